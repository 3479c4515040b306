//! Error types
//!
//! Two families live here. [`CastError`] is what client error callbacks
//! receive and mirrors the vendor error contract. [`Error`] covers failures
//! internal to this layer (channel closed, malformed envelopes).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed error code taxonomy exposed to client callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The operation was cancelled by the user
    Cancel,
    /// The operation timed out
    Timeout,
    /// The API is not initialized
    ApiNotInitialized,
    /// The parameters to the operation were not valid
    InvalidParameter,
    /// The API script is not compatible with the installed extension
    ExtensionNotCompatible,
    /// The extension is not available
    ExtensionMissing,
    /// No receiver was compatible with the session request
    ReceiverUnavailable,
    /// A session could not be created, or a session was invalid
    SessionError,
    /// A channel to the receiver is not available
    ChannelError,
    /// Load media failed
    LoadMediaFailed,
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Cancel => "cancel",
            ErrorCode::Timeout => "timeout",
            ErrorCode::ApiNotInitialized => "api_not_initialized",
            ErrorCode::InvalidParameter => "invalid_parameter",
            ErrorCode::ExtensionNotCompatible => "extension_not_compatible",
            ErrorCode::ExtensionMissing => "extension_missing",
            ErrorCode::ReceiverUnavailable => "receiver_unavailable",
            ErrorCode::SessionError => "session_error",
            ErrorCode::ChannelError => "channel_error",
            ErrorCode::LoadMediaFailed => "load_media_failed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error delivered to a caller-supplied error callback
#[derive(Debug, Clone, PartialEq)]
pub struct CastError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable detail
    pub description: Option<String>,
}

impl CastError {
    /// Create an error with no description
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            description: None,
        }
    }

    /// Create an error with a description
    pub fn with_description(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: Some(description.into()),
        }
    }
}

impl std::fmt::Display for CastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {}", self.code, description),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for CastError {}

impl From<ErrorCode> for CastError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

/// Internal error type for this layer
#[derive(Debug, Error)]
pub enum Error {
    /// The outbound side of the message channel is gone
    #[error("Message channel closed (subject: {subject})")]
    ChannelClosed { subject: String },

    /// An inbound envelope carried a subject this layer does not handle
    #[error("Unknown message subject: {0}")]
    UnknownSubject(String),

    /// An envelope payload did not match the shape its subject requires
    #[error("Invalid payload for {subject}: {source}")]
    InvalidPayload {
        subject: String,
        #[source]
        source: serde_json::Error,
    },

    /// A payload could not be serialized
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result alias for internal operations
pub type Result<T> = std::result::Result<T, Error>;
