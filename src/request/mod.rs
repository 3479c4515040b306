//! Session requests and the arbiter that serializes them

pub mod arbiter;

use serde::{Deserialize, Serialize};

use crate::receiver::Capability;

pub use arbiter::{ArbiterState, PendingCallbacks, SessionRequestArbiter};

/// Application to launch and its launch parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Receiver application id
    pub app_id: String,
    /// Capabilities the receiver must have
    pub capabilities: Vec<Capability>,
    /// Preferred receiver application language
    pub language: Option<String>,
}

impl SessionRequest {
    /// Request for an application with the default capabilities
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            capabilities: vec![Capability::VideoOut, Capability::AudioOut],
            language: None,
        }
    }

    /// Set required capabilities
    pub fn capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the preferred language
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}
