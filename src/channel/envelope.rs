//! Envelope framing and the outbound channel seam

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Message subjects carried over the channel
///
/// `main:*` subjects go to the extension UI, `bridge:*` subjects go to the
/// bridge process, and `cast:*` subjects arrive at this layer.
pub mod subject {
    pub const MAIN_INITIALIZE_CAST: &str = "main:initializeCast";
    pub const MAIN_SELECT_RECEIVER: &str = "main:selectReceiver";
    pub const MAIN_CLOSE_RECEIVER_SELECTOR: &str = "main:closeReceiverSelector";

    pub const BRIDGE_CREATE_CAST_SESSION: &str = "bridge:createCastSession";
    pub const BRIDGE_SEND_CAST_SESSION_MESSAGE: &str = "bridge:sendCastSessionMessage";
    pub const BRIDGE_STOP_CAST_SESSION: &str = "bridge:stopCastSession";
    pub const BRIDGE_SET_CAST_SESSION_VOLUME: &str = "bridge:setCastSessionVolume";

    pub const CAST_INITIALIZED: &str = "cast:initialized";
    pub const CAST_RECEIVER_DEVICE_UP: &str = "cast:receiverDeviceUp";
    pub const CAST_RECEIVER_DEVICE_DOWN: &str = "cast:receiverDeviceDown";
    pub const CAST_SESSION_CREATED: &str = "cast:sessionCreated";
    pub const CAST_SESSION_UPDATED: &str = "cast:sessionUpdated";
    pub const CAST_SESSION_STOPPED: &str = "cast:sessionStopped";
    pub const CAST_RECEIVED_SESSION_MESSAGE: &str = "cast:receivedSessionMessage";
    pub const CAST_SEND_MESSAGE_RESULT: &str = "cast:impl_sendMessage";
    pub const CAST_SELECT_RECEIVER_SELECTED: &str = "cast:selectReceiver/selected";
    pub const CAST_SELECT_RECEIVER_STOPPED: &str = "cast:selectReceiver/stopped";
    pub const CAST_SELECT_RECEIVER_CANCELLED: &str = "cast:selectReceiver/cancelled";
    pub const CAST_LAUNCH_APP: &str = "cast:launchApp";
}

/// A typed message travelling between this layer and the bridge/UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message subject (see [`subject`])
    pub subject: String,
    /// Subject-specific payload
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Create an envelope from a raw JSON payload
    pub fn new(subject: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            subject: subject.into(),
            data,
        }
    }

    /// Create an envelope with no payload
    pub fn empty(subject: impl Into<String>) -> Self {
        Self::new(subject, serde_json::Value::Null)
    }

    /// Create an envelope by serializing a payload
    pub fn with_payload<T: Serialize>(subject: impl Into<String>, payload: &T) -> Result<Self> {
        Ok(Self::new(subject, serde_json::to_value(payload)?))
    }
}

/// Outbound half of the message channel
///
/// Sends are fire-and-forget; replies arrive later as inbound envelopes.
pub trait MessageChannel: Send + Sync {
    /// Queue an envelope for delivery
    fn post(&self, envelope: Envelope) -> Result<()>;
}

impl MessageChannel for mpsc::UnboundedSender<Envelope> {
    fn post(&self, envelope: Envelope) -> Result<()> {
        let subject = envelope.subject.clone();
        self.send(envelope)
            .map_err(|_| Error::ChannelClosed { subject })
    }
}

/// Create an in-process outbound channel
///
/// Returns the channel handle to give to [`CastApi`](crate::api::CastApi)
/// and the receiver the embedding process forwards to the bridge.
pub fn unbounded() -> (Arc<dyn MessageChannel>, mpsc::UnboundedReceiver<Envelope>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(tx), rx)
}

/// Serialize a payload and post it
pub(crate) fn post_payload<T: Serialize>(
    channel: &dyn MessageChannel,
    subject: &str,
    payload: &T,
) -> Result<()> {
    channel.post(Envelope::with_payload(subject, payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_missing_data_defaults_to_null() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"subject":"cast:initialized"}"#).unwrap();

        assert_eq!(envelope.subject, subject::CAST_INITIALIZED);
        assert!(envelope.data.is_null());
    }

    #[test]
    fn test_post_after_receiver_dropped() {
        let (channel, rx) = unbounded();
        drop(rx);

        let result = channel.post(Envelope::empty(subject::MAIN_SELECT_RECEIVER));
        assert!(matches!(result, Err(Error::ChannelClosed { subject }) if subject == "main:selectReceiver"));
    }

    #[test]
    fn test_post_delivers_in_order() {
        let (channel, mut rx) = unbounded();

        channel.post(Envelope::empty("a")).unwrap();
        channel.post(Envelope::empty("b")).unwrap();

        assert_eq!(rx.try_recv().unwrap().subject, "a");
        assert_eq!(rx.try_recv().unwrap().subject, "b");
    }
}
