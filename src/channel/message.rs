//! Typed payloads for inbound and outbound envelopes

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCode, Result};
use crate::receiver::{Image, Volume};
use crate::registry::ReceiverDevice;
use crate::session::SenderApplication;

use super::envelope::{subject, Envelope};

/// Session state reported by the bridge on creation and on every update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusPayload {
    pub session_id: String,
    pub app_id: String,
    pub display_name: String,
    #[serde(default)]
    pub app_images: Vec<Image>,
    pub receiver_id: String,
    pub receiver_friendly_name: String,
    #[serde(default)]
    pub volume: Volume,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub namespaces: Vec<NamespaceEntry>,
    pub transport_id: String,
    #[serde(default)]
    pub sender_apps: Vec<SenderApplication>,
}

/// A namespace advertised by the receiver application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub name: String,
}

/// Application message received from a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub session_id: String,
    pub namespace: String,
    pub message_data: String,
}

/// Bridge acknowledgement for an outbound session message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResult {
    pub session_id: String,
    pub message_id: String,
    #[serde(default)]
    pub error: Option<ErrorCode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevicePayload {
    receiver_device: ReceiverDevice,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceIdPayload {
    receiver_device_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionIdPayload {
    session_id: String,
}

/// Inbound notification, decoded from an [`Envelope`]
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// The bridge finished starting up
    Initialized,
    /// A receiver device became reachable
    ReceiverDeviceUp(ReceiverDevice),
    /// A receiver device went away
    ReceiverDeviceDown { receiver_device_id: String },
    SessionCreated(SessionStatusPayload),
    SessionUpdated(SessionStatusPayload),
    SessionStopped { session_id: String },
    ReceivedSessionMessage(ReceivedMessage),
    SendMessageResult(SendMessageResult),
    /// The user picked a receiver in the selector
    ReceiverSelected(ReceiverDevice),
    /// The user stopped a receiver from the selector
    ReceiverStopped(ReceiverDevice),
    /// The selector was dismissed without a choice
    SelectorCancelled,
    /// The UI asked to launch the default application on a receiver
    LaunchApp(ReceiverDevice),
}

impl Inbound {
    /// Decode an envelope by subject
    pub fn decode(envelope: Envelope) -> Result<Self> {
        let Envelope { subject: name, data } = envelope;

        let inbound = match name.as_str() {
            subject::CAST_INITIALIZED => Inbound::Initialized,
            subject::CAST_RECEIVER_DEVICE_UP => {
                let payload: DevicePayload = parse(&name, data)?;
                Inbound::ReceiverDeviceUp(payload.receiver_device)
            }
            subject::CAST_RECEIVER_DEVICE_DOWN => {
                let payload: DeviceIdPayload = parse(&name, data)?;
                Inbound::ReceiverDeviceDown {
                    receiver_device_id: payload.receiver_device_id,
                }
            }
            subject::CAST_SESSION_CREATED => Inbound::SessionCreated(parse(&name, data)?),
            subject::CAST_SESSION_UPDATED => Inbound::SessionUpdated(parse(&name, data)?),
            subject::CAST_SESSION_STOPPED => {
                let payload: SessionIdPayload = parse(&name, data)?;
                Inbound::SessionStopped {
                    session_id: payload.session_id,
                }
            }
            subject::CAST_RECEIVED_SESSION_MESSAGE => {
                Inbound::ReceivedSessionMessage(parse(&name, data)?)
            }
            subject::CAST_SEND_MESSAGE_RESULT => {
                Inbound::SendMessageResult(parse(&name, data)?)
            }
            subject::CAST_SELECT_RECEIVER_SELECTED => {
                let payload: DevicePayload = parse(&name, data)?;
                Inbound::ReceiverSelected(payload.receiver_device)
            }
            subject::CAST_SELECT_RECEIVER_STOPPED => {
                let payload: DevicePayload = parse(&name, data)?;
                Inbound::ReceiverStopped(payload.receiver_device)
            }
            subject::CAST_SELECT_RECEIVER_CANCELLED => Inbound::SelectorCancelled,
            subject::CAST_LAUNCH_APP => {
                let payload: DevicePayload = parse(&name, data)?;
                Inbound::LaunchApp(payload.receiver_device)
            }
            _ => return Err(Error::UnknownSubject(name)),
        };

        Ok(inbound)
    }
}

fn parse<T: DeserializeOwned>(subject: &str, data: serde_json::Value) -> Result<T> {
    serde_json::from_value(data).map_err(|source| Error::InvalidPayload {
        subject: subject.to_string(),
        source,
    })
}

/// `main:initializeCast`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeCast<'a> {
    pub app_id: &'a str,
}

/// `bridge:createCastSession`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCastSession<'a> {
    pub app_id: &'a str,
    pub receiver_device: &'a ReceiverDevice,
}

/// `bridge:sendCastSessionMessage`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCastSessionMessage<'a> {
    pub session_id: &'a str,
    pub namespace: &'a str,
    pub message_data: &'a str,
    pub message_id: &'a str,
}

/// `bridge:stopCastSession`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopCastSession<'a> {
    pub session_id: &'a str,
}

/// `bridge:setCastSessionVolume`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCastSessionVolume<'a> {
    pub session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_device_up() {
        let envelope = Envelope::new(
            subject::CAST_RECEIVER_DEVICE_UP,
            json!({
                "receiverDevice": {
                    "id": "living-room",
                    "friendlyName": "Living Room TV",
                    "capabilities": 5,
                    "host": "192.168.1.20",
                    "port": 8009
                }
            }),
        );

        match Inbound::decode(envelope).unwrap() {
            Inbound::ReceiverDeviceUp(device) => {
                assert_eq!(device.id, "living-room");
                assert_eq!(device.friendly_name, "Living Room TV");
                assert_eq!(device.port, 8009);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_send_result_with_error() {
        let envelope = Envelope::new(
            subject::CAST_SEND_MESSAGE_RESULT,
            json!({ "sessionId": "s1", "messageId": "3", "error": "session_error" }),
        );

        let inbound = Inbound::decode(envelope).unwrap();
        assert_eq!(
            inbound,
            Inbound::SendMessageResult(SendMessageResult {
                session_id: "s1".into(),
                message_id: "3".into(),
                error: Some(ErrorCode::SessionError),
            })
        );
    }

    #[test]
    fn test_decode_session_status_defaults() {
        let envelope = Envelope::new(
            subject::CAST_SESSION_CREATED,
            json!({
                "sessionId": "s1",
                "appId": "CC1AD845",
                "displayName": "Default Media Receiver",
                "receiverId": "living-room",
                "receiverFriendlyName": "Living Room TV",
                "transportId": "web-5"
            }),
        );

        let Inbound::SessionCreated(status) = Inbound::decode(envelope).unwrap() else {
            panic!("expected SessionCreated");
        };
        assert!(status.namespaces.is_empty());
        assert!(status.volume.level.is_none());
        assert_eq!(status.status_text, "");
    }

    #[test]
    fn test_decode_unknown_subject() {
        let result = Inbound::decode(Envelope::empty("cast:somethingElse"));
        assert!(matches!(result, Err(Error::UnknownSubject(s)) if s == "cast:somethingElse"));
    }

    #[test]
    fn test_decode_invalid_payload() {
        let envelope = Envelope::new(subject::CAST_SESSION_STOPPED, json!({ "id": 4 }));
        assert!(matches!(
            Inbound::decode(envelope),
            Err(Error::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_volume_payload_omits_unset_fields() {
        let payload = SetCastSessionVolume {
            session_id: "s1",
            level: None,
            muted: Some(true),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "sessionId": "s1", "muted": true })
        );
    }
}
