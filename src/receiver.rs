//! Public receiver representation
//!
//! Maps the bridge's [`ReceiverDevice`] record onto the receiver shape client
//! code expects. Capability decoding is first-match-wins over a fixed
//! priority order, so a device reporting several capabilities surfaces only
//! the highest-priority one.

use serde::{Deserialize, Serialize};

use crate::registry::ReceiverDevice;

/// Device capability bits as reported by the bridge
pub mod capability_flags {
    pub const VIDEO_OUT: u32 = 1 << 0;
    pub const VIDEO_IN: u32 = 1 << 1;
    pub const AUDIO_OUT: u32 = 1 << 2;
    pub const AUDIO_IN: u32 = 1 << 3;
    pub const MULTIZONE_GROUP: u32 = 1 << 5;
}

/// Receiver capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    VideoOut,
    VideoIn,
    AudioOut,
    AudioIn,
    MultizoneGroup,
}

/// Decoding order, highest priority first
const CAPABILITY_PRIORITY: [(u32, Capability); 5] = [
    (capability_flags::VIDEO_OUT, Capability::VideoOut),
    (capability_flags::VIDEO_IN, Capability::VideoIn),
    (capability_flags::AUDIO_OUT, Capability::AudioOut),
    (capability_flags::AUDIO_IN, Capability::AudioIn),
    (capability_flags::MULTIZONE_GROUP, Capability::MultizoneGroup),
];

impl Capability {
    /// Decode capability bits, stopping at the first match
    pub fn decode(bits: u32) -> Vec<Capability> {
        CAPABILITY_PRIORITY
            .iter()
            .find(|(flag, _)| bits & flag != 0)
            .map(|&(_, capability)| vec![capability])
            .unwrap_or_default()
    }
}

/// Receiver family
///
/// Only cast receivers are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverType {
    Cast,
}

/// Receiver volume
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Level in `[0, 1]`
    #[serde(default)]
    pub level: Option<f64>,
    #[serde(default)]
    pub muted: Option<bool>,
}

/// Application image (icon)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// What a receiver is currently showing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverDisplayStatus {
    pub status_text: String,
    pub app_images: Vec<Image>,
}

/// Receiver as exposed to client code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receiver {
    /// Receiver identifier (the device id)
    pub label: String,
    pub friendly_name: String,
    pub capabilities: Vec<Capability>,
    pub volume: Option<Volume>,
    pub receiver_type: ReceiverType,
    pub display_status: Option<ReceiverDisplayStatus>,
}

/// Project a bridge device record onto a public receiver
pub fn project(device: &ReceiverDevice) -> Receiver {
    Receiver {
        label: device.id.clone(),
        friendly_name: device.friendly_name.clone(),
        capabilities: Capability::decode(device.capabilities),
        volume: None,
        receiver_type: ReceiverType::Cast,
        display_status: None,
    }
}

#[cfg(test)]
mod tests {
    use super::capability_flags::*;
    use super::*;

    fn device(capabilities: u32) -> ReceiverDevice {
        ReceiverDevice {
            id: "kitchen".into(),
            friendly_name: "Kitchen speaker".into(),
            capabilities,
            host: "10.0.0.4".into(),
            port: 8009,
        }
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            Capability::decode(VIDEO_OUT | AUDIO_OUT),
            vec![Capability::VideoOut]
        );
        assert_eq!(
            Capability::decode(AUDIO_IN | MULTIZONE_GROUP),
            vec![Capability::AudioIn]
        );
        assert_eq!(
            Capability::decode(MULTIZONE_GROUP),
            vec![Capability::MultizoneGroup]
        );
    }

    #[test]
    fn test_no_known_bits() {
        assert!(Capability::decode(0).is_empty());
        // Bit 4 is not a surfaced capability
        assert!(Capability::decode(1 << 4).is_empty());
    }

    #[test]
    fn test_project() {
        let receiver = project(&device(AUDIO_OUT | AUDIO_IN));

        assert_eq!(receiver.label, "kitchen");
        assert_eq!(receiver.friendly_name, "Kitchen speaker");
        assert_eq!(receiver.capabilities, vec![Capability::AudioOut]);
        assert_eq!(receiver.receiver_type, ReceiverType::Cast);
        assert!(receiver.volume.is_none());
        assert!(receiver.display_status.is_none());
    }
}
