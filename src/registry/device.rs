//! Receiver device record and aggregate availability

use serde::{Deserialize, Serialize};

/// Receiver device as reported by the bridge
///
/// Identified by `id`; two records with the same id are the same device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverDevice {
    /// Stable device identifier
    pub id: String,
    /// Human-readable name
    pub friendly_name: String,
    /// Capability bitflags (see [`capability_flags`](crate::receiver::capability_flags))
    pub capabilities: u32,
    /// Transport host
    pub host: String,
    /// Transport port
    pub port: u16,
}

/// Whether any receiver is currently reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverAvailability {
    Available,
    Unavailable,
}

impl ReceiverAvailability {
    /// Availability for a registry of the given size
    pub fn from_count(count: usize) -> Self {
        if count > 0 {
            ReceiverAvailability::Available
        } else {
            ReceiverAvailability::Unavailable
        }
    }
}
