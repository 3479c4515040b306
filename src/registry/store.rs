//! Device registry implementation
//!
//! Tracks the receiver devices the bridge currently reports as reachable.
//! Mutations return the aggregate availability transition they caused, if
//! any, so the caller can notify the configured receiver listener.

use std::collections::HashMap;

use super::device::{ReceiverAvailability, ReceiverDevice};

/// Set of reachable receiver devices, keyed by device id
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, ReceiverDevice>,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device if its id is not already known
    ///
    /// Returns `Some(Available)` when this insert made the registry
    /// non-empty. Re-registering a known id is a no-op and returns `None`.
    pub fn upsert(&mut self, device: ReceiverDevice) -> Option<ReceiverAvailability> {
        if self.devices.contains_key(&device.id) {
            tracing::debug!(device_id = %device.id, "Receiver device already registered");
            return None;
        }

        let was_empty = self.devices.is_empty();

        tracing::info!(
            device_id = %device.id,
            name = %device.friendly_name,
            host = %device.host,
            port = device.port,
            "Receiver device up"
        );
        self.devices.insert(device.id.clone(), device);

        was_empty.then_some(ReceiverAvailability::Available)
    }

    /// Remove a device by id
    ///
    /// Returns `Some(Unavailable)` when this removal emptied the registry.
    pub fn remove(&mut self, id: &str) -> Option<ReceiverAvailability> {
        if self.devices.remove(id).is_none() {
            tracing::debug!(device_id = %id, "Receiver device down for unknown id");
            return None;
        }

        tracing::info!(device_id = %id, remaining = self.devices.len(), "Receiver device down");

        self.devices
            .is_empty()
            .then_some(ReceiverAvailability::Unavailable)
    }

    /// Get a device by id
    pub fn get(&self, id: &str) -> Option<&ReceiverDevice> {
        self.devices.get(id)
    }

    /// Check whether a device id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.devices.contains_key(id)
    }

    /// Number of registered devices
    pub fn size(&self) -> usize {
        self.devices.len()
    }

    /// Check if no devices are registered
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Current aggregate availability
    pub fn availability(&self) -> ReceiverAvailability {
        ReceiverAvailability::from_count(self.devices.len())
    }
}
