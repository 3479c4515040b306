//! Receiver device registry
//!
//! Holds the devices the bridge reports through `cast:receiverDeviceUp` and
//! `cast:receiverDeviceDown`, and derives aggregate receiver availability.
//!
//! ```text
//!   receiverDeviceUp ──► upsert() ──┐
//!                                   ├──► empty <-> non-empty? ──► receiver listener
//!   receiverDeviceDown ─► remove() ─┘
//! ```

pub mod device;
pub mod store;

pub use device::{ReceiverAvailability, ReceiverDevice};
pub use store::DeviceRegistry;
