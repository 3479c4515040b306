//! Session registry and message routing
//!
//! ```text
//!   sessionCreated ──► Session::from_status() ──► SessionRegistry::insert()
//!   sessionUpdated ──► Session::apply_status()
//!   sessionStopped ──► SessionRegistry::stop() ──► update listeners(false)
//!
//!   receivedSessionMessage ──► route_message() ──► namespace listeners
//!   impl_sendMessage ───────► route_send_result() ──► pending callback pair
//! ```
//!
//! Session handles are shared with client code, so all per-session state
//! sits behind a `parking_lot::Mutex`. Listeners are always invoked after
//! the lock is released.

pub mod handle;
pub mod router;
pub mod state;
pub mod store;

pub use handle::Session;
pub use state::{SenderApplication, SessionStatus};
pub use store::SessionRegistry;
