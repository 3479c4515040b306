//! Sender-side cast session and receiver coordination
//!
//! This crate exposes the sender API shape of a widely deployed casting SDK:
//! discover receivers, negotiate a session with one of them and exchange
//! namespaced messages over it. It performs no network I/O itself. A bridge
//! process owns discovery and the cast transport, and everything it reports
//! arrives as an [`Envelope`] over the message channel.
//!
//! # Example
//!
//! ```no_run
//! use cast_sender::{channel, ApiConfig, CastRuntime, SessionRequest};
//!
//! # async fn example() {
//! let (outbound, _to_bridge) = channel::unbounded();
//! let (_from_bridge, inbound) = tokio::sync::mpsc::unbounded_channel();
//!
//! let runtime = CastRuntime::new(outbound);
//! let dispatch = runtime.spawn(inbound);
//!
//! let config = ApiConfig::new(
//!     SessionRequest::new("CC1AD845"),
//!     |session| println!("joined {}", session.session_id()),
//!     |availability| println!("receivers: {:?}", availability),
//! );
//!
//! let mut api = runtime.api().lock().await;
//! api.initialize(config, || {}, |err| eprintln!("init failed: {}", err));
//! api.request_session(
//!     |session| println!("session {}", session.session_id()),
//!     |err| eprintln!("request failed: {}", err),
//!     None,
//!     None,
//! );
//! # drop(api);
//! # dispatch.abort();
//! # }
//! ```

pub mod api;
pub mod channel;
pub mod error;
pub mod listener;
pub mod receiver;
pub mod registry;
pub mod request;
pub mod runtime;
pub mod session;

pub use api::{ApiConfig, AutoJoinPolicy, CastApi, DefaultActionPolicy};
pub use channel::{Envelope, MessageChannel};
pub use error::{CastError, Error, ErrorCode, Result};
pub use listener::{ListenerId, ReceiverAction};
pub use receiver::{Capability, Receiver, ReceiverType, Volume};
pub use registry::{ReceiverAvailability, ReceiverDevice};
pub use request::SessionRequest;
pub use runtime::CastRuntime;
pub use session::{Session, SessionStatus};

/// API version as `[major, minor]`
pub const VERSION: [u32; 2] = [1, 2];
