//! Message channel to the bridge process and extension UI
//!
//! This layer performs no network I/O. Every discovery event, session
//! lifecycle change and message delivery arrives as an [`Envelope`] and is
//! decoded into an [`Inbound`] notification; every directive to the bridge or
//! UI leaves through a [`MessageChannel`].
//!
//! ```text
//!   CastApi ──post()──► MessageChannel ──► bridge / UI
//!      ▲
//!      └── handle_envelope() ◄── Inbound::decode() ◄── Envelope
//! ```

pub mod envelope;
pub mod message;

pub use envelope::{subject, unbounded, Envelope, MessageChannel};
pub use message::{Inbound, NamespaceEntry, ReceivedMessage, SendMessageResult, SessionStatusPayload};

pub(crate) use envelope::post_payload;
