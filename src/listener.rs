//! Listener registries and callback types
//!
//! Listeners are long-lived and may fire many times; they are stored as
//! `Arc<dyn Fn>` in a [`ListenerSet`] and removed by the [`ListenerId`]
//! returned on insertion. Callbacks are one-shot `Box<dyn FnOnce>` values
//! consumed by the operation they belong to.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::CastError;
use crate::receiver::Receiver;
use crate::registry::ReceiverAvailability;
use crate::session::Session;

/// Action reported to receiver-action listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverAction {
    Cast,
    Stop,
}

/// Invoked for sessions not established through `request_session`
pub type SessionListener = Arc<dyn Fn(Session) + Send + Sync>;
/// Invoked when aggregate receiver availability changes
pub type ReceiverListener = Arc<dyn Fn(ReceiverAvailability) + Send + Sync>;
/// Invoked with `(namespace, message)` for inbound session messages
pub type MessageListener = dyn Fn(&str, &str) + Send + Sync;
/// Invoked with the session's connectivity when it changes
pub type UpdateListener = dyn Fn(bool) + Send + Sync;
/// Invoked when a receiver is cast to or stopped from this sender
pub type ReceiverActionListener = dyn Fn(&Receiver, ReceiverAction) + Send + Sync;

pub type SuccessCallback = Box<dyn FnOnce() + Send>;
pub type ErrorCallback = Box<dyn FnOnce(CastError) + Send>;
pub type SessionCallback = Box<dyn FnOnce(Session) + Send>;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Token identifying a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ordered set of listeners
pub struct ListenerSet<F: ?Sized> {
    listeners: Vec<(ListenerId, Arc<F>)>,
}

impl<F: ?Sized> ListenerSet<F> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener
    pub fn insert(&mut self, listener: Arc<F>) -> ListenerId {
        let id = ListenerId::next();
        self.listeners.push((id, listener));
        id
    }

    /// Unregister a listener, returning whether it was present
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Clone out the current listeners in registration order
    ///
    /// Dispatch goes through a snapshot so listeners run without any lock
    /// held and may add or remove listeners themselves.
    pub fn snapshot(&self) -> Vec<Arc<F>> {
        self.listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

impl<F: ?Sized> Default for ListenerSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> std::fmt::Debug for ListenerSet<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish()
    }
}
