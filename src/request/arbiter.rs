//! Session request arbiter
//!
//! Single-slot state machine guarding session negotiation:
//!
//! ```text
//!   Idle ──begin()──► Requesting ──take_request()──► AwaitingSession ──complete()──► Idle
//!                         │  │                             │
//!                         │  └────────── complete() ───────┼──────────────────────► Idle
//!                         └─────────────── cancel() ───────┴──────────────────────► Idle
//! ```
//!
//! `Requesting` holds both the request and its callbacks. Once the request is
//! sent to a device, or the selector reports the receiver stopped, the slot is
//! released but the callbacks stay pending until the bridge reports the
//! session. A new request started in `AwaitingSession` replaces those
//! callbacks without firing them.

use crate::error::CastError;
use crate::listener::{ErrorCallback, SessionCallback};
use crate::session::Session;

use super::SessionRequest;

/// Arbiter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    /// No request in flight, no callbacks pending
    Idle,
    /// A request is waiting for a device (direct or via the selector)
    Requesting,
    /// The request was sent; callbacks wait for the session notification
    AwaitingSession,
}

/// Callbacks of the request in flight
pub struct PendingCallbacks {
    on_success: SessionCallback,
    on_error: ErrorCallback,
}

impl PendingCallbacks {
    pub fn new(on_success: SessionCallback, on_error: ErrorCallback) -> Self {
        Self {
            on_success,
            on_error,
        }
    }

    /// Consume the pair, firing the success callback
    pub fn succeed(self, session: Session) {
        (self.on_success)(session)
    }

    /// Consume the pair, firing the error callback
    pub fn fail(self, error: CastError) {
        (self.on_error)(error)
    }
}

impl std::fmt::Debug for PendingCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PendingCallbacks")
    }
}

/// Holds at most one session request at a time
#[derive(Debug, Default)]
pub struct SessionRequestArbiter {
    in_flight: Option<SessionRequest>,
    callbacks: Option<PendingCallbacks>,
}

impl SessionRequestArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ArbiterState {
        match (&self.in_flight, &self.callbacks) {
            (Some(_), _) => ArbiterState::Requesting,
            (None, Some(_)) => ArbiterState::AwaitingSession,
            (None, None) => ArbiterState::Idle,
        }
    }

    /// Check whether a request currently occupies the slot
    pub fn is_requesting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The request in flight, if any
    pub fn request(&self) -> Option<&SessionRequest> {
        self.in_flight.as_ref()
    }

    /// Start a request
    ///
    /// Gives the callbacks back if a request already occupies the slot.
    pub fn begin(
        &mut self,
        request: SessionRequest,
        callbacks: PendingCallbacks,
    ) -> Result<(), PendingCallbacks> {
        if self.in_flight.is_some() {
            return Err(callbacks);
        }

        if self.callbacks.is_some() {
            tracing::warn!(
                app_id = %request.app_id,
                "Replacing callbacks of a request still awaiting its session"
            );
        }

        tracing::debug!(app_id = %request.app_id, "Session request started");
        self.in_flight = Some(request);
        self.callbacks = Some(callbacks);
        Ok(())
    }

    /// Release the slot, keeping the callbacks pending
    pub fn take_request(&mut self) -> Option<SessionRequest> {
        self.in_flight.take()
    }

    /// Clear the request and hand back its callbacks (selector cancelled,
    /// send failure)
    pub fn cancel(&mut self) -> Option<PendingCallbacks> {
        self.in_flight = None;
        self.callbacks.take()
    }

    /// Return to idle once the session exists, handing back the pending
    /// callbacks
    ///
    /// Also clears a request still waiting on the selector.
    pub fn complete(&mut self) -> Option<PendingCallbacks> {
        if let Some(request) = self.in_flight.take() {
            tracing::debug!(
                app_id = %request.app_id,
                "Session reported before a receiver was selected"
            );
        }
        self.callbacks.take()
    }
}
