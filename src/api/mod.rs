//! Public API facade
//!
//! [`CastApi`] is the single coordinator owning the device registry, the
//! session request arbiter and the session registry. Client calls and
//! inbound envelopes both go through `&mut self`, so every handler runs to
//! completion before the next one starts. Errors surface only through the
//! error callback of the operation that failed.

pub mod config;
mod dispatch;

use std::sync::Arc;

use crate::channel::message::{CreateCastSession, InitializeCast};
use crate::channel::{post_payload, subject, Envelope, MessageChannel};
use crate::error::{CastError, ErrorCode, Result};
use crate::listener::{ListenerId, ListenerSet, ReceiverAction, ReceiverActionListener};
use crate::receiver::{self, Receiver};
use crate::registry::{DeviceRegistry, ReceiverAvailability, ReceiverDevice};
use crate::request::{ArbiterState, PendingCallbacks, SessionRequest, SessionRequestArbiter};
use crate::session::{Session, SessionRegistry};

pub use config::{ApiConfig, AutoJoinPolicy, DefaultActionPolicy};

/// Sender-side cast API
pub struct CastApi {
    channel: Arc<dyn MessageChannel>,
    config: Option<ApiConfig>,
    bridge_available: bool,
    devices: DeviceRegistry,
    arbiter: SessionRequestArbiter,
    sessions: SessionRegistry,
    receiver_action_listeners: ListenerSet<ReceiverActionListener>,
}

impl CastApi {
    /// Create an uninitialized API over an outbound channel
    pub fn new(channel: Arc<dyn MessageChannel>) -> Self {
        Self {
            channel,
            config: None,
            bridge_available: false,
            devices: DeviceRegistry::new(),
            arbiter: SessionRequestArbiter::new(),
            sessions: SessionRegistry::new(),
            receiver_action_listeners: ListenerSet::new(),
        }
    }

    /// Set the configuration
    ///
    /// Fails with `invalid_parameter` if already initialized, leaving the
    /// first configuration in place. On success the receiver listener is
    /// immediately told the current availability.
    pub fn initialize<S, E>(&mut self, config: ApiConfig, on_success: S, on_error: E)
    where
        S: FnOnce() + Send + 'static,
        E: FnOnce(CastError) + Send + 'static,
    {
        if self.config.is_some() {
            tracing::warn!("API already initialized");
            on_error(CastError::with_description(
                ErrorCode::InvalidParameter,
                "API already initialized",
            ));
            return;
        }

        let payload = InitializeCast {
            app_id: &config.session_request.app_id,
        };
        if let Err(e) = post_payload(self.channel.as_ref(), subject::MAIN_INITIALIZE_CAST, &payload) {
            tracing::error!(error = %e, "Failed to announce application id");
        }

        tracing::info!(app_id = %config.session_request.app_id, "API initialized");

        let receiver_listener = Arc::clone(&config.receiver_listener);
        self.config = Some(config);

        on_success();
        receiver_listener(self.devices.availability());
    }

    /// Request a new session
    ///
    /// With a registered `receiver_device` the request goes straight to that
    /// device; otherwise the receiver selector is opened and the outcome
    /// arrives later. `on_success` fires once the bridge reports the session.
    pub fn request_session<S, E>(
        &mut self,
        on_success: S,
        on_error: E,
        request: Option<SessionRequest>,
        receiver_device: Option<ReceiverDevice>,
    ) where
        S: FnOnce(Session) + Send + 'static,
        E: FnOnce(CastError) + Send + 'static,
    {
        let Some(config) = self.config.as_ref() else {
            on_error(CastError::new(ErrorCode::ApiNotInitialized));
            return;
        };

        if self.arbiter.is_requesting() {
            on_error(CastError::with_description(
                ErrorCode::InvalidParameter,
                "Session request already in progress",
            ));
            return;
        }

        if self.devices.is_empty() {
            on_error(CastError::new(ErrorCode::ReceiverUnavailable));
            return;
        }

        let request = request.unwrap_or_else(|| config.session_request.clone());
        let callbacks = PendingCallbacks::new(Box::new(on_success), Box::new(on_error));
        if let Err(callbacks) = self.arbiter.begin(request, callbacks) {
            callbacks.fail(CastError::with_description(
                ErrorCode::InvalidParameter,
                "Session request already in progress",
            ));
            return;
        }

        let target = receiver_device.and_then(|device| {
            let registered = self.devices.get(&device.id).cloned();
            if registered.is_none() {
                tracing::warn!(device_id = %device.id, "Requested device not registered, opening selector");
            }
            registered
        });

        match target {
            Some(device) => {
                if self.send_pending_request(&device) {
                    self.notify_receiver_action(&receiver::project(&device), ReceiverAction::Cast);
                }
            }
            None => {
                if let Err(e) = self.channel.post(Envelope::empty(subject::MAIN_SELECT_RECEIVER)) {
                    self.fail_request(e);
                }
            }
        }
    }

    /// Register a receiver-action listener
    pub fn add_receiver_action_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&Receiver, ReceiverAction) + Send + Sync + 'static,
    {
        let listener: Arc<ReceiverActionListener> = Arc::new(listener);
        self.receiver_action_listeners.insert(listener)
    }

    pub fn remove_receiver_action_listener(&mut self, id: ListenerId) -> bool {
        self.receiver_action_listeners.remove(id)
    }

    /// Client log pass-through
    pub fn log_message(&self, message: &str) {
        tracing::info!(target: "cast_sender::client", "{}", message);
    }

    /// Whether the bridge has reported itself initialized
    pub fn is_available(&self) -> bool {
        self.bridge_available
    }

    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    pub fn config(&self) -> Option<&ApiConfig> {
        self.config.as_ref()
    }

    pub fn receiver_availability(&self) -> ReceiverAvailability {
        self.devices.availability()
    }

    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    pub fn arbiter_state(&self) -> ArbiterState {
        self.arbiter.state()
    }

    /// Look up a session, including stopped ones
    pub fn session(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).cloned()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Send the in-flight request to a device, releasing the slot
    ///
    /// Returns false if nothing was in flight or the send failed; a failed
    /// send reports `channel_error` to the caller.
    fn send_pending_request(&mut self, device: &ReceiverDevice) -> bool {
        let Some(request) = self.arbiter.take_request() else {
            tracing::warn!(device_id = %device.id, "No session request in flight");
            return false;
        };

        match self.post_create_session(&request.app_id, device) {
            Ok(()) => true,
            Err(e) => {
                self.fail_request(e);
                false
            }
        }
    }

    fn post_create_session(&self, app_id: &str, device: &ReceiverDevice) -> Result<()> {
        tracing::info!(app_id = %app_id, device_id = %device.id, "Creating session");
        let payload = CreateCastSession {
            app_id,
            receiver_device: device,
        };
        post_payload(self.channel.as_ref(), subject::BRIDGE_CREATE_CAST_SESSION, &payload)
    }

    fn fail_request(&mut self, error: crate::error::Error) {
        tracing::error!(error = %error, "Session request failed");
        if let Some(callbacks) = self.arbiter.cancel() {
            callbacks.fail(CastError::with_description(
                ErrorCode::ChannelError,
                error.to_string(),
            ));
        }
    }

    fn notify_receiver_action(&self, receiver: &Receiver, action: ReceiverAction) {
        for listener in self.receiver_action_listeners.snapshot() {
            listener(receiver, action);
        }
    }

    fn notify_availability(&self, availability: ReceiverAvailability) {
        if let Some(config) = self.config.as_ref() {
            (config.receiver_listener)(availability);
        }
    }
}

impl std::fmt::Debug for CastApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CastApi")
            .field("config", &self.config)
            .field("bridge_available", &self.bridge_available)
            .field("devices", &self.devices.size())
            .field("arbiter", &self.arbiter.state())
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
