//! Inbound notification handling

use crate::channel::{subject, Envelope, Inbound, SessionStatusPayload};
use crate::error::{CastError, ErrorCode};
use crate::listener::ReceiverAction;
use crate::receiver;
use crate::registry::ReceiverDevice;
use crate::session::Session;

use super::CastApi;

impl CastApi {
    /// Decode and handle one inbound envelope
    ///
    /// Undecodable envelopes are logged and dropped.
    pub fn handle_envelope(&mut self, envelope: Envelope) {
        let subject = envelope.subject.clone();
        match Inbound::decode(envelope) {
            Ok(inbound) => self.handle_inbound(inbound),
            Err(e) => tracing::warn!(subject = %subject, error = %e, "Dropping inbound envelope"),
        }
    }

    /// Handle one decoded notification
    pub fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Initialized => {
                tracing::debug!("Bridge initialized");
                self.bridge_available = true;
            }
            Inbound::ReceiverDeviceUp(device) => {
                if let Some(availability) = self.devices.upsert(device) {
                    self.notify_availability(availability);
                }
            }
            Inbound::ReceiverDeviceDown { receiver_device_id } => {
                if let Some(availability) = self.devices.remove(&receiver_device_id) {
                    self.notify_availability(availability);
                }
            }
            Inbound::SessionCreated(status) => self.on_session_created(status),
            Inbound::SessionUpdated(status) => self.apply_status(&status),
            Inbound::SessionStopped { session_id } => {
                if !self.sessions.stop(&session_id) {
                    tracing::debug!(session_id = %session_id, "Stop for unknown session");
                }
            }
            Inbound::ReceivedSessionMessage(message) => {
                self.sessions.route_message(&message);
            }
            Inbound::SendMessageResult(result) => {
                self.sessions.route_send_result(&result);
            }
            Inbound::ReceiverSelected(device) => self.on_receiver_selected(device),
            Inbound::ReceiverStopped(device) => self.on_receiver_stopped(device),
            Inbound::SelectorCancelled => self.on_selector_cancelled(),
            Inbound::LaunchApp(device) => self.on_launch_app(device),
        }
    }

    fn on_session_created(&mut self, status: SessionStatusPayload) {
        let Some(device) = self.devices.get(&status.receiver_id) else {
            tracing::error!(
                session_id = %status.session_id,
                device_id = %status.receiver_id,
                "Session created on unknown receiver device"
            );
            return;
        };

        let session = Session::from_status(
            &status,
            receiver::project(device),
            std::sync::Arc::clone(&self.channel),
        );
        self.sessions.insert(session);

        self.apply_status(&status);
    }

    /// Shared completion path for session creation and updates
    ///
    /// A pending `request_session` success callback takes priority over the
    /// configured session listener, and is consumed.
    fn apply_status(&mut self, status: &SessionStatusPayload) {
        let Some(session) = self.sessions.get(&status.session_id).cloned() else {
            tracing::warn!(session_id = %status.session_id, "Update for unknown session");
            return;
        };

        session.apply_status(status);

        if let Some(callbacks) = self.arbiter.complete() {
            tracing::debug!(session_id = %status.session_id, "Session request succeeded");
            if let Err(e) = self
                .channel
                .post(Envelope::empty(subject::MAIN_CLOSE_RECEIVER_SELECTOR))
            {
                tracing::warn!(error = %e, "Failed to close receiver selector");
            }
            callbacks.succeed(session);
        } else if let Some(config) = self.config.as_ref() {
            (config.session_listener)(session);
        }
    }

    fn on_receiver_selected(&mut self, device: ReceiverDevice) {
        tracing::debug!(device_id = %device.id, "Receiver selected");
        self.send_pending_request(&device);
    }

    fn on_receiver_stopped(&mut self, device: ReceiverDevice) {
        tracing::debug!(device_id = %device.id, "Receiver stopped from selector");
        self.arbiter.take_request();
        self.notify_receiver_action(&receiver::project(&device), ReceiverAction::Stop);
    }

    fn on_selector_cancelled(&mut self) {
        tracing::debug!("Receiver selection cancelled");
        if let Some(callbacks) = self.arbiter.cancel() {
            callbacks.fail(CastError::new(ErrorCode::Cancel));
        }
    }

    fn on_launch_app(&mut self, device: ReceiverDevice) {
        if self.arbiter.is_requesting() {
            tracing::warn!(device_id = %device.id, "Session request already in progress");
            return;
        }

        let Some(config) = self.config.as_ref() else {
            tracing::warn!(device_id = %device.id, "Launch requested before initialization");
            return;
        };

        if let Err(e) = self.post_create_session(&config.session_request.app_id, &device) {
            tracing::error!(device_id = %device.id, error = %e, "Failed to launch application");
        }
    }
}
