//! Client-facing session handle
//!
//! A [`Session`] is a cheap clone over shared session state. The registry,
//! the message router and client code all hold clones of the same handle,
//! so listeners registered by a client are seen by inbound dispatch.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::channel::message::{SendCastSessionMessage, SetCastSessionVolume, StopCastSession};
use crate::channel::{post_payload, subject, MessageChannel, SessionStatusPayload};
use crate::error::{CastError, ErrorCode};
use crate::listener::{ListenerId, ListenerSet, MessageListener, UpdateListener};
use crate::receiver::{Image, Receiver};

use super::state::{PendingSend, SenderApplication, SessionState, SessionStatus};

/// An established casting session
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    channel: Arc<dyn MessageChannel>,
}

impl Session {
    pub(crate) fn from_status(
        status: &SessionStatusPayload,
        receiver: Receiver,
        channel: Arc<dyn MessageChannel>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::from_status(status, receiver))),
            channel,
        }
    }

    pub(crate) fn state(&self) -> &Mutex<SessionState> {
        &self.state
    }

    pub(crate) fn apply_status(&self, status: &SessionStatusPayload) {
        self.state.lock().apply_status(status);
    }

    /// Mark stopped and tell every update listener the session is gone
    pub(crate) fn mark_stopped(&self) {
        let listeners = self.state.lock().stop();
        for listener in listeners {
            listener(false);
        }
    }

    pub fn session_id(&self) -> String {
        self.state.lock().session_id.clone()
    }

    pub fn app_id(&self) -> String {
        self.state.lock().app_id.clone()
    }

    pub fn display_name(&self) -> String {
        self.state.lock().display_name.clone()
    }

    pub fn app_images(&self) -> Vec<Image> {
        self.state.lock().app_images.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    pub fn status_text(&self) -> String {
        self.state.lock().status_text.clone()
    }

    /// Receiver snapshot taken when the session was created
    pub fn receiver(&self) -> Receiver {
        self.state.lock().receiver.clone()
    }

    pub fn transport_id(&self) -> String {
        self.state.lock().transport_id.clone()
    }

    pub fn sender_apps(&self) -> Vec<SenderApplication> {
        self.state.lock().sender_apps.clone()
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.state.lock().namespaces.clone()
    }

    /// Listen for messages on a namespace
    pub fn add_message_listener<F>(&self, namespace: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        let listener: Arc<MessageListener> = Arc::new(listener);
        self.state
            .lock()
            .message_listeners
            .entry(namespace.into())
            .or_insert_with(ListenerSet::new)
            .insert(listener)
    }

    pub fn remove_message_listener(&self, namespace: &str, id: ListenerId) -> bool {
        let mut state = self.state.lock();
        let Some(listeners) = state.message_listeners.get_mut(namespace) else {
            return false;
        };

        let removed = listeners.remove(id);
        if listeners.is_empty() {
            state.message_listeners.remove(namespace);
        }
        removed
    }

    /// Listen for connectivity changes (`false` once the session stops)
    pub fn add_update_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let listener: Arc<UpdateListener> = Arc::new(listener);
        self.state.lock().update_listeners.insert(listener)
    }

    pub fn remove_update_listener(&self, id: ListenerId) -> bool {
        self.state.lock().update_listeners.remove(id)
    }

    /// Send an application message on a namespace
    ///
    /// String messages are sent verbatim, other JSON values are serialized.
    /// `on_success` or `on_error` fires when the bridge acknowledges the
    /// message. There is no timeout: an unacknowledged message keeps its
    /// callbacks pending.
    pub fn send_message<S, E>(
        &self,
        namespace: &str,
        message: impl Into<serde_json::Value>,
        on_success: S,
        on_error: E,
    ) where
        S: FnOnce() + Send + 'static,
        E: FnOnce(CastError) + Send + 'static,
    {
        let message_data = match message.into() {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };

        let (session_id, message_id) = {
            let mut state = self.state.lock();
            if !state.is_connected() {
                drop(state);
                on_error(CastError::with_description(
                    ErrorCode::SessionError,
                    "Session is stopped",
                ));
                return;
            }

            let message_id = state.allocate_message_id();
            state.pending_sends.insert(
                message_id.clone(),
                PendingSend {
                    on_success: Box::new(on_success),
                    on_error: Box::new(on_error),
                },
            );
            (state.session_id.clone(), message_id)
        };

        let payload = SendCastSessionMessage {
            session_id: &session_id,
            namespace,
            message_data: &message_data,
            message_id: &message_id,
        };

        if let Err(e) = post_payload(
            self.channel.as_ref(),
            subject::BRIDGE_SEND_CAST_SESSION_MESSAGE,
            &payload,
        ) {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to send session message");
            let pending = self.state.lock().pending_sends.remove(&message_id);
            if let Some(pending) = pending {
                (pending.on_error)(CastError::with_description(
                    ErrorCode::ChannelError,
                    e.to_string(),
                ));
            }
        }
    }

    /// Ask the bridge to stop the receiver application
    ///
    /// The status changes when the bridge reports `cast:sessionStopped`.
    pub fn stop<S, E>(&self, on_success: S, on_error: E)
    where
        S: FnOnce() + Send + 'static,
        E: FnOnce(CastError) + Send + 'static,
    {
        let session_id = self.session_id();
        let payload = StopCastSession {
            session_id: &session_id,
        };

        match post_payload(self.channel.as_ref(), subject::BRIDGE_STOP_CAST_SESSION, &payload) {
            Ok(()) => on_success(),
            Err(e) => on_error(CastError::with_description(
                ErrorCode::ChannelError,
                e.to_string(),
            )),
        }
    }

    /// Set the receiver volume level in `[0, 1]`
    pub fn set_receiver_volume_level<S, E>(&self, level: f64, on_success: S, on_error: E)
    where
        S: FnOnce() + Send + 'static,
        E: FnOnce(CastError) + Send + 'static,
    {
        if !(0.0..=1.0).contains(&level) {
            on_error(CastError::with_description(
                ErrorCode::InvalidParameter,
                "Volume level must be between 0 and 1",
            ));
            return;
        }

        self.set_volume(Some(level), None, on_success, on_error);
    }

    /// Mute or unmute the receiver
    pub fn set_receiver_muted<S, E>(&self, muted: bool, on_success: S, on_error: E)
    where
        S: FnOnce() + Send + 'static,
        E: FnOnce(CastError) + Send + 'static,
    {
        self.set_volume(None, Some(muted), on_success, on_error);
    }

    fn set_volume<S, E>(&self, level: Option<f64>, muted: Option<bool>, on_success: S, on_error: E)
    where
        S: FnOnce() + Send + 'static,
        E: FnOnce(CastError) + Send + 'static,
    {
        let session_id = self.session_id();
        let payload = SetCastSessionVolume {
            session_id: &session_id,
            level,
            muted,
        };

        match post_payload(
            self.channel.as_ref(),
            subject::BRIDGE_SET_CAST_SESSION_VOLUME,
            &payload,
        ) {
            Ok(()) => on_success(),
            Err(e) => on_error(CastError::with_description(
                ErrorCode::ChannelError,
                e.to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Session")
            .field("session_id", &state.session_id)
            .field("app_id", &state.app_id)
            .field("status", &state.status)
            .field("receiver", &state.receiver.label)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use serde_json::json;

    use super::*;
    use crate::channel::{unbounded, Envelope};
    use crate::receiver::{ReceiverType, Volume};

    fn session() -> (Session, tokio::sync::mpsc::UnboundedReceiver<Envelope>) {
        let (channel, rx) = unbounded();
        let status = SessionStatusPayload {
            session_id: "s1".into(),
            app_id: "CC1AD845".into(),
            display_name: "Default Media Receiver".into(),
            app_images: vec![],
            receiver_id: "tv".into(),
            receiver_friendly_name: "TV".into(),
            volume: Volume::default(),
            status_text: String::new(),
            namespaces: vec![],
            transport_id: "web-1".into(),
            sender_apps: vec![],
        };
        let receiver = Receiver {
            label: "tv".into(),
            friendly_name: "TV".into(),
            capabilities: vec![],
            volume: None,
            receiver_type: ReceiverType::Cast,
            display_status: None,
        };
        (Session::from_status(&status, receiver, channel), rx)
    }

    #[test]
    fn test_send_message_records_pending() {
        let (session, mut rx) = session();

        session.send_message("urn:x-cast:test", json!({ "type": "PING" }), || {}, |_| {});

        let envelope = rx.try_recv().unwrap();
        assert_eq!(envelope.subject, subject::BRIDGE_SEND_CAST_SESSION_MESSAGE);
        assert_eq!(
            envelope.data,
            json!({
                "sessionId": "s1",
                "namespace": "urn:x-cast:test",
                "messageData": "{\"type\":\"PING\"}",
                "messageId": "0"
            })
        );
        assert!(session.state().lock().pending_sends.contains_key("0"));
    }

    #[test]
    fn test_send_message_string_verbatim() {
        let (session, mut rx) = session();

        session.send_message("urn:x-cast:test", "hello", || {}, |_| {});

        let envelope = rx.try_recv().unwrap();
        assert_eq!(envelope.data["messageData"], "hello");
    }

    #[test]
    fn test_send_message_on_stopped_session() {
        let (session, mut rx) = session();
        session.mark_stopped();

        let failed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&failed);
        session.send_message(
            "urn:x-cast:test",
            "hello",
            || panic!("should not succeed"),
            move |err| {
                assert_eq!(err.code, ErrorCode::SessionError);
                flag.store(true, Ordering::SeqCst);
            },
        );

        assert!(failed.load(Ordering::SeqCst));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_message_channel_closed() {
        let (session, rx) = session();
        drop(rx);

        let failed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&failed);
        session.send_message(
            "urn:x-cast:test",
            "hello",
            || panic!("should not succeed"),
            move |err| {
                assert_eq!(err.code, ErrorCode::ChannelError);
                flag.store(true, Ordering::SeqCst);
            },
        );

        assert!(failed.load(Ordering::SeqCst));
        assert!(session.state().lock().pending_sends.is_empty());
    }

    #[test]
    fn test_volume_level_validation() {
        let (session, mut rx) = session();

        let failed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&failed);
        session.set_receiver_volume_level(
            1.5,
            || panic!("should not succeed"),
            move |err| {
                assert_eq!(err.code, ErrorCode::InvalidParameter);
                flag.store(true, Ordering::SeqCst);
            },
        );
        assert!(failed.load(Ordering::SeqCst));
        assert!(rx.try_recv().is_err());

        session.set_receiver_volume_level(0.25, || {}, |_| panic!("should not fail"));
        let envelope = rx.try_recv().unwrap();
        assert_eq!(envelope.subject, subject::BRIDGE_SET_CAST_SESSION_VOLUME);
        assert_eq!(envelope.data, json!({ "sessionId": "s1", "level": 0.25 }));
    }

    #[test]
    fn test_stop_posts_directive_without_changing_status() {
        let (session, mut rx) = session();

        session.stop(|| {}, |_| panic!("should not fail"));

        let envelope = rx.try_recv().unwrap();
        assert_eq!(envelope.subject, subject::BRIDGE_STOP_CAST_SESSION);
        assert_eq!(session.status(), SessionStatus::Connected);
    }

    #[test]
    fn test_remove_message_listener() {
        let (session, _rx) = session();

        let id = session.add_message_listener("urn:x-cast:a", |_, _| {});
        assert!(!session.remove_message_listener("urn:x-cast:b", id));
        assert!(session.remove_message_listener("urn:x-cast:a", id));
        assert!(session.state().lock().message_listeners.is_empty());
    }
}
