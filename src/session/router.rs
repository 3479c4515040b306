//! Message router
//!
//! Routes inbound application messages to the listeners registered for
//! their namespace, and bridge send acknowledgements to the callback pair
//! stored when the message was sent. Notifications for unknown sessions,
//! namespaces or message ids are logged and dropped.

use crate::channel::{ReceivedMessage, SendMessageResult};
use crate::error::CastError;

use super::store::SessionRegistry;

impl SessionRegistry {
    /// Deliver an inbound message to its namespace listeners
    ///
    /// Returns the number of listeners invoked.
    pub fn route_message(&self, message: &ReceivedMessage) -> usize {
        let Some(session) = self.get(&message.session_id) else {
            tracing::warn!(session_id = %message.session_id, "Message for unknown session");
            return 0;
        };

        let listeners = session
            .state()
            .lock()
            .message_listeners
            .get(&message.namespace)
            .map(|set| set.snapshot())
            .unwrap_or_default();

        if listeners.is_empty() {
            tracing::debug!(
                session_id = %message.session_id,
                namespace = %message.namespace,
                "No listeners for namespace"
            );
            return 0;
        }

        for listener in &listeners {
            listener(&message.namespace, &message.message_data);
        }

        listeners.len()
    }

    /// Resolve the callback pair for an acknowledged message
    ///
    /// Each message id resolves at most once. Returns whether a pending
    /// pair was found.
    pub fn route_send_result(&self, result: &SendMessageResult) -> bool {
        let Some(session) = self.get(&result.session_id) else {
            tracing::warn!(session_id = %result.session_id, "Send result for unknown session");
            return false;
        };

        let pending = session
            .state()
            .lock()
            .pending_sends
            .remove(&result.message_id);

        let Some(pending) = pending else {
            tracing::warn!(
                session_id = %result.session_id,
                message_id = %result.message_id,
                "Send result for unknown message"
            );
            return false;
        };

        match result.error {
            Some(code) => {
                tracing::debug!(
                    session_id = %result.session_id,
                    message_id = %result.message_id,
                    error = %code,
                    "Message send failed"
                );
                (pending.on_error)(CastError::new(code));
            }
            None => (pending.on_success)(),
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::channel::{unbounded, Envelope, SessionStatusPayload};
    use crate::error::ErrorCode;
    use crate::receiver::{Receiver, ReceiverType, Volume};
    use crate::session::Session;

    fn registry_with_session() -> (SessionRegistry, Session, UnboundedReceiver<Envelope>) {
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

        let session = Session::from_status(&status, receiver, channel);
        let mut registry = SessionRegistry::new();
        registry.insert(session.clone());
        (registry, session, rx)
    }

    fn message(session_id: &str, namespace: &str, data: &str) -> ReceivedMessage {
        ReceivedMessage {
            session_id: session_id.into(),
            namespace: namespace.into(),
            message_data: data.into(),
        }
    }

    #[test]
    fn test_route_message_to_namespace_listeners() {
        let (registry, session, _rx) = registry_with_session();
        let received = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..2 {
            let received = Arc::clone(&received);
            session.add_message_listener("urn:x-cast:a", move |ns, data| {
                received.lock().unwrap().push(format!("{}|{}", ns, data));
            });
        }
        session.add_message_listener("urn:x-cast:b", |_, _| panic!("wrong namespace"));

        assert_eq!(registry.route_message(&message("s1", "urn:x-cast:a", "hi")), 2);
        assert_eq!(
            *received.lock().unwrap(),
            vec!["urn:x-cast:a|hi".to_string(), "urn:x-cast:a|hi".to_string()]
        );
    }

    #[test]
    fn test_route_message_drops_unknown() {
        let (registry, _session, _rx) = registry_with_session();

        assert_eq!(registry.route_message(&message("nope", "urn:x-cast:a", "hi")), 0);
        assert_eq!(registry.route_message(&message("s1", "urn:x-cast:none", "hi")), 0);
    }

    #[test]
    fn test_route_send_result_success_once() {
        let (registry, session, _rx) = registry_with_session();
        let successes = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&successes);
        session.send_message(
            "urn:x-cast:a",
            "hi",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            |_| panic!("should not fail"),
        );

        let result = SendMessageResult {
            session_id: "s1".into(),
            message_id: "0".into(),
            error: None,
        };
        assert!(registry.route_send_result(&result));
        assert!(!registry.route_send_result(&result));
        assert_eq!(successes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_route_send_result_error() {
        let (registry, session, _rx) = registry_with_session();
        let errors = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&errors);
        session.send_message(
            "urn:x-cast:a",
            "hi",
            || panic!("should not succeed"),
            move |err| sink.lock().unwrap().push(err.code),
        );

        assert!(registry.route_send_result(&SendMessageResult {
            session_id: "s1".into(),
            message_id: "0".into(),
            error: Some(ErrorCode::ChannelError),
        }));
        assert_eq!(*errors.lock().unwrap(), vec![ErrorCode::ChannelError]);
    }
}
