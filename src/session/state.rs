//! Session state
//!
//! The data behind a [`Session`](super::Session) handle: the bridge-reported
//! session fields plus the per-session observer registries.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::channel::SessionStatusPayload;
use crate::listener::{ErrorCallback, ListenerSet, MessageListener, SuccessCallback, UpdateListener};
use crate::receiver::{Image, Receiver, ReceiverDisplayStatus};

/// Session lifecycle status
///
/// Sessions only exist once the bridge reports them, so there is no
/// connecting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Connected,
    Stopped,
}

/// A sender application registered with the receiver application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderApplication {
    pub platform: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub package_id: Option<String>,
}

/// Callback pair for an outbound message awaiting acknowledgement
pub(crate) struct PendingSend {
    pub on_success: SuccessCallback,
    pub on_error: ErrorCallback,
}

/// Complete session state
pub(crate) struct SessionState {
    pub session_id: String,
    pub app_id: String,
    pub display_name: String,
    pub app_images: Vec<Image>,
    /// Snapshot taken at creation; only volume and display status are patched
    pub receiver: Receiver,
    pub status: SessionStatus,
    pub status_text: String,
    pub transport_id: String,
    pub sender_apps: Vec<SenderApplication>,
    pub namespaces: Vec<String>,

    /// Per-namespace message listeners
    pub message_listeners: HashMap<String, ListenerSet<MessageListener>>,

    /// Connectivity listeners
    pub update_listeners: ListenerSet<UpdateListener>,

    /// Outbound messages awaiting acknowledgement, keyed by message id
    pub pending_sends: HashMap<String, PendingSend>,

    next_message_id: u64,
}

impl SessionState {
    /// Build state from a creation notification
    pub fn from_status(status: &SessionStatusPayload, mut receiver: Receiver) -> Self {
        receiver.volume = Some(status.volume);
        receiver.display_status = Some(ReceiverDisplayStatus {
            status_text: status.status_text.clone(),
            app_images: status.app_images.clone(),
        });

        Self {
            session_id: status.session_id.clone(),
            app_id: status.app_id.clone(),
            display_name: status.display_name.clone(),
            app_images: status.app_images.clone(),
            receiver,
            status: SessionStatus::Connected,
            status_text: status.status_text.clone(),
            transport_id: status.transport_id.clone(),
            sender_apps: status.sender_apps.clone(),
            namespaces: namespace_names(status),
            message_listeners: HashMap::new(),
            update_listeners: ListenerSet::new(),
            pending_sends: HashMap::new(),
            next_message_id: 0,
        }
    }

    /// Patch status text, namespaces and receiver volume in place
    pub fn apply_status(&mut self, status: &SessionStatusPayload) {
        self.status_text = status.status_text.clone();
        self.namespaces = namespace_names(status);
        self.receiver.volume = Some(status.volume);

        if let Some(display) = self.receiver.display_status.as_mut() {
            display.status_text = status.status_text.clone();
        }
    }

    /// Mark the session stopped and return the listeners to notify
    pub fn stop(&mut self) -> Vec<Arc<UpdateListener>> {
        self.status = SessionStatus::Stopped;
        self.update_listeners.snapshot()
    }

    /// Allocate the next outbound message id
    pub fn allocate_message_id(&mut self) -> String {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id.to_string()
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }
}

fn namespace_names(status: &SessionStatusPayload) -> Vec<String> {
    status.namespaces.iter().map(|ns| ns.name.clone()).collect()
}
