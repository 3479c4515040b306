//! API configuration

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::listener::{ReceiverListener, SessionListener};
use crate::registry::ReceiverAvailability;
use crate::request::SessionRequest;
use crate::session::Session;

/// Which existing sessions the bridge may auto-join
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoJoinPolicy {
    /// Sessions started from the same tab and origin
    #[default]
    TabAndOriginScoped,
    /// Sessions started from the same origin
    OriginScoped,
    /// No auto-join
    PageScoped,
}

/// What the UI's default action is for this page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultActionPolicy {
    #[default]
    CreateSession,
    CastThisTab,
}

/// Client configuration, set once per [`CastApi`](super::CastApi)
#[derive(Clone)]
pub struct ApiConfig {
    /// Request used when `request_session` gets no override and for
    /// UI-initiated launches
    pub session_request: SessionRequest,

    /// Invoked for sessions not established through `request_session`
    pub session_listener: SessionListener,

    /// Invoked with aggregate receiver availability
    pub receiver_listener: ReceiverListener,

    pub auto_join_policy: AutoJoinPolicy,

    pub default_action_policy: DefaultActionPolicy,
}

impl ApiConfig {
    /// Create a config with default policies
    pub fn new<S, R>(session_request: SessionRequest, session_listener: S, receiver_listener: R) -> Self
    where
        S: Fn(Session) + Send + Sync + 'static,
        R: Fn(ReceiverAvailability) + Send + Sync + 'static,
    {
        Self {
            session_request,
            session_listener: Arc::new(session_listener),
            receiver_listener: Arc::new(receiver_listener),
            auto_join_policy: AutoJoinPolicy::default(),
            default_action_policy: DefaultActionPolicy::default(),
        }
    }

    /// Set the auto-join policy
    pub fn auto_join_policy(mut self, policy: AutoJoinPolicy) -> Self {
        self.auto_join_policy = policy;
        self
    }

    /// Set the default action policy
    pub fn default_action_policy(mut self, policy: DefaultActionPolicy) -> Self {
        self.default_action_policy = policy;
        self
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("session_request", &self.session_request)
            .field("auto_join_policy", &self.auto_join_policy)
            .field("default_action_policy", &self.default_action_policy)
            .finish_non_exhaustive()
    }
}
