//! Session registry implementation
//!
//! Maps session ids to live [`Session`] handles. Entries are only created
//! from a `cast:sessionCreated` notification and are never removed; stopped
//! sessions stay queryable in their terminal state.

use std::collections::HashMap;

use super::handle::Session;

/// Registry of sessions acknowledged by the bridge
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly created session
    ///
    /// A repeated creation notification for a known id replaces the handle.
    pub fn insert(&mut self, session: Session) {
        let session_id = session.session_id();
        if self.sessions.insert(session_id.clone(), session).is_some() {
            tracing::warn!(session_id = %session_id, "Session created twice, replacing");
        } else {
            tracing::info!(session_id = %session_id, "Session created");
        }
    }

    /// Get a session by id
    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    /// Mark a session stopped, notifying its update listeners
    ///
    /// Returns false for an unknown id.
    pub fn stop(&self, session_id: &str) -> bool {
        let Some(session) = self.sessions.get(session_id) else {
            return false;
        };

        session.mark_stopped();
        tracing::info!(session_id = %session_id, "Session stopped");
        true
    }

    /// Total number of sessions, including stopped ones
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
