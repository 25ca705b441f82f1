//! In-Memory Session Registry
//!
//! Tracks which session identifiers are currently connected. The registry is
//! the single process-wide view of live sessions; each entry is created when
//! a client connects and destroyed exactly once when its relay tears down.
//! Nothing here outlives the process: session persistence is out of scope.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// One client's end-to-end interaction lifetime with the agent boundary.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    /// Whether the client negotiated audio output at connect time.
    pub audio: bool,
    pub created_at: DateTime<Utc>,
}

/// Registry of active sessions, keyed by session identifier. The critical
/// sections are short and never await, so a plain mutex suffices.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session. A second connection for an identifier that is
    /// still active is rejected: one relay instance per session identifier.
    pub fn create(&self, id: &str, audio: bool) -> Result<Session> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(id) {
            bail!("session '{id}' is already connected");
        }
        let session = Session {
            id: id.to_string(),
            audio,
            created_at: Utc::now(),
        };
        sessions.insert(id.to_string(), session.clone());
        Ok(session)
    }

    /// Removes a session. Returns false when the identifier was not present.
    pub fn destroy(&self, id: &str) -> bool {
        self.sessions.lock().unwrap().remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    /// All active sessions, most recent first.
    pub fn list(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> =
            self.sessions.lock().unwrap().values().cloned().collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_destroy_round_trip() {
        let registry = SessionRegistry::new();
        let session = registry.create("client-1", true).unwrap();
        assert_eq!(session.id, "client-1");
        assert!(session.audio);

        assert!(registry.get("client-1").is_some());
        assert!(registry.destroy("client-1"));
        assert!(registry.get("client-1").is_none());
        assert!(!registry.destroy("client-1"));
    }

    #[test]
    fn duplicate_identifier_is_rejected() {
        let registry = SessionRegistry::new();
        registry.create("client-1", false).unwrap();
        assert!(registry.create("client-1", false).is_err());

        // The identifier becomes available again after teardown.
        registry.destroy("client-1");
        assert!(registry.create("client-1", true).is_ok());
    }

    #[test]
    fn list_returns_most_recent_first() {
        let registry = SessionRegistry::new();
        registry.create("older", false).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        registry.create("newer", false).unwrap();

        let sessions = registry.list();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, "newer");
        assert_eq!(sessions[1].id, "older");
    }
}
