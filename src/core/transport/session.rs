//! Session tracking for the SSE transport.
//!
//! Every open event stream owns one session. Messages POSTed with that
//! session's id are answered on its stream, so two clients never see each
//! other's responses.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;
use tracing::debug;

/// Outbound queue feeding one client's event stream.
type SessionSender = mpsc::Sender<Value>;

/// Registry of live SSE sessions, shared by all HTTP handlers.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionSender>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session.
    ///
    /// The session lives as long as the returned guard; the receiver yields
    /// every message queued for it.
    pub fn open(&self, capacity: usize) -> (SessionGuard, mpsc::Receiver<Value>) {
        let id = uuid::Uuid::new_v4().to_string();
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        self.write().insert(id.clone(), sender);
        debug!(session_id = %id, "Session opened");

        let guard = SessionGuard {
            id,
            registry: self.clone(),
        };
        (guard, receiver)
    }

    /// Sender for a session's stream, if the session is still open.
    pub fn sender(&self, id: &str) -> Option<mpsc::Sender<Value>> {
        self.read().get(id).cloned()
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no session is open.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn remove(&self, id: &str) {
        if self.write().remove(id).is_some() {
            debug!(session_id = %id, "Session closed");
        }
    }

    // A panicking holder cannot leave the map half-updated, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SessionSender>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SessionSender>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a session registered; dropping it closes the session.
#[derive(Debug)]
pub struct SessionGuard {
    id: String,
    registry: SessionRegistry,
}

impl SessionGuard {
    /// The session id clients must echo back as `sessionId`.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
