//! In-memory session store.
//!
//! Sessions are held server-side and injected through the application
//! context; the cookie carries only an opaque token. Expired entries are
//! pruned lazily on lookup.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use uuid::Uuid;

/// A logged-in session.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub expires_at: u64,
}

impl Session {
    fn new(username: &str, timeout_hours: u64) -> Self {
        Self {
            username: username.to_string(),
            expires_at: now_secs().saturating_add(timeout_hours.saturating_mul(3600)),
        }
    }

    pub fn is_valid(&self) -> bool {
        now_secs() < self.expires_at
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Token-keyed session storage shared across request handlers.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create a session and return its token.
    pub fn create(&self, username: &str, timeout_hours: u64) -> String {
        let token = Uuid::new_v4().to_string();
        self.inner
            .write()
            .insert(token.clone(), Session::new(username, timeout_hours));
        token
    }

    /// Look up a session by token. Expired sessions are removed and yield
    /// `None`.
    pub fn get(&self, token: &str) -> Option<Session> {
        let sessions = self.inner.read();
        let session = sessions.get(token)?;
        if session.is_valid() {
            return Some(session.clone());
        }
        drop(sessions);
        self.inner.write().remove(token);
        None
    }

    /// Drop a session, valid or not.
    pub fn clear(&self, token: &str) {
        self.inner.write().remove(token);
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
