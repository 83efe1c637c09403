//! Session capability.
//!
//! A session is an opaque per-client key-value map addressed by the id
//! carried in the session cookie. The only key the application writes is
//! [`USER_ID_KEY`]; its absence means the client is not logged in. The
//! session stores only the user id, and the user itself is re-read from
//! storage on every request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reviewboard_common::IdGenerator;
use tokio::sync::RwLock;

/// Session key holding the authenticated user's id.
pub const USER_ID_KEY: &str = "userId";

/// Per-client key-value storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value from a session.
    async fn get(&self, session_id: &str, key: &str) -> Option<String>;

    /// Write a value, creating the session if needed.
    async fn insert(&self, session_id: &str, key: &str, value: String);

    /// Drop a session and everything in it.
    async fn destroy(&self, session_id: &str);
}

pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Login state on top of a [`SessionStore`].
#[derive(Clone)]
pub struct SessionService {
    store: SharedSessionStore,
    id_gen: IdGenerator,
}

impl SessionService {
    #[must_use]
    pub fn new(store: SharedSessionStore) -> Self {
        Self {
            store,
            id_gen: IdGenerator::new(),
        }
    }

    /// The user id stored in a session, if any.
    pub async fn user_id(&self, session_id: &str) -> Option<String> {
        self.store.get(session_id, USER_ID_KEY).await
    }

    /// Start a fresh session for `user_id` and return its id.
    ///
    /// A new id is issued on every login so a pre-login session id can
    /// never become authenticated.
    pub async fn sign_in(&self, user_id: &str) -> String {
        let session_id = self.id_gen.generate_session_id();
        self.store
            .insert(&session_id, USER_ID_KEY, user_id.to_string())
            .await;
        tracing::debug!(user_id = %user_id, "Session started");
        session_id
    }

    /// End a session.
    pub async fn sign_out(&self, session_id: &str) {
        self.store.destroy(session_id).await;
    }
}

/// Sessions expire after this long unless configured otherwise.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

struct SessionEntry {
    issued_at: Instant,
    values: HashMap<String, String>,
}

/// In-process session store. Sessions do not survive a restart and are
/// not shared between nodes.
///
/// A session expires `ttl` after it was created. Expired sessions read as
/// absent straight away and are dropped by [`MemorySessionStore::cleanup`].
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Remove expired sessions and return how many were dropped.
    pub async fn cleanup(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, entry| entry.issued_at.elapsed() < ttl);
        before - sessions.len()
    }

    /// Number of sessions held, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are held.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .filter(|entry| entry.issued_at.elapsed() < self.ttl)
            .and_then(|entry| entry.values.get(key).cloned())
    }

    async fn insert(&self, session_id: &str, key: &str, value: String) {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                issued_at: Instant::now(),
                values: HashMap::new(),
            });
        if entry.issued_at.elapsed() >= self.ttl {
            // Reusing an expired id starts a new session
            entry.issued_at = Instant::now();
            entry.values.clear();
        }
        entry.values.insert(key.to_string(), value);
    }

    async fn destroy(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }
}
