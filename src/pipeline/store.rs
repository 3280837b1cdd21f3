//! In-memory session storage for the HTTP service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::session::BatchSession;

/// How long a session may sit untouched before it is evicted.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

type SharedSession = Arc<Mutex<BatchSession>>;

#[derive(Debug)]
struct Entry {
    session: SharedSession,
    last_used: Instant,
}

/// Sessions keyed by id.
///
/// The map lock is only held to find a session. Each session has its own
/// lock, so a long `advance` on one batch does not hold up requests for
/// another. Sessions idle for longer than the store's TTL are evicted
/// when a new session is inserted or [`evict_idle`](Self::evict_idle) runs.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Entry>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    /// Creates an empty store with [`DEFAULT_SESSION_TTL`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that evicts sessions idle for longer than `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Stores a session under its own id and returns the id.
    pub fn insert(&self, session: BatchSession) -> Uuid {
        self.evict_idle();
        let id = session.id;
        self.lock().insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(session)),
                last_used: Instant::now(),
            },
        );
        id
    }

    /// Returns a copy of a session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] for an unknown id.
    pub fn get(&self, id: Uuid) -> EngineResult<BatchSession> {
        let session = self.shared(id)?;
        let copy = lock_session(&session).clone();
        Ok(copy)
    }

    /// Runs `f` against a stored session, holding only that session's lock.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] for an unknown id, or
    /// whatever `f` returns.
    pub fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut BatchSession) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let session = self.shared(id)?;
        let mut guard = lock_session(&session);
        f(&mut guard)
    }

    /// Removes a session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] for an unknown id.
    pub fn remove(&self, id: Uuid) -> EngineResult<BatchSession> {
        let entry = self
            .lock()
            .remove(&id)
            .ok_or(EngineError::SessionNotFound { id })?;
        let session = lock_session(&entry.session).clone();
        Ok(session)
    }

    /// Drops every session idle for longer than the TTL and returns how
    /// many were dropped.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when no session is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn evict_idle_at(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_used) <= self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle batch sessions");
        }
        evicted
    }

    fn shared(&self, id: Uuid) -> EngineResult<SharedSession> {
        let mut sessions = self.lock();
        let entry = sessions
            .get_mut(&id)
            .ok_or(EngineError::SessionNotFound { id })?;
        entry.last_used = Instant::now();
        Ok(Arc::clone(&entry.session))
    }

    // A panic while holding the lock leaves the map itself consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_session(session: &Mutex<BatchSession>) -> MutexGuard<'_, BatchSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
