//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::RulesLoader;
use crate::pipeline::SessionStore;

/// Shared application state.
///
/// Holds the loaded rules and the open batch sessions.
#[derive(Clone)]
pub struct AppState {
    /// The loaded payroll configuration.
    config: Arc<RulesLoader>,
    /// Open batch sessions.
    sessions: Arc<SessionStore>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: RulesLoader) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    /// Like [`new`](Self::new), evicting sessions idle for longer than `ttl`.
    pub fn with_session_ttl(config: RulesLoader, ttl: Duration) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::with_ttl(ttl)),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &RulesLoader {
        &self.config
    }

    /// Returns the session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
