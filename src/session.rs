//! Session context: login flag and user email.
//!
//! The context is injected wherever the session is needed and keeps an
//! in-memory copy of the state; a `SessionStore` persists it between runs.
//! Lifecycle is explicit: `begin` at login, `end` at logout.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub user_email: Option<String>,
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<SessionState, SessionError>;
    fn save(&self, state: &SessionState) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Process-local store, used by tests and one-shot runs.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<SessionState>,
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<SessionState, SessionError> {
        self.state
            .lock()
            .map(|s| s.clone())
            .map_err(|_| SessionError::LockPoisoned)
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        *self.state.lock().map_err(|_| SessionError::LockPoisoned)? = state.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.save(&SessionState::default())
    }
}

/// JSON file store. A missing file reads as logged out.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<SessionState, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(state)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct SessionContext {
    store: Box<dyn SessionStore>,
    state: RwLock<SessionState>,
}

impl SessionContext {
    /// Initialise from `store`. An unreadable store starts logged out.
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        let state = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Session store unreadable, starting logged out");
            SessionState::default()
        });
        Self {
            store,
            state: RwLock::new(state),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::default()))
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read().map(|s| s.logged_in).unwrap_or(false)
    }

    pub fn user_email(&self) -> Option<String> {
        self.state.read().ok()?.user_email.clone()
    }

    /// Mark the session authenticated for `email` and persist it.
    pub fn begin(&self, email: &str) -> Result<(), SessionError> {
        let state = SessionState {
            logged_in: true,
            user_email: Some(email.to_string()),
        };
        self.store.save(&state)?;
        *self.state.write().map_err(|_| SessionError::LockPoisoned)? = state;
        tracing::debug!(email, "Session started");
        Ok(())
    }

    /// Clear the session. The in-memory state is cleared even when the
    /// store fails.
    pub fn end(&self) -> Result<(), SessionError> {
        if let Ok(mut state) = self.state.write() {
            *state = SessionState::default();
        }
        self.store.clear()?;
        tracing::debug!("Session ended");
        Ok(())
    }
}
