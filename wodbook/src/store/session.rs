//! Durable session cache, one entry per account.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

use crate::models::Session;

/// File-backed account -> session mapping.
///
/// Reads degrade to "not cached"; only writes surface errors, and callers
/// are expected to log and proceed without a cached session.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Use the session file at a specific path.
    pub const fn open_at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Look up the cached session for an account. Absence is not an
    /// error; an unreadable or corrupt file is treated as absence.
    pub fn get(&self, account: &str) -> Option<Session> {
        let mut sessions = self.read_all();
        sessions.remove(account)
    }

    /// Cache a session under its account. Overwrites any previous entry.
    pub fn put(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut sessions = self.read_all();
        sessions.insert(session.account.clone(), session.clone());

        let json = serde_json::to_string_pretty(&sessions)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;
        Ok(())
    }

    fn read_all(&self) -> HashMap<String, Session> {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        serde_json::from_str(&content).unwrap_or_else(|err| {
            debug!("ignoring unreadable session file: {err}");
            HashMap::new()
        })
    }
}
