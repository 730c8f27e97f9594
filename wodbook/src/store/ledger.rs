//! Single-slot durable record of the active booking.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

use crate::models::ActiveBooking;

/// File-backed storage for the one outstanding booking. No history.
pub struct BookingLedger {
    path: PathBuf,
}

impl BookingLedger {
    /// Use the ledger file at a specific path.
    pub const fn open_at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the active booking, if any.
    ///
    /// Never errors: a missing, empty, or corrupt ledger reads as absent
    /// so startup cannot fail on damaged local state.
    pub fn load(&self) -> Option<ActiveBooking> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        if content.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&content) {
            Ok(booking) => Some(booking),
            Err(err) => {
                debug!("ignoring unreadable booking ledger: {err}");
                None
            }
        }
    }

    /// Persist the active booking, replacing any previous record.
    pub fn save(&self, booking: &ActiveBooking) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(booking)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write booking ledger: {}", self.path.display()))?;
        Ok(())
    }

    /// Clear the record after a confirmed cancellation. The file is
    /// truncated rather than deleted.
    pub fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        std::fs::write(&self.path, "")
            .with_context(|| format!("Failed to clear booking ledger: {}", self.path.display()))
    }
}
