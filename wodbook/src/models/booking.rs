//! Active booking model: the single outstanding confirmed booking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ClassSlot;

/// The one booking the user currently holds.
///
/// Exists if and only if the last successful book has not been followed by
/// a successful cancel. Persisted across restarts by the booking ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBooking {
    /// The slot the user committed to.
    pub slot: ClassSlot,
    /// Remote-assigned confirmation id, required to cancel later.
    pub confirmation_id: u64,
    /// When the booking was confirmed.
    pub booked_at: DateTime<Utc>,
}

impl ActiveBooking {
    /// Create a new active booking from a confirmed book outcome.
    pub fn new(slot: ClassSlot, confirmation_id: u64) -> Self {
        Self {
            slot,
            confirmation_id,
            booked_at: Utc::now(),
        }
    }
}
