//! Class slot model representing one bookable class occurrence.

use serde::{Deserialize, Serialize};

/// A single bookable class occurrence at the box on a given day.
///
/// Slots are immutable within one listing cycle; a fresh listing replaces
/// the whole in-memory set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSlot {
    /// Remote identifier used to book this slot.
    pub id: u64,
    /// Start time as rendered by the remote service (e.g. "18:00").
    pub time: String,
    /// Remote time-window identifier.
    pub time_id: String,
    /// Identifier of the class type.
    pub class_id: u64,
    /// Class type name (e.g. "WOD").
    pub class_name: String,
    /// Coach running the class.
    pub coach_name: String,
    /// Athletes currently signed up.
    pub ocupation: i64,
    /// Maximum number of athletes.
    pub limit: i64,
    /// Remote booking-state flag, when the service reports one.
    pub book_state: Option<i64>,
    /// Reservation id, present when the remote already holds a booking
    /// for this slot.
    pub reservation_id: Option<u64>,
    /// Day this slot belongs to, as `YYYYMMDD`. The listing payload omits
    /// it, so it is attached at fetch time.
    pub day: String,
}

impl ClassSlot {
    /// Whether the remote service reports this slot as already booked.
    pub const fn is_booked(&self) -> bool {
        matches!(self.book_state, Some(1))
    }
}

impl std::fmt::Display for ClassSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({:02}/{}), Monitor {}",
            self.time, self.class_name, self.ocupation, self.limit, self.coach_name
        )
    }
}
