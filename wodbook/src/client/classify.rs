//! Classification of raw remote replies into typed outcomes.
//!
//! The service answers book and cancel with the same success sentinel
//! (`bookState == 1`); the presence of an `id` field is the only thing
//! that tells a booking confirmation apart from a cancellation
//! confirmation. The check order below is load-bearing.

use reqwest::StatusCode;
use serde_json::Value;

use crate::models::Outcome;

/// `bookState` value the service uses for a confirmed book or cancel.
const BOOK_STATE_OK: i64 = 1;

/// Which remote operation a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Booking a slot.
    Book,
    /// Cancelling an active booking.
    Cancel,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Book => write!(f, "book"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Interpret a raw remote reply.
///
/// Pure over status + body text, so it is testable without a network.
/// Transport faults raised before any body exists are mapped to
/// [`Outcome::TransportFailure`] by the caller.
pub fn classify(action: Action, status: StatusCode, body: &str) -> Outcome {
    if !status.is_success() {
        return Outcome::TransportFailure {
            detail: format!("{action} returned HTTP {status}"),
        };
    }

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Outcome::rejected("unknown");
    };

    let book_state = value.get("bookState").and_then(value_as_i64);
    if book_state == Some(BOOK_STATE_OK) {
        return match value.get("id").and_then(value_as_u64) {
            Some(confirmation_id) => Outcome::Booked { confirmation_id },
            None => Outcome::Cancelled,
        };
    }

    let message = value
        .get("errorMssg")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    Outcome::Rejected {
        code: book_state,
        message,
    }
}

/// Read a JSON field as an integer, tolerating numeric strings. The
/// service is not consistent about which it sends.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Unsigned variant of [`value_as_i64`], used for identifiers.
pub fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
