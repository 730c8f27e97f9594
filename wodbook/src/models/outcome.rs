//! Typed outcome of a remote book or cancel operation.

/// What the remote service's reply meant.
///
/// Produced by the response classifier, consumed by the booking manager
/// and ultimately rendered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The booking was confirmed; the id is needed to cancel later.
    Booked {
        /// Remote-assigned confirmation id.
        confirmation_id: u64,
    },
    /// The cancellation was confirmed.
    Cancelled,
    /// The service understood the request and declined it (slot full,
    /// already booked elsewhere, local refusal).
    Rejected {
        /// Remote `bookState` code, when the reply carried one.
        code: Option<i64>,
        /// Human-readable reason.
        message: String,
    },
    /// The HTTP layer failed before any domain semantics were available.
    TransportFailure {
        /// What went wrong at the transport level.
        detail: String,
    },
}

impl Outcome {
    /// Local rejection with no remote `bookState` code.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            code: None,
            message: message.into(),
        }
    }
}
