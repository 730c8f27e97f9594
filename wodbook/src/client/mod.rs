//! Client for the remote booking service.

mod classify;
mod remote;

pub use classify::{classify, Action};
pub use remote::{RemoteClient, RemoteConfig};

use crate::error::ClientError;
use crate::models::{ClassSlot, Outcome, Session};

/// Remote operations the booking manager depends on.
///
/// [`RemoteClient`] is the production implementation; manager tests
/// substitute a scripted fake so state transitions run without a network.
pub trait BookingApi {
    /// Return the cached session for the account, logging in only on a
    /// cache miss.
    async fn obtain_session(&self, email: &str, password: &str) -> Result<Session, ClientError>;

    /// Log in again and replace the cached session, bypassing the cache.
    async fn refresh_session(&self, email: &str, password: &str) -> Result<Session, ClientError>;

    /// Fetch the slots bookable on a day (`YYYYMMDD`).
    async fn list_slots(&self, session: &Session, day: &str)
        -> Result<Vec<ClassSlot>, ClientError>;

    /// Book a slot; the reply is classified, never raised.
    async fn book(&self, session: &Session, slot_id: u64, day: &str) -> Outcome;

    /// Cancel a booking by its confirmation id; the reply is classified,
    /// never raised.
    async fn cancel(&self, session: &Session, confirmation_id: u64) -> Outcome;
}
