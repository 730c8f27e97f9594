//! Session model representing an authenticated remote context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An opaque authenticated context for one account.
///
/// Holds the cookies captured from the login response, already joined into
/// a single `Cookie` header value. The remote side never tells us when it
/// expires; staleness is discovered by later calls failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Account e-mail this session belongs to.
    pub account: String,
    /// Cookie header value sent with every authenticated request.
    pub cookie_header: String,
    /// When the session was created by a successful login.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session from a successful login.
    pub fn new(account: impl Into<String>, cookie_header: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            cookie_header: cookie_header.into(),
            created_at: Utc::now(),
        }
    }
}
