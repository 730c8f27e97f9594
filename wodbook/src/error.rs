//! Error taxonomy for the remote booking client.

use thiserror::Error;

/// Errors raised by the remote client.
///
/// Domain rejections and transport faults on book/cancel travel as
/// [`crate::models::Outcome`] values instead; these variants cover the
/// paths where there is no outcome to carry them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The login endpoint is throttling this account. Requires waiting
    /// and fresh operator intervention, not a retry.
    #[error("login rejected: too many attempts, wait before retrying")]
    LoginTooManyAttempts,

    /// The login page reported an error it does not explain.
    #[error("login failed: {0}")]
    LoginUnknown(String),

    /// A data endpoint answered with the login page instead of JSON: the
    /// cached session is no longer valid on the remote side.
    #[error("cached session is no longer valid")]
    StaleSession,

    /// Transport-level fault on an operation whose return shape is not an
    /// outcome (login, listing).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}
