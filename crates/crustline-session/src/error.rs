//! Error types for the session layer.

use std::time::Duration;

/// Errors reported by (or while talking to) the identity backend.
///
/// The session monitor never hands these to its callers. It logs them
/// and degrades to `false` / `None`, so the UI simply sees "not logged
/// in". They're public so [`AuthProvider`](crate::AuthProvider)
/// implementations can say what went wrong.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// The backend couldn't be reached.
    #[error("identity backend unreachable: {0}")]
    Network(String),

    /// The backend answered with something we couldn't make sense of.
    #[error("malformed identity backend response: {0}")]
    MalformedResponse(String),

    /// The backend refused the request (revoked refresh token, signed-out
    /// user, etc.).
    #[error("identity backend rejected the request: {0}")]
    Rejected(String),

    /// The call didn't finish within the configured provider timeout.
    #[error("identity backend call timed out after {0:?}")]
    Timeout(Duration),
}
