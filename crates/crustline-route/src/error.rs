//! Error types for the navigation layer.

/// Errors that can occur while changing routes.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// The client-side router refused or failed the transition.
    /// [`Redirector`](crate::Redirector) answers this with one full reload.
    #[error("route transition to {path} failed: {reason}")]
    TransitionFailed { path: String, reason: String },

    /// The path isn't something the router can route to
    /// (empty, or not starting with `/`).
    #[error("invalid route path: {0:?}")]
    InvalidPath(String),
}
