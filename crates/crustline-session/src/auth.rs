//! The identity backend seam.
//!
//! Crustline doesn't issue or verify tokens: your identity backend does
//! (a hosted auth service, your own API, whatever the storefront uses).
//! The [`AuthProvider`] trait is the four calls the session monitor needs
//! from it.
//!
//! # Why a trait?
//!
//! The monitor's policy (check, refresh once, give up, redirect) is the
//! same no matter who issues the tokens. Behind a trait we can:
//! - Talk to the real backend in the application
//! - Use a simulated backend in the demo
//! - Script failures in tests
//!
//! All without changing the monitor.

use std::future::Future;
use std::sync::Arc;

use crustline_types::{Session, User};

use crate::ProviderError;

/// Access to the current session on the identity backend.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the monitor calls the provider from a
///   background Tokio task for as long as monitoring runs.
/// - Every method returns a `Send` future so that task can be spawned
///   on a multi-threaded runtime.
///
/// Implementations write `async fn` directly:
///
/// ```rust
/// use crustline_session::{AuthProvider, ProviderError};
/// use crustline_types::{Session, User};
///
/// /// A backend nobody is ever signed in to.
/// struct Anonymous;
///
/// impl AuthProvider for Anonymous {
///     async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
///         Ok(None)
///     }
///
///     async fn refresh_session(&self) -> Result<Option<Session>, ProviderError> {
///         Err(ProviderError::Rejected("no refresh token".into()))
///     }
///
///     async fn get_current_user(&self) -> Result<Option<User>, ProviderError> {
///         Ok(None)
///     }
///
///     async fn sign_out(&self) -> Result<(), ProviderError> {
///         Ok(())
///     }
/// }
/// ```
pub trait AuthProvider: Send + Sync + 'static {
    /// The current session, or `Ok(None)` if nobody is signed in.
    fn get_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, ProviderError>> + Send;

    /// Exchanges the refresh token for a new session.
    ///
    /// Providers rotate (and persist) the tokens themselves. `Ok(None)`
    /// means the backend answered but issued no session, which the
    /// monitor treats exactly like an error.
    fn refresh_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, ProviderError>> + Send;

    /// The signed-in user, fetched fresh from the backend.
    fn get_current_user(
        &self,
    ) -> impl Future<Output = Result<Option<User>, ProviderError>> + Send;

    /// Ends the session on the backend.
    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

impl<T: AuthProvider> AuthProvider for Arc<T> {
    fn get_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, ProviderError>> + Send {
        (**self).get_session()
    }

    fn refresh_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, ProviderError>> + Send {
        (**self).refresh_session()
    }

    fn get_current_user(
        &self,
    ) -> impl Future<Output = Result<Option<User>, ProviderError>> + Send {
        (**self).get_current_user()
    }

    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send {
        (**self).sign_out()
    }
}
