//! Navigation: the router seam and the guards built on top of it.
//!
//! Crustline doesn't route anything itself; the UI's router does. The
//! [`Navigator`] trait is the hook the application implements so the
//! session monitor and the route guards can move the user around.

use std::sync::Arc;

use crustline_types::NavigationState;

use crate::NavigationError;
use crate::routes::{ADMIN, HOME, LOGIN, LOGIN_EXPIRED};

/// Shown on the login page when a guard bounced the user there.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to continue";
/// Shown when an anonymous user tries to open the admin dashboard.
pub const ADMIN_LOGIN_MESSAGE: &str = "Please log in to access the admin dashboard";
/// Shown on the home page when a non-admin tries to open the dashboard.
pub const ADMIN_DENIED_MESSAGE: &str = "Access denied. Admin privileges required.";
/// Shown on the login page after the monitor gave up on a session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// The application's router.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the session monitor calls it from its
///   background task, so it must be shareable across threads and own
///   its data.
pub trait Navigator: Send + Sync + 'static {
    /// The path the user is currently on, including any query string.
    fn current_path(&self) -> String;

    /// Client-side route transition to `path`, carrying `state`.
    ///
    /// # Errors
    /// [`NavigationError`] when the router can't perform the transition.
    fn push(
        &self,
        path: &str,
        state: Option<&NavigationState>,
    ) -> Result<(), NavigationError>;

    /// Full page load of `path`. The last resort; it can't fail, and any
    /// transition state is lost.
    fn reload(&self, path: &str);
}

impl<T: Navigator> Navigator for Arc<T> {
    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn push(
        &self,
        path: &str,
        state: Option<&NavigationState>,
    ) -> Result<(), NavigationError> {
        (**self).push(path, state)
    }

    fn reload(&self, path: &str) {
        (**self).reload(path)
    }
}

/// How a navigation was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The client-side router handled it.
    Routed,
    /// The router failed and a full reload was issued instead.
    Reloaded,
}

/// Route guards and redirect helpers on top of a [`Navigator`].
///
/// All guards are synchronous: they trust the flags the caller passes
/// in and never ask the identity backend anything themselves.
#[derive(Debug, Clone)]
pub struct Redirector<N> {
    navigator: N,
}

impl<N: Navigator> Redirector<N> {
    pub fn new(navigator: N) -> Self {
        Self { navigator }
    }

    /// The wrapped router.
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Navigates to `path`, falling back to a full reload if the router
    /// fails. The fallback happens at most once; there's no retry loop.
    pub fn navigate(
        &self,
        path: &str,
        state: Option<NavigationState>,
    ) -> NavigationOutcome {
        match self.navigator.push(path, state.as_ref()) {
            Ok(()) => {
                tracing::debug!(path, "navigated");
                NavigationOutcome::Routed
            }
            Err(e) => {
                tracing::warn!(
                    path,
                    error = %e,
                    "route transition failed, falling back to full reload"
                );
                self.navigator.reload(path);
                NavigationOutcome::Reloaded
            }
        }
    }

    /// Sends the user to the login page, remembering where they came from.
    pub fn go_to_login(&self, from: &str, message: Option<&str>) -> NavigationOutcome {
        let state = NavigationState::from_path(
            from,
            message.unwrap_or(LOGIN_REQUIRED_MESSAGE),
        );
        self.navigate(LOGIN, Some(state))
    }

    /// Sends the user to `/login?expired=true` after their session could
    /// not be refreshed.
    pub fn go_to_login_expired(&self, from: &str) -> NavigationOutcome {
        tracing::info!(from, "session expired, redirecting to login");
        let state = NavigationState::from_path(from, SESSION_EXPIRED_MESSAGE);
        self.navigate(LOGIN_EXPIRED, Some(state))
    }

    pub fn go_home(&self, message: Option<&str>) -> NavigationOutcome {
        let state = message.map(NavigationState::with_message);
        self.navigate(HOME, state)
    }

    /// Navigates to a route that needs a session.
    ///
    /// When `is_authenticated` is false the user lands on the login page
    /// instead, with `from` set to the requested path.
    pub fn go_to_protected(
        &self,
        path: &str,
        is_authenticated: bool,
        message: Option<&str>,
    ) -> NavigationOutcome {
        if !is_authenticated {
            tracing::debug!(path, "protected route requested without session");
            return self.go_to_login(path, message);
        }
        self.navigate(path, None)
    }

    /// Navigates to the admin dashboard.
    ///
    /// Anonymous users go to the login page; signed-in non-admins go home
    /// with a denial message.
    pub fn go_to_admin(&self, is_authenticated: bool, is_admin: bool) -> NavigationOutcome {
        if !is_authenticated {
            return self.go_to_login(ADMIN, Some(ADMIN_LOGIN_MESSAGE));
        }
        if !is_admin {
            tracing::warn!("non-admin user tried to open the admin dashboard");
            return self.go_home(Some(ADMIN_DENIED_MESSAGE));
        }
        self.navigate(ADMIN, None)
    }
}
