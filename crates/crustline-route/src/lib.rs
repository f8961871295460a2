//! Routing for Crustline.
//!
//! This crate knows three things:
//!
//! 1. **Where things are**: the storefront's route table ([`routes`])
//! 2. **What needs a session**: [`RestrictedPaths`]
//! 3. **How to move the user**: the [`Navigator`] seam and the
//!    [`Redirector`] guards (`go_to_protected`, `go_to_admin`, and the
//!    expired-session redirect the monitor uses)
//!
//! # How it fits in the stack
//!
//! ```text
//! Session monitor (above)  ← redirects on unrecoverable expiry
//!     ↕
//! Route layer (this crate)  ← guards and redirects
//!     ↕
//! Application router  ← implements Navigator
//! ```

mod error;
mod redirect;
pub mod routes;

pub use error::NavigationError;
pub use redirect::{
    ADMIN_DENIED_MESSAGE, ADMIN_LOGIN_MESSAGE, LOGIN_REQUIRED_MESSAGE, NavigationOutcome,
    Navigator, Redirector, SESSION_EXPIRED_MESSAGE,
};
pub use routes::RestrictedPaths;
