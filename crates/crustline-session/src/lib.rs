//! Client session monitoring for Crustline.
//!
//! This crate keeps a signed-in user's session healthy for as long as the
//! application runs:
//!
//! 1. **Backend access**: the four identity calls the monitor needs
//!    ([`AuthProvider`] trait)
//! 2. **Periodic checks**: validate, refresh once on expiry, and clean up
//!    when refresh fails ([`SessionMonitor`])
//! 3. **Activity**: remembering when the user last did something
//!    ([`ActivityTracker`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Application (above)  ← builds one monitor at its root, starts/stops it
//!     ↕
//! Session Layer (this crate)  ← decides what a dead session means
//!     ↕
//! Store / Route / Tick (below)  ← token storage, redirects, the timer
//! ```

mod activity;
mod auth;
mod config;
mod error;
mod monitor;

pub use activity::{ActivityKind, ActivityTracker};
pub use auth::AuthProvider;
pub use config::{
    DEFAULT_CHECK_INTERVAL, DEFAULT_INACTIVITY_THRESHOLD, DEFAULT_PROVIDER_TIMEOUT, MonitorConfig,
};
pub use error::ProviderError;
pub use monitor::SessionMonitor;
