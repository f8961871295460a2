//! # Crustline
//!
//! Client session lifecycle for web storefronts.
//!
//! Crustline keeps a signed-in user's session alive for as long as they
//! use the application: it checks the session on a timer, refreshes it
//! once when it expires, and when refresh fails it clears the stored
//! token and sends the user from restricted pages to the login page.
//! Application code implements [`AuthProvider`] for its identity backend
//! and [`Navigator`] for its router; the framework handles the rest.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crustline::prelude::*;
//!
//! // Implement AuthProvider and Navigator, then:
//! // let monitor = Crustline::builder()
//! //     .provider(my_backend)
//! //     .store(MemoryTokenStore::new())
//! //     .navigator(my_router)
//! //     .build()?;
//! // monitor.start();
//! ```
//!
//! [`AuthProvider`]: crustline_session::AuthProvider
//! [`Navigator`]: crustline_route::Navigator

mod builder;
pub mod config;
mod error;
pub mod telemetry;

pub use builder::{Crustline, CrustlineBuilder};
pub use error::CrustlineError;

pub use crustline_route as route;
pub use crustline_session as session;
pub use crustline_store as store;
pub use crustline_tick as tick;
pub use crustline_types as types;

pub mod prelude {
    //! Everything an application needs to wire up session monitoring.

    pub use crate::config::load_monitor_config;
    pub use crate::telemetry::init_tracing;
    pub use crate::{Crustline, CrustlineBuilder, CrustlineError};

    pub use crustline_route::routes::{self, RestrictedPaths};
    pub use crustline_route::{NavigationError, NavigationOutcome, Navigator, Redirector};
    pub use crustline_session::{
        ActivityKind, AuthProvider, MonitorConfig, ProviderError, SessionMonitor,
    };
    pub use crustline_store::{
        FileTokenStore, MemoryTokenStore, StoreError, TokenStore, persist_session,
    };
    pub use crustline_types::{
        NavigationState, Session, SessionInfo, User, UserRole, unix_now,
    };
}
