//! `Crustline` builder: the composition root.
//!
//! This is where an application assembles its session monitor. It ties
//! together all the layers: identity backend → token store → navigator →
//! session monitor.

use crustline_route::Navigator;
use crustline_session::{AuthProvider, MonitorConfig, SessionMonitor};
use crustline_store::TokenStore;

use crate::CrustlineError;
use crate::config::load_monitor_config;

/// Entry point for building a [`SessionMonitor`].
///
/// # Example
///
/// ```rust,ignore
/// use crustline::prelude::*;
///
/// let monitor = Crustline::builder()
///     .config_from_env()
///     .provider(my_backend)
///     .store(FileTokenStore::new(path))
///     .navigator(my_router)
///     .build()?;
/// monitor.start();
/// ```
pub struct Crustline;

impl Crustline {
    /// Creates a new builder.
    pub fn builder<P, S, N>() -> CrustlineBuilder<P, S, N> {
        CrustlineBuilder::new()
    }
}

/// Builder for a [`SessionMonitor`].
///
/// The provider, store, and navigator are required. The configuration
/// defaults to [`MonitorConfig::default()`].
pub struct CrustlineBuilder<P, S, N> {
    config: MonitorConfig,
    provider: Option<P>,
    store: Option<S>,
    navigator: Option<N>,
}

impl<P, S, N> CrustlineBuilder<P, S, N> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: MonitorConfig::default(),
            provider: None,
            store: None,
            navigator: None,
        }
    }

    /// Sets the monitor configuration.
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Reads the configuration from `CRUSTLINE_*` environment variables.
    pub fn config_from_env(self) -> Self {
        self.config(load_monitor_config())
    }

    /// Sets the identity backend.
    pub fn provider(mut self, provider: P) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets where tokens are stored.
    pub fn store(mut self, store: S) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the application's router.
    pub fn navigator(mut self, navigator: N) -> Self {
        self.navigator = Some(navigator);
        self
    }
}

impl<P, S, N> CrustlineBuilder<P, S, N>
where
    P: AuthProvider,
    S: TokenStore,
    N: Navigator,
{
    /// Builds a stopped monitor.
    ///
    /// Fails with [`CrustlineError::Config`] if a required part is
    /// missing or the configuration can't work.
    pub fn build(self) -> Result<SessionMonitor<P, S, N>, CrustlineError> {
        let provider = self
            .provider
            .ok_or_else(|| CrustlineError::Config("no identity provider set".into()))?;
        let store = self
            .store
            .ok_or_else(|| CrustlineError::Config("no token store set".into()))?;
        let navigator = self
            .navigator
            .ok_or_else(|| CrustlineError::Config("no navigator set".into()))?;

        if self.config.check_interval.is_zero() {
            return Err(CrustlineError::Config("check interval must be positive".into()));
        }
        if self.config.token_key.is_empty() {
            return Err(CrustlineError::Config("token key must not be empty".into()));
        }

        tracing::debug!(
            interval_secs = self.config.check_interval.as_secs(),
            token_key = %self.config.token_key,
            "session monitor built"
        );
        Ok(SessionMonitor::new(provider, store, navigator, self.config))
    }
}

impl<P, S, N> Default for CrustlineBuilder<P, S, N> {
    fn default() -> Self {
        Self::new()
    }
}
