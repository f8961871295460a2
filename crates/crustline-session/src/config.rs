//! Configuration for the session monitor.

use std::time::Duration;

use crustline_route::RestrictedPaths;
use crustline_store::DEFAULT_TOKEN_KEY;
use crustline_tick::TickConfig;

/// How often the monitor checks the session.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// Idle time after which the user counts as inactive (1 800 000 ms).
pub const DEFAULT_INACTIVITY_THRESHOLD: Duration = Duration::from_secs(30 * 60);
/// Upper bound on any single identity backend call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`SessionMonitor`](crate::SessionMonitor).
///
/// Start from `MonitorConfig::default()` and override what you need:
///
/// ```rust
/// use std::time::Duration;
/// use crustline_session::MonitorConfig;
///
/// let config = MonitorConfig {
///     check_interval: Duration::from_secs(60),
///     ..MonitorConfig::default()
/// };
/// assert_eq!(config.token_key, "access_token");
/// ```
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between background session checks. Default: 5 minutes.
    pub check_interval: Duration,

    /// Default threshold for [`is_idle`](crate::SessionMonitor::is_idle).
    /// Default: 30 minutes.
    pub inactivity_threshold: Duration,

    /// Deadline for each identity backend call. A call that runs longer
    /// counts as a failure. `None` waits forever. Default: 30 seconds.
    pub provider_timeout: Option<Duration>,

    /// Token store key holding the access token. Removed when a session
    /// is confirmed dead. Default: `access_token`.
    pub token_key: String,

    /// Whether a check that finds *no* session at all (rather than an
    /// expired one) gets the same treatment as a failed refresh. Off by
    /// default: route guards already keep anonymous users off restricted
    /// pages.
    pub redirect_on_missing_session: bool,

    /// Random delay (0–max) before the first check. Default: none.
    pub initial_jitter: Duration,

    /// Routes that send the user to the login page when the session dies.
    pub restricted_paths: RestrictedPaths,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            inactivity_threshold: DEFAULT_INACTIVITY_THRESHOLD,
            provider_timeout: Some(DEFAULT_PROVIDER_TIMEOUT),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            redirect_on_missing_session: false,
            initial_jitter: Duration::ZERO,
            restricted_paths: RestrictedPaths::default(),
        }
    }
}

impl MonitorConfig {
    /// Scheduler settings for the background check loop.
    ///
    /// Late wake-ups (a suspended laptop, a slow check) skip the missed
    /// checks instead of running them back to back.
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            interval: Some(self.check_interval),
            initial_jitter: self.initial_jitter,
            ..TickConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_storefront_policy() {
        let config = MonitorConfig::default();

        assert_eq!(config.check_interval, Duration::from_secs(300));
        assert_eq!(config.inactivity_threshold.as_millis(), 1_800_000);
        assert_eq!(config.provider_timeout, Some(Duration::from_secs(30)));
        assert!(!config.redirect_on_missing_session);
        assert!(config.restricted_paths.is_restricted("/checkout"));
    }

    #[test]
    fn test_tick_config_uses_check_interval() {
        let config = MonitorConfig {
            check_interval: Duration::from_secs(42),
            ..MonitorConfig::default()
        };

        let tick = config.tick_config();

        assert_eq!(tick.interval, Some(Duration::from_secs(42)));
        assert_eq!(tick.initial_jitter, Duration::ZERO);
    }
}
