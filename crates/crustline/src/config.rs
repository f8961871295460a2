//! Monitor configuration from the environment.
//!
//! Every setting has a default, so an empty environment yields
//! [`MonitorConfig::default()`]. A value that is set but can't be parsed
//! is logged and ignored; a typo never stops the application from
//! starting.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `CRUSTLINE_CHECK_INTERVAL_SECS` | seconds between session checks, at least 1 | 300 |
//! | `CRUSTLINE_INACTIVITY_SECS` | idle seconds before "inactive" | 1800 |
//! | `CRUSTLINE_PROVIDER_TIMEOUT_SECS` | backend call deadline, `0` disables | 30 |
//! | `CRUSTLINE_TOKEN_KEY` | token store key for the access token | `access_token` |
//! | `CRUSTLINE_REDIRECT_ON_MISSING_SESSION` | treat "no session" like expiry | `false` |

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crustline_session::MonitorConfig;
use tracing::{info, warn};

pub const CHECK_INTERVAL_VAR: &str = "CRUSTLINE_CHECK_INTERVAL_SECS";
pub const INACTIVITY_VAR: &str = "CRUSTLINE_INACTIVITY_SECS";
pub const PROVIDER_TIMEOUT_VAR: &str = "CRUSTLINE_PROVIDER_TIMEOUT_SECS";
pub const TOKEN_KEY_VAR: &str = "CRUSTLINE_TOKEN_KEY";
pub const REDIRECT_ON_MISSING_VAR: &str = "CRUSTLINE_REDIRECT_ON_MISSING_SESSION";

/// Reads the monitor configuration from the process environment.
pub fn load_monitor_config() -> MonitorConfig {
    monitor_config_from(|key| env::var(key).ok())
}

/// Builds a configuration from an arbitrary variable lookup.
///
/// [`load_monitor_config`] is this with `std::env::var`. Tests and
/// embedders with their own settings source pass a closure instead.
pub fn monitor_config_from(lookup: impl Fn(&str) -> Option<String>) -> MonitorConfig {
    let defaults = MonitorConfig::default();

    let check_interval = try_load::<u64>(&lookup, CHECK_INTERVAL_VAR)
        .filter(|&secs| {
            if secs == 0 {
                warn!("{CHECK_INTERVAL_VAR} must be at least 1, using default");
            }
            secs > 0
        })
        .map(Duration::from_secs)
        .unwrap_or(defaults.check_interval);

    let inactivity_threshold = try_load(&lookup, INACTIVITY_VAR)
        .map(Duration::from_secs)
        .unwrap_or(defaults.inactivity_threshold);

    let provider_timeout = match try_load::<u64>(&lookup, PROVIDER_TIMEOUT_VAR) {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => defaults.provider_timeout,
    };

    let token_key = lookup(TOKEN_KEY_VAR)
        .map(|key| key.trim().to_string())
        .filter(|key| {
            if key.is_empty() {
                warn!("{TOKEN_KEY_VAR} is empty, using default");
            }
            !key.is_empty()
        })
        .unwrap_or(defaults.token_key);

    let redirect_on_missing_session = try_load(&lookup, REDIRECT_ON_MISSING_VAR)
        .unwrap_or(defaults.redirect_on_missing_session);

    MonitorConfig {
        check_interval,
        inactivity_threshold,
        provider_timeout,
        token_key,
        redirect_on_missing_session,
        ..defaults
    }
}

/// Parses `key` if it's set. Unset or unparsable both mean "use the default".
fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T::Err: Display,
{
    let raw = lookup(key)?;
    raw.trim()
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default");
        })
        .ok()
        .inspect(|_| info!("{key} set from environment"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> MonitorConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        monitor_config_from(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_monitor_config_from_empty_uses_defaults() {
        let config = from_pairs(&[]);
        let defaults = MonitorConfig::default();

        assert_eq!(config.check_interval, defaults.check_interval);
        assert_eq!(config.inactivity_threshold, defaults.inactivity_threshold);
        assert_eq!(config.provider_timeout, defaults.provider_timeout);
        assert_eq!(config.token_key, "access_token");
        assert!(!config.redirect_on_missing_session);
    }

    #[test]
    fn test_monitor_config_from_overrides_every_setting() {
        let config = from_pairs(&[
            (CHECK_INTERVAL_VAR, "60"),
            (INACTIVITY_VAR, " 900 "),
            (PROVIDER_TIMEOUT_VAR, "5"),
            (TOKEN_KEY_VAR, "sb-token"),
            (REDIRECT_ON_MISSING_VAR, "true"),
        ]);

        assert_eq!(config.check_interval, Duration::from_secs(60));
        assert_eq!(config.inactivity_threshold, Duration::from_secs(900));
        assert_eq!(config.provider_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.token_key, "sb-token");
        assert!(config.redirect_on_missing_session);
    }

    #[test]
    fn test_monitor_config_from_zero_timeout_disables_it() {
        let config = from_pairs(&[(PROVIDER_TIMEOUT_VAR, "0")]);
        assert_eq!(config.provider_timeout, None);
    }

    #[test]
    fn test_monitor_config_from_invalid_values_fall_back() {
        let config = from_pairs(&[
            (CHECK_INTERVAL_VAR, "five minutes"),
            (PROVIDER_TIMEOUT_VAR, "-1"),
            (TOKEN_KEY_VAR, "   "),
            (REDIRECT_ON_MISSING_VAR, "yes"),
        ]);
        let defaults = MonitorConfig::default();

        assert_eq!(config.check_interval, defaults.check_interval);
        assert_eq!(config.provider_timeout, defaults.provider_timeout);
        assert_eq!(config.token_key, defaults.token_key);
        assert!(!config.redirect_on_missing_session);

        let zero_interval = from_pairs(&[(CHECK_INTERVAL_VAR, "0")]);
        assert_eq!(zero_interval.check_interval, defaults.check_interval);
    }
}
