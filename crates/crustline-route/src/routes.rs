//! The storefront's route table and the set of routes that need a session.

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------

pub const HOME: &str = "/";
pub const MENU: &str = "/menu";
pub const CART: &str = "/cart";
pub const CHECKOUT: &str = "/checkout";
pub const ORDERS: &str = "/orders";
pub const PROFILE: &str = "/profile";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const ADMIN: &str = "/admin";
pub const ADMIN_ORDERS: &str = "/admin/orders";
pub const ADMIN_MENU: &str = "/admin/menu";
pub const ADMIN_USERS: &str = "/admin/users";

/// Where the monitor sends users whose session could not be refreshed.
/// The login page shows an "expired" banner when it sees the flag.
pub const LOGIN_EXPIRED: &str = "/login?expired=true";

/// Detail page for a single order: `/orders/{id}`.
pub fn order_detail(order_id: &str) -> String {
    format!("{ORDERS}/{order_id}")
}

/// Strips any `?query` or `#fragment` from a path.
pub fn strip_query(path: &str) -> &str {
    path.find(['?', '#']).map_or(path, |idx| &path[..idx])
}

// ---------------------------------------------------------------------------
// RestrictedPaths
// ---------------------------------------------------------------------------

/// Route prefixes that require an active session.
///
/// Matching is per path segment: `/orders` covers `/orders` and
/// `/orders/42`, but not `/ordersheet`. Query strings and fragments are
/// ignored, so `/checkout?step=2` is restricted too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedPaths {
    prefixes: Vec<String>,
}

impl RestrictedPaths {
    /// Builds a set from arbitrary prefixes. Trailing slashes are dropped
    /// so `/admin/` and `/admin` mean the same thing.
    pub fn with_prefixes<I, P>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(Into::into)
            .map(|p| {
                let trimmed = p.trim_end_matches('/');
                if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() }
            })
            .collect();
        Self { prefixes }
    }

    /// Whether `path` falls under one of the prefixes.
    pub fn is_restricted(&self, path: &str) -> bool {
        let path = strip_query(path);
        self.prefixes.iter().any(|prefix| {
            if prefix == "/" {
                return path.starts_with('/');
            }
            match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            }
        })
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }
}

/// Checkout, orders, profile, and the admin dashboard.
impl Default for RestrictedPaths {
    fn default() -> Self {
        Self::with_prefixes([CHECKOUT, ORDERS, PROFILE, ADMIN])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_restricted_default_prefixes() {
        let paths = RestrictedPaths::default();

        assert!(paths.is_restricted("/checkout"));
        assert!(paths.is_restricted("/orders"));
        assert!(paths.is_restricted("/profile"));
        assert!(paths.is_restricted("/admin"));
    }

    #[test]
    fn test_is_restricted_nested_paths() {
        let paths = RestrictedPaths::default();

        assert!(paths.is_restricted(&order_detail("42")));
        assert!(paths.is_restricted(ADMIN_USERS));
        assert!(paths.is_restricted("/profile/"));
    }

    #[test]
    fn test_is_restricted_public_paths() {
        let paths = RestrictedPaths::default();

        for path in [HOME, MENU, CART, LOGIN, REGISTER] {
            assert!(!paths.is_restricted(path), "{path} should be public");
        }
    }

    #[test]
    fn test_is_restricted_respects_segment_boundaries() {
        let paths = RestrictedPaths::default();

        assert!(!paths.is_restricted("/ordersheet"));
        assert!(!paths.is_restricted("/administrator"));
    }

    #[test]
    fn test_is_restricted_ignores_query_and_fragment() {
        let paths = RestrictedPaths::default();

        assert!(paths.is_restricted("/checkout?step=payment"));
        assert!(paths.is_restricted("/orders#latest"));
        assert!(!paths.is_restricted("/menu?category=/admin"));
    }

    #[test]
    fn test_with_prefixes_normalizes_trailing_slash() {
        let paths = RestrictedPaths::with_prefixes(["/rewards/"]);

        assert!(paths.is_restricted("/rewards"));
        assert!(paths.is_restricted("/rewards/points"));
        assert_eq!(paths.prefixes().collect::<Vec<_>>(), vec!["/rewards"]);
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query(LOGIN_EXPIRED), LOGIN);
        assert_eq!(strip_query("/menu"), "/menu");
        assert_eq!(strip_query("/a#b?c"), "/a");
    }
}
