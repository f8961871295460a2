//! Core data types shared by every Crustline layer.
//!
//! These mirror what the identity backend returns and what the storefront
//! keeps on the client. Field names serialize in camelCase so the persisted
//! form matches what the web client already writes.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current Unix time in whole seconds.
///
/// Session expiry is expressed in Unix seconds by the identity backend,
/// so every expiry comparison goes through this one function.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// What a signed-in user is allowed to do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// A regular storefront customer: orders pizza, tracks orders.
    #[default]
    Customer,
    /// Staff with access to the admin dashboard.
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A user identity as reported by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend-assigned identifier. Opaque to us.
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    /// Creates a customer with no display name.
    pub fn customer(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            role: UserRole::Customer,
        }
    }

    /// Creates an admin with no display name.
    pub fn admin(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            role: UserRole::Admin,
            ..Self::customer(id, email)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.id, self.email)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The server-issued proof of authentication.
///
/// Owned by the identity backend. The session monitor never keeps its own
/// copy; it reads one, decides, and drops it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    /// Opaque bearer token sent with API requests.
    pub access_token: String,
    /// Opaque credential used to obtain a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as Unix seconds. `None` means the backend didn't say, and
    /// the session is treated as already expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Session {
    /// Whether the session has expired at Unix time `now`.
    ///
    /// Expired means `now >= expires_at`. A session without an expiry is
    /// expired by default.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|expires_at| now >= expires_at)
    }

    /// [`is_expired_at`](Self::is_expired_at) against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    /// Seconds left before expiry, clamped at zero. `None` without an expiry.
    pub fn seconds_until_expiry(&self, now: i64) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - now).max(0))
    }
}

/// A read-only snapshot of the current session, handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user: User,
    pub expires_at: Option<i64>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub is_expired: bool,
}

impl SessionInfo {
    /// Builds a snapshot of `session` as seen at Unix time `now`.
    pub fn from_session(session: &Session, now: i64) -> Self {
        Self {
            user: session.user.clone(),
            expires_at: session.expires_at,
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            is_expired: session.is_expired_at(now),
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// State attached to a route transition.
///
/// The login page reads `from` to send the user back where they were
/// going, and shows `message` above the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NavigationState {
    /// State remembering where the user came from, with a reason.
    pub fn from_path(from: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            message: Some(message.into()),
        }
    }

    /// State carrying only a message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            from: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_expiring_at(expires_at: Option<i64>) -> Session {
        Session {
            user: User::customer("u-1", "ada@example.com"),
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            expires_at,
        }
    }

    #[test]
    fn test_is_expired_at_boundary_counts_as_expired() {
        let session = session_expiring_at(Some(1_000));

        assert!(!session.is_expired_at(999));
        assert!(session.is_expired_at(1_000));
        assert!(session.is_expired_at(1_001));
    }

    #[test]
    fn test_is_expired_at_missing_expiry_is_expired() {
        let session = session_expiring_at(None);

        assert!(session.is_expired_at(0));
    }

    #[test]
    fn test_seconds_until_expiry_clamps_at_zero() {
        let session = session_expiring_at(Some(100));

        assert_eq!(session.seconds_until_expiry(40), Some(60));
        assert_eq!(session.seconds_until_expiry(500), Some(0));
        assert_eq!(session_expiring_at(None).seconds_until_expiry(0), None);
    }

    #[test]
    fn test_session_info_from_session_copies_fields() {
        let session = session_expiring_at(Some(2_000));

        let info = SessionInfo::from_session(&session, 1_000);

        assert_eq!(info.user, session.user);
        assert_eq!(info.access_token, "access");
        assert_eq!(info.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(info.expires_at, Some(2_000));
        assert!(!info.is_expired);
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let session = session_expiring_at(Some(42));

        let json = serde_json::to_value(&session).expect("should serialize");

        assert_eq!(json["accessToken"], "access");
        assert_eq!(json["refreshToken"], "refresh");
        assert_eq!(json["expiresAt"], 42);
        assert_eq!(json["user"]["role"], "customer");
    }

    #[test]
    fn test_user_role_defaults_to_customer_when_missing() {
        let user: User =
            serde_json::from_str(r#"{"id":"u-9","email":"x@example.com"}"#)
                .expect("should deserialize");

        assert_eq!(user.role, UserRole::Customer);
        assert!(!user.is_admin());
        assert!(User::admin("u-1", "boss@example.com").is_admin());
    }

    #[test]
    fn test_navigation_state_skips_empty_fields() {
        let state = NavigationState::with_message("Access denied");

        let json = serde_json::to_string(&state).expect("should serialize");

        assert_eq!(json, r#"{"message":"Access denied"}"#);
    }
}
