use std::env;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crustline::config::CHECK_INTERVAL_VAR;
use crustline::prelude::*;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Simulated identity backend
// ---------------------------------------------------------------------------

/// How long the simulated backend's sessions last.
const SESSION_LIFETIME_SECS: i64 = 1;
/// Check interval when `CRUSTLINE_CHECK_INTERVAL_SECS` isn't set.
const DEMO_CHECK_INTERVAL: Duration = Duration::from_secs(2);
const TOKEN_FILE: &str = "crustline-storefront/tokens.json";

/// An identity backend living in process memory.
///
/// Sessions are deliberately short-lived so the monitor has something to
/// do. Every refresh rotates both tokens and writes the new access token
/// to the store, like a hosted auth client would.
struct SimulatedBackend {
    store: Arc<FileTokenStore>,
    session: Mutex<Option<Session>>,
    /// Once set, refreshes are rejected (the refresh token was revoked).
    revoked: AtomicBool,
    generation: AtomicU32,
}

impl SimulatedBackend {
    fn new(store: Arc<FileTokenStore>) -> Self {
        Self {
            store,
            session: Mutex::new(None),
            revoked: AtomicBool::new(false),
            generation: AtomicU32::new(0),
        }
    }

    fn sign_in(&self, user: User) -> Result<Session, CrustlineError> {
        self.revoked.store(false, Ordering::SeqCst);
        self.issue(user)
    }

    fn revoke(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    fn issue(&self, user: User) -> Result<Session, CrustlineError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let session = Session {
            user,
            access_token: format!("access-{generation}"),
            refresh_token: Some(format!("refresh-{generation}")),
            expires_at: Some(unix_now() + SESSION_LIFETIME_SECS),
        };
        persist_session(&self.store, "access_token", &session)?;
        *self.lock() = Some(session.clone());
        Ok(session)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl AuthProvider for SimulatedBackend {
    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        Ok(self.lock().clone())
    }

    async fn refresh_session(&self) -> Result<Option<Session>, ProviderError> {
        if self.revoked.load(Ordering::SeqCst) {
            *self.lock() = None;
            return Err(ProviderError::Rejected("refresh token revoked".into()));
        }
        let Some(user) = self.lock().as_ref().map(|s| s.user.clone()) else {
            return Ok(None);
        };
        self.issue(user)
            .map(Some)
            .map_err(|e| ProviderError::Network(e.to_string()))
    }

    async fn get_current_user(&self) -> Result<Option<User>, ProviderError> {
        Ok(self.lock().as_ref().map(|s| s.user.clone()))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        *self.lock() = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Logging navigator
// ---------------------------------------------------------------------------

/// Stands in for the browser router: remembers the current path and logs
/// every transition.
struct LoggingNavigator {
    current: Mutex<String>,
}

impl LoggingNavigator {
    fn at(path: &str) -> Self {
        Self {
            current: Mutex::new(path.to_string()),
        }
    }

    fn set(&self, path: &str) {
        *self
            .current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = path.to_string();
    }
}

impl Navigator for LoggingNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn push(&self, path: &str, state: Option<&NavigationState>) -> Result<(), NavigationError> {
        if !path.starts_with('/') {
            return Err(NavigationError::InvalidPath(path.to_string()));
        }
        info!(
            to = path,
            from = ?state.and_then(|s| s.from.as_deref()),
            message = ?state.and_then(|s| s.message.as_deref()),
            "route change"
        );
        self.set(path);
        Ok(())
    }

    fn reload(&self, path: &str) {
        warn!(to = path, "full page reload");
        self.set(path);
    }
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

fn print_session(label: &str, info: Option<&SessionInfo>) {
    match info.map(serde_json::to_string_pretty) {
        Some(Ok(json)) => println!("{label}:\n{json}"),
        Some(Err(e)) => warn!(error = %e, "could not render session"),
        None => println!("{label}: no session"),
    }
}

#[tokio::main]
async fn main() -> Result<(), CrustlineError> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing("info,crustline_session=debug");

    let token_path = env::temp_dir().join(TOKEN_FILE);
    let store = Arc::new(FileTokenStore::new(&token_path));
    let backend = Arc::new(SimulatedBackend::new(Arc::clone(&store)));
    let router = Arc::new(LoggingNavigator::at(routes::HOME));

    let mut config = load_monitor_config();
    if env::var(CHECK_INTERVAL_VAR).is_err() {
        config.check_interval = DEMO_CHECK_INTERVAL;
    }

    let monitor = Crustline::builder()
        .config(config)
        .provider(Arc::clone(&backend))
        .store(Arc::clone(&store))
        .navigator(Arc::clone(&router))
        .build()?;
    info!(path = %token_path.display(), "tokens stored on disk");

    // Anonymous visitors get bounced off checkout.
    monitor.redirector().go_to_protected(routes::CHECKOUT, false, None);

    let session = backend.sign_in(User::customer("cust-1", "pat@example.com"))?;
    info!(
        user = %session.user,
        expires_in_secs = ?session.seconds_until_expiry(unix_now()),
        "signed in"
    );
    monitor.redirector().go_to_protected(routes::CHECKOUT, true, None);

    monitor.start();
    monitor.record_activity(ActivityKind::Click);

    // The session outlives its one-second lifetime: the monitor refreshes it.
    let wait = monitor.config().check_interval + Duration::from_millis(500);
    tokio::time::sleep(wait).await;
    print_session("after first check", monitor.session_info().await.as_ref());
    info!(token = ?store.get("access_token")?, "stored token");

    // Now the backend stops honouring refresh tokens.
    backend.revoke();
    tokio::time::sleep(wait).await;
    print_session("after revocation", monitor.session_info().await.as_ref());
    info!(
        token = ?store.get("access_token")?,
        path = %router.current_path(),
        idle = monitor.is_idle(),
        "after expiry"
    );

    monitor.stop().await;

    // Sign back in, then out again.
    let session = backend.sign_in(User::customer("cust-1", "pat@example.com"))?;
    info!(expired = session.is_expired(), "signed back in");
    if let Some(user) = monitor.force_refresh_session().await {
        info!(%user, "refreshed on demand");
    }
    monitor.sign_out().await;
    monitor.redirector().go_to_admin(false, false);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, Arc<FileTokenStore>, SimulatedBackend) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileTokenStore::new(dir.path().join("tokens.json")));
        let backend = SimulatedBackend::new(Arc::clone(&store));
        (dir, store, backend)
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_persists_token() {
        let (_dir, store, backend) = backend();
        backend.sign_in(User::customer("c", "c@example.com")).unwrap();

        let refreshed = backend.refresh_session().await.unwrap().unwrap();

        assert_eq!(refreshed.access_token, "access-2");
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("access-2"));
    }

    #[test]
    fn test_sign_in_issues_short_lived_session() {
        let (_dir, _store, backend) = backend();
        let now = unix_now();

        let session = backend.sign_in(User::customer("c", "c@example.com")).unwrap();

        let left = session.seconds_until_expiry(now).unwrap();
        assert!((SESSION_LIFETIME_SECS..=SESSION_LIFETIME_SECS + 1).contains(&left));
    }

    #[tokio::test]
    async fn test_refresh_after_revoke_is_rejected() {
        let (_dir, _store, backend) = backend();
        backend.sign_in(User::customer("c", "c@example.com")).unwrap();
        backend.revoke();

        assert!(backend.refresh_session().await.is_err());
        assert!(backend.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_session_returns_none() {
        let (_dir, _store, backend) = backend();
        assert!(backend.refresh_session().await.unwrap().is_none());
    }

    #[test]
    fn test_navigator_tracks_current_path() {
        let nav = LoggingNavigator::at(routes::HOME);

        nav.push(routes::MENU, None).unwrap();
        assert_eq!(nav.current_path(), routes::MENU);

        nav.reload(routes::LOGIN);
        assert_eq!(nav.current_path(), routes::LOGIN);
    }

    #[test]
    fn test_navigator_rejects_relative_path() {
        let nav = LoggingNavigator::at(routes::HOME);

        let result = nav.push("menu", None);

        assert!(matches!(result, Err(NavigationError::InvalidPath(_))));
        assert_eq!(nav.current_path(), routes::HOME);
    }
}
