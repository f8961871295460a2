//! The session monitor: keeps the client's session alive or ends it cleanly.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Checking the session on a recurring timer (every five minutes)
//! - Refreshing an expired session, exactly once per check
//! - Clearing the stored token and redirecting when refresh fails
//! - Tracking user activity for inactivity checks
//!
//! # Ownership
//!
//! There's no global instance. The application builds one monitor at its
//! root and hands references to whoever needs it; tests build as many
//! isolated monitors as they like.
//!
//! # Concurrency
//!
//! Checks run on a single background Tokio task. A check runs to
//! completion before the next tick is awaited, so checks on one monitor
//! never overlap.
//!
//! [`stop`](SessionMonitor::stop) cancels the run and waits for the task
//! to exit. A check still in flight is abandoned: its provider call is
//! dropped and its effects (token removal, redirect) are skipped. On a
//! multi-threaded runtime the check may be mid-poll on another worker
//! when `stop` is called; expiry effects run under the run's cancellation
//! lock, so they either finish before `stop` cancels or never happen.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crustline_route::{Navigator, Redirector};
use crustline_store::TokenStore;
use crustline_tick::TickScheduler;
use crustline_types::{SessionInfo, User, unix_now};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace, warn};

use crate::{ActivityKind, ActivityTracker, AuthProvider, MonitorConfig, ProviderError};

/// Watches the current session and reacts when it dies.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ start() ──→ [tick every 5 min: validate_session()] ──→ stop()
///              ↑                                                     │
///              └─────────────────────────────────────────────────────┘
/// ```
///
/// Dropping the monitor also ends the background task.
pub struct SessionMonitor<P, S, N> {
    shared: Arc<Shared<P, S, N>>,
    /// The armed background check, if any. At most one at a time.
    task: Mutex<Option<MonitorTask>>,
}

/// Handle to the running background check loop.
struct MonitorTask {
    shutdown: oneshot::Sender<()>,
    gate: Arc<RunGate>,
    handle: JoinHandle<()>,
}

/// Cancellation flag for one monitoring run.
///
/// Expiry effects run while holding the lock, so cancelling either waits
/// for effects already under way or prevents them entirely.
#[derive(Debug, Default)]
struct RunGate {
    cancelled: Mutex<bool>,
}

impl RunGate {
    fn cancel(&self) {
        *self.lock() = true;
    }

    /// Runs `effects` unless the run was cancelled. Returns whether it ran.
    fn run(&self, effects: impl FnOnce()) -> bool {
        let cancelled = self.lock();
        if *cancelled {
            return false;
        }
        effects();
        true
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything the background task needs, shared with the monitor.
struct Shared<P, S, N> {
    provider: P,
    store: S,
    redirector: Redirector<N>,
    activity: ActivityTracker,
    config: MonitorConfig,
}

impl<P, S, N> SessionMonitor<P, S, N>
where
    P: AuthProvider,
    S: TokenStore,
    N: Navigator,
{
    /// Creates a stopped monitor.
    pub fn new(provider: P, store: S, navigator: N, config: MonitorConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                provider,
                store,
                redirector: Redirector::new(navigator),
                activity: ActivityTracker::new(),
                config,
            }),
            task: Mutex::new(None),
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Starts listening for activity and arms the recurring check.
    ///
    /// Returns `false` (and changes nothing) if monitoring is already
    /// running, so calling it twice never creates a second timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut task = self.lock_task();
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            warn!("session monitoring already running, ignoring start");
            return false;
        }

        self.shared.activity.attach();
        let scheduler = TickScheduler::new(self.shared.config.tick_config());
        let (shutdown, shutdown_rx) = oneshot::channel();
        let gate = Arc::new(RunGate::default());
        let handle = tokio::spawn(run_checks(
            Arc::clone(&self.shared),
            scheduler,
            Arc::clone(&gate),
            shutdown_rx,
        ));
        *task = Some(MonitorTask {
            shutdown,
            gate,
            handle,
        });

        info!(
            interval_secs = self.shared.config.check_interval.as_secs(),
            "session monitoring started"
        );
        true
    }

    /// Cancels the recurring check and stops listening for activity.
    ///
    /// A check that is mid-flight is abandoned, and once this returns
    /// the background task has exited: no check effect can land after
    /// it. Returns `false` if monitoring wasn't running; calling it again
    /// is harmless.
    pub async fn stop(&self) -> bool {
        let Some(task) = self.lock_task().take() else {
            debug!("session monitoring not running, nothing to stop");
            return false;
        };
        task.gate.cancel();
        // The task may already be gone; either way it's stopped.
        let _ = task.shutdown.send(());
        self.shared.activity.detach();

        if let Err(e) = task.handle.await {
            if e.is_panic() {
                warn!(error = %e, "session check task panicked");
            }
        }
        info!("session monitoring stopped");
        true
    }

    /// Whether the recurring check is armed.
    pub fn is_running(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    // ---------------------------------------------------------------------
    // Session checks
    // ---------------------------------------------------------------------

    /// Runs one session check right now. This is what every tick does.
    ///
    /// Returns `true` if the session is valid (possibly after a refresh).
    /// See [`Shared::validate_session`] for the full policy.
    pub async fn validate_session(&self) -> bool {
        self.shared.validate_session(&RunGate::default()).await
    }

    /// Refreshes the session regardless of its expiry and returns the
    /// user as the backend sees them afterwards.
    ///
    /// `None` on any failure. Nothing is written to the token store.
    pub async fn force_refresh_session(&self) -> Option<User> {
        self.shared.force_refresh_session().await
    }

    /// Snapshot of the current session, or `None` if there is none (or
    /// the backend couldn't be asked).
    pub async fn session_info(&self) -> Option<SessionInfo> {
        self.shared.session_info().await
    }

    /// Signs out on the backend and removes the stored token.
    ///
    /// The token is removed even when the backend call fails, so the
    /// client never keeps a token it meant to discard. Returns whether
    /// the backend confirmed.
    pub async fn sign_out(&self) -> bool {
        self.shared.sign_out().await
    }

    // ---------------------------------------------------------------------
    // Activity
    // ---------------------------------------------------------------------

    /// Feeds a user interaction to the activity tracker.
    pub fn record_activity(&self, kind: ActivityKind) -> bool {
        self.shared.activity.record(kind)
    }

    /// `true` iff the user has been idle for more than `threshold`.
    pub fn is_user_inactive(&self, threshold: Duration) -> bool {
        self.shared.activity.is_inactive(threshold)
    }

    /// [`is_user_inactive`](Self::is_user_inactive) with the configured
    /// threshold (30 minutes by default).
    pub fn is_idle(&self) -> bool {
        self.is_user_inactive(self.shared.config.inactivity_threshold)
    }

    pub fn last_activity(&self) -> Instant {
        self.shared.activity.last_activity()
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &MonitorConfig {
        &self.shared.config
    }

    /// The route guards, sharing the monitor's navigator.
    pub fn redirector(&self) -> &Redirector<N> {
        &self.shared.redirector
    }

    pub fn store(&self) -> &S {
        &self.shared.store
    }

    pub fn provider(&self) -> &P {
        &self.shared.provider
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<MonitorTask>> {
        // Nothing in the critical sections can panic halfway through an
        // update, so a poisoned lock still holds a consistent value.
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The background check loop.
///
/// `biased` makes the shutdown branch win whenever both are ready. Losing
/// the race drops the in-flight check future, which is how `stop`
/// abandons a pending provider call.
async fn run_checks<P, S, N>(
    shared: Arc<Shared<P, S, N>>,
    mut scheduler: TickScheduler,
    gate: Arc<RunGate>,
    mut shutdown: oneshot::Receiver<()>,
) where
    P: AuthProvider,
    S: TokenStore,
    N: Navigator,
{
    loop {
        tokio::select! {
            biased;
            // Fires on `stop()`, or when the monitor is dropped.
            _ = &mut shutdown => break,
            _ = check_once(&*shared, &mut scheduler, &gate) => {}
        }
    }
    debug!(
        checks = scheduler.tick_count(),
        "session check loop exited"
    );
}

async fn check_once<P, S, N>(
    shared: &Shared<P, S, N>,
    scheduler: &mut TickScheduler,
    gate: &RunGate,
) where
    P: AuthProvider,
    S: TokenStore,
    N: Navigator,
{
    let tick = scheduler.wait_for_tick().await;
    let valid = shared.validate_session(gate).await;
    scheduler.record_tick_end();
    debug!(tick = tick.tick, valid, "session check complete");
}

impl<P, S, N> Shared<P, S, N>
where
    P: AuthProvider,
    S: TokenStore,
    N: Navigator,
{
    /// One session check:
    ///
    /// - backend error or no session → `false`. No recovery unless
    ///   `redirect_on_missing_session` is set (and then only for the
    ///   no-session case, never for a transient error).
    /// - session expired → one refresh. Failure (error or no session)
    ///   → expiry handling, `false`. Success → `true`.
    /// - session valid → `true`.
    ///
    /// Expiry effects are skipped once `gate` is cancelled.
    async fn validate_session(&self, gate: &RunGate) -> bool {
        let session = match self.call("get_session", self.provider.get_session()).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!("no active session");
                if self.config.redirect_on_missing_session {
                    self.handle_expiry(gate);
                }
                return false;
            }
            Err(_) => return false,
        };

        if !session.is_expired_at(unix_now()) {
            trace!(user = %session.user, expires_at = ?session.expires_at, "session valid");
            return true;
        }

        info!(user = %session.user, "session expired, attempting refresh");
        match self.call("refresh_session", self.provider.refresh_session()).await {
            Ok(Some(refreshed)) => {
                info!(
                    user = %refreshed.user,
                    expires_at = ?refreshed.expires_at,
                    "session refreshed"
                );
                true
            }
            Ok(None) => {
                warn!("refresh returned no session");
                self.handle_expiry(gate);
                false
            }
            Err(_) => {
                self.handle_expiry(gate);
                false
            }
        }
    }

    /// The session is gone for good: forget the token, and get the user
    /// off any page that needs one.
    fn handle_expiry(&self, gate: &RunGate) {
        if !gate.run(|| self.expire()) {
            debug!("monitoring stopped mid-check, skipping expiry handling");
        }
    }

    fn expire(&self) {
        match self.store.remove(&self.config.token_key) {
            Ok(removed) => debug!(key = %self.config.token_key, removed, "stored token cleared"),
            Err(e) => warn!(error = %e, "failed to clear stored token"),
        }

        let current = self.redirector.navigator().current_path();
        if self.config.restricted_paths.is_restricted(&current) {
            self.redirector.go_to_login_expired(&current);
        } else {
            debug!(path = %current, "session expired on a public route, not redirecting");
        }
    }

    async fn force_refresh_session(&self) -> Option<User> {
        match self.call("refresh_session", self.provider.refresh_session()).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!("forced refresh returned no session");
                return None;
            }
            Err(_) => return None,
        }

        let user = self
            .call("get_current_user", self.provider.get_current_user())
            .await
            .ok()
            .flatten();
        if let Some(user) = &user {
            info!(%user, "session force-refreshed");
        }
        user
    }

    async fn session_info(&self) -> Option<SessionInfo> {
        let session = self
            .call("get_session", self.provider.get_session())
            .await
            .ok()
            .flatten()?;
        Some(SessionInfo::from_session(&session, unix_now()))
    }

    async fn sign_out(&self) -> bool {
        let confirmed = self.call("sign_out", self.provider.sign_out()).await.is_ok();
        if let Err(e) = self.store.remove(&self.config.token_key) {
            warn!(error = %e, "failed to clear stored token on sign-out");
        }
        info!(confirmed, "signed out");
        confirmed
    }

    /// Runs a provider call under the configured deadline and logs any
    /// failure. Callers only decide what a failure means.
    async fn call<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        let result = match self.config.provider_timeout {
            Some(limit) => match time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(limit)),
            },
            None => fut.await,
        };
        if let Err(e) = &result {
            warn!(op, error = %e, "identity provider call failed");
        }
        result
    }
}
