//! User activity tracking for inactivity detection.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// The interaction events that count as "the user is still here".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
}

impl ActivityKind {
    /// Every kind the tracker listens for.
    pub const ALL: [ActivityKind; 6] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::KeyPress,
        Self::Scroll,
        Self::TouchStart,
        Self::Click,
    ];

    /// The DOM event name this kind corresponds to.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::PointerDown => "mousedown",
            Self::PointerMove => "mousemove",
            Self::KeyPress => "keypress",
            Self::Scroll => "scroll",
            Self::TouchStart => "touchstart",
            Self::Click => "click",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Remembers when the user last interacted with the application.
///
/// Recording is O(1) and never blocks on anything but a tiny mutex. The
/// tracker only listens while attached: the monitor attaches it on
/// `start` and detaches it on `stop`, and events arriving in between are
/// dropped.
///
/// Uses Tokio's clock, so tests can pause and advance time.
#[derive(Debug)]
pub struct ActivityTracker {
    last_activity: Mutex<Instant>,
    attached: AtomicBool,
}

impl ActivityTracker {
    /// A detached tracker whose last activity is "now".
    pub fn new() -> Self {
        Self {
            last_activity: Mutex::new(Instant::now()),
            attached: AtomicBool::new(false),
        }
    }

    /// Starts listening. Returns `false` if already attached.
    pub fn attach(&self) -> bool {
        !self.attached.swap(true, Ordering::AcqRel)
    }

    /// Stops listening. Returns `false` if already detached.
    pub fn detach(&self) -> bool {
        self.attached.swap(false, Ordering::AcqRel)
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Records an interaction. Ignored (returns `false`) while detached.
    pub fn record(&self, kind: ActivityKind) -> bool {
        if !self.is_attached() {
            tracing::trace!(%kind, "activity ignored, tracker detached");
            return false;
        }
        *self.lock() = Instant::now();
        true
    }

    /// When the user last interacted.
    pub fn last_activity(&self) -> Instant {
        *self.lock()
    }

    /// Time since the last interaction.
    pub fn idle_for(&self) -> Duration {
        Instant::now().saturating_duration_since(self.last_activity())
    }

    /// `true` iff more than `threshold` has passed since the last
    /// interaction. Exactly `threshold` still counts as active.
    pub fn is_inactive(&self, threshold: Duration) -> bool {
        self.idle_for() > threshold
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Instant> {
        // An `Instant` can't be left half-written, so a poisoned lock is
        // still safe to read.
        self.last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_is_inactive_strictly_greater_than_threshold() {
        let tracker = ActivityTracker::new();

        tokio::time::advance(Duration::from_secs(10)).await;

        assert!(tracker.is_inactive(Duration::from_secs(9)));
        assert!(!tracker.is_inactive(Duration::from_secs(10)));
        assert!(!tracker.is_inactive(Duration::from_secs(11)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_inactive_zero_threshold() {
        let tracker = ActivityTracker::new();

        // No time has passed: zero idle is not "more than zero".
        assert!(!tracker.is_inactive(Duration::ZERO));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(tracker.is_inactive(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_while_attached_resets_idle_time() {
        let tracker = ActivityTracker::new();
        tracker.attach();
        tokio::time::advance(Duration::from_secs(60)).await;

        assert!(tracker.record(ActivityKind::KeyPress));

        assert_eq!(tracker.idle_for(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_while_detached_is_ignored() {
        let tracker = ActivityTracker::new();
        tokio::time::advance(Duration::from_secs(60)).await;

        assert!(!tracker.record(ActivityKind::Click));

        assert_eq!(tracker.idle_for(), Duration::from_secs(60));
    }

    #[test]
    fn test_attach_detach_report_transitions() {
        let tracker = ActivityTracker::new();

        assert!(tracker.attach());
        assert!(!tracker.attach());
        assert!(tracker.is_attached());

        assert!(tracker.detach());
        assert!(!tracker.detach());
        assert!(!tracker.is_attached());
    }

    #[test]
    fn test_event_names_are_distinct() {
        let mut names: Vec<_> =
            ActivityKind::ALL.iter().map(|k| k.event_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ActivityKind::ALL.len());
    }
}
