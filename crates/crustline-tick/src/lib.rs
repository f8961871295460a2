//! Recurring check scheduler for Crustline.
//!
//! Fires a tick every `interval` (five minutes for the session monitor),
//! with budget monitoring and late-wake handling.
//!
//! # Disabled mode
//!
//! When `interval` is `None`, the scheduler is disabled and
//! [`TickScheduler::wait_for_tick`] pends forever. Callers can keep the
//! same `tokio::select!` loop and simply never see a tick.
//!
//! # Integration
//!
//! The scheduler sits inside a background task's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         _ = &mut shutdown => break,
//!         info = scheduler.wait_for_tick() => {
//!             run_check(info).await;
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Full configuration for the tick scheduler.
///
/// A late wake-up (the previous check ran long, or the host was
/// suspended) forgets the missed ticks and schedules the next one a full
/// interval from now. A laptop waking from sleep gets one check, not a
/// burst of them.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks. `None` = disabled (tick never fires).
    pub interval: Option<Duration>,
    /// Random jitter (0–max) added to the *first* tick, so many clients
    /// started together don't all hit the identity backend at once.
    pub initial_jitter: Duration,
    /// Budget warning threshold (0.0–1.0). Default: 0.5.
    /// A tracing warning is emitted when one check takes longer than
    /// this fraction of the interval.
    pub budget_warn_threshold: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: None,
            initial_jitter: Duration::ZERO,
            budget_warn_threshold: 0.5,
        }
    }
}

impl TickConfig {
    /// Shortest interval the scheduler accepts.
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

    /// Create a config with a fixed interval and default settings.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            ..Default::default()
        }
    }

    /// Clamp any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`]. Rules:
    /// - `interval` raised to at least [`Self::MIN_INTERVAL`] (`None` stays disabled).
    /// - `budget_warn_threshold` clamped to `0.0..=1.0`.
    pub fn validated(mut self) -> Self {
        if let Some(interval) = self.interval {
            if interval < Self::MIN_INTERVAL {
                warn!(
                    interval_ms = interval.as_millis() as u64,
                    min_ms = Self::MIN_INTERVAL.as_millis() as u64,
                    "tick interval below minimum, clamping"
                );
                self.interval = Some(Self::MIN_INTERVAL);
            }
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info (returned to caller each tick)
// ---------------------------------------------------------------------------

/// Information about a tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// `true` if this tick fired noticeably late.
    pub late: bool,
    /// How many whole intervals were skipped (0 in normal operation).
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime metrics for the tick scheduler.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    /// Total ticks fired.
    pub total_ticks: u64,
    /// Ticks that fired late.
    pub total_late: u64,
    /// Intervals skipped after late wake-ups.
    pub total_skipped: u64,
    /// Longest check duration reported via [`TickScheduler::record_tick_end`].
    pub max_check_time: Duration,
    /// Duration of the most recent check.
    pub last_check_time: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Recurring tick scheduler. One per background check loop.
pub struct TickScheduler {
    config: TickConfig,
    interval: Option<Duration>,
    tick_count: u64,
    /// When the next tick should fire (Tokio instant for `sleep_until`).
    next_tick: Option<TokioInstant>,
    /// Wall-clock instant the current check started.
    /// Set by `wait_for_tick`, consumed by `record_tick_end`.
    tick_start: Option<Instant>,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// Create a new scheduler from config.
    ///
    /// The first tick is one interval away, plus optional jitter.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let interval = config.interval;

        let next_tick = interval.map(|d| {
            let max_us = config.initial_jitter.as_micros() as u64;
            let jitter = if max_us > 0 {
                Duration::from_micros(rand::rng().random_range(0..max_us))
            } else {
                Duration::ZERO
            };
            TokioInstant::now() + d + jitter
        });

        match interval {
            None => debug!("tick scheduler created in disabled mode"),
            Some(d) => debug!(
                interval_secs = d.as_secs_f64(),
                "tick scheduler created"
            ),
        }

        Self {
            config,
            interval,
            tick_count: 0,
            next_tick,
            tick_start: None,
            metrics: TickMetrics::default(),
        }
    }

    /// Create a scheduler with a fixed interval and default settings.
    pub fn every(interval: Duration) -> Self {
        Self::new(TickConfig::every(interval))
    }

    /// Wait until the next tick is due. Returns [`TickInfo`] for the tick.
    ///
    /// When disabled this future pends forever, but `tokio::select!`
    /// still services its other branches.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, interval) = match (self.next_tick, self.interval) {
            (Some(next), Some(interval)) => (next, interval),
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        // More than 10% of an interval behind counts as late.
        let late_by = now.saturating_duration_since(next);
        let late = late_by > interval / 10;
        let mut ticks_skipped = 0u64;

        if late {
            ticks_skipped = (late_by.as_nanos() / interval.as_nanos()) as u64;
            if ticks_skipped > 0 {
                warn!(
                    tick = self.tick_count,
                    skipped = ticks_skipped,
                    late_secs = late_by.as_secs_f64(),
                    "tick fired late, skipping missed intervals"
                );
            }
        }
        self.next_tick = Some(now + interval);

        if late {
            self.metrics.total_late += 1;
        }
        self.metrics.total_skipped += ticks_skipped;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, late, "tick fired");

        TickInfo {
            tick: self.tick_count,
            late,
            ticks_skipped,
        }
    }

    /// Record that the work for the current tick has finished.
    ///
    /// Enables budget warnings and check-time metrics. A no-op when no
    /// tick is in progress.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();

        if let Some(interval) = self.interval {
            let utilization = elapsed.as_secs_f64() / interval.as_secs_f64();
            if utilization >= self.config.budget_warn_threshold {
                warn!(
                    tick = self.tick_count,
                    elapsed_secs = elapsed.as_secs_f64(),
                    interval_secs = interval.as_secs_f64(),
                    "check is taking a large share of the tick interval"
                );
            }
        }

        self.metrics.last_check_time = elapsed;
        if elapsed > self.metrics.max_check_time {
            self.metrics.max_check_time = elapsed;
        }
    }

    /// Whether this scheduler never fires (no interval configured).
    pub fn is_disabled(&self) -> bool {
        self.interval.is_none()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// The configured interval, or `None` when disabled.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }
}
