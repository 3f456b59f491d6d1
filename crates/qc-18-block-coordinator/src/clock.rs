//! Monotonic time source and periodic-trigger helpers.
//!
//! The coordinator never calls `Instant::now()`/`SystemTime::now()`
//! directly; every handler goes through a `Clock` so tests can drive time
//! deterministically, the same way this workspace's storage crates take a
//! `TimeSource` port instead of reading the wall clock inline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A monotonic source of "now", injectable for deterministic tests.
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Current unix time in seconds, used only for fields that must be
    /// wall-clock comparable across nodes (e.g. block timestamps).
    fn unix_now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// The real, OS-backed clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock driven entirely by test code, advanced explicitly between
/// coordinator steps.
#[derive(Debug, Clone)]
pub struct FakeClock {
    base: Instant,
    offset_ms: Arc<AtomicU64>,
}

impl FakeClock {
    /// Construct a fake clock anchored at construction time.
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance the fake clock by the given duration.
    pub fn advance(&self, delta: Duration) {
        self.offset_ms
            .fetch_add(delta.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// Rate-limits a repeated action (a log line, a state re-check) to at
/// most once per configured interval.
#[derive(Debug, Clone)]
pub struct PeriodicGate {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl PeriodicGate {
    /// Construct a gate that fires at most once per `interval`, primed to
    /// fire immediately on the first check.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    /// Check whether the gate should fire given the current time; if so,
    /// the internal clock resets and subsequent calls return `false`
    /// until `interval` elapses again.
    pub fn check(&mut self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }

    /// Force the gate to fire on the very next `check`, discarding any
    /// remaining cooldown. Used when (re-)entering a state that should
    /// always log immediately.
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
