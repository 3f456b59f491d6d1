//! The blocking run loop, plus an optional `tokio`-backed async wrapper.
//!
//! The core state machine ([`crate::handlers`]) never blocks; the
//! driver is what turns a sequence of `step()` calls into something a
//! node actually runs, honoring the delay each step requests and
//! exiting promptly when asked to stop (§5: "no in-handler
//! preemption").

use crate::coordinator::Coordinator;
use crate::handlers::StepOutcome;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A cooperative stop flag. Cloning shares the same underlying signal;
/// `stop()` causes `run`/`run_async` to exit after the in-flight step
/// completes.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// A fresh signal, not yet tripped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the driver loop to stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether `stop()` has been called.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run the coordinator's driver loop on the calling thread until
/// `stop_signal` is tripped. Blocks the calling thread with
/// `std::thread::sleep` between steps; intended to be spawned onto its
/// own dedicated OS thread.
pub fn run(coordinator: &mut Coordinator, stop_signal: &StopSignal, on_step: impl Fn(&StepOutcome)) {
    while !stop_signal.is_stopped() {
        let outcome = coordinator.step();
        on_step(&outcome);
        if let Some(delay) = outcome.delay {
            sleep_in_slices(delay, stop_signal);
        }
    }
}

/// Sleep for `delay`, but wake up periodically to re-check
/// `stop_signal` rather than blocking through a long requested delay
/// (the longest configured delay is the 5s catastrophic-failure
/// backoff; slicing keeps shutdown latency low regardless).
fn sleep_in_slices(delay: Duration, stop_signal: &StopSignal) {
    const SLICE: Duration = Duration::from_millis(50);
    let mut remaining = delay;
    while remaining > Duration::ZERO {
        if stop_signal.is_stopped() {
            return;
        }
        let slice = remaining.min(SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
}

#[cfg(feature = "async-driver")]
mod async_driver {
    use super::*;

    /// As [`run`], but via `tokio::time::sleep` so the coordinator
    /// composes into an async `node-runtime` without the core state
    /// machine itself depending on a runtime.
    pub async fn run_async(
        coordinator: &mut Coordinator,
        stop_signal: &StopSignal,
        on_step: impl Fn(&StepOutcome),
    ) {
        while !stop_signal.is_stopped() {
            let outcome = coordinator.step();
            on_step(&outcome);
            if let Some(delay) = outcome.delay {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(feature = "async-driver")]
pub use async_driver::run_async;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mocks::*;
    use crate::CoordinatorConfig;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn stop_signal_halts_the_loop_promptly() {
        let (mut coordinator, _harness) = build_idle_coordinator();
        let stop_signal = StopSignal::new();
        let steps = AtomicUsize::new(0);

        let stop_clone = stop_signal.clone();
        run(&mut coordinator, &stop_signal, |_| {
            let count = steps.fetch_add(1, Ordering::SeqCst);
            if count >= 3 {
                stop_clone.stop();
            }
        });

        assert!(steps.load(Ordering::SeqCst) >= 4);
    }

    fn build_idle_coordinator() -> (Coordinator, MockHarness) {
        let harness = MockHarness::new();
        let coordinator = harness.coordinator(CoordinatorConfig {
            empty_tip_retry_delay: Duration::from_millis(1),
            idle_poll_delay: Duration::from_millis(1),
            ..CoordinatorConfig::default()
        });
        (coordinator, harness)
    }
}
