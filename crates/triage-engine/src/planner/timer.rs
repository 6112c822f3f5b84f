//! Cooperative timeout.

use triage_core::traits::clock::Clock;

/// A deadline armed against an injected clock.
///
/// The planner polls this between phases; there is no preemption.
pub struct Timer<'a> {
    clock: &'a dyn Clock,
    duration_secs: f64,
    started_at: f64,
}

impl<'a> Timer<'a> {
    /// Arm the timer now. A zero duration is expired immediately.
    pub fn start(clock: &'a dyn Clock, duration_secs: f64) -> Self {
        let started_at = clock.now();
        Self { clock, duration_secs, started_at }
    }

    pub fn expired(&self) -> bool {
        self.clock.now() - self.started_at >= self.duration_secs
    }
}
