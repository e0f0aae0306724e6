//! Button validation plan.
//!
//! The plan itself is two dwells: announce the instructions, then hold the
//! session open while the operator exercises the button. Press detection and
//! classification happen on the bridge path, independent of phase progress.

use core::time::Duration;

use super::ANNOUNCE_DWELL;
use crate::phase::{PhaseDescriptor, TestPlan};

/// How long the session listens for presses before wrapping up on its own.
pub const MONITOR_DWELL: Duration = Duration::from_millis(25_000);

/// Ordered phases that implement the button test.
pub const BUTTON_PHASES: [PhaseDescriptor; 2] = [
    PhaseDescriptor::dwell("announce", ANNOUNCE_DWELL),
    PhaseDescriptor::dwell("monitor", MONITOR_DWELL),
];

/// Plan table describing the button test.
pub const BUTTON_PLAN: TestPlan = TestPlan::new("button", &BUTTON_PHASES);

/// Returns the shared button plan.
#[must_use]
pub const fn button_plan() -> TestPlan {
    BUTTON_PLAN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_plan_matches_expected_timings() {
        assert_eq!(BUTTON_PLAN.phase_count(), 2);
        assert_eq!(BUTTON_PHASES[0].label, "announce");
        assert_eq!(BUTTON_PHASES[1].label, "monitor");
        assert_eq!(
            BUTTON_PLAN.nominal_duration(),
            ANNOUNCE_DWELL + MONITOR_DWELL
        );
    }
}
