//! Servo validation plan.
//!
//! Sweeps the output through fixed positions across the travel range and
//! recenters before finishing. Position labels are degrees so the summary
//! reads directly against the mechanical setup.

use core::time::Duration;

use super::ANNOUNCE_DWELL;
use crate::phase::{PhaseDescriptor, TestPlan};

/// Hold time at each sweep position, long enough for the horn to settle.
pub const SWEEP_STEP: Duration = Duration::from_millis(1_000);
/// Dwell after commanding the recenter position.
pub const RECENTER_DWELL: Duration = Duration::from_millis(1_000);

/// Sweep positions in degrees, end to end and back toward center.
pub const SWEEP_STEPS: [&str; 5] = ["0", "45", "90", "135", "180"];

/// Ordered phases that implement the servo test.
pub const SERVO_PHASES: [PhaseDescriptor; 3] = [
    PhaseDescriptor::dwell("announce", ANNOUNCE_DWELL),
    PhaseDescriptor::stepped("sweep", SWEEP_STEP, &SWEEP_STEPS),
    PhaseDescriptor::dwell("recenter", RECENTER_DWELL),
];

/// Plan table describing the servo test.
pub const SERVO_PLAN: TestPlan = TestPlan::new("servo", &SERVO_PHASES);

/// Returns the shared servo plan.
#[must_use]
pub const fn servo_plan() -> TestPlan {
    SERVO_PLAN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn servo_plan_sweeps_then_recenters() {
        assert_eq!(SERVO_PLAN.phase_count(), 3);
        assert_eq!(SERVO_PHASES[1].step_count(), SWEEP_STEPS.len());
        assert_eq!(
            SERVO_PLAN.nominal_duration(),
            ANNOUNCE_DWELL + Duration::from_millis(6_000)
        );
    }
}
