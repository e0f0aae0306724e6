//! Static test-plan tables shared by firmware and host targets.
//!
//! Each validation test is a data-only [`TestPlan`]; the phase engine walks
//! the table without any per-test code. Concrete drivers map step labels to
//! pixel colors, brightness levels, or servo positions.

use core::time::Duration;

use crate::phase::TestPlan;
use crate::session::SessionConfig;

pub mod button;
pub mod led;
pub mod servo;

pub use button::{BUTTON_PLAN, button_plan};
pub use led::{LED_PLAN, led_plan};
pub use servo::{SERVO_PLAN, servo_plan};

/// Dwell applied to every announce phase.
pub const ANNOUNCE_DWELL: Duration = Duration::from_millis(2_000);

/// The validation tests this rig knows how to run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TestKind {
    Button,
    Led,
    Servo,
}

impl TestKind {
    /// Deterministic index for lookups into [`ALL_TEST_KINDS`].
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            TestKind::Button => 0,
            TestKind::Led => 1,
            TestKind::Servo => 2,
        }
    }

    /// Attempts to construct a [`TestKind`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(TestKind::Button),
            1 => Some(TestKind::Led),
            2 => Some(TestKind::Servo),
            _ => None,
        }
    }
}

/// Every selectable test kind, in index order.
pub const ALL_TEST_KINDS: [TestKind; 3] = [TestKind::Button, TestKind::Led, TestKind::Servo];

/// Looks up the plan table for a test kind.
#[must_use]
pub const fn plan_by_kind(kind: TestKind) -> TestPlan {
    match kind {
        TestKind::Button => BUTTON_PLAN,
        TestKind::Led => LED_PLAN,
        TestKind::Servo => SERVO_PLAN,
    }
}

/// Default session configuration for a test kind.
///
/// Interactive tests get the full 30 s default window; display-only plans
/// cap the session just past their nominal run time so a wedged driver
/// cannot hold the rig indefinitely.
#[must_use]
pub fn config_by_kind(kind: TestKind) -> SessionConfig {
    match kind {
        TestKind::Button => SessionConfig::default(),
        TestKind::Led | TestKind::Servo => {
            let plan = plan_by_kind(kind);
            SessionConfig::with_duration_limit(
                plan.nominal_duration() + Duration::from_millis(5_000),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_indices_round_trip() {
        for kind in ALL_TEST_KINDS {
            assert_eq!(TestKind::from_index(kind.as_index()), Some(kind));
        }
        assert_eq!(TestKind::from_index(3), None);
    }

    #[test]
    fn every_kind_resolves_to_a_plan() {
        assert_eq!(plan_by_kind(TestKind::Button).name, "button");
        assert_eq!(plan_by_kind(TestKind::Led).name, "led");
        assert_eq!(plan_by_kind(TestKind::Servo).name, "servo");
    }

    #[test]
    fn display_plans_get_a_limit_past_their_nominal_duration() {
        for kind in [TestKind::Led, TestKind::Servo] {
            let plan = plan_by_kind(kind);
            let config = config_by_kind(kind);
            assert!(config.duration_limit > plan.nominal_duration());
        }
    }
}
