//! LED validation plan.
//!
//! Cycles the status pixel through the reference colors, then walks the
//! brightness ladder. Step labels double as statistics category names, so
//! the completion summary reports exactly which colors and levels were
//! shown.

use core::time::Duration;

use super::ANNOUNCE_DWELL;
use crate::phase::{PhaseDescriptor, TestPlan};

/// Hold time for each color step.
pub const COLOR_STEP: Duration = Duration::from_millis(1_000);
/// Hold time for each brightness step.
pub const BRIGHTNESS_STEP: Duration = Duration::from_millis(500);
/// Settling dwell before the session declares the plan finished.
pub const WRAP_UP_DWELL: Duration = Duration::from_millis(500);

/// Reference colors, in display order.
pub const COLOR_STEPS: [&str; 6] = ["red", "green", "blue", "white", "yellow", "off"];

/// Brightness ladder, dimmest to brightest, then off.
pub const BRIGHTNESS_STEPS: [&str; 5] = ["25%", "50%", "75%", "100%", "off"];

/// Ordered phases that implement the LED test.
pub const LED_PHASES: [PhaseDescriptor; 4] = [
    PhaseDescriptor::dwell("announce", ANNOUNCE_DWELL),
    PhaseDescriptor::stepped("colors", COLOR_STEP, &COLOR_STEPS),
    PhaseDescriptor::stepped("brightness", BRIGHTNESS_STEP, &BRIGHTNESS_STEPS),
    PhaseDescriptor::dwell("wrap-up", WRAP_UP_DWELL),
];

/// Plan table describing the LED test.
pub const LED_PLAN: TestPlan = TestPlan::new("led", &LED_PHASES);

/// Returns the shared LED plan.
#[must_use]
pub const fn led_plan() -> TestPlan {
    LED_PLAN
}
