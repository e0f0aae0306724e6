//! Phase driver backed by the rig's status LED.
//!
//! The engine decides when phases and steps happen; this driver translates
//! them into pin states. Step labels double as the off switch: a literal
//! `"off"` step drops the LED, anything else raises it.

use embassy_stm32::gpio::Output;
use testrig_core::phase::{PhaseDescriptor, PhaseDriver};

pub struct RigDriver<'d> {
    status_led: Output<'d>,
}

impl<'d> RigDriver<'d> {
    pub fn new(status_led: Output<'d>) -> Self {
        Self { status_led }
    }

    /// Returns the rig to its quiescent state between sessions.
    pub fn idle(&mut self) {
        self.status_led.set_low();
    }
}

impl PhaseDriver for RigDriver<'_> {
    fn enter(&mut self, phase: &PhaseDescriptor) {
        defmt::debug!("rig: phase enter {}", phase.label);
        self.status_led.set_high();
    }

    fn apply_step(&mut self, phase: &PhaseDescriptor, step_index: usize, label: &'static str) {
        defmt::debug!("rig: {} step {} -> {}", phase.label, step_index, label);
        if label == "off" {
            self.status_led.set_low();
        } else {
            self.status_led.set_high();
        }
    }
}
