use std::io;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use session::{HostSession, SwitchChange};
use testrig_core::plans::TestKind;

const TICK_STEP_MILLIS: u32 = 10;

fn main() -> io::Result<()> {
    record_button()?;
    record_passive(TestKind::Led)?;
    record_passive(TestKind::Servo)?;
    Ok(())
}

/// Button transcript: a short press, a long press, a rapid double-tap,
/// a spurious release, and one bounce burst the debouncer must reject.
fn record_button() -> io::Result<()> {
    let script = [
        // Short press held for 800ms.
        SwitchChange {
            at_millis: 3_000,
            closed: true,
        },
        SwitchChange {
            at_millis: 3_800,
            closed: false,
        },
        // Bounce burst inside the debounce window of the release.
        SwitchChange {
            at_millis: 3_820,
            closed: true,
        },
        SwitchChange {
            at_millis: 3_840,
            closed: false,
        },
        // Long press held for 6s.
        SwitchChange {
            at_millis: 5_000,
            closed: true,
        },
        SwitchChange {
            at_millis: 11_000,
            closed: false,
        },
        // Rapid double-tap: releases 150ms apart.
        SwitchChange {
            at_millis: 13_000,
            closed: true,
        },
        SwitchChange {
            at_millis: 13_080,
            closed: false,
        },
        SwitchChange {
            at_millis: 13_150,
            closed: true,
        },
        SwitchChange {
            at_millis: 13_230,
            closed: false,
        },
    ];

    let mut session = HostSession::new(TestKind::Button)?;
    session.run_scripted(&script, TICK_STEP_MILLIS)
}

/// LED and servo plans need no input; the transcript captures the phase
/// and step cadence plus the summary.
fn record_passive(kind: TestKind) -> io::Result<()> {
    let mut session = HostSession::new(kind)?;
    session.run_scripted(&[], TICK_STEP_MILLIS)
}
