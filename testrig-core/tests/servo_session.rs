//! End-to-end servo test: sweep positions apply in order and the forced
//! time limit reports the phases it cut off.

use core::time::Duration;

use testrig_core::phase::{PhaseDescriptor, PhaseDriver};
use testrig_core::plans::servo::SWEEP_STEPS;
use testrig_core::plans::{TestKind, config_by_kind, plan_by_kind};
use testrig_core::report::ReportEvent;
use testrig_core::session::{CompletionReason, SessionConfig, TestSession};
use testrig_core::time::TickMillis;

const TICK_STEP: u32 = 10;

#[derive(Default)]
struct RecordingDriver {
    steps: Vec<&'static str>,
}

impl PhaseDriver for RecordingDriver {
    fn enter(&mut self, _: &PhaseDescriptor) {}

    fn apply_step(&mut self, _: &PhaseDescriptor, _: usize, label: &'static str) {
        self.steps.push(label);
    }
}

fn run_with_config(config: SessionConfig) -> (TestSession<TickMillis>, RecordingDriver) {
    let mut session = TestSession::new(plan_by_kind(TestKind::Servo), config);
    let mut driver = RecordingDriver::default();

    session.start(TickMillis::new(0));
    let mut now = 0_u32;
    while session.is_active() {
        session.tick(TickMillis::new(now), &mut driver);
        now += TICK_STEP;
        assert!(now < 120_000, "session failed to complete");
    }

    (session, driver)
}

#[test]
fn sweep_positions_apply_in_order() {
    let (session, driver) = run_with_config(config_by_kind(TestKind::Servo));

    assert_eq!(driver.steps, SWEEP_STEPS);
    assert_eq!(session.completion(), Some(CompletionReason::PlanFinished));
    for position in SWEEP_STEPS {
        assert_eq!(session.statistics().category(position), 1);
    }
}

#[test]
fn time_limit_mid_sweep_reports_unreached_phases() {
    // 3s limit lands inside the sweep, leaving recenter unreached.
    let (session, driver) =
        run_with_config(SessionConfig::with_duration_limit(Duration::from_secs(3)));

    assert_eq!(session.completion(), Some(CompletionReason::TimeLimit));
    assert!(driver.steps.len() < SWEEP_STEPS.len());

    let complete = session
        .recorder()
        .latest()
        .copied()
        .expect("completion record expected");
    assert_eq!(
        complete.event,
        ReportEvent::SessionComplete {
            reason: CompletionReason::TimeLimit,
            unreached_phases: 1,
        }
    );
}
