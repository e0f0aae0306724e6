use embassy_time::Timer;

use crate::clock;
use crate::control::TestReceiver;
use crate::report;
use crate::rig::RigDriver;
use testrig_core::bridge::EdgeBridge;
use testrig_core::plans::{config_by_kind, plan_by_kind};
use testrig_core::session::TestSession;

/// Runs queued tests one session at a time.
///
/// Each iteration is non-blocking with respect to the plan: drained edges
/// and phase ticks interleave, and the only await points are the queue
/// receive and the idle pause between iterations.
#[embassy_executor::task]
pub async fn run(
    tests: TestReceiver<'static>,
    bridge: &'static EdgeBridge,
    mut rig: RigDriver<'static>,
) -> ! {
    loop {
        let kind = tests.receive().await;
        let mut session = TestSession::new(plan_by_kind(kind), config_by_kind(kind));

        // Edges from before this session belong to no one.
        bridge.clear();
        report::render_all(&session.start(clock::now()));

        let idle = clock::to_embassy(session.config().idle_interval);
        while session.is_active() {
            while let Some(edge) = bridge.take() {
                report::render_all(&session.handle_edge(edge));
            }
            report::render_all(&session.tick(clock::now(), &mut rig));
            Timer::after(idle).await;
        }

        rig.idle();
        if let Some(reason) = session.completion() {
            report::render_summary(session.statistics(), reason);
        }
    }
}
