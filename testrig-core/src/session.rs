//! Session lifecycle: start, per-tick dispatch, global timeout, completion.
//!
//! One [`TestSession`] object owns every piece of per-run state, so a restart
//! is a full reset rather than an incremental patch-up. The session never
//! blocks; the cooperative loop calls [`TestSession::tick`] once per
//! iteration and feeds it drained bridge edges in between.

use core::time::Duration;

use heapless::Vec;

use crate::debounce::EdgeEvent;
use crate::phase::{PhaseDriver, PhaseEngine, PhaseNotice, TestPlan};
use crate::report::{ReportEvent, ReportRecord, ReportRecorder};
use crate::stats::{EdgeOutcome, EventStatistics, PressThresholds, PressTracker};
use crate::time::MonotonicInstant;

/// Global limit applied when callers do not override it.
pub const DEFAULT_DURATION_LIMIT: Duration = Duration::from_secs(30);

/// Idle pause between loop iterations; bounds CPU use, not correctness.
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(10);

/// Tunable parameters for one session.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SessionConfig {
    /// Hard cap on session length; the controller forces completion at
    /// `start + duration_limit` regardless of phase progress.
    pub duration_limit: Duration,
    /// Suggested pause between cooperative loop iterations.
    pub idle_interval: Duration,
    /// Press classification thresholds.
    pub thresholds: PressThresholds,
}

impl SessionConfig {
    /// Config with the given limit and default idle/thresholds.
    #[must_use]
    pub fn with_duration_limit(duration_limit: Duration) -> Self {
        Self {
            duration_limit,
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_limit: DEFAULT_DURATION_LIMIT,
            idle_interval: DEFAULT_IDLE_INTERVAL,
            thresholds: PressThresholds::default(),
        }
    }
}

/// Why a session stopped.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompletionReason {
    /// The plan's final phase completed on its own.
    PlanFinished,
    /// The global duration limit elapsed mid-plan.
    TimeLimit,
}

/// Records produced by a single session operation.
pub type SessionRecords<TInstant> = Vec<ReportRecord<TInstant>, 8>;

/// Owns the lifecycle of one test run at a time.
pub struct TestSession<TInstant>
where
    TInstant: Copy,
{
    config: SessionConfig,
    engine: PhaseEngine<TInstant>,
    tracker: PressTracker<TInstant>,
    stats: EventStatistics,
    recorder: ReportRecorder<TInstant>,
    started_at: Option<TInstant>,
    active: bool,
    completion: Option<CompletionReason>,
}

impl<TInstant> TestSession<TInstant>
where
    TInstant: MonotonicInstant,
{
    /// Creates an inactive session for the given plan.
    #[must_use]
    pub fn new(plan: TestPlan, config: SessionConfig) -> Self {
        Self {
            config,
            engine: PhaseEngine::new(plan),
            tracker: PressTracker::new(config.thresholds),
            stats: EventStatistics::new(),
            recorder: ReportRecorder::new(),
            started_at: None,
            active: false,
            completion: None,
        }
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the plan being run.
    #[must_use]
    pub const fn plan(&self) -> &TestPlan {
        self.engine.plan()
    }

    /// Returns `true` while the session accepts ticks and edges.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns how the last run ended, if it has.
    #[must_use]
    pub const fn completion(&self) -> Option<CompletionReason> {
        self.completion
    }

    /// Returns the aggregated statistics for the current or last run.
    #[must_use]
    pub const fn statistics(&self) -> &EventStatistics {
        &self.stats
    }

    /// Returns the report history.
    #[must_use]
    pub const fn recorder(&self) -> &ReportRecorder<TInstant> {
        &self.recorder
    }

    /// Starts (or restarts) the session, fully resetting all per-run state.
    ///
    /// Safe to call regardless of in-progress state.
    pub fn start(&mut self, now: TInstant) -> SessionRecords<TInstant> {
        self.engine.reset();
        self.tracker.reset();
        self.stats.reset();
        self.started_at = Some(now);
        self.active = true;
        self.completion = None;

        let mut records = SessionRecords::new();
        self.push(
            &mut records,
            ReportEvent::SessionStarted {
                plan: self.engine.plan().name,
            },
            now,
        );
        records
    }

    /// Advances the session by one cooperative tick.
    ///
    /// No-ops when inactive. Drives the phase engine, then enforces the
    /// half-open active interval `[start, start + duration_limit)`.
    pub fn tick<D>(&mut self, now: TInstant, driver: &mut D) -> SessionRecords<TInstant>
    where
        D: PhaseDriver,
    {
        let mut records = SessionRecords::new();
        if !self.active {
            return records;
        }

        let notices = self.engine.tick(now, driver);
        for notice in notices {
            match notice {
                PhaseNotice::Entered { phase_index } => {
                    if let Some(label) = self.phase_label(phase_index) {
                        self.push(
                            &mut records,
                            ReportEvent::PhaseEntered { phase_index, label },
                            now,
                        );
                    }
                }
                PhaseNotice::Step {
                    phase_index,
                    step_index,
                } => {
                    if let Some(label) = self.step_label(phase_index, step_index) {
                        self.stats.record_category(label);
                        self.push(
                            &mut records,
                            ReportEvent::StepApplied {
                                phase_index,
                                step_index,
                                label,
                            },
                            now,
                        );
                    }
                }
                PhaseNotice::Finished => {
                    self.finish(&mut records, now, CompletionReason::PlanFinished);
                }
            }
        }

        if self.active
            && let Some(started_at) = self.started_at
            && now.duration_since(started_at) >= self.config.duration_limit
        {
            self.finish(&mut records, now, CompletionReason::TimeLimit);
        }

        records
    }

    /// Consumes one drained bridge edge.
    ///
    /// Ignored while inactive; anomalies (spurious releases, rapid repeats)
    /// are reported as diagnostics, never propagated as failures.
    pub fn handle_edge(&mut self, event: EdgeEvent<TInstant>) -> SessionRecords<TInstant> {
        let mut records = SessionRecords::new();
        if !self.active {
            return records;
        }

        match self.tracker.observe(event) {
            EdgeOutcome::PressOpened => {}
            EdgeOutcome::Classified {
                class,
                held_for,
                rapid_repeat,
            } => {
                self.stats.record_press(class);
                self.push(
                    &mut records,
                    ReportEvent::PressClassified { class, held_for },
                    event.timestamp,
                );
                if let Some(gap) = rapid_repeat {
                    self.push(&mut records, ReportEvent::RapidRepeat { gap }, event.timestamp);
                }
            }
            EdgeOutcome::SpuriousRelease => {
                self.push(&mut records, ReportEvent::SpuriousRelease, event.timestamp);
            }
        }
        records
    }

    /// Forces completion now; idempotent.
    pub fn complete(&mut self, now: TInstant) -> SessionRecords<TInstant> {
        let mut records = SessionRecords::new();
        if self.active {
            self.finish(&mut records, now, CompletionReason::TimeLimit);
        }
        records
    }

    fn finish(
        &mut self,
        records: &mut SessionRecords<TInstant>,
        now: TInstant,
        reason: CompletionReason,
    ) {
        if self.completion.is_some() && !self.active {
            return;
        }
        self.active = false;
        self.completion = Some(reason);
        self.push(
            records,
            ReportEvent::SessionComplete {
                reason,
                unreached_phases: self.engine.unreached_phases(),
            },
            now,
        );
    }

    fn phase_label(&self, phase_index: usize) -> Option<&'static str> {
        self.engine
            .plan()
            .phases
            .get(phase_index)
            .map(|phase| phase.label)
    }

    fn step_label(&self, phase_index: usize, step_index: usize) -> Option<&'static str> {
        use crate::phase::PhaseRule;

        let phase = self.engine.plan().phases.get(phase_index)?;
        match phase.rule {
            PhaseRule::Dwell(_) => None,
            PhaseRule::Stepped { steps, .. } => steps.get(step_index).copied(),
        }
    }

    fn push(
        &mut self,
        records: &mut SessionRecords<TInstant>,
        event: ReportEvent,
        now: TInstant,
    ) {
        let record = self.recorder.record(event, now);
        let _ = records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::EdgeKind;
    use crate::phase::{NoopPhaseDriver, PhaseDescriptor};
    use crate::report::ReportTag;
    use crate::stats::PressClass;
    use crate::time::TickMillis;

    const STEP_LABELS: [&str; 2] = ["red", "green"];
    const PHASES: [PhaseDescriptor; 3] = [
        PhaseDescriptor::dwell("announce", Duration::from_millis(2_000)),
        PhaseDescriptor::stepped("colors", Duration::from_millis(1_000), &STEP_LABELS),
        PhaseDescriptor::dwell("wrap-up", Duration::from_millis(500)),
    ];
    const PLAN: TestPlan = TestPlan::new("fixture", &PHASES);

    fn at(millis: u32) -> TickMillis {
        TickMillis::new(millis)
    }

    fn edge(kind: EdgeKind, millis: u32) -> EdgeEvent<TickMillis> {
        EdgeEvent {
            kind,
            timestamp: at(millis),
        }
    }

    fn session(limit_millis: u64) -> TestSession<TickMillis> {
        TestSession::new(
            PLAN,
            SessionConfig::with_duration_limit(Duration::from_millis(limit_millis)),
        )
    }

    fn run_to_completion(session: &mut TestSession<TickMillis>, tick_millis: u32) {
        let mut driver = NoopPhaseDriver::new();
        let mut now = 0;
        while session.is_active() {
            session.tick(at(now), &mut driver);
            now += tick_millis;
            assert!(now < 120_000, "session failed to complete");
        }
    }

    #[test]
    fn tick_before_start_is_a_no_op() {
        let mut session = session(30_000);
        let mut driver = NoopPhaseDriver::new();
        assert!(session.tick(at(0), &mut driver).is_empty());
        assert!(!session.is_active());
    }

    #[test]
    fn start_marks_active_and_reports_the_plan() {
        let mut session = session(30_000);
        let records = session.start(at(0));

        assert!(session.is_active());
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].event,
            ReportEvent::SessionStarted { plan: "fixture" }
        );
        assert_eq!(records[0].tag(), ReportTag::Info);
    }

    #[test]
    fn three_second_hold_counts_one_short_press() {
        let mut session = session(30_000);
        session.start(at(0));

        session.handle_edge(edge(EdgeKind::Press, 1_000));
        let records = session.handle_edge(edge(EdgeKind::Release, 4_000));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tag(), ReportTag::Ok);
        assert_eq!(session.statistics().short_presses(), 1);
        assert_eq!(session.statistics().long_presses(), 0);
        assert_eq!(session.statistics().total_presses(), 1);
    }

    #[test]
    fn six_second_hold_counts_one_long_press() {
        let mut session = session(30_000);
        session.start(at(0));

        session.handle_edge(edge(EdgeKind::Press, 1_000));
        session.handle_edge(edge(EdgeKind::Release, 7_000));

        assert_eq!(session.statistics().long_presses(), 1);
        assert_eq!(session.statistics().short_presses(), 0);
        assert_eq!(session.statistics().total_presses(), 1);
    }

    #[test]
    fn rapid_releases_count_normally_and_warn_once() {
        let mut session = session(30_000);
        session.start(at(0));

        session.handle_edge(edge(EdgeKind::Press, 1_000));
        session.handle_edge(edge(EdgeKind::Release, 1_050));
        session.handle_edge(edge(EdgeKind::Press, 1_100));
        let records = session.handle_edge(edge(EdgeKind::Release, 1_150));

        assert_eq!(session.statistics().total_presses(), 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tag(), ReportTag::Ok);
        assert_eq!(
            records[1].event,
            ReportEvent::RapidRepeat {
                gap: Duration::from_millis(100),
            }
        );
    }

    #[test]
    fn spurious_release_warns_without_counting() {
        let mut session = session(30_000);
        session.start(at(0));

        let records = session.handle_edge(edge(EdgeKind::Release, 500));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, ReportEvent::SpuriousRelease);
        assert_eq!(session.statistics().total_presses(), 0);
    }

    #[test]
    fn plan_finishing_completes_the_session() {
        let mut session = session(30_000);
        session.start(at(0));
        run_to_completion(&mut session, 10);

        assert_eq!(session.completion(), Some(CompletionReason::PlanFinished));
        let last = session.recorder().latest().copied().expect("records expected");
        assert_eq!(
            last.event,
            ReportEvent::SessionComplete {
                reason: CompletionReason::PlanFinished,
                unreached_phases: 0,
            }
        );
    }

    #[test]
    fn global_limit_forces_completion_with_unreached_phases() {
        // 1s limit elapses inside the 2s announce dwell.
        let mut session = session(1_000);
        let mut driver = NoopPhaseDriver::new();
        session.start(at(0));

        session.tick(at(0), &mut driver);
        assert!(session.is_active());

        let records = session.tick(at(1_000), &mut driver);
        assert!(!session.is_active());
        assert_eq!(session.completion(), Some(CompletionReason::TimeLimit));
        let complete = records
            .iter()
            .find(|record| matches!(record.event, ReportEvent::SessionComplete { .. }))
            .expect("completion record expected");
        assert_eq!(
            complete.event,
            ReportEvent::SessionComplete {
                reason: CompletionReason::TimeLimit,
                unreached_phases: 2,
            }
        );
    }

    #[test]
    fn step_labels_feed_category_counters() {
        let mut session = session(30_000);
        session.start(at(0));
        run_to_completion(&mut session, 10);

        assert_eq!(session.statistics().category("red"), 1);
        assert_eq!(session.statistics().category("green"), 1);
    }

    #[test]
    fn complete_is_idempotent() {
        let mut session = session(30_000);
        session.start(at(0));

        let first = session.complete(at(5_000));
        assert_eq!(first.len(), 1);
        let recorded = session.recorder().len();

        let second = session.complete(at(6_000));
        assert!(second.is_empty());
        assert_eq!(session.recorder().len(), recorded);
    }

    #[test]
    fn edges_after_completion_are_ignored() {
        let mut session = session(30_000);
        session.start(at(0));
        session.complete(at(100));

        assert!(session.handle_edge(edge(EdgeKind::Press, 200)).is_empty());
        assert!(session.handle_edge(edge(EdgeKind::Release, 400)).is_empty());
        assert_eq!(session.statistics().total_presses(), 0);
    }

    #[test]
    fn restart_resets_counters_and_phase_state() {
        let mut session = session(30_000);
        session.start(at(0));
        session.handle_edge(edge(EdgeKind::Press, 100));
        session.handle_edge(edge(EdgeKind::Release, 400));
        session.complete(at(1_000));
        assert_eq!(session.statistics().total_presses(), 1);

        // Restart mid-state must be a full reset.
        let records = session.start(at(2_000));
        assert!(session.is_active());
        assert!(session.completion().is_none());
        assert_eq!(session.statistics().total_presses(), 0);
        assert_eq!(
            records[0].event,
            ReportEvent::SessionStarted { plan: "fixture" }
        );

        session.handle_edge(edge(EdgeKind::Press, 2_100));
        session.handle_edge(edge(EdgeKind::Release, 8_000));
        assert_eq!(session.statistics().long_presses(), 1);
        assert_eq!(session.statistics().category("red"), 0);
    }

    #[test]
    fn press_classified_record_carries_duration() {
        let mut session = session(30_000);
        session.start(at(0));

        session.handle_edge(edge(EdgeKind::Press, 0));
        let records = session.handle_edge(edge(EdgeKind::Release, 3_000));
        assert_eq!(
            records[0].event,
            ReportEvent::PressClassified {
                class: PressClass::Short,
                held_for: Duration::from_millis(3_000),
            }
        );
    }
}
