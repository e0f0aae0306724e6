//! Table-driven phase sequencing shared by firmware and host targets.
//!
//! A test run is an ordered list of [`PhaseDescriptor`]s. The engine advances
//! through them using elapsed-time comparisons only — there is no blocking
//! wait inside a phase, so the cooperative loop can interleave edge handling
//! between ticks. Adding or reordering phases is a data change; the engine
//! itself has no per-phase knowledge.

use core::time::Duration;

use heapless::Vec;

use crate::time::MonotonicInstant;

/// Progression rule for a single phase.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PhaseRule {
    /// Perform the entry action once, then hold for the given duration.
    Dwell(Duration),
    /// Walk an ordered list of labelled sub-steps, one per `step_time`.
    Stepped {
        step_time: Duration,
        steps: &'static [&'static str],
    },
}

/// Immutable description of one phase in a test plan.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PhaseDescriptor {
    pub label: &'static str,
    pub rule: PhaseRule,
}

impl PhaseDescriptor {
    /// Builds a fixed-dwell phase.
    #[must_use]
    pub const fn dwell(label: &'static str, hold: Duration) -> Self {
        Self {
            label,
            rule: PhaseRule::Dwell(hold),
        }
    }

    /// Builds a step-indexed phase.
    #[must_use]
    pub const fn stepped(
        label: &'static str,
        step_time: Duration,
        steps: &'static [&'static str],
    ) -> Self {
        Self {
            label,
            rule: PhaseRule::Stepped { step_time, steps },
        }
    }

    /// Number of sub-steps the phase walks through (zero for dwell phases).
    #[must_use]
    pub const fn step_count(&self) -> usize {
        match self.rule {
            PhaseRule::Dwell(_) => 0,
            PhaseRule::Stepped { steps, .. } => steps.len(),
        }
    }

    /// Nominal time the phase occupies before the engine advances.
    #[must_use]
    pub fn nominal_duration(&self) -> Duration {
        match self.rule {
            PhaseRule::Dwell(hold) => hold,
            PhaseRule::Stepped { step_time, steps } => {
                step_time.saturating_mul(u32::try_from(steps.len()).unwrap_or(u32::MAX))
            }
        }
    }
}

/// Named, ordered collection of phases making up one test.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TestPlan {
    pub name: &'static str,
    pub phases: &'static [PhaseDescriptor],
}

impl TestPlan {
    /// Builds a plan from a static phase table.
    #[must_use]
    pub const fn new(name: &'static str, phases: &'static [PhaseDescriptor]) -> Self {
        Self { name, phases }
    }

    /// Returns the number of configured phases.
    #[must_use]
    pub const fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Sum of the nominal durations of every phase.
    #[must_use]
    pub fn nominal_duration(&self) -> Duration {
        self.phases
            .iter()
            .fold(Duration::ZERO, |acc, phase| acc + phase.nominal_duration())
    }
}

/// Abstraction over the peripherals a phase acts on.
///
/// Concrete drivers translate phase entries and step labels into pixel
/// colors, servo pulses, or console output; the engine only reports what
/// should happen and when.
pub trait PhaseDriver {
    /// Invoked exactly once when a phase becomes current.
    fn enter(&mut self, phase: &PhaseDescriptor);

    /// Invoked once per sub-step, only when the computed step index changes.
    fn apply_step(&mut self, phase: &PhaseDescriptor, step_index: usize, label: &'static str);
}

/// Phase driver that performs no peripheral interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopPhaseDriver;

impl NoopPhaseDriver {
    /// Creates a new no-op phase driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PhaseDriver for NoopPhaseDriver {
    fn enter(&mut self, _: &PhaseDescriptor) {}

    fn apply_step(&mut self, _: &PhaseDescriptor, _: usize, _: &'static str) {}
}

/// Observation emitted by a single sequencer tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PhaseNotice {
    /// A phase became current and its entry action fired.
    Entered { phase_index: usize },
    /// A sub-step was applied for the current phase.
    Step { phase_index: usize, step_index: usize },
    /// The plan's final phase completed; emitted exactly once.
    Finished,
}

/// Maximum notices a single tick can produce (entry + step + finish).
pub const MAX_TICK_NOTICES: usize = 4;

/// Notices produced by one call to [`PhaseEngine::tick`].
pub type TickNotices = Vec<PhaseNotice, MAX_TICK_NOTICES>;

/// Cooperative-context state machine walking a [`TestPlan`].
///
/// The current phase index only ever moves forward; a completed phase is
/// never re-entered within one run.
pub struct PhaseEngine<TInstant>
where
    TInstant: Copy,
{
    plan: TestPlan,
    index: usize,
    phase_started_at: Option<TInstant>,
    entered: bool,
    applied_step: Option<usize>,
    finished: bool,
}

impl<TInstant> PhaseEngine<TInstant>
where
    TInstant: MonotonicInstant,
{
    /// Creates an engine positioned before the first phase.
    #[must_use]
    pub const fn new(plan: TestPlan) -> Self {
        Self {
            plan,
            index: 0,
            phase_started_at: None,
            entered: false,
            applied_step: None,
            finished: false,
        }
    }

    /// Returns the plan this engine walks.
    #[must_use]
    pub const fn plan(&self) -> &TestPlan {
        &self.plan
    }

    /// Index of the current phase (equals the phase count once finished).
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.index
    }

    /// Returns the descriptor of the current phase, if any remain.
    #[must_use]
    pub fn current_phase(&self) -> Option<&PhaseDescriptor> {
        self.plan.phases.get(self.index)
    }

    /// Returns `true` once the final phase has completed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of configured phases the engine has not yet entered.
    ///
    /// The current phase counts as reached even when interrupted mid-dwell.
    #[must_use]
    pub fn unreached_phases(&self) -> usize {
        let reached = if self.entered || self.finished {
            self.index.saturating_add(1)
        } else {
            self.index
        };
        self.plan.phase_count().saturating_sub(reached.min(self.plan.phase_count()))
    }

    /// Rewinds to the first phase, dropping all per-run state.
    pub fn reset(&mut self) {
        self.index = 0;
        self.phase_started_at = None;
        self.entered = false;
        self.applied_step = None;
        self.finished = false;
    }

    /// Advances the state machine by one cooperative tick.
    ///
    /// Safe to call at any rate: entry actions fire once per phase, a
    /// sub-step is applied only when `elapsed / step_time` crosses into a new
    /// index, and re-invocation within the same step produces nothing.
    pub fn tick<D>(&mut self, now: TInstant, driver: &mut D) -> TickNotices
    where
        D: PhaseDriver,
    {
        let mut notices = TickNotices::new();

        if self.finished {
            return notices;
        }

        let Some(phase) = self.plan.phases.get(self.index) else {
            self.finish(&mut notices);
            return notices;
        };
        let phase = *phase;

        if !self.entered {
            self.entered = true;
            self.phase_started_at = Some(now);
            self.applied_step = None;
            driver.enter(&phase);
            let _ = notices.push(PhaseNotice::Entered {
                phase_index: self.index,
            });
        }

        let Some(started_at) = self.phase_started_at else {
            return notices;
        };
        let elapsed = now.duration_since(started_at);

        match phase.rule {
            PhaseRule::Dwell(hold) => {
                if elapsed >= hold {
                    self.advance(&mut notices);
                }
            }
            PhaseRule::Stepped { step_time, steps } => {
                let computed = step_index_for(elapsed, step_time);
                if computed >= steps.len() {
                    self.advance(&mut notices);
                } else if self.applied_step != Some(computed) {
                    self.applied_step = Some(computed);
                    driver.apply_step(&phase, computed, steps[computed]);
                    let _ = notices.push(PhaseNotice::Step {
                        phase_index: self.index,
                        step_index: computed,
                    });
                }
            }
        }

        notices
    }

    fn advance(&mut self, notices: &mut TickNotices) {
        self.index = self.index.saturating_add(1);
        self.entered = false;
        self.applied_step = None;
        self.phase_started_at = None;

        if self.index >= self.plan.phase_count() {
            self.finish(notices);
        }
    }

    fn finish(&mut self, notices: &mut TickNotices) {
        if !self.finished {
            self.finished = true;
            let _ = notices.push(PhaseNotice::Finished);
        }
    }
}

/// Integer step index for the elapsed time, saturating on overflow.
fn step_index_for(elapsed: Duration, step_time: Duration) -> usize {
    let step_millis = step_time.as_millis().max(1);
    usize::try_from(elapsed.as_millis() / step_millis).unwrap_or(usize::MAX)
}
