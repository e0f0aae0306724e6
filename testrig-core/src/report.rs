//! Structured report records shared by firmware and host targets.
//!
//! The engine never formats text. Each observation becomes a tagged record
//! with numeric fields; reporting collaborators (the defmt sink on the MCU,
//! stdout in the emulator) render the `[INFO]`/`[OK]`/`[WARN]` line
//! convention that downstream tooling parses. Records are also retained in a
//! fixed-size ring so a summary can be reproduced after the fact.

use core::time::Duration;

use heapless::{HistoryBuf, OldestOrdered};

use crate::session::CompletionReason;
use crate::stats::PressClass;

/// Identifier assigned to emitted report records.
pub type ReportId = u32;

/// Line tag the rendering collaborator must preserve.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReportTag {
    /// Lifecycle and phase announcements.
    Info,
    /// Successfully observed and classified events.
    Ok,
    /// Diagnostics that do not affect classification.
    Warn,
}

impl ReportTag {
    /// Canonical rendering of the tag, including brackets.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ReportTag::Info => "[INFO]",
            ReportTag::Ok => "[OK]",
            ReportTag::Warn => "[WARN]",
        }
    }
}

/// Discriminated report events produced over one session.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReportEvent {
    /// A session began for the named plan.
    SessionStarted { plan: &'static str },
    /// A phase became current.
    PhaseEntered {
        phase_index: usize,
        label: &'static str,
    },
    /// A sub-step was applied within the current phase.
    StepApplied {
        phase_index: usize,
        step_index: usize,
        label: &'static str,
    },
    /// A press/release pair was observed and classified.
    PressClassified {
        class: PressClass,
        held_for: Duration,
    },
    /// A release arrived without a matching press; excluded from counters.
    SpuriousRelease,
    /// Two releases landed closer together than the rapid-repeat threshold.
    RapidRepeat { gap: Duration },
    /// The session reached a defined completion state.
    SessionComplete {
        reason: CompletionReason,
        unreached_phases: usize,
    },
}

impl ReportEvent {
    /// Line tag this event renders under.
    #[must_use]
    pub const fn tag(&self) -> ReportTag {
        match self {
            ReportEvent::SessionStarted { .. }
            | ReportEvent::PhaseEntered { .. }
            | ReportEvent::StepApplied { .. }
            | ReportEvent::SessionComplete { .. } => ReportTag::Info,
            ReportEvent::PressClassified { .. } => ReportTag::Ok,
            ReportEvent::SpuriousRelease | ReportEvent::RapidRepeat { .. } => ReportTag::Warn,
        }
    }
}

/// Report record stored in the ring buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ReportRecord<TInstant>
where
    TInstant: Copy,
{
    pub id: ReportId,
    pub timestamp: TInstant,
    pub event: ReportEvent,
}

impl<TInstant> ReportRecord<TInstant>
where
    TInstant: Copy,
{
    /// Line tag this record renders under.
    #[must_use]
    pub const fn tag(&self) -> ReportTag {
        self.event.tag()
    }
}

/// Total number of report entries retained in memory.
pub const REPORT_RING_CAPACITY: usize = 128;

/// Report ring buffer type alias.
pub type ReportRing<TInstant, const CAPACITY: usize = REPORT_RING_CAPACITY> =
    HistoryBuf<ReportRecord<TInstant>, CAPACITY>;

/// Records report events into a fixed-size ring buffer.
pub struct ReportRecorder<TInstant, const CAPACITY: usize = REPORT_RING_CAPACITY>
where
    TInstant: Copy,
{
    ring: ReportRing<TInstant, CAPACITY>,
    next_id: ReportId,
}

impl<TInstant, const CAPACITY: usize> ReportRecorder<TInstant, CAPACITY>
where
    TInstant: Copy,
{
    /// Creates a recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_id: 0,
        }
    }

    /// Records an event, returning the stored record.
    pub fn record(&mut self, event: ReportEvent, timestamp: TInstant) -> ReportRecord<TInstant> {
        let record = ReportRecord {
            id: self.next_id,
            timestamp,
            event,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.ring.write(record);
        record
    }

    /// Returns an iterator over stored records in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, ReportRecord<TInstant>> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent record, if available.
    pub fn latest(&self) -> Option<&ReportRecord<TInstant>> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl<TInstant, const CAPACITY: usize> Default for ReportRecorder<TInstant, CAPACITY>
where
    TInstant: Copy,
{
    fn default() -> Self {
        Self::new()
    }
}
