//! defmt rendering of engine report records.
//!
//! The core emits structured records only; this sink renders the
//! `[INFO]`/`[OK]`/`[WARN]` line convention the host tooling parses.

use testrig_core::report::{ReportEvent, ReportRecord, ReportTag};
use testrig_core::session::{CompletionReason, SessionRecords};
use testrig_core::stats::{EventStatistics, PressClass};
use testrig_core::time::TickMillis;

/// Renders every record produced by one session operation.
pub fn render_all(records: &SessionRecords<TickMillis>) {
    for record in records {
        render(record);
    }
}

/// Renders one record as a tagged console line.
pub fn render(record: &ReportRecord<TickMillis>) {
    let tag = record.tag().as_str();
    let at = record.timestamp.as_raw();

    match record.event {
        ReportEvent::SessionStarted { plan } => {
            defmt::info!("{} t={}ms session start: {}", tag, at, plan);
        }
        ReportEvent::PhaseEntered { phase_index, label } => {
            defmt::info!("{} t={}ms phase {}: {}", tag, at, phase_index, label);
        }
        ReportEvent::StepApplied {
            phase_index,
            step_index,
            label,
        } => {
            defmt::info!(
                "{} t={}ms phase {} step {}: {}",
                tag,
                at,
                phase_index,
                step_index,
                label
            );
        }
        ReportEvent::PressClassified { class, held_for } => {
            defmt::info!(
                "{} t={}ms {} press: held {}ms",
                tag,
                at,
                class_label(class),
                millis(held_for)
            );
        }
        ReportEvent::SpuriousRelease => {
            defmt::warn!("{} t={}ms release without matching press", tag, at);
        }
        ReportEvent::RapidRepeat { gap } => {
            defmt::warn!(
                "{} t={}ms rapid repeat: {}ms between releases",
                tag,
                at,
                millis(gap)
            );
        }
        ReportEvent::SessionComplete {
            reason,
            unreached_phases,
        } => {
            defmt::info!(
                "{} t={}ms session complete: {}, {} phases unreached",
                tag,
                at,
                reason_label(reason),
                unreached_phases
            );
        }
    }
}

/// Renders the post-session summary from the aggregated statistics.
pub fn render_summary(stats: &EventStatistics, reason: CompletionReason) {
    let tag = ReportTag::Info.as_str();
    defmt::info!(
        "{} summary ({}): presses total={} short={} long={}",
        tag,
        reason_label(reason),
        stats.total_presses(),
        stats.short_presses(),
        stats.long_presses()
    );
    for (label, count) in stats.categories() {
        defmt::info!("{} summary: step {} applied {}x", tag, label, count);
    }
}

fn class_label(class: PressClass) -> &'static str {
    match class {
        PressClass::Short => "short",
        PressClass::Long => "long",
    }
}

fn reason_label(reason: CompletionReason) -> &'static str {
    match reason {
        CompletionReason::PlanFinished => "plan finished",
        CompletionReason::TimeLimit => "time limit",
    }
}

fn millis(duration: core::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
