use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use testrig_core::debounce::{ActiveLevel, DEFAULT_DEBOUNCE_WINDOW, Debouncer};
use testrig_core::phase::{PhaseDescriptor, PhaseDriver};
use testrig_core::plans::{TestKind, config_by_kind, plan_by_kind};
use testrig_core::report::{ReportEvent, ReportRecord, ReportTag};
use testrig_core::session::{CompletionReason, TestSession};
use testrig_core::stats::PressClass;
use testrig_core::time::TickMillis;

pub fn kind_from_tag(tag: &str) -> Result<TestKind, String> {
    if tag.eq_ignore_ascii_case("button") {
        Ok(TestKind::Button)
    } else if tag.eq_ignore_ascii_case("led") {
        Ok(TestKind::Led)
    } else if tag.eq_ignore_ascii_case("servo") {
        Ok(TestKind::Servo)
    } else {
        Err(format!("Unknown test kind `{tag}`"))
    }
}

fn log_path(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Button => "transcripts/emulator-button.log",
        TestKind::Led => "transcripts/emulator-led.log",
        TestKind::Servo => "transcripts/emulator-servo.log",
    }
}

fn header(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Button => "Test rig emulator button transcript",
        TestKind::Led => "Test rig emulator LED transcript",
        TestKind::Servo => "Test rig emulator servo transcript",
    }
}

/// A scripted raw switch level change, `closed == true` meaning pressed.
#[derive(Copy, Clone, Debug)]
pub struct SwitchChange {
    pub at_millis: u32,
    pub closed: bool,
}

/// Phase driver that narrates rig actions as console lines.
#[derive(Default)]
struct ConsoleDriver {
    lines: Vec<String>,
}

impl ConsoleDriver {
    fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl PhaseDriver for ConsoleDriver {
    fn enter(&mut self, phase: &PhaseDescriptor) {
        self.lines.push(format!("rig: phase {}", phase.label));
    }

    fn apply_step(&mut self, phase: &PhaseDescriptor, _step_index: usize, label: &'static str) {
        self.lines.push(format!("rig: {} -> {}", phase.label, label));
    }
}

/// Host-side run of one test plan against the shared engine.
///
/// The emulator exercises the same pipeline as the firmware: raw switch
/// levels pass through the debouncer, validated edges reach the session,
/// and every report record is rendered with the tagged line convention.
pub struct HostSession {
    kind: TestKind,
    session: TestSession<TickMillis>,
    debouncer: Debouncer<TickMillis>,
    driver: ConsoleDriver,
    transcript: TranscriptLogger,
}

impl HostSession {
    pub fn new(kind: TestKind) -> io::Result<Self> {
        let transcript = TranscriptLogger::new(kind)?;
        let mut debouncer = Debouncer::new(DEFAULT_DEBOUNCE_WINDOW, ActiveLevel::High);
        // Idle baseline; produces no event.
        let _ = debouncer.sample(false, TickMillis::new(0));

        Ok(Self {
            kind,
            session: TestSession::new(plan_by_kind(kind), config_by_kind(kind)),
            debouncer,
            driver: ConsoleDriver::default(),
            transcript,
        })
    }

    pub fn kind(&self) -> TestKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Suggested pause between cooperative iterations, in milliseconds.
    pub fn idle_millis(&self) -> u64 {
        u64::try_from(self.session.config().idle_interval.as_millis()).unwrap_or(10)
    }

    pub fn start(&mut self, now: TickMillis) -> io::Result<Vec<String>> {
        let lines: Vec<String> = self
            .session
            .start(now)
            .iter()
            .map(render_record)
            .collect();
        self.emit(&lines)?;
        Ok(lines)
    }

    /// Feeds one raw switch level; bounce is rejected silently, exactly as
    /// the interrupt path would reject it.
    pub fn handle_switch(&mut self, closed: bool, now: TickMillis) -> io::Result<Vec<String>> {
        self.transcript.append_line(
            now,
            TranscriptRole::Switch,
            &format!("level {}", if closed { "closed" } else { "open" }),
        )?;

        let Some(edge) = self.debouncer.sample(closed, now) else {
            return Ok(Vec::new());
        };

        let lines: Vec<String> = self
            .session
            .handle_edge(edge)
            .iter()
            .map(render_record)
            .collect();
        self.emit(&lines)?;
        Ok(lines)
    }

    pub fn tick(&mut self, now: TickMillis) -> io::Result<Vec<String>> {
        let records = self.session.tick(now, &mut self.driver);

        let mut lines = self.driver.drain();
        lines.extend(records.iter().map(render_record));
        self.emit(&lines)?;
        Ok(lines)
    }

    /// Renders the post-run summary from the aggregated statistics.
    pub fn summary(&mut self) -> io::Result<Vec<String>> {
        let Some(reason) = self.session.completion() else {
            return Ok(Vec::new());
        };

        let stats = self.session.statistics();
        let tag = ReportTag::Info.as_str();
        let mut lines = vec![format!(
            "{tag} summary ({}): presses total={} short={} long={}",
            reason_label(reason),
            stats.total_presses(),
            stats.short_presses(),
            stats.long_presses()
        )];
        for (label, count) in stats.categories() {
            lines.push(format!("{tag} summary: step {label} applied {count}x"));
        }

        self.emit(&lines)?;
        Ok(lines)
    }

    /// Runs a scripted sequence of switch changes on a virtual clock.
    pub fn run_scripted(&mut self, script: &[SwitchChange], tick_step: u32) -> io::Result<()> {
        let mut now = 0_u32;
        let mut next = 0_usize;
        self.start(TickMillis::new(now))?;

        while self.is_active() {
            while next < script.len() && script[next].at_millis <= now {
                self.handle_switch(script[next].closed, TickMillis::new(script[next].at_millis))?;
                next += 1;
            }
            self.tick(TickMillis::new(now))?;
            now = now.saturating_add(tick_step);
            assert!(now < 120_000, "scripted session failed to complete");
        }

        self.summary()?;
        Ok(())
    }

    fn emit(&mut self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            let at = self.latest_timestamp();
            self.transcript.append_line(at, TranscriptRole::Rig, line)?;
        }
        Ok(())
    }

    fn latest_timestamp(&self) -> TickMillis {
        self.session
            .recorder()
            .latest()
            .map_or(TickMillis::new(0), |record| record.timestamp)
    }
}

/// Renders one record as a tagged console line, matching the firmware sink.
pub fn render_record(record: &ReportRecord<TickMillis>) -> String {
    let tag = record.tag().as_str();
    let at = record.timestamp.as_raw();
    let body = match record.event {
        ReportEvent::SessionStarted { plan } => format!("session start: {plan}"),
        ReportEvent::PhaseEntered { phase_index, label } => {
            format!("phase {phase_index}: {label}")
        }
        ReportEvent::StepApplied {
            phase_index,
            step_index,
            label,
        } => format!("phase {phase_index} step {step_index}: {label}"),
        ReportEvent::PressClassified { class, held_for } => format!(
            "{} press: held {}ms",
            class_label(class),
            held_for.as_millis()
        ),
        ReportEvent::SpuriousRelease => "release without matching press".to_string(),
        ReportEvent::RapidRepeat { gap } => {
            format!("rapid repeat: {}ms between releases", gap.as_millis())
        }
        ReportEvent::SessionComplete {
            reason,
            unreached_phases,
        } => format!(
            "session complete: {}, {unreached_phases} phases unreached",
            reason_label(reason)
        ),
    };
    format!("{tag} t={at}ms {body}")
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

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn new(kind: TestKind) -> io::Result<Self> {
        let path = Path::new(log_path(kind));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header(kind)?;
        Ok(logger)
    }

    fn write_header(&mut self, kind: TestKind) -> io::Result<()> {
        writeln!(self.writer, "# {}", header(kind))?;
        writeln!(
            self.writer,
            "# Timestamps are milliseconds since session start"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(&mut self, at: TickMillis, role: TranscriptRole, line: &str) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            at.as_raw(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Switch,
    Rig,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Switch => "SIM>",
            TranscriptRole::Rig => "RIG<",
        }
    }
}
