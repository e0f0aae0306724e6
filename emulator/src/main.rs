mod session;

use std::env;
use std::io;
use std::process;
use std::time::{Duration, Instant as HostInstant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use testrig_core::plans::TestKind;
use testrig_core::time::TickMillis;

use session::HostSession;

fn main() -> io::Result<()> {
    let kind = parse_kind().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: emulator [--test <button|led|servo>] | emulator <button|led|servo>");
        process::exit(2);
    });

    let mut session = HostSession::new(kind)?;
    println!("Test rig emulator: running the {} plan.", plan_tag(kind));
    println!("Space toggles the simulated switch, `q` or Esc quits early.");

    terminal::enable_raw_mode()?;
    let outcome = run_interactive(&mut session);
    terminal::disable_raw_mode()?;
    outcome
}

fn run_interactive(session: &mut HostSession) -> io::Result<()> {
    let started = HostInstant::now();
    let idle = Duration::from_millis(session.idle_millis());
    let mut switch_closed = false;

    emit(&session.start(now_since(started))?);

    while session.is_active() {
        if event::poll(idle)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char(' ') => {
                        switch_closed = !switch_closed;
                        emit(&session.handle_switch(switch_closed, now_since(started))?);
                    }
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    _ => {}
                },
                _ => {}
            }
        }

        emit(&session.tick(now_since(started))?);
    }

    emit(&session.summary()?);
    Ok(())
}

fn emit(lines: &[String]) {
    // Raw mode disables the usual newline translation.
    for line in lines {
        print!("{line}\r\n");
    }
}

#[allow(clippy::cast_possible_truncation)]
fn now_since(started: HostInstant) -> TickMillis {
    TickMillis::new(started.elapsed().as_millis() as u32)
}

fn plan_tag(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Button => "button",
        TestKind::Led => "led",
        TestKind::Servo => "servo",
    }
}

fn parse_kind() -> Result<TestKind, String> {
    let mut args = env::args().skip(1);
    if let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--test=") {
            session::kind_from_tag(value)
        } else if arg == "--test" {
            if let Some(value) = args.next() {
                session::kind_from_tag(&value)
            } else {
                Err("Expected value after --test".to_string())
            }
        } else {
            session::kind_from_tag(&arg)
        }
    } else {
        Ok(TestKind::Button)
    }
}
