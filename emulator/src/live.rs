//! Real-time front-end: raw terminal, wall-clock ticks and audible cues.

use std::collections::VecDeque;
use std::io::Write;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::{debug, info};
use workout_core::engine::{Cue, CueTiming};

use crate::error::{EmulatorError, Result};
use crate::session::Session;

/// Upper bound on how long the loop sleeps while nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

const BELL: &str = "\x07";

/// Restores cooked mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().map_err(EmulatorError::Terminal)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

enum Key {
    Toggle,
    Skip,
    Quit,
    Other,
}

fn read_key() -> Result<Key> {
    let Event::Key(key) = event::read().map_err(EmulatorError::Terminal)? else {
        return Ok(Key::Other);
    };
    if key.kind != KeyEventKind::Press {
        return Ok(Key::Other);
    }
    Ok(match key.code {
        KeyCode::Char(' ') => Key::Toggle,
        KeyCode::Char('n') => Key::Skip,
        KeyCode::Char('q') | KeyCode::Esc => Key::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Quit,
        _ => Key::Other,
    })
}

/// Drives `session` from the keyboard until `q` or Esc.
///
/// # Errors
///
/// Terminal and transcript failures end the loop.
pub fn run<W: Write>(session: &mut Session, out: &mut W) -> Result<()> {
    let _raw = RawModeGuard::enable()?;
    let pulse_gap = CueTiming::default().pulse_gap;
    let mut second_pulses: VecDeque<Instant> = VecDeque::new();

    emit(
        out,
        &["space: play/pause  n: next movement  q: quit".to_string()],
    )?;
    info!("live mode started");

    loop {
        let now = Instant::now();
        let wake = [session.tick_deadline(), second_pulses.front().copied()]
            .into_iter()
            .flatten()
            .fold(now + IDLE_POLL, Instant::min);

        if event::poll(wake.saturating_duration_since(now)).map_err(EmulatorError::Terminal)? {
            match read_key()? {
                Key::Toggle => emit(out, &session.handle_command("toggle")?)?,
                Key::Skip => emit(out, &session.skip_to_next()?)?,
                Key::Quit => break,
                Key::Other => {}
            }
        }

        let now = Instant::now();
        while second_pulses.front().is_some_and(|at| *at <= now) {
            second_pulses.pop_front();
            out.write_all(BELL.as_bytes())?;
            out.flush()?;
        }

        if session.tick_deadline().is_some_and(|deadline| deadline <= now) {
            let lines = session.live_tick()?;
            for cue in session.take_cues() {
                debug!(?cue, "cue");
                out.write_all(BELL.as_bytes())?;
                let marker = match cue {
                    Cue::Warning => "[cue] warning",
                    Cue::Transition => {
                        second_pulses.push_back(now + pulse_gap);
                        "[cue] transition"
                    }
                };
                emit(out, &[marker.to_string()])?;
            }
            emit(out, &lines)?;
        }
    }

    info!("live mode closed");
    emit(out, &["Session closed.".to_string()])
}

/// Raw mode needs explicit carriage returns.
fn emit<W: Write>(out: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        write!(out, "{line}\r\n")?;
    }
    out.flush()?;
    Ok(())
}
