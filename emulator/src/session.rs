use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use workout_core::engine::{Cue, CuePlayer, StartOutcome, TickOutcome, ToggleOutcome};
use workout_core::repl::catalog;
use workout_core::repl::commands::{
    CommandError, CommandExecutor, CommandOutcome, JumpAck, StartAck, TickAck,
};
use workout_core::repl::completion::{CompletionEngine, Replacement};
use workout_core::repl::status::{PlanFormatter, StatusFormatter};
use workout_core::session::{TickTimer, WorkoutSession};
use workout_core::telemetry::EventId;
use workout_core::workouts::{self, Day};

use crate::error::{EmulatorError, Result};

type HostSession = WorkoutSession<'static, HostCues, HostTickTimer>;

/// Collects cues until the front-end renders them.
#[derive(Debug, Default)]
pub struct HostCues {
    pending: Vec<Cue>,
}

impl HostCues {
    pub fn drain(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.pending)
    }
}

impl CuePlayer for HostCues {
    fn play_warning_cue(&mut self) {
        self.pending.push(Cue::Warning);
    }

    fn play_transition_cue(&mut self) {
        self.pending.push(Cue::Transition);
    }
}

/// Wall-clock deadline standing in for a periodic one-second timer.
#[derive(Debug)]
pub struct HostTickTimer {
    period: Duration,
    deadline: Option<Instant>,
}

impl HostTickTimer {
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Moves an armed deadline forward by one period.
    pub fn reschedule(&mut self) {
        if let Some(deadline) = self.deadline.as_mut() {
            *deadline += self.period;
        }
    }
}

impl TickTimer for HostTickTimer {
    fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.period);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

#[derive(Debug)]
pub enum CompletionResponse {
    NoMatches,
    Applied { replacement: Replacement },
    Suggestions { options: Vec<&'static str> },
}

pub struct Session {
    executor: CommandExecutor<HostSession>,
    transcript: Option<TranscriptLogger>,
    started_at: Instant,
    completion: CompletionEngine,
    /// Id of the next telemetry record not yet forwarded.
    telemetry_cursor: EventId,
}

impl Session {
    /// Loads `day`'s plan without starting it.
    ///
    /// # Errors
    ///
    /// Fails when the transcript file cannot be created.
    pub fn new(day: Day, tick_period: Duration, transcript: Option<&Path>) -> Result<Self> {
        let transcript = transcript
            .map(|path| TranscriptLogger::create(path, day))
            .transpose()?;
        let plan = workouts::lookup(day);
        info!(%day, sets = plan.len(), total_secs = plan.total_seconds(), "plan loaded");

        let session = WorkoutSession::new(plan, HostCues::default(), HostTickTimer::new(tick_period));
        Ok(Self {
            executor: CommandExecutor::new(session),
            transcript,
            started_at: Instant::now(),
            completion: CompletionEngine::new(),
            telemetry_cursor: 0,
        })
    }

    /// Runs one REPL line and returns the response lines.
    ///
    /// # Errors
    ///
    /// Only transcript and formatting failures are errors; rejected commands
    /// become `ERR` lines.
    pub fn handle_command(&mut self, line: &str) -> Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let elapsed = self.started_at.elapsed();
        self.record(elapsed, TranscriptRole::Host, &[trimmed])?;

        let lines = match self.executor.execute(trimmed) {
            Ok(outcome) => self.describe(outcome)?,
            Err(err) => {
                warn!(command = trimmed, error = %err, "command rejected");
                vec![describe_error(&err)]
            }
        };
        // Virtual ticks are summarized by the tick acknowledgement.
        self.executor.session_mut().cues_mut().drain();

        self.record(elapsed, TranscriptRole::Emulator, &lines)?;
        self.forward_telemetry(elapsed)?;
        Ok(lines)
    }

    pub fn handle_completion(&mut self, buffer: &str, cursor: usize) -> Result<CompletionResponse> {
        let cursor = cursor.min(buffer.len());
        let elapsed = self.started_at.elapsed();
        let request = match buffer.split_at_checked(cursor) {
            Some((prefix, suffix)) => {
                format!("[TAB] prefix={prefix:?} suffix={suffix:?} cursor={cursor}")
            }
            None => {
                warn!(cursor, "completion cursor inside a character");
                format!("[TAB] buffer={buffer:?} cursor={cursor} (not a char boundary)")
            }
        };
        self.record(elapsed, TranscriptRole::Host, &[request.as_str()])?;

        let result = self.completion.complete(buffer, cursor);
        let options: Vec<&'static str> = result.options.iter().copied().collect();

        let (response, lines) = match (options.len(), result.replacement) {
            (0, _) => (
                CompletionResponse::NoMatches,
                vec!["completion: no matches".to_string()],
            ),
            (1, Some(replacement)) => {
                let line = format!(
                    "completion applied: {} (range={}..{})",
                    replacement.value, replacement.start, replacement.end
                );
                (CompletionResponse::Applied { replacement }, vec![line])
            }
            (_, replacement) => {
                let mut lines = vec![format!("completion options ({})", options.len())];
                lines.extend(options.iter().map(|option| format!("  {option}")));
                if let Some(replacement) = replacement {
                    lines.push(format!("completion prefix: {}", replacement.value));
                }
                (CompletionResponse::Suggestions { options }, lines)
            }
        };

        self.record(elapsed, TranscriptRole::Emulator, &lines)?;
        Ok(response)
    }

    /// Deadline of the next live tick while the session timer is armed.
    #[must_use]
    pub fn tick_deadline(&self) -> Option<Instant> {
        self.executor.session().timer().deadline()
    }

    /// Delivers one real-time tick. Cues stay queued for [`Session::take_cues`].
    ///
    /// # Errors
    ///
    /// Fails when the transcript cannot be written.
    pub fn live_tick(&mut self) -> Result<Vec<String>> {
        let session = self.executor.session_mut();
        let outcome = session.tick();
        session.timer_mut().reschedule();
        debug!(?outcome, "live tick");

        let snapshot = session.snapshot();
        let mut lines = Vec::new();
        if let TickOutcome::Advanced(boundary) = outcome {
            if outcome.completed() {
                info!(elapsed = snapshot.elapsed_ticks, "workout complete");
                lines.push("DONE workout complete".to_string());
            } else {
                let mut line = format!("NEXT {boundary:?} ");
                StatusFormatter::new(&snapshot).write_movement_line(&mut line)?;
                lines.push(line);
            }
        }
        let mut line = String::new();
        StatusFormatter::new(&snapshot).write_position_line(&mut line)?;
        lines.push(line);

        let elapsed = self.started_at.elapsed();
        self.record(elapsed, TranscriptRole::Emulator, &lines)?;
        self.forward_telemetry(elapsed)?;
        Ok(lines)
    }

    pub fn take_cues(&mut self) -> Vec<Cue> {
        self.executor.session_mut().cues_mut().drain()
    }

    /// Jumps to the following movement of the current set, or to the first
    /// movement of the next set after the last one.
    ///
    /// # Errors
    ///
    /// Fails when the transcript cannot be written.
    pub fn skip_to_next(&mut self) -> Result<Vec<String>> {
        let session = self.executor.session();
        let state = session.engine().state();
        let plan = session.plan();

        let target = session.engine().current_set().and_then(|set| {
            if state.movement_index + 1 < set.movement_count() {
                Some((set.id, state.movement_index + 2))
            } else {
                plan.set(state.set_index + 1).map(|next| (next.id, 1))
            }
        });

        match target {
            Some((set, number)) => self.handle_command(&format!("jump {set} {number}")),
            None => Ok(vec!["OK nothing to skip to".to_string()]),
        }
    }

    fn describe(&self, outcome: CommandOutcome<'static>) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        match outcome {
            CommandOutcome::Started(StartAck { day, outcome }) => {
                let label = day.map_or("plan", Day::name);
                let plan = self.executor.session().plan();
                match outcome {
                    StartOutcome::Running => {
                        info!(plan = label, "session started");
                        lines.push(format!(
                            "OK start {label} sets={} total={}s",
                            plan.len(),
                            plan.total_seconds()
                        ));
                        self.push_status(&mut lines)?;
                    }
                    StartOutcome::Empty => {
                        info!(plan = label, "nothing scheduled");
                        lines.push(format!("OK start {label}: nothing scheduled, complete"));
                    }
                }
            }
            CommandOutcome::Paused(true) => lines.push("OK paused".to_string()),
            CommandOutcome::Paused(false) => lines.push("OK not running".to_string()),
            CommandOutcome::Resumed(true) => lines.push("OK running".to_string()),
            CommandOutcome::Resumed(false) => lines.push("OK nothing to resume".to_string()),
            CommandOutcome::Toggled(toggle) => {
                lines.push(
                    match toggle {
                        ToggleOutcome::Started(StartOutcome::Running) => "OK started",
                        ToggleOutcome::Started(StartOutcome::Empty) => "OK nothing scheduled",
                        ToggleOutcome::Paused => "OK paused",
                        ToggleOutcome::Resumed => "OK running",
                        ToggleOutcome::Ignored => "OK workout complete",
                    }
                    .to_string(),
                );
            }
            CommandOutcome::Ticked(ack) => {
                debug!(?ack, "ticks delivered");
                lines.push(describe_ticks(&ack)?);
                if ack.completed {
                    info!("workout complete");
                    lines.push("DONE workout complete".to_string());
                }
                self.push_status(&mut lines)?;
            }
            CommandOutcome::Jumped(JumpAck { set, movement }) => {
                info!(%set, movement, "jumped");
                lines.push(format!("OK jump set={set} movement={movement}"));
                self.push_status(&mut lines)?;
            }
            CommandOutcome::Status(_) => self.push_status(&mut lines)?,
            CommandOutcome::Plan(plan) => {
                let mut line = String::new();
                PlanFormatter::new(&plan).for_each_line(&mut line, |line| {
                    lines.push(std::mem::take(line));
                    Ok(())
                })?;
            }
            CommandOutcome::Help(Some(spec)) => {
                lines.push(format!("{} - {}", spec.usage, spec.summary));
            }
            CommandOutcome::Help(None) => {
                lines.push("Available commands:".to_string());
                for spec in catalog::commands() {
                    lines.push(format!("  {:<32} - {}", spec.usage, spec.summary));
                }
                lines.push("Type `help <command>` for one command, `exit` to quit.".to_string());
            }
        }
        Ok(lines)
    }

    fn push_status(&self, lines: &mut Vec<String>) -> Result<()> {
        let snapshot = self.executor.session().snapshot();
        let formatter = StatusFormatter::new(&snapshot);

        let mut line = String::new();
        formatter.write_position_line(&mut line)?;
        lines.push(line);

        let mut line = String::new();
        formatter.write_movement_line(&mut line)?;
        if !line.is_empty() {
            lines.push(line);
        }

        let mut line = String::new();
        formatter.write_progress_line(&mut line)?;
        lines.push(line);
        Ok(())
    }

    /// Logs and transcribes telemetry recorded since the last call.
    fn forward_telemetry(&mut self, elapsed: Duration) -> Result<()> {
        let telemetry = self.executor.session().telemetry();
        let cursor = self.telemetry_cursor;
        let mut lines = Vec::new();

        for record in telemetry.oldest_first().filter(|record| record.id >= cursor) {
            if lines.is_empty() && record.id > cursor {
                warn!(dropped = record.id - cursor, "telemetry ring overwrote records");
                lines.push(format!("dropped {} records", record.id - cursor));
            }
            let code = record.event.to_raw();
            debug!(
                id = record.id,
                code,
                event = %record.event,
                tick = record.timestamp.0,
                details = ?record.details,
                "telemetry"
            );
            lines.push(format!(
                "#{} tick={} 0x{code:04x} {}",
                record.id, record.timestamp.0, record.event
            ));
        }
        self.telemetry_cursor = telemetry.next_event_id();

        self.record(elapsed, TranscriptRole::Telemetry, &lines)
    }

    fn record<S: AsRef<str>>(
        &mut self,
        elapsed: Duration,
        role: TranscriptRole,
        lines: &[S],
    ) -> Result<()> {
        if let Some(transcript) = self.transcript.as_mut() {
            for line in lines {
                transcript.append_line(elapsed, role, line.as_ref())?;
            }
        }
        Ok(())
    }
}

fn describe_ticks(ack: &TickAck) -> Result<String> {
    let mut line = format!("OK tick applied={}/{}", ack.applied, ack.requested);
    if ack.warnings > 0 {
        write!(line, " warnings={}", ack.warnings)?;
    }
    if ack.transitions > 0 {
        write!(line, " transitions={}", ack.transitions)?;
    }
    Ok(line)
}

fn describe_error(error: &CommandError<'_>) -> String {
    match error {
        CommandError::Parse(err) => format!("ERR syntax {err}"),
        CommandError::Definition(err) => format!("ERR plan {err}"),
        CommandError::Jump(_) | CommandError::MovementOutOfRange { .. } => {
            format!("ERR jump {error}")
        }
        CommandError::UnknownTopic(topic) => {
            let names: Vec<&str> = catalog::commands().iter().map(|spec| spec.name).collect();
            format!("ERR no help for `{topic}`; topics: {}", names.join(", "))
        }
    }
}

struct TranscriptLogger {
    writer: BufWriter<File>,
}

impl TranscriptLogger {
    fn create(path: &Path, day: Day) -> Result<Self> {
        let open = || -> std::io::Result<File> {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
        };
        let file = open().map_err(|source| EmulatorError::Transcript {
            path: path.to_path_buf(),
            source,
        })?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };
        writeln!(logger.writer, "# Workout emulator transcript ({day})")?;
        writeln!(logger.writer, "# Timestamps are milliseconds since session start")?;
        writeln!(logger.writer)?;
        logger.writer.flush()?;
        Ok(logger)
    }

    fn append_line(&mut self, elapsed: Duration, role: TranscriptRole, line: &str) -> Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            elapsed.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum TranscriptRole {
    Host,
    Emulator,
    Telemetry,
}

impl TranscriptRole {
    const fn prefix(self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
            TranscriptRole::Telemetry => "EVT *",
        }
    }
}
