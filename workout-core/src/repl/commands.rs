//! High-level REPL command dispatcher.
//!
//! Parsed commands are forwarded to a [`SessionControl`] implementation,
//! normally a [`WorkoutSession`], and summarized as a [`CommandOutcome`] that
//! front-ends render however they like.

use core::fmt;

use crate::engine::{
    CuePlayer, EngineSnapshot, JumpError, StartOutcome, TickOutcome, ToggleOutcome,
};
use crate::session::{TickTimer, WorkoutSession};
use crate::workouts::{self, Day, DefinitionError, SetId, WorkoutDefinition};

use super::catalog::{self, CommandSpec};
use super::grammar::{self, Command, JumpCommand, StartCommand};

/// Command execution successes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome<'a> {
    Started(StartAck),
    /// `false` when the session was not running.
    Paused(bool),
    /// `false` when the session was already running, idle, or complete.
    Resumed(bool),
    Toggled(ToggleOutcome),
    Ticked(TickAck),
    Jumped(JumpAck),
    Status(EngineSnapshot<'a>),
    Plan(WorkoutDefinition<'a>),
    /// `None` lists every command.
    Help(Option<&'static CommandSpec>),
}

/// Summary returned after `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartAck {
    pub day: Option<Day>,
    pub outcome: StartOutcome,
}

/// Summary of a batch of ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickAck {
    pub requested: u16,
    /// Ticks the engine consumed; the rest were ignored.
    pub applied: u16,
    pub warnings: u16,
    pub transitions: u16,
    pub completed: bool,
}

/// Summary returned after a successful jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JumpAck {
    pub set: SetId,
    /// 1-based, as typed.
    pub movement: u16,
}

/// Errors surfaced while executing a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError<'l> {
    Parse(grammar::ParseError<'l>),
    Definition(DefinitionError),
    Jump(JumpError),
    /// Movement number outside the set, reported as typed (1-based).
    MovementOutOfRange {
        set: SetId,
        movement: u16,
        count: usize,
    },
    UnknownTopic(&'l str),
}

impl<'l> From<grammar::ParseError<'l>> for CommandError<'l> {
    fn from(error: grammar::ParseError<'l>) -> Self {
        Self::Parse(error)
    }
}

impl From<DefinitionError> for CommandError<'_> {
    fn from(error: DefinitionError) -> Self {
        Self::Definition(error)
    }
}

impl From<JumpError> for CommandError<'_> {
    fn from(error: JumpError) -> Self {
        Self::Jump(error)
    }
}

impl fmt::Display for CommandError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Parse(err) => err.fmt(f),
            CommandError::Definition(err) => write!(f, "invalid workout: {err}"),
            CommandError::Jump(err) => err.fmt(f),
            CommandError::MovementOutOfRange {
                set,
                movement,
                count,
            } => write!(
                f,
                "movement {movement} out of range for set {set} (1..={count})"
            ),
            CommandError::UnknownTopic(topic) => write!(f, "no help for `{topic}`"),
        }
    }
}

/// Operations the dispatcher needs from a session.
pub trait SessionControl<'a> {
    /// Starts `day`'s plan, or restarts the loaded plan when `day` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the plan is malformed.
    fn start(&mut self, day: Option<Day>) -> Result<StartOutcome, DefinitionError>;

    fn pause(&mut self) -> bool;

    fn resume(&mut self) -> bool;

    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the toggle starts a malformed plan.
    fn toggle(&mut self) -> Result<ToggleOutcome, DefinitionError>;

    fn tick(&mut self) -> TickOutcome;

    /// # Errors
    ///
    /// Returns [`JumpError`] for unknown sets or out-of-range indices.
    fn jump_to(&mut self, set: SetId, movement_index: usize) -> Result<(), JumpError>;

    fn snapshot(&self) -> EngineSnapshot<'a>;

    fn plan(&self) -> WorkoutDefinition<'a>;
}

impl<'a, C, T, const CAPACITY: usize> SessionControl<'a> for WorkoutSession<'a, C, T, CAPACITY>
where
    C: CuePlayer,
    T: TickTimer,
{
    fn start(&mut self, day: Option<Day>) -> Result<StartOutcome, DefinitionError> {
        match day {
            Some(day) => self.start_with(workouts::lookup(day)),
            None => WorkoutSession::start(self),
        }
    }

    fn pause(&mut self) -> bool {
        WorkoutSession::pause(self)
    }

    fn resume(&mut self) -> bool {
        WorkoutSession::resume(self)
    }

    fn toggle(&mut self) -> Result<ToggleOutcome, DefinitionError> {
        WorkoutSession::toggle(self)
    }

    fn tick(&mut self) -> TickOutcome {
        WorkoutSession::tick(self)
    }

    fn jump_to(&mut self, set: SetId, movement_index: usize) -> Result<(), JumpError> {
        WorkoutSession::jump_to(self, set, movement_index)
    }

    fn snapshot(&self) -> EngineSnapshot<'a> {
        WorkoutSession::snapshot(self)
    }

    fn plan(&self) -> WorkoutDefinition<'a> {
        WorkoutSession::plan(self)
    }
}

/// Dispatches REPL commands into a session.
pub struct CommandExecutor<S> {
    session: S,
}

impl<S> CommandExecutor<S> {
    #[must_use]
    pub const fn new(session: S) -> Self {
        Self { session }
    }

    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.session
    }
}

impl<'a, S> CommandExecutor<S>
where
    S: SessionControl<'a>,
{
    /// Parses and executes a REPL command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the line does not parse or the session
    /// rejects the command.
    pub fn execute<'l>(&mut self, line: &'l str) -> Result<CommandOutcome<'a>, CommandError<'l>> {
        let command = grammar::parse(line)?;
        self.dispatch(command)
    }

    /// Executes an already parsed command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the session rejects the command.
    pub fn dispatch<'l>(
        &mut self,
        command: Command<'l>,
    ) -> Result<CommandOutcome<'a>, CommandError<'l>> {
        match command {
            Command::Start(StartCommand { day }) => {
                let outcome = self.session.start(day)?;
                Ok(CommandOutcome::Started(StartAck { day, outcome }))
            }
            Command::Pause => Ok(CommandOutcome::Paused(self.session.pause())),
            Command::Resume => Ok(CommandOutcome::Resumed(self.session.resume())),
            Command::Toggle => Ok(CommandOutcome::Toggled(self.session.toggle()?)),
            Command::Tick(tick) => Ok(CommandOutcome::Ticked(self.handle_tick(tick.count))),
            Command::Jump(JumpCommand { set, movement }) => {
                let index = usize::from(movement.saturating_sub(1));
                self.session
                    .jump_to(set, index)
                    .map_err(|err| match err {
                        JumpError::MovementOutOfRange { len, .. } => {
                            CommandError::MovementOutOfRange {
                                set,
                                movement,
                                count: len,
                            }
                        }
                        other @ JumpError::UnknownSet(_) => CommandError::Jump(other),
                    })?;
                Ok(CommandOutcome::Jumped(JumpAck { set, movement }))
            }
            Command::Status => Ok(CommandOutcome::Status(self.session.snapshot())),
            Command::Plan => Ok(CommandOutcome::Plan(self.session.plan())),
            Command::Help(help) => match help.topic {
                None => Ok(CommandOutcome::Help(None)),
                Some(topic) => catalog::find(topic)
                    .map(|spec| CommandOutcome::Help(Some(spec)))
                    .ok_or(CommandError::UnknownTopic(topic)),
            },
        }
    }

    fn handle_tick(&mut self, count: u16) -> TickAck {
        let mut ack = TickAck {
            requested: count,
            ..TickAck::default()
        };
        for _ in 0..count {
            match self.session.tick() {
                TickOutcome::Ignored => break,
                TickOutcome::Counted { warned, .. } => {
                    ack.applied += 1;
                    ack.warnings += u16::from(warned);
                }
                outcome @ TickOutcome::Advanced(_) => {
                    ack.applied += 1;
                    ack.transitions += 1;
                    if outcome.completed() {
                        ack.completed = true;
                        break;
                    }
                }
            }
        }
        ack
    }
}
