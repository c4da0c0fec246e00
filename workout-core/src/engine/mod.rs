//! Deterministic sequencing engine driving a workout session.
//!
//! The engine owns the position inside a [`WorkoutDefinition`] (set, repeat,
//! movement), the current [`Phase`] and the countdown for that phase. It is
//! driven by one-second [`SequencingEngine::tick`] calls from an external
//! periodic timer plus user commands (`start`, `pause`, `resume`, `jump_to`).
//! Audible and haptic feedback leaves the engine through the [`CuePlayer`]
//! trait so the emulator and tests can supply their own outputs.
//!
//! The engine never arms or cancels timers itself; see
//! [`crate::session::WorkoutSession`] for the wrapper that keeps a timer in
//! step with [`EngineState::running`].

use core::{fmt, time::Duration};

use crate::workouts::{DefinitionError, Movement, MovementSet, SetId, WorkoutDefinition};

/// Active seconds during which every countdown tick plays a warning cue.
pub const DEFAULT_WARNING_WINDOW_SECS: u16 = 5;
/// Gap between the two pulses of a transition cue.
pub const TRANSITION_PULSE_GAP: Duration = Duration::from_millis(200);

/// Tunables for the sequencing engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    warning_window: u16,
}

impl EngineConfig {
    #[must_use]
    pub const fn new(warning_window: u16) -> Self {
        Self { warning_window }
    }

    #[must_use]
    pub const fn warning_window(&self) -> u16 {
        self.warning_window
    }

    /// Returns `true` when an active countdown at `remaining` should warn.
    #[must_use]
    pub const fn warns_at(&self, remaining: u16) -> bool {
        remaining >= 1 && remaining <= self.warning_window
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WARNING_WINDOW_SECS)
    }
}

/// Timing used by cue players when rendering pulses.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CueTiming {
    pub pulse_gap: Duration,
}

impl CueTiming {
    #[must_use]
    pub const fn new(pulse_gap: Duration) -> Self {
        Self { pulse_gap }
    }
}

impl Default for CueTiming {
    fn default() -> Self {
        Self::new(TRANSITION_PULSE_GAP)
    }
}

/// Which half of a movement slot is counting down.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    #[default]
    Active,
    Resting,
}

impl Phase {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Phase::Active => "active",
            Phase::Resting => "resting",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Feedback emitted by the engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cue {
    /// Single pulse near the end of an active phase.
    Warning,
    /// Double pulse when a phase finishes.
    Transition,
}

/// Output for audio or haptic cues. Implementations are fire-and-forget.
pub trait CuePlayer {
    /// Plays the single warning pulse.
    fn play_warning_cue(&mut self);

    /// Plays the double transition pulse.
    fn play_transition_cue(&mut self);

    fn play(&mut self, cue: Cue) {
        match cue {
            Cue::Warning => self.play_warning_cue(),
            Cue::Transition => self.play_transition_cue(),
        }
    }
}

/// Cue player that stays silent.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopCuePlayer;

impl NoopCuePlayer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CuePlayer for NoopCuePlayer {
    fn play_warning_cue(&mut self) {}

    fn play_transition_cue(&mut self) {}
}

/// Mutable engine state. One instance per session.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EngineState {
    /// Index into the definition's sets; equal to the set count once complete.
    pub set_index: usize,
    /// 1-based repeat of the current set.
    pub repeat_counter: u8,
    pub movement_index: usize,
    pub phase: Phase,
    pub seconds_remaining: u16,
    pub running: bool,
    pub started: bool,
}

/// Location of a movement slot inside a definition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub set_index: usize,
    pub repeat: u8,
    pub movement_index: usize,
}

impl Position {
    #[must_use]
    pub const fn new(set_index: usize, repeat: u8, movement_index: usize) -> Self {
        Self {
            set_index,
            repeat,
            movement_index,
        }
    }

    /// Position following `self` in `definition`, crossing movement, repeat
    /// and set boundaries. `None` after the final movement of the final set.
    #[must_use]
    pub fn next_in(self, definition: &WorkoutDefinition<'_>) -> Option<Position> {
        let set = definition.set(self.set_index)?;
        if self.movement_index + 1 < set.movement_count() {
            Some(Position::new(
                self.set_index,
                self.repeat,
                self.movement_index + 1,
            ))
        } else if self.repeat < set.repeat_count {
            Some(Position::new(self.set_index, self.repeat + 1, 0))
        } else if self.set_index + 1 < definition.len() {
            Some(Position::new(self.set_index + 1, 1, 0))
        } else {
            None
        }
    }
}

/// Boundary crossed when a phase finishes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Boundary {
    /// Active phase finished; rest begins.
    Rest,
    /// Next movement within the same repeat.
    Movement,
    /// Next repeat of the same set.
    Repeat,
    /// First movement of the next set.
    Set,
    /// Workout finished.
    Complete,
}

/// Result of a single [`SequencingEngine::tick`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// Engine was paused or terminal.
    Ignored,
    /// Countdown decremented.
    Counted { remaining: u16, warned: bool },
    /// Phase finished and a transition cue played.
    Advanced(Boundary),
}

impl TickOutcome {
    #[must_use]
    pub const fn completed(self) -> bool {
        matches!(self, TickOutcome::Advanced(Boundary::Complete))
    }
}

/// Result of [`SequencingEngine::start`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StartOutcome {
    Running,
    /// Nothing to play; the engine is terminal and idle.
    Empty,
}

/// Result of [`SequencingEngine::toggle`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ToggleOutcome {
    Started(StartOutcome),
    Paused,
    Resumed,
    /// Terminal sessions cannot be resumed.
    Ignored,
}

/// Rejected navigation target.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JumpError {
    UnknownSet(SetId),
    MovementOutOfRange { set: SetId, index: usize, len: usize },
}

impl fmt::Display for JumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JumpError::UnknownSet(set) => write!(f, "unknown set {set}"),
            JumpError::MovementOutOfRange { set, index, len } => write!(
                f,
                "movement index {index} out of range for set {set} ({len} movements)"
            ),
        }
    }
}

/// Read-only view of the engine handed to presentation code.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EngineSnapshot<'a> {
    pub state: EngineState,
    pub set: Option<&'a MovementSet<'a>>,
    pub current: Option<&'a Movement<'a>>,
    pub next: Option<&'a Movement<'a>>,
    pub set_count: usize,
    pub terminal: bool,
    pub remaining_workout_secs: u32,
    pub elapsed_ticks: u32,
}

/// Workout state machine.
#[derive(Clone, Debug)]
pub struct SequencingEngine<'a> {
    definition: WorkoutDefinition<'a>,
    state: EngineState,
    config: EngineConfig,
    elapsed_ticks: u32,
}

impl Default for SequencingEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SequencingEngine<'a> {
    /// Creates an idle engine holding an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            definition: WorkoutDefinition::EMPTY,
            state: EngineState::default(),
            config,
            elapsed_ticks: 0,
        }
    }

    pub const fn config(&self) -> EngineConfig {
        self.config
    }

    pub const fn definition(&self) -> WorkoutDefinition<'a> {
        self.definition
    }

    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Ticks consumed since the last `start`.
    pub const fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    /// Loads `definition` and begins its first movement. Calling again resets
    /// the session. An empty definition leaves the engine terminal and idle.
    ///
    /// # Errors
    ///
    /// Returns the validation failure for a malformed definition; the engine
    /// state is left untouched in that case.
    pub fn start(
        &mut self,
        definition: WorkoutDefinition<'a>,
    ) -> Result<StartOutcome, DefinitionError> {
        definition.validate()?;

        self.definition = definition;
        self.elapsed_ticks = 0;

        let Some(first) = definition.set(0) else {
            self.state = EngineState {
                started: true,
                ..EngineState::default()
            };
            return Ok(StartOutcome::Empty);
        };

        self.state = EngineState {
            set_index: 0,
            repeat_counter: 1,
            movement_index: 0,
            phase: Phase::Active,
            seconds_remaining: first.active_secs,
            running: true,
            started: true,
        };
        Ok(StartOutcome::Running)
    }

    /// Stops the countdown. Returns `false` if it was not running.
    pub fn pause(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.running = false;
        true
    }

    /// Restarts the countdown where it stopped. Returns `false` when already
    /// running, never started, or terminal.
    pub fn resume(&mut self) -> bool {
        if self.state.running || !self.state.started || self.is_terminal() {
            return false;
        }
        if self.state.seconds_remaining == 0 {
            self.state.seconds_remaining = self.phase_duration();
        }
        self.state.running = true;
        true
    }

    /// Play/pause button: starts `definition` if the session never started,
    /// otherwise flips between paused and running.
    ///
    /// # Errors
    ///
    /// Propagates [`DefinitionError`] from the implicit start.
    pub fn toggle(
        &mut self,
        definition: WorkoutDefinition<'a>,
    ) -> Result<ToggleOutcome, DefinitionError> {
        if !self.state.started {
            return self.start(definition).map(ToggleOutcome::Started);
        }
        if self.pause() {
            Ok(ToggleOutcome::Paused)
        } else if self.resume() {
            Ok(ToggleOutcome::Resumed)
        } else {
            Ok(ToggleOutcome::Ignored)
        }
    }

    /// Consumes one elapsed second.
    pub fn tick<C: CuePlayer>(&mut self, cues: &mut C) -> TickOutcome {
        if !self.state.running || self.is_terminal() {
            return TickOutcome::Ignored;
        }
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);

        if self.state.seconds_remaining > 1 {
            self.state.seconds_remaining -= 1;
            let remaining = self.state.seconds_remaining;
            let warned = self.state.phase == Phase::Active && self.config.warns_at(remaining);
            if warned {
                cues.play_warning_cue();
            }
            return TickOutcome::Counted { remaining, warned };
        }

        cues.play_transition_cue();
        TickOutcome::Advanced(self.advance())
    }

    /// Moves straight to `movement_index` of the set identified by `set_id`
    /// and starts it running from its first repeat.
    ///
    /// # Errors
    ///
    /// Unknown sets and out-of-range indices are rejected without touching
    /// the current state.
    pub fn jump_to(&mut self, set_id: SetId, movement_index: usize) -> Result<(), JumpError> {
        let (set_index, set) = self
            .definition
            .find_set(set_id)
            .ok_or(JumpError::UnknownSet(set_id))?;
        if movement_index >= set.movement_count() {
            return Err(JumpError::MovementOutOfRange {
                set: set_id,
                index: movement_index,
                len: set.movement_count(),
            });
        }

        self.state = EngineState {
            set_index,
            repeat_counter: 1,
            movement_index,
            phase: Phase::Active,
            seconds_remaining: set.active_secs,
            running: true,
            started: true,
        };
        Ok(())
    }

    /// `true` once every set has been played (or nothing was loaded).
    pub const fn is_terminal(&self) -> bool {
        self.state.set_index >= self.definition.len()
    }

    pub fn current_set(&self) -> Option<&'a MovementSet<'a>> {
        self.definition.set(self.state.set_index)
    }

    pub fn position(&self) -> Option<Position> {
        self.current_set().map(|_| {
            Position::new(
                self.state.set_index,
                self.state.repeat_counter,
                self.state.movement_index,
            )
        })
    }

    pub fn current_movement(&self) -> Option<&'a Movement<'a>> {
        self.current_set()?.movement(self.state.movement_index)
    }

    /// Movement that plays after the current one, if any.
    pub fn next_movement(&self) -> Option<&'a Movement<'a>> {
        let next = self.position()?.next_in(&self.definition)?;
        self.definition.set(next.set_index)?.movement(next.movement_index)
    }

    /// Seconds left until the workout completes if it runs uninterrupted.
    pub fn remaining_workout_secs(&self) -> u32 {
        let Some(set) = self.current_set() else {
            return 0;
        };
        let state = self.state;
        let mut total = u32::from(state.seconds_remaining);
        if state.phase == Phase::Active {
            total += u32::from(set.rest_secs);
        }

        let movements = set.movement_count();
        let later_in_pass = movements.saturating_sub(state.movement_index + 1);
        let later_passes = usize::from(set.repeat_count.saturating_sub(state.repeat_counter));
        let slots = u32::try_from(later_in_pass + later_passes * movements).unwrap_or(u32::MAX);
        total = total.saturating_add(set.slot_secs().saturating_mul(slots));

        self.definition.sets[state.set_index + 1..]
            .iter()
            .fold(total, |sum, later| sum.saturating_add(later.cycle_seconds()))
    }

    pub fn snapshot(&self) -> EngineSnapshot<'a> {
        EngineSnapshot {
            state: self.state,
            set: self.current_set(),
            current: self.current_movement(),
            next: self.next_movement(),
            set_count: self.definition.len(),
            terminal: self.is_terminal(),
            remaining_workout_secs: self.remaining_workout_secs(),
            elapsed_ticks: self.elapsed_ticks,
        }
    }

    fn phase_duration(&self) -> u16 {
        match (self.current_set(), self.state.phase) {
            (Some(set), Phase::Active) => set.active_secs,
            (Some(set), Phase::Resting) => set.rest_secs,
            (None, _) => 0,
        }
    }

    fn advance(&mut self) -> Boundary {
        loop {
            let boundary = match self.state.phase {
                Phase::Active => {
                    self.state.phase = Phase::Resting;
                    Boundary::Rest
                }
                Phase::Resting => {
                    self.state.phase = Phase::Active;
                    self.step_position()
                }
            };

            if self.is_terminal() {
                self.state.running = false;
                return Boundary::Complete;
            }

            self.state.seconds_remaining = self.phase_duration();
            // Zero-length rest is never observable.
            if self.state.phase == Phase::Resting && self.state.seconds_remaining == 0 {
                continue;
            }
            return boundary;
        }
    }

    fn step_position(&mut self) -> Boundary {
        let Some(set) = self.current_set() else {
            return Boundary::Complete;
        };
        let state = &mut self.state;
        if state.movement_index + 1 < set.movement_count() {
            state.movement_index += 1;
            Boundary::Movement
        } else if state.repeat_counter < set.repeat_count {
            state.repeat_counter += 1;
            state.movement_index = 0;
            Boundary::Repeat
        } else {
            state.set_index += 1;
            state.repeat_counter = 1;
            state.movement_index = 0;
            Boundary::Set
        }
    }
}
