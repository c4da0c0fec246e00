//! Session wrapper owning the engine, its periodic timer and its cue output.
//!
//! [`WorkoutSession`] forwards commands to the [`SequencingEngine`] and, after
//! each one, reconciles the [`TickTimer`] so it is armed exactly while the
//! engine is running. Every observable change is written to the session's
//! telemetry ring.

use core::time::Duration;

use crate::engine::{
    Boundary, Cue, CuePlayer, EngineConfig, EngineSnapshot, JumpError, SequencingEngine,
    StartOutcome, TickOutcome, ToggleOutcome,
};
use crate::telemetry::{
    PositionTelemetry, SessionTelemetry, TELEMETRY_RING_CAPACITY, TelemetryEventKind,
    TelemetryInstant, TelemetryPayload, TelemetryRecorder,
};
use crate::workouts::{DefinitionError, SetId, WorkoutDefinition};

/// Handle to a periodic one-second timer that calls back into the session.
pub trait TickTimer {
    /// Registers the periodic callback, restarting its period.
    fn arm(&mut self);

    /// Cancels the periodic callback.
    fn cancel(&mut self);

    fn is_armed(&self) -> bool;
}

/// Timer whose ticks are delivered by hand. Tracks arm and cancel calls.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ManualTickTimer {
    armed: bool,
    arm_count: u32,
    cancel_count: u32,
}

impl ManualTickTimer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            armed: false,
            arm_count: 0,
            cancel_count: 0,
        }
    }

    pub const fn arm_count(&self) -> u32 {
        self.arm_count
    }

    pub const fn cancel_count(&self) -> u32 {
        self.cancel_count
    }
}

impl TickTimer for ManualTickTimer {
    fn arm(&mut self) {
        self.armed = true;
        self.arm_count = self.arm_count.saturating_add(1);
    }

    fn cancel(&mut self) {
        self.armed = false;
        self.cancel_count = self.cancel_count.saturating_add(1);
    }

    fn is_armed(&self) -> bool {
        self.armed
    }
}

/// Session clock measured in consumed ticks.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct SessionTick(pub u32);

impl TelemetryInstant for SessionTick {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_secs(u64::from(self.0.saturating_sub(earlier.0)))
    }
}

/// One engine, one timer handle and one cue output for a single session.
pub struct WorkoutSession<'a, C, T, const CAPACITY: usize = TELEMETRY_RING_CAPACITY>
where
    C: CuePlayer,
    T: TickTimer,
{
    engine: SequencingEngine<'a>,
    plan: WorkoutDefinition<'a>,
    cues: C,
    timer: T,
    telemetry: TelemetryRecorder<SessionTick, CAPACITY>,
}

impl<'a, C, T, const CAPACITY: usize> WorkoutSession<'a, C, T, CAPACITY>
where
    C: CuePlayer,
    T: TickTimer,
{
    pub fn new(plan: WorkoutDefinition<'a>, cues: C, timer: T) -> Self {
        Self::with_config(plan, cues, timer, EngineConfig::default())
    }

    pub fn with_config(plan: WorkoutDefinition<'a>, cues: C, timer: T, config: EngineConfig) -> Self {
        Self {
            engine: SequencingEngine::with_config(config),
            plan,
            cues,
            timer,
            telemetry: TelemetryRecorder::new(),
        }
    }

    /// Definition loaded by the next `start`.
    pub const fn plan(&self) -> WorkoutDefinition<'a> {
        self.plan
    }

    pub const fn engine(&self) -> &SequencingEngine<'a> {
        &self.engine
    }

    pub fn snapshot(&self) -> EngineSnapshot<'a> {
        self.engine.snapshot()
    }

    pub const fn telemetry(&self) -> &TelemetryRecorder<SessionTick, CAPACITY> {
        &self.telemetry
    }

    pub const fn cues(&self) -> &C {
        &self.cues
    }

    pub fn cues_mut(&mut self) -> &mut C {
        &mut self.cues
    }

    pub const fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Starts (or restarts) the current plan.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the plan is malformed.
    pub fn start(&mut self) -> Result<StartOutcome, DefinitionError> {
        let outcome = self.engine.start(self.plan)?;
        let summary = SessionTelemetry::new(self.plan.total_seconds(), 0);
        let now = self.now();
        match outcome {
            StartOutcome::Running => {
                self.telemetry
                    .record_session(TelemetryEventKind::SessionStarted, summary, now);
                self.record_boundary(TelemetryEventKind::MovementStarted);
            }
            StartOutcome::Empty => {
                self.telemetry
                    .record_session(TelemetryEventKind::SessionEmpty, summary, now);
            }
        }
        self.rearm_timer();
        Ok(outcome)
    }

    /// Replaces the plan and starts it. A malformed plan leaves the current
    /// plan and engine untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when `plan` is malformed.
    pub fn start_with(
        &mut self,
        plan: WorkoutDefinition<'a>,
    ) -> Result<StartOutcome, DefinitionError> {
        plan.validate()?;
        self.plan = plan;
        self.start()
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.engine.pause();
        if paused {
            self.record_marker(TelemetryEventKind::Paused);
        }
        self.sync_timer();
        paused
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.engine.resume();
        if resumed {
            self.record_marker(TelemetryEventKind::Resumed);
        }
        self.sync_timer();
        resumed
    }

    /// Play/pause button.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the toggle starts a malformed plan.
    pub fn toggle(&mut self) -> Result<ToggleOutcome, DefinitionError> {
        if !self.engine.state().started {
            return self.start().map(ToggleOutcome::Started);
        }
        let outcome = self.engine.toggle(self.plan)?;
        match outcome {
            ToggleOutcome::Paused => self.record_marker(TelemetryEventKind::Paused),
            ToggleOutcome::Resumed => self.record_marker(TelemetryEventKind::Resumed),
            ToggleOutcome::Started(_) | ToggleOutcome::Ignored => {}
        }
        self.sync_timer();
        Ok(outcome)
    }

    /// Delivers one timer tick.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.engine.tick(&mut self.cues);
        let now = self.now();
        match outcome {
            TickOutcome::Ignored | TickOutcome::Counted { warned: false, .. } => {}
            TickOutcome::Counted {
                remaining,
                warned: true,
            } => {
                self.telemetry.record_cue(Cue::Warning, remaining, now);
            }
            TickOutcome::Advanced(boundary) => {
                self.telemetry.record_cue(Cue::Transition, 0, now);
                if boundary == Boundary::Complete {
                    let summary = SessionTelemetry::new(
                        self.plan.total_seconds(),
                        self.engine.elapsed_ticks(),
                    );
                    self.telemetry.record_session(
                        TelemetryEventKind::WorkoutComplete,
                        summary,
                        now,
                    );
                } else {
                    self.record_boundary(TelemetryEventKind::for_boundary(boundary));
                }
            }
        }
        self.sync_timer();
        outcome
    }

    /// Jumps to a movement and restarts the timer period.
    ///
    /// # Errors
    ///
    /// Returns [`JumpError`] for unknown sets or out-of-range indices; the
    /// session is unchanged in that case.
    pub fn jump_to(&mut self, set: SetId, movement_index: usize) -> Result<(), JumpError> {
        self.engine.jump_to(set, movement_index)?;
        self.record_boundary(TelemetryEventKind::Jumped);
        self.rearm_timer();
        Ok(())
    }

    fn now(&self) -> SessionTick {
        SessionTick(self.engine.elapsed_ticks())
    }

    fn record_boundary(&mut self, event: TelemetryEventKind) {
        if let Some(set) = self.engine.current_set() {
            let state = self.engine.state();
            let now = self.now();
            self.telemetry.record_boundary(event, set.id, &state, now);
        }
    }

    fn record_marker(&mut self, event: TelemetryEventKind) {
        if let Some(set) = self.engine.current_set() {
            let state = self.engine.state();
            let payload = TelemetryPayload::Position(PositionTelemetry::new(set.id, &state, None));
            let now = self.now();
            self.telemetry.record(event, payload, now);
        }
    }

    fn rearm_timer(&mut self) {
        if self.timer.is_armed() {
            self.timer.cancel();
        }
        self.sync_timer();
    }

    fn sync_timer(&mut self) {
        match (self.engine.state().running, self.timer.is_armed()) {
            (true, false) => self.timer.arm(),
            (false, true) => self.timer.cancel(),
            _ => {}
        }
    }
}

impl<C, T, const CAPACITY: usize> Drop for WorkoutSession<'_, C, T, CAPACITY>
where
    C: CuePlayer,
    T: TickTimer,
{
    fn drop(&mut self) {
        if self.timer.is_armed() {
            self.timer.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use heapless::Vec;

    use super::*;
    use crate::engine::Phase;
    use crate::workouts::{Movement, MovementId, MovementSet};

    #[derive(Default)]
    struct CountingCues {
        warnings: u32,
        transitions: u32,
    }

    impl CuePlayer for CountingCues {
        fn play_warning_cue(&mut self) {
            self.warnings += 1;
        }

        fn play_transition_cue(&mut self) {
            self.transitions += 1;
        }
    }

    const MOVES: [Movement<'static>; 1] = [Movement::new(MovementId(1), "Plank")];
    const SETS: [MovementSet<'static>; 1] = [MovementSet::new(SetId(3), "Core", 1, 2, 1, &MOVES)];

    type TestSession = WorkoutSession<'static, CountingCues, ManualTickTimer, 32>;

    fn session() -> TestSession {
        WorkoutSession::new(
            WorkoutDefinition::new(&SETS),
            CountingCues::default(),
            ManualTickTimer::new(),
        )
    }

    fn events(session: &TestSession) -> Vec<TelemetryEventKind, 32> {
        session.telemetry().oldest_first().map(|r| r.event).collect()
    }

    #[test]
    fn timer_follows_running_state() {
        let mut session = session();
        assert!(!session.timer().is_armed());

        session.start().expect("valid plan");
        assert!(session.timer().is_armed());

        assert!(session.pause());
        assert!(!session.timer().is_armed());

        assert!(session.resume());
        assert!(session.timer().is_armed());

        // 2 s active + 1 s rest.
        for _ in 0..3 {
            session.tick();
        }
        assert!(session.engine().is_terminal());
        assert!(!session.timer().is_armed());
    }

    #[test]
    fn empty_start_never_arms_the_timer() {
        let mut session = session();
        session.start().expect("valid plan");
        assert_eq!(
            session.start_with(WorkoutDefinition::EMPTY),
            Ok(StartOutcome::Empty)
        );
        assert!(!session.timer().is_armed());
        assert!(session.engine().is_terminal());
        assert_eq!(session.snapshot().current, None);
    }

    #[test]
    fn restart_restarts_the_timer_period() {
        let mut session = session();
        session.start().expect("valid plan");
        session.start().expect("valid plan");
        assert_eq!(session.timer().arm_count(), 2);
        assert_eq!(session.timer().cancel_count(), 1);
        assert!(session.timer().is_armed());
    }

    #[test]
    fn telemetry_narrates_a_full_session() {
        let mut session = session();
        session.start().expect("valid plan");
        for _ in 0..3 {
            session.tick();
        }

        assert_eq!(
            events(&session).as_slice(),
            &[
                TelemetryEventKind::SessionStarted,
                TelemetryEventKind::MovementStarted,
                TelemetryEventKind::WarningCue,
                TelemetryEventKind::TransitionCue,
                TelemetryEventKind::RestStarted,
                TelemetryEventKind::TransitionCue,
                TelemetryEventKind::WorkoutComplete,
            ]
        );
        assert_eq!(session.cues().warnings, 1);
        assert_eq!(session.cues().transitions, 2);

        let last = session.telemetry().latest().copied().expect("recorded");
        assert_eq!(last.timestamp, SessionTick(3));
        assert_eq!(
            last.details,
            TelemetryPayload::Session(SessionTelemetry::new(3, 3))
        );
    }

    #[test]
    fn toggle_starts_pauses_and_resumes() {
        let mut session = session();
        assert_eq!(
            session.toggle(),
            Ok(ToggleOutcome::Started(StartOutcome::Running))
        );
        assert_eq!(session.toggle(), Ok(ToggleOutcome::Paused));
        assert!(!session.timer().is_armed());
        assert_eq!(session.toggle(), Ok(ToggleOutcome::Resumed));
        assert!(session.timer().is_armed());
    }

    #[test]
    fn failed_jump_changes_nothing() {
        let mut session = session();
        session.start().expect("valid plan");
        session.pause();
        let recorded = session.telemetry().len();

        assert!(session.jump_to(SetId(3), 4).is_err());
        assert!(!session.timer().is_armed());
        assert_eq!(session.telemetry().len(), recorded);

        session.jump_to(SetId(3), 0).expect("valid target");
        assert!(session.timer().is_armed());
        assert_eq!(session.snapshot().state.phase, Phase::Active);
        assert_eq!(
            session.telemetry().latest().map(|r| r.event),
            Some(TelemetryEventKind::Jumped)
        );
    }

    #[test]
    fn dropping_the_session_cancels_the_timer() {
        struct SharedTimer<'t>(&'t core::cell::Cell<bool>);

        impl TickTimer for SharedTimer<'_> {
            fn arm(&mut self) {
                self.0.set(true);
            }

            fn cancel(&mut self) {
                self.0.set(false);
            }

            fn is_armed(&self) -> bool {
                self.0.get()
            }
        }

        let armed = core::cell::Cell::new(false);
        {
            let mut session: WorkoutSession<'_, CountingCues, SharedTimer<'_>, 8> =
                WorkoutSession::new(
                    WorkoutDefinition::new(&SETS),
                    CountingCues::default(),
                    SharedTimer(&armed),
                );
            session.start().expect("valid plan");
            assert!(armed.get());
        }
        assert!(!armed.get());
    }
}
