use heapless::Vec as HeaplessVec;

use workout_core::engine::{
    Boundary, Cue, CuePlayer, EngineConfig, JumpError, Phase, SequencingEngine, StartOutcome,
    TickOutcome,
};
use workout_core::session::{ManualTickTimer, TickTimer, WorkoutSession};
use workout_core::telemetry::TelemetryEventKind;
use workout_core::workouts::{
    DefinitionError, MONDAY_WORKOUT, Movement, MovementId, MovementSet, SetId, WorkoutDefinition,
};

#[derive(Default)]
struct RecordingCues {
    cues: HeaplessVec<Cue, 512>,
}

impl RecordingCues {
    fn count(&self, cue: Cue) -> usize {
        self.cues.iter().filter(|played| **played == cue).count()
    }
}

impl CuePlayer for RecordingCues {
    fn play_warning_cue(&mut self) {
        self.cues.push(Cue::Warning).expect("cue log full");
    }

    fn play_transition_cue(&mut self) {
        self.cues.push(Cue::Transition).expect("cue log full");
    }
}

const PAIR: [Movement<'static>; 2] = [
    Movement::new(MovementId(1), "Squats"),
    Movement::new(MovementId(2), "Lunges"),
];

const FINISHER: [Movement<'static>; 1] = [Movement::new(MovementId(3), "Plank")];

const TWO_SETS: [MovementSet<'static>; 2] = [
    MovementSet::new(SetId(1), "Legs", 3, 10, 5, &PAIR),
    MovementSet::new(SetId(2), "Core", 1, 20, 0, &FINISHER),
];

const PLAN: WorkoutDefinition<'static> = WorkoutDefinition::new(&TWO_SETS);

fn position(engine: &SequencingEngine<'_>) -> (u8, usize, Phase, u16) {
    let state = engine.state();
    (
        state.repeat_counter,
        state.movement_index,
        state.phase,
        state.seconds_remaining,
    )
}

fn tick_n(engine: &mut SequencingEngine<'_>, cues: &mut RecordingCues, n: u32) -> TickOutcome {
    let mut last = TickOutcome::Ignored;
    for _ in 0..n {
        last = engine.tick(cues);
    }
    last
}

#[test]
fn repeats_walk_through_every_movement() {
    let mut engine = SequencingEngine::new();
    let mut cues = RecordingCues::default();
    assert_eq!(engine.start(PLAN), Ok(StartOutcome::Running));
    assert_eq!(position(&engine), (1, 0, Phase::Active, 10));

    assert_eq!(
        tick_n(&mut engine, &mut cues, 10),
        TickOutcome::Advanced(Boundary::Rest)
    );
    assert_eq!(position(&engine), (1, 0, Phase::Resting, 5));

    assert_eq!(
        tick_n(&mut engine, &mut cues, 5),
        TickOutcome::Advanced(Boundary::Movement)
    );
    assert_eq!(position(&engine), (1, 1, Phase::Active, 10));

    tick_n(&mut engine, &mut cues, 15);
    assert_eq!(position(&engine), (2, 0, Phase::Active, 10));

    tick_n(&mut engine, &mut cues, 30);
    assert_eq!(position(&engine), (3, 0, Phase::Active, 10));

    assert_eq!(
        tick_n(&mut engine, &mut cues, 30),
        TickOutcome::Advanced(Boundary::Set)
    );
    assert_eq!(engine.state().set_index, 1);
    assert_eq!(position(&engine), (1, 0, Phase::Active, 20));
}

#[test]
fn final_set_without_rest_terminates_on_last_active_second() {
    let mut engine = SequencingEngine::new();
    let mut cues = RecordingCues::default();
    engine.start(PLAN).expect("valid plan");

    tick_n(&mut engine, &mut cues, 90);
    assert_eq!(engine.state().set_index, 1);

    assert_eq!(
        tick_n(&mut engine, &mut cues, 19),
        TickOutcome::Counted {
            remaining: 1,
            warned: true
        }
    );
    assert_eq!(
        engine.tick(&mut cues),
        TickOutcome::Advanced(Boundary::Complete)
    );

    let state = engine.state();
    assert_eq!(state.set_index, PLAN.len());
    assert!(!state.running);
    assert!(engine.is_terminal());
    assert_eq!(engine.elapsed_ticks(), PLAN.total_ticks());

    assert_eq!(engine.tick(&mut cues), TickOutcome::Ignored);
    assert!(!engine.resume());
}

#[test]
fn one_transition_cue_per_finished_phase() {
    let mut engine = SequencingEngine::new();
    let mut cues = RecordingCues::default();
    engine.start(PLAN).expect("valid plan");
    tick_n(&mut engine, &mut cues, PLAN.total_ticks());

    // Legs: 6 active + 6 rest phases. Core: one active phase, rest skipped.
    assert_eq!(cues.count(Cue::Transition), 13);
    // Five warnings per active phase, at 5..=1 seconds left.
    assert_eq!(cues.count(Cue::Warning), 7 * 5);
}

#[test]
fn empty_definition_is_terminal_immediately() {
    let mut engine = SequencingEngine::new();
    assert_eq!(
        engine.start(WorkoutDefinition::EMPTY),
        Ok(StartOutcome::Empty)
    );
    assert!(engine.is_terminal());
    assert!(!engine.state().running);
    assert!(engine.current_movement().is_none());
    assert_eq!(engine.remaining_workout_secs(), 0);
}

#[test]
fn invalid_definition_leaves_engine_untouched() {
    const NO_MOVES: [MovementSet<'static>; 1] = [MovementSet::new(SetId(4), "Broken", 1, 10, 5, &[])];

    let mut engine = SequencingEngine::new();
    engine.start(PLAN).expect("valid plan");
    let before = engine.state();

    assert_eq!(
        engine.start(WorkoutDefinition::new(&NO_MOVES)),
        Err(DefinitionError::NoMovements(SetId(4)))
    );
    assert_eq!(engine.state(), before);
    assert_eq!(engine.definition(), PLAN);
}

#[test]
fn jump_restarts_at_first_repeat() {
    let mut engine = SequencingEngine::new();
    let mut cues = RecordingCues::default();
    engine.start(PLAN).expect("valid plan");
    tick_n(&mut engine, &mut cues, 35);
    engine.pause();

    engine.jump_to(SetId(1), 1).expect("in range");
    let state = engine.state();
    assert_eq!(state.repeat_counter, 1);
    assert_eq!(state.movement_index, 1);
    assert_eq!(state.phase, Phase::Active);
    assert_eq!(state.seconds_remaining, 10);
    assert!(state.running);
}

#[test]
fn rejected_jump_changes_nothing() {
    let mut engine = SequencingEngine::new();
    engine.start(PLAN).expect("valid plan");
    let before = engine.state();

    assert_eq!(
        engine.jump_to(SetId(2), 1),
        Err(JumpError::MovementOutOfRange {
            set: SetId(2),
            index: 1,
            len: 1
        })
    );
    assert_eq!(engine.jump_to(SetId(8), 0), Err(JumpError::UnknownSet(SetId(8))));
    assert_eq!(engine.state(), before);
}

#[test]
fn warning_window_is_configurable() {
    let mut engine = SequencingEngine::with_config(EngineConfig::new(2));
    let mut cues = RecordingCues::default();
    engine.start(PLAN).expect("valid plan");
    tick_n(&mut engine, &mut cues, 10);
    assert_eq!(cues.count(Cue::Warning), 2);
}

#[test]
fn monday_plan_runs_to_completion_in_a_session() {
    let mut session: WorkoutSession<'_, RecordingCues, ManualTickTimer> =
        WorkoutSession::new(MONDAY_WORKOUT, RecordingCues::default(), ManualTickTimer::new());
    assert_eq!(session.start(), Ok(StartOutcome::Running));
    assert!(session.timer().is_armed());

    let mut completions = 0;
    for _ in 0..MONDAY_WORKOUT.total_ticks() {
        if session.tick().completed() {
            completions += 1;
        }
    }

    assert_eq!(completions, 1);
    assert!(session.snapshot().terminal);
    assert!(!session.timer().is_armed());
    assert_eq!(
        session.telemetry().latest().map(|record| record.event),
        Some(TelemetryEventKind::WorkoutComplete)
    );
}
