use proptest::prelude::*;

use workout_core::engine::{EngineState, NoopCuePlayer, Phase, SequencingEngine};
use workout_core::workouts::{Movement, MovementId, MovementSet, SetId, WorkoutDefinition};

#[derive(Clone, Debug)]
struct SetShape {
    repeat_count: u8,
    active_secs: u16,
    rest_secs: u16,
    movements: usize,
}

fn set_shape() -> impl Strategy<Value = SetShape> {
    (1u8..4, 1u16..8, 0u16..4, 1usize..4).prop_map(
        |(repeat_count, active_secs, rest_secs, movements)| SetShape {
            repeat_count,
            active_secs,
            rest_secs,
            movements,
        },
    )
}

const NAMES: [Movement<'static>; 3] = [
    Movement::new(MovementId(1), "Squats"),
    Movement::new(MovementId(2), "Burpees"),
    Movement::new(MovementId(3), "Plank"),
];

fn build_sets(shapes: &[SetShape]) -> Vec<MovementSet<'static>> {
    shapes
        .iter()
        .enumerate()
        .map(|(index, shape)| {
            MovementSet::new(
                SetId(u16::try_from(index).expect("few sets") + 1),
                "Generated",
                shape.repeat_count,
                shape.active_secs,
                shape.rest_secs,
                &NAMES[..shape.movements],
            )
        })
        .collect()
}

#[derive(Clone, Copy, Debug)]
enum Control {
    Pause,
    Resume,
    Toggle,
    Snapshot,
}

fn control() -> impl Strategy<Value = Control> {
    prop_oneof![
        Just(Control::Pause),
        Just(Control::Resume),
        Just(Control::Toggle),
        Just(Control::Snapshot),
    ]
}

fn without_running(state: EngineState) -> EngineState {
    EngineState {
        running: false,
        ..state
    }
}

proptest! {
    #[test]
    fn planned_ticks_reach_terminal_exactly_once(shapes in prop::collection::vec(set_shape(), 0..4)) {
        let sets = build_sets(&shapes);
        let definition = WorkoutDefinition::new(&sets);
        let mut engine = SequencingEngine::new();
        let mut cues = NoopCuePlayer::new();
        engine.start(definition).expect("generated plans are valid");

        let total = definition.total_ticks();
        let mut completions = 0;
        for tick in 0..total {
            prop_assert!(!engine.is_terminal(), "terminal early at tick {}", tick);
            if engine.tick(&mut cues).completed() {
                completions += 1;
            }
        }

        prop_assert!(engine.is_terminal());
        prop_assert_eq!(completions, u32::from(!definition.is_empty()));
        prop_assert!(!engine.tick(&mut cues).completed());
        prop_assert!(engine.is_terminal());
    }

    #[test]
    fn zero_second_phases_are_never_observed(shapes in prop::collection::vec(set_shape(), 1..4)) {
        let sets = build_sets(&shapes);
        let definition = WorkoutDefinition::new(&sets);
        let mut engine = SequencingEngine::new();
        let mut cues = NoopCuePlayer::new();
        engine.start(definition).expect("generated plans are valid");

        while !engine.is_terminal() {
            let state = engine.state();
            prop_assert!(state.seconds_remaining > 0);
            if state.phase == Phase::Resting {
                let set = engine.current_set().expect("not terminal");
                prop_assert!(set.rest_secs > 0);
            }
            engine.tick(&mut cues);
        }
    }

    #[test]
    fn remaining_time_tracks_elapsed_ticks(
        shapes in prop::collection::vec(set_shape(), 1..4),
        ticks in 0u32..200,
    ) {
        let sets = build_sets(&shapes);
        let definition = WorkoutDefinition::new(&sets);
        let mut engine = SequencingEngine::new();
        let mut cues = NoopCuePlayer::new();
        engine.start(definition).expect("generated plans are valid");

        let total = definition.total_seconds();
        let ticks = ticks.min(total);
        for _ in 0..ticks {
            engine.tick(&mut cues);
        }
        prop_assert_eq!(engine.remaining_workout_secs(), total - ticks);
    }

    #[test]
    fn controls_without_ticks_only_flip_running(
        shapes in prop::collection::vec(set_shape(), 1..4),
        warmup in 0u32..40,
        controls in prop::collection::vec(control(), 0..12),
    ) {
        let sets = build_sets(&shapes);
        let definition = WorkoutDefinition::new(&sets);
        let mut engine = SequencingEngine::new();
        let mut cues = NoopCuePlayer::new();
        engine.start(definition).expect("generated plans are valid");
        for _ in 0..warmup {
            engine.tick(&mut cues);
        }

        engine.pause();
        let paused = engine.state();
        for control in controls {
            match control {
                Control::Pause => {
                    engine.pause();
                }
                Control::Resume => {
                    engine.resume();
                }
                Control::Toggle => {
                    engine.toggle(definition).expect("already started");
                }
                Control::Snapshot => {
                    let _ = engine.snapshot();
                }
            }
            prop_assert_eq!(without_running(engine.state()), without_running(paused));
        }
    }
}
