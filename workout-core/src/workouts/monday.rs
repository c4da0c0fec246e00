//! Monday plan: a one-pass warmup followed by three rounds of the main workout.
//!
//! Both sets run 10 s per movement with 5 s of rest after each movement.

use super::{Movement, MovementId, MovementSet, SetId, WorkoutDefinition};

/// Seconds each warmup movement is held.
pub const WARMUP_ACTIVE_SECS: u16 = 10;
/// Rest after each warmup movement.
pub const WARMUP_REST_SECS: u16 = 5;
pub const WARMUP_REPEATS: u8 = 1;

/// Seconds each workout movement is performed.
pub const WORKOUT_ACTIVE_SECS: u16 = 10;
/// Rest after each workout movement.
pub const WORKOUT_REST_SECS: u16 = 5;
pub const WORKOUT_REPEATS: u8 = 3;

pub const WARMUP_SET_ID: SetId = SetId(1);
pub const WORKOUT_SET_ID: SetId = SetId(2);

pub const WARMUP_MOVEMENTS: [Movement<'static>; 15] = [
    Movement::with_image(MovementId(1), "Head Turns (Up Down)", "headTurnUpDown"),
    Movement::with_image(MovementId(2), "Head Turns (Left Right)", "headTurnLeftRight"),
    Movement::with_image(MovementId(3), "Foot Circles (Left Foot)", "footCircleLeft"),
    Movement::with_image(MovementId(4), "Foot Circles (Right Foot)", "footCircleRight"),
    Movement::with_image(MovementId(5), "Shoulder Rotations", "shoulderRotations"),
    Movement::with_image(MovementId(6), "Lateral Side Bends", "lateralSideBends"),
    Movement::with_image(MovementId(7), "Prisoner Squats", "prisonerSquats"),
    Movement::with_image(MovementId(8), "Reverse Lunges", "reverseLunges"),
    Movement::with_image(MovementId(9), "Plank Walkouts", "plankWalkouts"),
    Movement::with_image(MovementId(10), "High Knees", "highKnees"),
    Movement::with_image(MovementId(11), "Side Skater", "sideSkater"),
    Movement::with_image(MovementId(12), "Child's Pose", "childsPose"),
    Movement::with_image(MovementId(13), "Crescent Knees", "crescentKnees"),
    Movement::with_image(MovementId(14), "Slow Mountain Climbers", "slowMountainClimbers"),
    Movement::with_image(MovementId(15), "Plank", "plank"),
];

pub const WORKOUT_MOVEMENTS: [Movement<'static>; 11] = [
    Movement::new(MovementId(101), "Mountain Climbers"),
    Movement::new(MovementId(102), "Bicycle Crunch"),
    Movement::new(MovementId(103), "Reverse Crunch"),
    Movement::new(MovementId(104), "Side Plank Dip"),
    Movement::new(MovementId(105), "Burpee"),
    Movement::new(MovementId(106), "Kettlebell Swing"),
    Movement::new(MovementId(107), "Russian Twists"),
    Movement::new(MovementId(108), "Plank Up Down"),
    Movement::new(MovementId(109), "Flutter Kick"),
    Movement::new(MovementId(110), "Crunches"),
    Movement::new(MovementId(111), "Special"),
];

pub const MONDAY_SETS: [MovementSet<'static>; 2] = [
    MovementSet::new(
        WARMUP_SET_ID,
        "Warmup",
        WARMUP_REPEATS,
        WARMUP_ACTIVE_SECS,
        WARMUP_REST_SECS,
        &WARMUP_MOVEMENTS,
    ),
    MovementSet::new(
        WORKOUT_SET_ID,
        "Workout",
        WORKOUT_REPEATS,
        WORKOUT_ACTIVE_SECS,
        WORKOUT_REST_SECS,
        &WORKOUT_MOVEMENTS,
    ),
];

pub const MONDAY_WORKOUT: WorkoutDefinition<'static> = WorkoutDefinition::new(&MONDAY_SETS);

/// Returns the shared Monday plan.
#[must_use]
pub const fn monday_workout() -> WorkoutDefinition<'static> {
    MONDAY_WORKOUT
}
