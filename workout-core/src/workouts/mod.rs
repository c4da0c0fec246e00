//! Workout definitions shared by the sequencing engine and host front-ends.
//!
//! A [`WorkoutDefinition`] is an ordered list of [`MovementSet`]s, each of
//! which repeats an ordered list of [`Movement`]s. Everything here is plain,
//! borrow-only data so the built-in plans can live in `const` tables while
//! tests build definitions from owned vectors.

use core::fmt;

pub mod monday;

pub use monday::{MONDAY_SETS, MONDAY_WORKOUT, monday_workout};

/// Stable identifier for a movement.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MovementId(pub u16);

/// Stable identifier for a movement set.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SetId(pub u16);

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single exercise shown to the user.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Movement<'a> {
    pub id: MovementId,
    pub name: &'a str,
    /// Illustration key understood by the presentation layer.
    pub image: Option<&'a str>,
}

impl<'a> Movement<'a> {
    pub const fn new(id: MovementId, name: &'a str) -> Self {
        Self {
            id,
            name,
            image: None,
        }
    }

    pub const fn with_image(id: MovementId, name: &'a str, image: &'a str) -> Self {
        Self {
            id,
            name,
            image: Some(image),
        }
    }
}

/// Ordered group of movements played `repeat_count` times.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MovementSet<'a> {
    pub id: SetId,
    pub name: &'a str,
    pub repeat_count: u8,
    /// Seconds each movement is performed.
    pub active_secs: u16,
    /// Seconds of rest after each movement. Zero skips the rest phase.
    pub rest_secs: u16,
    pub movements: &'a [Movement<'a>],
}

impl<'a> MovementSet<'a> {
    pub const fn new(
        id: SetId,
        name: &'a str,
        repeat_count: u8,
        active_secs: u16,
        rest_secs: u16,
        movements: &'a [Movement<'a>],
    ) -> Self {
        Self {
            id,
            name,
            repeat_count,
            active_secs,
            rest_secs,
            movements,
        }
    }

    /// Number of movements in one pass through the set.
    pub const fn movement_count(&self) -> usize {
        self.movements.len()
    }

    pub fn movement(&self, index: usize) -> Option<&'a Movement<'a>> {
        self.movements.get(index)
    }

    /// Seconds consumed by one movement including its rest.
    pub fn slot_secs(&self) -> u32 {
        u32::from(self.active_secs) + u32::from(self.rest_secs)
    }

    /// Seconds needed to play every repeat of the set.
    pub fn cycle_seconds(&self) -> u32 {
        let movements = u32::try_from(self.movements.len()).unwrap_or(u32::MAX);
        self.slot_secs()
            .saturating_mul(movements)
            .saturating_mul(u32::from(self.repeat_count))
    }

    /// Checks the per-set invariants the engine relies on.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.repeat_count == 0 {
            return Err(DefinitionError::ZeroRepeatCount(self.id));
        }
        if self.active_secs == 0 {
            return Err(DefinitionError::ZeroActiveDuration(self.id));
        }
        if self.movements.is_empty() {
            return Err(DefinitionError::NoMovements(self.id));
        }
        if let Some(movement) = self.movements.iter().find(|m| m.name.trim().is_empty()) {
            return Err(DefinitionError::UnnamedMovement {
                set: self.id,
                movement: movement.id,
            });
        }
        Ok(())
    }
}

/// Ordered movement sets making up one session. May be empty.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct WorkoutDefinition<'a> {
    pub sets: &'a [MovementSet<'a>],
}

impl<'a> WorkoutDefinition<'a> {
    /// Definition with nothing to play.
    pub const EMPTY: WorkoutDefinition<'static> = WorkoutDefinition { sets: &[] };

    pub const fn new(sets: &'a [MovementSet<'a>]) -> Self {
        Self { sets }
    }

    pub const fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub const fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn set(&self, index: usize) -> Option<&'a MovementSet<'a>> {
        self.sets.get(index)
    }

    /// Locates a set by id, returning its index alongside it.
    pub fn find_set(&self, id: SetId) -> Option<(usize, &'a MovementSet<'a>)> {
        self.sets.iter().enumerate().find(|(_, set)| set.id == id)
    }

    /// Planned session length in seconds.
    pub fn total_seconds(&self) -> u32 {
        self.sets
            .iter()
            .fold(0u32, |total, set| total.saturating_add(set.cycle_seconds()))
    }

    /// Ticks needed to drive a fresh start to completion; one tick per second.
    pub fn total_ticks(&self) -> u32 {
        self.total_seconds()
    }

    /// Validates every set and rejects duplicate set ids.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (index, set) in self.sets.iter().enumerate() {
            set.validate()?;
            if self.sets[..index].iter().any(|earlier| earlier.id == set.id) {
                return Err(DefinitionError::DuplicateSetId(set.id));
            }
        }
        Ok(())
    }
}

impl Default for WorkoutDefinition<'_> {
    fn default() -> Self {
        WorkoutDefinition::EMPTY
    }
}

/// Reasons a definition cannot be played.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DefinitionError {
    ZeroRepeatCount(SetId),
    ZeroActiveDuration(SetId),
    NoMovements(SetId),
    UnnamedMovement { set: SetId, movement: MovementId },
    DuplicateSetId(SetId),
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::ZeroRepeatCount(set) => {
                write!(f, "set {set} must repeat at least once")
            }
            DefinitionError::ZeroActiveDuration(set) => {
                write!(f, "set {set} needs an active duration of at least 1s")
            }
            DefinitionError::NoMovements(set) => write!(f, "set {set} has no movements"),
            DefinitionError::UnnamedMovement { set, movement } => {
                write!(f, "movement {} in set {set} has no name", movement.0)
            }
            DefinitionError::DuplicateSetId(set) => write!(f, "set id {set} is used twice"),
        }
    }
}

/// Day of the week a plan is scheduled for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Lowercase name used by the REPL and CLI.
    pub const fn name(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }

    /// Parses a full or three-letter day name, ignoring case.
    pub fn from_name(name: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|day| {
            let full = day.name();
            name.eq_ignore_ascii_case(full) || name.eq_ignore_ascii_case(&full[..3])
        })
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the plan configured for `day`, or an empty definition.
pub const fn lookup(day: Day) -> WorkoutDefinition<'static> {
    match day {
        Day::Monday => MONDAY_WORKOUT,
        _ => WorkoutDefinition::EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUAT: Movement<'static> = Movement::new(MovementId(1), "Squat");
    const LUNGE: Movement<'static> = Movement::new(MovementId(2), "Lunge");
    const PAIR: [Movement<'static>; 2] = [SQUAT, LUNGE];

    #[test]
    fn cycle_seconds_counts_every_repeat() {
        let set = MovementSet::new(SetId(7), "Legs", 3, 10, 5, &PAIR);
        assert_eq!(set.slot_secs(), 15);
        assert_eq!(set.cycle_seconds(), 90);
    }

    #[test]
    fn validate_rejects_broken_sets() {
        let zero_repeat = [MovementSet::new(SetId(1), "A", 0, 10, 5, &PAIR)];
        assert_eq!(
            WorkoutDefinition::new(&zero_repeat).validate(),
            Err(DefinitionError::ZeroRepeatCount(SetId(1)))
        );

        let zero_active = [MovementSet::new(SetId(2), "B", 1, 0, 5, &PAIR)];
        assert_eq!(
            WorkoutDefinition::new(&zero_active).validate(),
            Err(DefinitionError::ZeroActiveDuration(SetId(2)))
        );

        let no_movements = [MovementSet::new(SetId(3), "C", 1, 10, 5, &[])];
        assert_eq!(
            WorkoutDefinition::new(&no_movements).validate(),
            Err(DefinitionError::NoMovements(SetId(3)))
        );

        let blank = [Movement::new(MovementId(9), "  ")];
        let unnamed = [MovementSet::new(SetId(4), "D", 1, 10, 5, &blank)];
        assert_eq!(
            WorkoutDefinition::new(&unnamed).validate(),
            Err(DefinitionError::UnnamedMovement {
                set: SetId(4),
                movement: MovementId(9),
            })
        );
    }

    #[test]
    fn validate_rejects_duplicate_set_ids() {
        let sets = [
            MovementSet::new(SetId(1), "A", 1, 10, 0, &PAIR),
            MovementSet::new(SetId(1), "B", 1, 10, 0, &PAIR),
        ];
        assert_eq!(
            WorkoutDefinition::new(&sets).validate(),
            Err(DefinitionError::DuplicateSetId(SetId(1)))
        );
    }

    #[test]
    fn empty_definition_is_valid() {
        assert!(WorkoutDefinition::EMPTY.validate().is_ok());
        assert_eq!(WorkoutDefinition::EMPTY.total_seconds(), 0);
    }

    #[test]
    fn find_set_reports_index() {
        let sets = [
            MovementSet::new(SetId(10), "A", 1, 10, 0, &PAIR),
            MovementSet::new(SetId(20), "B", 1, 10, 0, &PAIR),
        ];
        let definition = WorkoutDefinition::new(&sets);
        let (index, set) = definition.find_set(SetId(20)).expect("set 20 present");
        assert_eq!(index, 1);
        assert_eq!(set.name, "B");
        assert!(definition.find_set(SetId(30)).is_none());
    }

    #[test]
    fn day_names_parse_in_any_case() {
        assert_eq!(Day::from_name("Monday"), Some(Day::Monday));
        assert_eq!(Day::from_name("THU"), Some(Day::Thursday));
        assert_eq!(Day::from_name("sun"), Some(Day::Sunday));
        assert_eq!(Day::from_name("mo"), None);
        assert_eq!(Day::from_name("funday"), None);
    }

    #[test]
    fn only_monday_has_a_plan() {
        assert_eq!(lookup(Day::Monday), MONDAY_WORKOUT);
        for day in Day::ALL.into_iter().skip(1) {
            assert!(lookup(day).is_empty(), "{day} should be empty");
        }
    }
}
