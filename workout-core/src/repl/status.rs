//! Shared text rendering for the `status` and `plan` REPL commands.
//!
//! [`StatusFormatter`] renders an [`EngineSnapshot`] and [`PlanFormatter`]
//! renders a [`WorkoutDefinition`]. Both write single lines through
//! [`fmt::Write`] so front-ends decide on line endings and buffering.

use core::fmt;

use crate::engine::EngineSnapshot;
use crate::workouts::{Movement, MovementSet, WorkoutDefinition};

/// Renders an [`EngineSnapshot`] into human-readable lines.
#[derive(Clone, Copy, Debug)]
pub struct StatusFormatter<'s, 'a> {
    snapshot: &'s EngineSnapshot<'a>,
}

impl<'s, 'a> StatusFormatter<'s, 'a> {
    #[must_use]
    pub const fn new(snapshot: &'s EngineSnapshot<'a>) -> Self {
        Self { snapshot }
    }

    /// Writes the countdown line, e.g.
    /// `phase=active remaining=7s set=2/2 repeat=1/3 movement=3/11 running=true`.
    ///
    /// Before the first `start` the line reads `idle`, and once the workout
    /// is finished it reads `complete elapsed=720s`.
    pub fn write_position_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        let snapshot = self.snapshot;
        let state = &snapshot.state;

        if !state.started {
            return writer.write_str("idle");
        }
        if snapshot.terminal {
            return write!(writer, "complete elapsed={}s", snapshot.elapsed_ticks);
        }

        write!(
            writer,
            "phase={} remaining={}s set={}/{}",
            state.phase,
            state.seconds_remaining,
            state.set_index + 1,
            snapshot.set_count,
        )?;
        if let Some(set) = snapshot.set {
            write!(
                writer,
                " repeat={}/{} movement={}/{}",
                state.repeat_counter,
                set.repeat_count,
                state.movement_index + 1,
                set.movement_count(),
            )?;
        }
        write!(writer, " running={}", state.running)
    }

    /// Writes the movement line, e.g. `set="Workout" now=Plank next=Squats`.
    ///
    /// Nothing is written while idle or complete.
    pub fn write_movement_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        let snapshot = self.snapshot;
        if !snapshot.state.started || snapshot.terminal {
            return Ok(());
        }

        if let Some(set) = snapshot.set {
            write!(writer, "set=\"{}\" ", set.name)?;
        }
        writer.write_str("now=")?;
        write_movement_name(writer, snapshot.current)?;
        writer.write_str(" next=")?;
        write_movement_name(writer, snapshot.next)
    }

    /// Writes the overall progress line, e.g. `left=500s elapsed=220s`.
    pub fn write_progress_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        write!(
            writer,
            "left={}s elapsed={}s",
            self.snapshot.remaining_workout_secs, self.snapshot.elapsed_ticks
        )
    }
}

fn write_movement_name<W: fmt::Write>(writer: &mut W, movement: Option<&Movement<'_>>) -> fmt::Result {
    match movement {
        Some(movement) => writer.write_str(movement.name),
        None => writer.write_str("none"),
    }
}

/// Renders a [`WorkoutDefinition`] as a set/movement listing.
#[derive(Clone, Copy, Debug)]
pub struct PlanFormatter<'s, 'a> {
    definition: &'s WorkoutDefinition<'a>,
}

impl<'s, 'a> PlanFormatter<'s, 'a> {
    #[must_use]
    pub const fn new(definition: &'s WorkoutDefinition<'a>) -> Self {
        Self { definition }
    }

    /// Writes `plan sets=2 total=720s`, or `plan empty`.
    pub fn write_summary_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        if self.definition.is_empty() {
            return writer.write_str("plan empty");
        }
        write!(
            writer,
            "plan sets={} total={}s",
            self.definition.len(),
            self.definition.total_seconds()
        )
    }

    /// Writes one set header, e.g.
    /// `set 2 "Workout" repeats=3 active=10s rest=5s movements=11`.
    pub fn write_set_line<W: fmt::Write>(set: &MovementSet<'_>, writer: &mut W) -> fmt::Result {
        write!(
            writer,
            "set {} \"{}\" repeats={} active={}s rest={}s movements={}",
            set.id,
            set.name,
            set.repeat_count,
            set.active_secs,
            set.rest_secs,
            set.movement_count()
        )
    }

    /// Writes one movement entry numbered from 1, e.g. `  3. Plank`.
    pub fn write_movement_line<W: fmt::Write>(
        number: usize,
        movement: &Movement<'_>,
        writer: &mut W,
    ) -> fmt::Result {
        write!(writer, "  {number}. {}", movement.name)?;
        if let Some(image) = movement.image {
            write!(writer, " [{image}]")?;
        }
        Ok(())
    }

    /// Visits every line of the listing in order.
    pub fn for_each_line<W, F>(&self, writer: &mut W, mut emit: F) -> fmt::Result
    where
        W: fmt::Write,
        F: FnMut(&mut W) -> fmt::Result,
    {
        self.write_summary_line(writer)?;
        emit(writer)?;
        for set in self.definition.sets {
            Self::write_set_line(set, writer)?;
            emit(writer)?;
            for (index, movement) in set.movements.iter().enumerate() {
                Self::write_movement_line(index + 1, movement, writer)?;
                emit(writer)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{NoopCuePlayer, SequencingEngine};
    use crate::workouts::{MONDAY_WORKOUT, MovementId, SetId};
    use heapless::String;

    const MOVES: [Movement<'static>; 2] = [
        Movement::new(MovementId(1), "Plank"),
        Movement::with_image(MovementId(2), "Squats", "squats"),
    ];
    const SETS: [MovementSet<'static>; 1] =
        [MovementSet::new(SetId(7), "Core", 2, 3, 2, &MOVES)];
    const PLAN: WorkoutDefinition<'static> = WorkoutDefinition::new(&SETS);

    fn render<F>(write: F) -> String<128>
    where
        F: FnOnce(&mut String<128>) -> fmt::Result,
    {
        let mut out = String::new();
        write(&mut out).expect("line fits");
        out
    }

    #[test]
    fn idle_engine_reports_idle() {
        let engine = SequencingEngine::new();
        let snapshot = engine.snapshot();
        let formatter = StatusFormatter::new(&snapshot);
        assert_eq!(render(|w| formatter.write_position_line(w)), "idle");
        assert_eq!(render(|w| formatter.write_movement_line(w)), "");
    }

    #[test]
    fn running_engine_reports_position() {
        let mut engine = SequencingEngine::new();
        engine.start(PLAN).expect("valid plan");
        let mut cues = NoopCuePlayer::new();
        engine.tick(&mut cues);

        let snapshot = engine.snapshot();
        let formatter = StatusFormatter::new(&snapshot);
        assert_eq!(
            render(|w| formatter.write_position_line(w)),
            "phase=active remaining=2s set=1/1 repeat=1/2 movement=1/2 running=true"
        );
        assert_eq!(
            render(|w| formatter.write_movement_line(w)),
            "set=\"Core\" now=Plank next=Squats"
        );
        assert_eq!(
            render(|w| formatter.write_progress_line(w)),
            "left=19s elapsed=1s"
        );
    }

    #[test]
    fn finished_engine_reports_completion() {
        let mut engine = SequencingEngine::new();
        engine.start(PLAN).expect("valid plan");
        let mut cues = NoopCuePlayer::new();
        for _ in 0..PLAN.total_ticks() {
            engine.tick(&mut cues);
        }

        let snapshot = engine.snapshot();
        let formatter = StatusFormatter::new(&snapshot);
        assert_eq!(
            render(|w| formatter.write_position_line(w)),
            "complete elapsed=20s"
        );
    }

    #[test]
    fn plan_listing_numbers_movements_from_one() {
        let mut lines: heapless::Vec<String<128>, 8> = heapless::Vec::new();
        let mut line = String::<128>::new();
        PlanFormatter::new(&PLAN)
            .for_each_line(&mut line, |w| {
                lines.push(w.clone()).map_err(|_| fmt::Error)?;
                w.clear();
                Ok(())
            })
            .expect("listing fits");

        assert_eq!(lines[0], "plan sets=1 total=20s");
        assert_eq!(lines[1], "set 7 \"Core\" repeats=2 active=3s rest=2s movements=2");
        assert_eq!(lines[2], "  1. Plank");
        assert_eq!(lines[3], "  2. Squats [squats]");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn monday_summary_matches_total() {
        let line = render(|w| PlanFormatter::new(&MONDAY_WORKOUT).write_summary_line(w));
        assert_eq!(line, "plan sets=2 total=720s");
        let empty = WorkoutDefinition::EMPTY;
        let line = render(|w| PlanFormatter::new(&empty).write_summary_line(w));
        assert_eq!(line, "plan empty");
    }
}
