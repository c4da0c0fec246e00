//! Telemetry event catalog and ring-buffer recorder for workout sessions.
//!
//! The core crate has no logger of its own. Every observable change in a
//! session (lifecycle commands, phase boundaries, cues) is written into a
//! bounded [`TelemetryRing`]. Front-ends read it past the last seen
//! [`EventId`] and forward each record to their logs and transcripts. Event
//! kinds encode to compact `u16` codes for those outputs.

use core::{fmt, time::Duration};

use heapless::{HistoryBuf, OldestOrdered};

use crate::engine::{Boundary, Cue, EngineState, Phase};
use crate::workouts::SetId;

/// Identifier assigned to each recorded event.
pub type EventId = u32;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 128;

/// Discriminated telemetry events emitted by a session.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryEventKind {
    SessionStarted,
    /// `start` was issued for a definition with nothing to play.
    SessionEmpty,
    Paused,
    Resumed,
    Jumped,
    RestStarted,
    MovementStarted,
    RepeatStarted,
    SetStarted,
    WorkoutComplete,
    WarningCue,
    TransitionCue,
    Custom(u16),
}

impl fmt::Display for TelemetryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEventKind::SessionStarted => f.write_str("session-started"),
            TelemetryEventKind::SessionEmpty => f.write_str("session-empty"),
            TelemetryEventKind::Paused => f.write_str("paused"),
            TelemetryEventKind::Resumed => f.write_str("resumed"),
            TelemetryEventKind::Jumped => f.write_str("jumped"),
            TelemetryEventKind::RestStarted => f.write_str("rest-started"),
            TelemetryEventKind::MovementStarted => f.write_str("movement-started"),
            TelemetryEventKind::RepeatStarted => f.write_str("repeat-started"),
            TelemetryEventKind::SetStarted => f.write_str("set-started"),
            TelemetryEventKind::WorkoutComplete => f.write_str("workout-complete"),
            TelemetryEventKind::WarningCue => f.write_str("warning-cue"),
            TelemetryEventKind::TransitionCue => f.write_str("transition-cue"),
            TelemetryEventKind::Custom(code) => write!(f, "custom({code})"),
        }
    }
}

impl TelemetryEventKind {
    const SESSION_STARTED_CODE: u16 = 0x0001;
    const SESSION_EMPTY_CODE: u16 = 0x0002;
    const PAUSED_CODE: u16 = 0x0003;
    const RESUMED_CODE: u16 = 0x0004;
    const JUMPED_CODE: u16 = 0x0005;
    const REST_STARTED_CODE: u16 = 0x0010;
    const MOVEMENT_STARTED_CODE: u16 = 0x0011;
    const REPEAT_STARTED_CODE: u16 = 0x0012;
    const SET_STARTED_CODE: u16 = 0x0013;
    const WORKOUT_COMPLETE_CODE: u16 = 0x0014;
    const WARNING_CUE_CODE: u16 = 0x0020;
    const TRANSITION_CUE_CODE: u16 = 0x0021;

    /// Encodes the event into a compact transport-friendly discriminant.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            TelemetryEventKind::SessionStarted => Self::SESSION_STARTED_CODE,
            TelemetryEventKind::SessionEmpty => Self::SESSION_EMPTY_CODE,
            TelemetryEventKind::Paused => Self::PAUSED_CODE,
            TelemetryEventKind::Resumed => Self::RESUMED_CODE,
            TelemetryEventKind::Jumped => Self::JUMPED_CODE,
            TelemetryEventKind::RestStarted => Self::REST_STARTED_CODE,
            TelemetryEventKind::MovementStarted => Self::MOVEMENT_STARTED_CODE,
            TelemetryEventKind::RepeatStarted => Self::REPEAT_STARTED_CODE,
            TelemetryEventKind::SetStarted => Self::SET_STARTED_CODE,
            TelemetryEventKind::WorkoutComplete => Self::WORKOUT_COMPLETE_CODE,
            TelemetryEventKind::WarningCue => Self::WARNING_CUE_CODE,
            TelemetryEventKind::TransitionCue => Self::TRANSITION_CUE_CODE,
            TelemetryEventKind::Custom(code) => code,
        }
    }

    /// Decodes a raw discriminant, falling back to [`TelemetryEventKind::Custom`].
    #[must_use]
    pub const fn from_raw(code: u16) -> Self {
        match code {
            Self::SESSION_STARTED_CODE => TelemetryEventKind::SessionStarted,
            Self::SESSION_EMPTY_CODE => TelemetryEventKind::SessionEmpty,
            Self::PAUSED_CODE => TelemetryEventKind::Paused,
            Self::RESUMED_CODE => TelemetryEventKind::Resumed,
            Self::JUMPED_CODE => TelemetryEventKind::Jumped,
            Self::REST_STARTED_CODE => TelemetryEventKind::RestStarted,
            Self::MOVEMENT_STARTED_CODE => TelemetryEventKind::MovementStarted,
            Self::REPEAT_STARTED_CODE => TelemetryEventKind::RepeatStarted,
            Self::SET_STARTED_CODE => TelemetryEventKind::SetStarted,
            Self::WORKOUT_COMPLETE_CODE => TelemetryEventKind::WorkoutComplete,
            Self::WARNING_CUE_CODE => TelemetryEventKind::WarningCue,
            Self::TRANSITION_CUE_CODE => TelemetryEventKind::TransitionCue,
            other => TelemetryEventKind::Custom(other),
        }
    }

    /// Event recorded when the engine crosses `boundary`.
    #[must_use]
    pub const fn for_boundary(boundary: Boundary) -> Self {
        match boundary {
            Boundary::Rest => TelemetryEventKind::RestStarted,
            Boundary::Movement => TelemetryEventKind::MovementStarted,
            Boundary::Repeat => TelemetryEventKind::RepeatStarted,
            Boundary::Set => TelemetryEventKind::SetStarted,
            Boundary::Complete => TelemetryEventKind::WorkoutComplete,
        }
    }

    #[must_use]
    pub const fn for_cue(cue: Cue) -> Self {
        match cue {
            Cue::Warning => TelemetryEventKind::WarningCue,
            Cue::Transition => TelemetryEventKind::TransitionCue,
        }
    }
}

/// Payloads carried alongside telemetry events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TelemetryPayload {
    None,
    /// Where the session stood after the event.
    Position(PositionTelemetry),
    /// Countdown value that triggered a cue.
    Cue(CueTelemetry),
    /// Session-wide totals.
    Session(SessionTelemetry),
}

impl TelemetryPayload {
    #[must_use]
    pub const fn none() -> Self {
        TelemetryPayload::None
    }
}

/// Position snapshot payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PositionTelemetry {
    pub set: SetId,
    pub repeat: u8,
    pub movement_index: usize,
    pub phase: Phase,
    pub seconds_remaining: u16,
    /// Time spent in the previous phase, if one was recorded.
    pub since_previous: Option<Duration>,
}

impl PositionTelemetry {
    #[must_use]
    pub const fn new(set: SetId, state: &EngineState, since_previous: Option<Duration>) -> Self {
        Self {
            set,
            repeat: state.repeat_counter,
            movement_index: state.movement_index,
            phase: state.phase,
            seconds_remaining: state.seconds_remaining,
            since_previous,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CueTelemetry {
    pub cue: Cue,
    pub seconds_remaining: u16,
}

/// Totals captured at session start and completion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SessionTelemetry {
    pub planned_secs: u32,
    pub elapsed_ticks: u32,
}

impl SessionTelemetry {
    #[must_use]
    pub const fn new(planned_secs: u32, elapsed_ticks: u32) -> Self {
        Self {
            planned_secs,
            elapsed_ticks,
        }
    }
}

/// Trait implemented by monotonic instant wrappers used for telemetry tracking.
pub trait TelemetryInstant: Copy {
    /// Returns the saturating duration from `earlier` to `self`.
    fn saturating_duration_since(&self, earlier: Self) -> Duration;
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TelemetryRecord<TInstant>
where
    TInstant: Copy,
{
    pub id: EventId,
    pub timestamp: TInstant,
    pub event: TelemetryEventKind,
    pub details: TelemetryPayload,
}

/// Telemetry ring buffer type alias.
pub type TelemetryRing<TInstant, const CAPACITY: usize = TELEMETRY_RING_CAPACITY> =
    HistoryBuf<TelemetryRecord<TInstant>, CAPACITY>;

/// Records telemetry events into a fixed-size ring buffer.
pub struct TelemetryRecorder<TInstant, const CAPACITY: usize = TELEMETRY_RING_CAPACITY>
where
    TInstant: Copy,
{
    ring: TelemetryRing<TInstant, CAPACITY>,
    last_boundary_at: Option<TInstant>,
    next_event_id: EventId,
}

impl<TInstant, const CAPACITY: usize> TelemetryRecorder<TInstant, CAPACITY>
where
    TInstant: TelemetryInstant,
{
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            last_boundary_at: None,
            next_event_id: 0,
        }
    }

    /// Returns an iterator over the recorded telemetry in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, TelemetryRecord<TInstant>> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent telemetry record, if available.
    pub fn latest(&self) -> Option<&TelemetryRecord<TInstant>> {
        self.ring.recent()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Id the next recorded event will receive.
    pub const fn next_event_id(&self) -> EventId {
        self.next_event_id
    }

    /// Records a lifecycle event and restarts boundary timing.
    pub fn record_session(
        &mut self,
        event: TelemetryEventKind,
        summary: SessionTelemetry,
        timestamp: TInstant,
    ) -> EventId {
        self.last_boundary_at = Some(timestamp);
        self.record(event, TelemetryPayload::Session(summary), timestamp)
    }

    /// Records a phase boundary along with time spent since the previous one.
    pub fn record_boundary(
        &mut self,
        event: TelemetryEventKind,
        set: SetId,
        state: &EngineState,
        timestamp: TInstant,
    ) -> EventId {
        let since_previous = self
            .last_boundary_at
            .map(|previous| timestamp.saturating_duration_since(previous));
        self.last_boundary_at = Some(timestamp);

        let payload = TelemetryPayload::Position(PositionTelemetry::new(set, state, since_previous));
        self.record(event, payload, timestamp)
    }

    pub fn record_cue(&mut self, cue: Cue, seconds_remaining: u16, timestamp: TInstant) -> EventId {
        self.record(
            TelemetryEventKind::for_cue(cue),
            TelemetryPayload::Cue(CueTelemetry {
                cue,
                seconds_remaining,
            }),
            timestamp,
        )
    }

    /// Records an arbitrary telemetry event with the supplied payload.
    pub fn record(
        &mut self,
        event: TelemetryEventKind,
        payload: TelemetryPayload,
        timestamp: TInstant,
    ) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(TelemetryRecord {
            id,
            timestamp,
            event,
            details: payload,
        });

        id
    }
}

impl<TInstant, const CAPACITY: usize> Default for TelemetryRecorder<TInstant, CAPACITY>
where
    TInstant: TelemetryInstant,
{
    fn default() -> Self {
        Self::new()
    }
}
