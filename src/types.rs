//! Core types for alarm registration.

/// Whether an alarm fires once or keeps firing every period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmMode {
    /// Fire once, then the record is released.
    OneShot,

    /// Fire every `period` ticks until cancelled.
    Repeating,
}

/// Identifier of a live alarm.
///
/// Ids are small positive integers in `1..=N`, where `N` is the queue capacity.
/// `AlarmId(0)` is reserved and never handed out, so it is always rejected by
/// [`AlarmQueue::cancel`](crate::AlarmQueue::cancel). Ids of released alarms
/// are reused, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmId(pub u8);

impl AlarmId {
    /// Returns true for any id other than the reserved `0`.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl From<u8> for AlarmId {
    fn from(id: u8) -> Self {
        AlarmId(id)
    }
}

impl From<AlarmId> for u8 {
    fn from(id: AlarmId) -> Self {
        id.0
    }
}

/// Work performed when an alarm fires.
///
/// Implemented for every `FnMut()` closure and plain `fn()` item. Implement it
/// on your own type (for example an enum dispatched with `match`) when actions
/// need to be `Copy` or named in a `static`.
pub trait AlarmAction {
    /// Runs the action. Called synchronously from the main loop.
    fn fire(&mut self);
}

impl<F: FnMut()> AlarmAction for F {
    #[inline]
    fn fire(&mut self) {
        self()
    }
}

/// Alarm registration and cancellation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// Every slot of the queue is taken.
    CapacityExceeded,

    /// Duration below one tick.
    ZeroDuration,

    /// No action supplied.
    MissingAction,

    /// The reserved id `0` was passed.
    InvalidId,

    /// No live alarm carries this id.
    NotFound(AlarmId),
}

impl core::fmt::Display for AlarmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AlarmError::CapacityExceeded => {
                write!(f, "alarm queue is full")
            }
            AlarmError::ZeroDuration => {
                write!(f, "alarm duration must be at least one tick")
            }
            AlarmError::MissingAction => {
                write!(f, "alarm has no action to fire")
            }
            AlarmError::InvalidId => {
                write!(f, "alarm id 0 is reserved")
            }
            AlarmError::NotFound(id) => {
                write!(f, "no alarm with id {}", id.0)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AlarmError {}
