//! Time-of-day alarms checked against the wall clock once per second.

use crate::clock::{ClockError, WallTime};
use crate::scheduler::TickListener;
use crate::types::AlarmAction;

/// Settings of one time-of-day alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DailyAlarm {
    hour: u8,
    minute: u8,
    enabled: bool,
}

impl DailyAlarm {
    /// Creates an alarm at `hour:minute`.
    ///
    /// # Errors
    /// Returns `OutOfRange` unless `hour < 24` and `minute < 60`.
    pub const fn new(hour: u8, minute: u8, enabled: bool) -> Result<Self, ClockError> {
        if hour >= 24 || minute >= 60 {
            return Err(ClockError::OutOfRange);
        }
        Ok(Self {
            hour,
            minute,
            enabled,
        })
    }

    /// Hour the alarm goes off.
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute the alarm goes off.
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Returns true if the alarm is armed.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Moves the alarm one hour forward, wrapping at 24.
    pub fn increment_hour(&mut self) {
        self.hour = (self.hour + 1) % 24;
    }

    /// Moves the alarm one hour back, wrapping at 0.
    pub fn decrement_hour(&mut self) {
        self.hour = (self.hour + 23) % 24;
    }

    /// Moves the alarm one minute forward within the hour, wrapping at 60.
    pub fn increment_minute(&mut self) {
        self.minute = (self.minute + 1) % 60;
    }

    /// Moves the alarm one minute back within the hour, wrapping at 0.
    pub fn decrement_minute(&mut self) {
        self.minute = (self.minute + 59) % 60;
    }

    /// Returns true if this alarm is enabled and `now` is the first second of its minute.
    pub fn matches(&self, now: WallTime) -> bool {
        self.enabled && now.second() == 0 && now.hour() == self.hour && now.minute() == self.minute
    }
}

/// Fixed table of time-of-day alarms with their actions.
///
/// Matching alarms fire when the clock passes second zero of their minute.
/// A second is only evaluated once, so calling [`check`](Self::check) several
/// times within the same second never fires an alarm twice.
///
/// # Type Parameters
/// * `A` - Action fired by a matching alarm
/// * `N` - Number of slots
pub struct DailyAlarms<A: AlarmAction, const N: usize> {
    slots: [Option<(DailyAlarm, A)>; N],
    last_checked: Option<WallTime>,
}

impl<A: AlarmAction, const N: usize> DailyAlarms<A, N> {
    /// Creates a table with every slot empty.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            last_checked: None,
        }
    }

    /// Stores an alarm and its action in `slot`, replacing any previous entry.
    ///
    /// Returns false if `slot` is out of range.
    pub fn set(&mut self, slot: usize, alarm: DailyAlarm, action: A) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = Some((alarm, action));
                true
            }
            None => false,
        }
    }

    /// Replaces the settings of an occupied slot, keeping its action.
    ///
    /// Returns false if the slot is empty or out of range.
    pub fn update(&mut self, slot: usize, alarm: DailyAlarm) -> bool {
        match self.slots.get_mut(slot) {
            Some(Some((settings, _))) => {
                *settings = alarm;
                true
            }
            _ => false,
        }
    }

    /// Empties `slot`, returning its action.
    pub fn remove(&mut self, slot: usize) -> Option<A> {
        self.slots.get_mut(slot)?.take().map(|(_, action)| action)
    }

    /// Returns the settings stored in `slot`.
    pub fn get(&self, slot: usize) -> Option<DailyAlarm> {
        self.slots.get(slot)?.as_ref().map(|(alarm, _)| *alarm)
    }

    /// Enables or disables an occupied slot. Returns false if there is none.
    pub fn set_enabled(&mut self, slot: usize, enabled: bool) -> bool {
        match self.slots.get_mut(slot) {
            Some(Some((alarm, _))) => {
                alarm.enabled = enabled;
                true
            }
            _ => false,
        }
    }

    /// Flips the enabled state of an occupied slot and returns the new state.
    pub fn toggle(&mut self, slot: usize) -> Option<bool> {
        match self.slots.get_mut(slot) {
            Some(Some((alarm, _))) => {
                alarm.enabled = !alarm.enabled;
                Some(alarm.enabled)
            }
            _ => None,
        }
    }

    /// Fires every enabled alarm due at `now`.
    ///
    /// Returns the number of actions invoked.
    pub fn check(&mut self, now: WallTime) -> usize {
        if self.last_checked == Some(now) {
            return 0;
        }
        self.last_checked = Some(now);

        if now.second() != 0 {
            return 0;
        }

        let mut fired = 0;
        for (alarm, action) in self.slots.iter_mut().flatten() {
            if alarm.matches(now) {
                action.fire();
                fired += 1;
            }
        }

        #[cfg(feature = "defmt")]
        if fired > 0 {
            defmt::info!("{=usize} daily alarm(s) fired at {}", fired, now);
        }

        fired
    }

    /// Iterates over occupied slots as `(slot, settings)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, DailyAlarm)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|(alarm, _)| (slot, *alarm)))
    }

    /// Returns the number of slots, `N`.
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<A: AlarmAction, const N: usize> Default for DailyAlarms<A, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AlarmAction, const N: usize> TickListener for DailyAlarms<A, N> {
    fn on_second(&mut self, now: WallTime) {
        self.check(now);
    }
}
