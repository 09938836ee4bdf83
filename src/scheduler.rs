//! Main-loop side of the tick handoff.
//!
//! Provides [`Scheduler`], which turns the interrupt's pending flag into exactly
//! one alarm queue advance per tick, accumulates ticks into wall-clock seconds,
//! and forwards both to [`TickListener`] collaborators.

use crate::clock::WallTime;
use crate::queue::{AlarmInfo, AlarmQueue, DispatchOutcome};
use crate::signal::PendingFlag;
use crate::tick::TICKS_PER_SECOND;
use crate::types::{AlarmAction, AlarmError, AlarmId, AlarmMode};

/// Collaborator driven by the scheduler's tick.
///
/// Both hooks default to doing nothing. Implemented for `()`, for `&mut T`,
/// and for pairs, so several listeners can be passed at once:
/// `scheduler.process_tick(&mut (&mut receiver, &mut daily_alarms))`.
pub trait TickListener {
    /// Called once per processed tick, after the alarm queue has advanced.
    fn on_tick(&mut self) {}

    /// Called once per elapsed second with the updated wall-clock time.
    fn on_second(&mut self, _now: WallTime) {}
}

impl TickListener for () {}

impl<T: TickListener + ?Sized> TickListener for &mut T {
    fn on_tick(&mut self) {
        (**self).on_tick();
    }

    fn on_second(&mut self, now: WallTime) {
        (**self).on_second(now);
    }
}

impl<A: TickListener, B: TickListener> TickListener for (A, B) {
    fn on_tick(&mut self) {
        self.0.on_tick();
        self.1.on_tick();
    }

    fn on_second(&mut self, now: WallTime) {
        self.0.on_second(now);
        self.1.on_second(now);
    }
}

/// What happened during one processed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Result of advancing the alarm queue.
    pub dispatch: DispatchOutcome,

    /// Set when this tick completed a wall-clock second.
    pub second: Option<WallTime>,
}

impl TickReport {
    /// Returns true if this tick completed a wall-clock second.
    pub fn second_elapsed(&self) -> bool {
        self.second.is_some()
    }
}

/// Cooperative alarm scheduler polled from the main loop.
///
/// Owns the alarm queue, the sub-second tick accumulator and the wall clock.
/// The tick interrupt only raises the shared [`PendingFlag`]; everything here
/// runs in main-loop context, so none of it needs locking.
///
/// # Type Parameters
/// * `'s` - Lifetime of the tick flag reference (usually `'static`)
/// * `A` - Alarm action type
/// * `N` - Alarm queue capacity
pub struct Scheduler<'s, A: AlarmAction, const N: usize> {
    tick: &'s PendingFlag,
    alarms: AlarmQueue<A, N>,
    ticks_per_second: u32,
    subsecond_ticks: u32,
    clock: WallTime,
    uptime_ticks: u64,
}

impl<'s, A: AlarmAction, const N: usize> Scheduler<'s, A, N> {
    /// Creates a scheduler at midnight with an empty alarm queue.
    pub const fn new(tick: &'s PendingFlag) -> Self {
        Self::with_ticks_per_second(tick, TICKS_PER_SECOND)
    }

    /// Creates a scheduler whose second is `ticks_per_second` ticks long.
    ///
    /// A value of zero is treated as one.
    pub const fn with_ticks_per_second(tick: &'s PendingFlag, ticks_per_second: u32) -> Self {
        Self {
            tick,
            alarms: AlarmQueue::new(),
            ticks_per_second: if ticks_per_second == 0 { 1 } else { ticks_per_second },
            subsecond_ticks: 0,
            clock: WallTime::MIDNIGHT,
            uptime_ticks: 0,
        }
    }

    /// Services a pending tick. Call once per main-loop iteration.
    ///
    /// Returns `None` without doing anything if no tick is pending. Otherwise
    /// clears the flag, advances the alarm queue exactly once, runs
    /// `listener.on_tick()`, and when a full second has accumulated advances
    /// the wall clock and runs `listener.on_second()`.
    ///
    /// Ticks raised while the main loop was busy elsewhere are coalesced into
    /// one; poll at least once per tick period to keep alarms on time.
    pub fn process_tick<L: TickListener + ?Sized>(&mut self, listener: &mut L) -> Option<TickReport> {
        if !self.tick.take() {
            return None;
        }

        self.uptime_ticks = self.uptime_ticks.wrapping_add(1);
        let dispatch = self.alarms.advance_and_dispatch();
        listener.on_tick();

        self.subsecond_ticks += 1;
        let second = if self.subsecond_ticks >= self.ticks_per_second {
            self.subsecond_ticks = 0;
            self.clock.advance_second();
            listener.on_second(self.clock);
            Some(self.clock)
        } else {
            None
        };

        Some(TickReport { dispatch, second })
    }

    /// Registers an alarm. See [`AlarmQueue::register`].
    pub fn register(
        &mut self,
        duration_ticks: u32,
        mode: AlarmMode,
        action: Option<A>,
    ) -> Result<AlarmId, AlarmError> {
        self.alarms.register(duration_ticks, mode, action)
    }

    /// Registers an alarm with a present action. See [`AlarmQueue::schedule`].
    pub fn schedule(
        &mut self,
        duration_ticks: u32,
        mode: AlarmMode,
        action: A,
    ) -> Result<AlarmId, AlarmError> {
        self.alarms.schedule(duration_ticks, mode, action)
    }

    /// Cancels an alarm. See [`AlarmQueue::cancel`].
    pub fn cancel(&mut self, id: AlarmId) -> Result<(), AlarmError> {
        self.alarms.cancel(id)
    }

    /// Returns the ticks until the given alarm fires.
    pub fn remaining(&self, id: AlarmId) -> Option<u32> {
        self.alarms.remaining(id)
    }

    /// Returns the alarm that fires next.
    pub fn next_alarm(&self) -> Option<AlarmInfo> {
        self.alarms.peek()
    }

    /// Returns the alarm queue.
    pub fn alarms(&self) -> &AlarmQueue<A, N> {
        &self.alarms
    }

    /// Returns the current wall-clock time.
    pub fn clock(&self) -> WallTime {
        self.clock
    }

    /// Sets the wall clock and restarts the current second.
    pub fn set_clock(&mut self, time: WallTime) {
        self.clock = time;
        self.subsecond_ticks = 0;

        #[cfg(feature = "defmt")]
        defmt::info!("clock set to {}", time);
    }

    /// Returns the number of ticks processed since creation.
    pub fn uptime_ticks(&self) -> u64 {
        self.uptime_ticks
    }

    /// Returns the number of ticks that make up one wall-clock second.
    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        ticks: u32,
        seconds: u32,
    }

    impl TickListener for Counter {
        fn on_tick(&mut self) {
            self.ticks += 1;
        }

        fn on_second(&mut self, _now: WallTime) {
            self.seconds += 1;
        }
    }

    #[test]
    fn no_pending_tick_is_a_no_op() {
        let flag = PendingFlag::new();
        let mut scheduler = Scheduler::<fn(), 4>::new(&flag);
        assert_eq!(scheduler.process_tick(&mut ()), None);
        assert_eq!(scheduler.uptime_ticks(), 0);
    }

    #[test]
    fn pair_listeners_both_run() {
        let flag = PendingFlag::new();
        let mut scheduler = Scheduler::<fn(), 4>::with_ticks_per_second(&flag, 2);
        let mut a = Counter { ticks: 0, seconds: 0 };
        let mut b = Counter { ticks: 0, seconds: 0 };

        for _ in 0..4 {
            flag.raise();
            scheduler.process_tick(&mut (&mut a, &mut b));
        }

        assert_eq!((a.ticks, a.seconds), (4, 2));
        assert_eq!((b.ticks, b.seconds), (4, 2));
    }

    #[test]
    fn set_clock_restarts_second() {
        let flag = PendingFlag::new();
        let mut scheduler = Scheduler::<fn(), 4>::with_ticks_per_second(&flag, 3);

        flag.raise();
        scheduler.process_tick(&mut ());
        flag.raise();
        scheduler.process_tick(&mut ());
        scheduler.set_clock(WallTime::new(12, 0, 0).unwrap());

        flag.raise();
        let report = scheduler.process_tick(&mut ()).unwrap();
        assert!(!report.second_elapsed());
    }
}
