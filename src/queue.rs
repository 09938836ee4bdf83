//! Fixed-capacity alarm queue ordered by remaining ticks.
//!
//! The queue keeps its records sorted so the record that fires next is always
//! at the head. Each record stores the ticks left *after its predecessor has
//! fired* rather than an absolute count. Advancing one tick therefore touches
//! only the head, yet every record keeps counting down: the absolute remaining
//! time of a record is the sum of its own and all earlier stored values.
//!
//! Registration, cancellation and re-insertion of repeating alarms are O(N)
//! shifts inside a `heapless::Vec`; a tick that fires nothing is O(1).

use crate::types::{AlarmAction, AlarmError, AlarmId, AlarmMode};
use heapless::Vec;

/// Capacity of the reference firmware's alarm queue.
pub const DEFAULT_CAPACITY: usize = 9;

/// A scheduled unit of work.
///
/// A record is live exactly while it is stored in the queue; removed slots
/// are simply absent from the vector.
#[derive(Debug)]
struct AlarmRecord<A> {
    id: AlarmId,
    /// Ticks remaining once the preceding record has fired.
    delta: u32,
    period: u32,
    mode: AlarmMode,
    action: A,
}

/// Read-only view of a queued alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmInfo {
    /// Alarm identifier.
    pub id: AlarmId,

    /// Ticks until the alarm fires.
    pub remaining: u32,

    /// Registered duration, reloaded after each firing of a repeating alarm.
    pub period: u32,

    /// One-shot or repeating.
    pub mode: AlarmMode,
}

/// Result of advancing the queue by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    /// No alarms are queued.
    Idle,

    /// The head is still counting down.
    Pending {
        /// Alarm at the head of the queue.
        next: AlarmId,
        /// Ticks until it fires.
        remaining: u32,
    },

    /// One or more alarms reached zero and their actions ran.
    Fired {
        /// Number of actions invoked during this tick.
        count: usize,
    },
}

/// Sorted, bounded set of alarms advanced one tick at a time.
///
/// # Type Parameters
/// * `A` - Action type invoked when an alarm fires
/// * `N` - Maximum number of concurrently queued alarms (at most 255)
pub struct AlarmQueue<A: AlarmAction, const N: usize> {
    records: Vec<AlarmRecord<A>, N>,
}

impl<A: AlarmAction, const N: usize> AlarmQueue<A, N> {
    const CAPACITY_FITS_IDS: () = assert!(
        N >= 1 && N <= u8::MAX as usize,
        "alarm queue capacity must be between 1 and 255"
    );

    /// Creates an empty queue.
    pub const fn new() -> Self {
        let () = Self::CAPACITY_FITS_IDS;

        Self { records: Vec::new() }
    }

    /// Registers an alarm that fires after `duration_ticks` ticks.
    ///
    /// The new record goes in front of the first queued record with strictly
    /// more remaining ticks, so alarms due on the same tick fire in
    /// registration order.
    ///
    /// # Errors
    /// * `MissingAction` - `action` is `None`
    /// * `ZeroDuration` - `duration_ticks` is zero
    /// * `CapacityExceeded` - `N` alarms are already queued
    pub fn register(
        &mut self,
        duration_ticks: u32,
        mode: AlarmMode,
        action: Option<A>,
    ) -> Result<AlarmId, AlarmError> {
        let result = self.try_register(duration_ticks, mode, action);

        #[cfg(feature = "defmt")]
        match result {
            Ok(id) => defmt::debug!("alarm {=u8} registered: {=u32} ticks, {}", id.0, duration_ticks, mode),
            Err(err) => defmt::warn!("alarm registration rejected: {}", err),
        }

        result
    }

    fn try_register(
        &mut self,
        duration_ticks: u32,
        mode: AlarmMode,
        action: Option<A>,
    ) -> Result<AlarmId, AlarmError> {
        let action = action.ok_or(AlarmError::MissingAction)?;
        if duration_ticks == 0 {
            return Err(AlarmError::ZeroDuration);
        }
        if self.records.is_full() {
            return Err(AlarmError::CapacityExceeded);
        }

        let id = self.free_id().ok_or(AlarmError::CapacityExceeded)?;
        let record = AlarmRecord {
            id,
            delta: duration_ticks,
            period: duration_ticks,
            mode,
            action,
        };

        self.insert_sorted(record)
            .map_err(|_| AlarmError::CapacityExceeded)?;
        Ok(id)
    }

    /// Registers an alarm with a present action. See [`register`](Self::register).
    pub fn schedule(
        &mut self,
        duration_ticks: u32,
        mode: AlarmMode,
        action: A,
    ) -> Result<AlarmId, AlarmError> {
        self.register(duration_ticks, mode, Some(action))
    }

    /// Cancels a queued alarm. Its action is dropped without running.
    ///
    /// # Errors
    /// * `InvalidId` - `id` is the reserved `0`
    /// * `NotFound` - no queued alarm has this id
    ///
    /// An action cannot cancel through the queue that owns it by capturing
    /// the queue directly:
    ///
    /// ```compile_fail
    /// use tick_scheduler::{AlarmId, AlarmMode, AlarmQueue};
    ///
    /// let mut queue = AlarmQueue::<_, 2>::new();
    /// queue
    ///     .schedule(1, AlarmMode::OneShot, || {
    ///         queue.cancel(AlarmId(1)).ok();
    ///     })
    ///     .ok();
    /// ```
    ///
    /// Actions that reach the queue through shared ownership (a `RefCell`
    /// captured by reference) compile, but the nested `borrow_mut` panics
    /// at runtime while the queue is dispatching.
    pub fn cancel(&mut self, id: AlarmId) -> Result<(), AlarmError> {
        if !id.is_valid() {
            return Err(AlarmError::InvalidId);
        }

        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(AlarmError::NotFound(id))?;

        let removed = self.records.remove(index);
        if let Some(next) = self.records.get_mut(index) {
            next.delta = next.delta.saturating_add(removed.delta);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("alarm {=u8} cancelled", id.0);

        Ok(())
    }

    /// Advances the queue by one tick and fires whatever became due.
    ///
    /// Only the head is decremented. When it reaches zero its action runs, the
    /// record is taken off the queue and, if repeating, re-inserted with its
    /// full period. Records sharing the same deadline sit behind the head with
    /// zero ticks of their own and fire in the same call, in queue order.
    ///
    /// A head already at zero (left over from a dispatch that was interrupted)
    /// is not decremented further; it simply fires.
    pub fn advance_and_dispatch(&mut self) -> DispatchOutcome {
        let Some(head) = self.records.first_mut() else {
            return DispatchOutcome::Idle;
        };

        if head.delta > 0 {
            head.delta -= 1;
        }
        if head.delta > 0 {
            return DispatchOutcome::Pending {
                next: head.id,
                remaining: head.delta,
            };
        }

        let mut count = 0;
        while self.records.first().is_some_and(|r| r.delta == 0) {
            let mut record = self.records.remove(0);
            record.action.fire();
            count += 1;

            #[cfg(feature = "defmt")]
            defmt::trace!("alarm {=u8} fired", record.id.0);

            if record.mode == AlarmMode::Repeating {
                record.delta = record.period;
                // The fired record's own slot was just freed, so this cannot fail.
                if let Err(_dropped) = self.insert_sorted(record) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("repeating alarm dropped: queue full on re-insertion");
                }
            }
        }

        DispatchOutcome::Fired { count }
    }

    /// Removes every alarm without running any action.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns the number of queued alarms.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no alarms are queued.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if another registration would fail with `CapacityExceeded`.
    pub fn is_full(&self) -> bool {
        self.records.is_full()
    }

    /// Returns the maximum number of queued alarms, `N`.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns true if an alarm with this id is queued.
    pub fn contains(&self, id: AlarmId) -> bool {
        id.is_valid() && self.records.iter().any(|r| r.id == id)
    }

    /// Returns the ticks until the given alarm fires.
    pub fn remaining(&self, id: AlarmId) -> Option<u32> {
        self.iter().find(|info| info.id == id).map(|info| info.remaining)
    }

    /// Returns the alarm that fires next.
    pub fn peek(&self) -> Option<AlarmInfo> {
        self.iter().next()
    }

    /// Iterates over queued alarms in firing order.
    pub fn iter(&self) -> impl Iterator<Item = AlarmInfo> + '_ {
        self.records.iter().scan(0u32, |elapsed, record| {
            *elapsed = elapsed.saturating_add(record.delta);
            Some(AlarmInfo {
                id: record.id,
                remaining: *elapsed,
                period: record.period,
                mode: record.mode,
            })
        })
    }

    /// Lowest id in `1..=N` not held by a queued record.
    fn free_id(&self) -> Option<AlarmId> {
        (1..=N as u8)
            .map(AlarmId)
            .find(|candidate| !self.records.iter().any(|r| r.id == *candidate))
    }

    /// Inserts `record`, whose `delta` holds its absolute remaining ticks, in
    /// front of the first record that fires strictly later.
    fn insert_sorted(&mut self, mut record: AlarmRecord<A>) -> Result<(), AlarmRecord<A>> {
        if self.records.is_full() {
            return Err(record);
        }

        let target = record.delta;
        let mut elapsed = 0u32;
        let mut index = self.records.len();
        for (i, existing) in self.records.iter().enumerate() {
            let deadline = elapsed.saturating_add(existing.delta);
            if deadline > target {
                index = i;
                break;
            }
            elapsed = deadline;
        }

        record.delta = target - elapsed;
        if let Some(next) = self.records.get_mut(index) {
            next.delta -= record.delta;
        }

        self.records.insert(index, record)
    }
}

impl<A: AlarmAction, const N: usize> Default for AlarmQueue<A, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::vec::Vec as StdVec;

    type Log = RefCell<StdVec<u8>>;

    struct Tag<'a> {
        log: &'a Log,
        tag: u8,
    }

    impl AlarmAction for Tag<'_> {
        fn fire(&mut self) {
            self.log.borrow_mut().push(self.tag);
        }
    }

    fn tag(log: &Log, tag: u8) -> Tag<'_> {
        Tag { log, tag }
    }

    fn stored_deltas<A: AlarmAction, const N: usize>(queue: &AlarmQueue<A, N>) -> StdVec<u32> {
        queue.records.iter().map(|r| r.delta).collect()
    }

    #[test]
    fn stores_head_relative_deltas() {
        let log = Log::default();
        let mut queue = AlarmQueue::<Tag, 4>::new();
        queue.schedule(5, AlarmMode::OneShot, tag(&log, 1)).unwrap();
        queue.schedule(2, AlarmMode::OneShot, tag(&log, 2)).unwrap();
        queue.schedule(9, AlarmMode::OneShot, tag(&log, 3)).unwrap();
        queue.schedule(5, AlarmMode::OneShot, tag(&log, 4)).unwrap();

        assert_eq!(stored_deltas(&queue), [2, 3, 0, 4]);
        let remaining: StdVec<u32> = queue.iter().map(|i| i.remaining).collect();
        assert_eq!(remaining, [2, 5, 5, 9]);
    }

    #[test]
    fn cancel_hands_ticks_to_successor() {
        let log = Log::default();
        let mut queue = AlarmQueue::<Tag, 4>::new();
        let a = queue.schedule(3, AlarmMode::OneShot, tag(&log, 1)).unwrap();
        let b = queue.schedule(7, AlarmMode::OneShot, tag(&log, 2)).unwrap();

        queue.cancel(a).unwrap();
        assert_eq!(stored_deltas(&queue), [7]);
        assert_eq!(queue.remaining(b), Some(7));
    }

    #[test]
    fn ids_are_reused_lowest_first() {
        let log = Log::default();
        let mut queue = AlarmQueue::<Tag, 4>::new();
        let a = queue.schedule(1, AlarmMode::OneShot, tag(&log, 1)).unwrap();
        let b = queue.schedule(1, AlarmMode::OneShot, tag(&log, 2)).unwrap();
        let c = queue.schedule(1, AlarmMode::OneShot, tag(&log, 3)).unwrap();
        assert_eq!((a, b, c), (AlarmId(1), AlarmId(2), AlarmId(3)));

        queue.cancel(b).unwrap();
        queue.cancel(a).unwrap();
        let d = queue.schedule(1, AlarmMode::OneShot, tag(&log, 4)).unwrap();
        assert_eq!(d, AlarmId(1));
        let e = queue.schedule(1, AlarmMode::OneShot, tag(&log, 5)).unwrap();
        assert_eq!(e, AlarmId(2));
    }

    #[test]
    fn zero_head_fires_without_underflow() {
        let log = Log::default();
        let mut queue = AlarmQueue::<Tag, 2>::new();
        queue.schedule(1, AlarmMode::OneShot, tag(&log, 1)).unwrap();
        queue.records[0].delta = 0;

        assert_eq!(queue.advance_and_dispatch(), DispatchOutcome::Fired { count: 1 });
        assert_eq!(*log.borrow(), [1]);
        assert!(queue.is_empty());
    }
}
