//! Shared test infrastructure for tick-scheduler integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::RefCell;
use tick_scheduler::{
    AlarmAction, AlarmInfo, AlarmQueue, PendingFlag, Scheduler, TickListener, TickReport,
    TickTimer, TimerConfig,
};

// ============================================================================
// Recording Actions
// ============================================================================

/// Ordered record of which actions fired
pub type FireLog = RefCell<Vec<u8>>;

/// Action that appends its tag to a shared log when fired
pub struct Tagged<'a> {
    log: &'a FireLog,
    tag: u8,
}

impl AlarmAction for Tagged<'_> {
    fn fire(&mut self) {
        self.log.borrow_mut().push(self.tag);
    }
}

pub fn tagged(log: &FireLog, tag: u8) -> Tagged<'_> {
    Tagged { log, tag }
}

/// Number of times `tag` appears in the log
pub fn fired(log: &FireLog, tag: u8) -> usize {
    log.borrow().iter().filter(|t| **t == tag).count()
}

// ============================================================================
// Queue Helpers
// ============================================================================

/// Absolute remaining ticks of every queued alarm, head first
pub fn remaining_ticks<A: AlarmAction, const N: usize>(queue: &AlarmQueue<A, N>) -> Vec<u32> {
    queue.iter().map(|info: AlarmInfo| info.remaining).collect()
}

pub fn is_sorted(values: &[u32]) -> bool {
    values.windows(2).all(|pair| pair[0] <= pair[1])
}

/// Raise the tick flag and service it, as the interrupt and main loop would
pub fn tick_once<A: AlarmAction, const N: usize>(
    flag: &PendingFlag,
    scheduler: &mut Scheduler<'_, A, N>,
) -> TickReport {
    flag.raise();
    scheduler
        .process_tick(&mut ())
        .expect("tick was raised, so it must be processed")
}

/// Same as `tick_once` but with a listener
pub fn tick_with<A: AlarmAction, L: TickListener, const N: usize>(
    flag: &PendingFlag,
    scheduler: &mut Scheduler<'_, A, N>,
    listener: &mut L,
) -> TickReport {
    flag.raise();
    scheduler
        .process_tick(listener)
        .expect("tick was raised, so it must be processed")
}

// ============================================================================
// Mock Timer
// ============================================================================

/// Mock tick timer recording configuration and a settable update-pending bit
#[derive(Default)]
pub struct MockTimer {
    pub config: Option<TimerConfig>,
    pub enabled: bool,
    pub update_pending: bool,
    pub cleared: u32,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the counter reaching its reload value
    pub fn overflow(&mut self) {
        self.update_pending = true;
    }
}

impl TickTimer for MockTimer {
    fn configure(&mut self, config: TimerConfig) {
        self.config = Some(config);
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn take_update(&mut self) -> bool {
        if self.update_pending {
            self.update_pending = false;
            self.cleared += 1;
            true
        } else {
            false
        }
    }
}
