#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`PendingFlag`**: One-bit handoff raised by an interrupt and taken by the main loop
//! - **`TimerConfig`**: Exact prescaler/period arithmetic for the periodic tick timer
//! - **`TickTimer`**: Trait to implement for your tick timer hardware
//! - **`AlarmQueue`**: Fixed-capacity, sorted set of one-shot and repeating alarms
//! - **`AlarmAction`**: What runs when an alarm fires (any `FnMut()` or your own type)
//! - **`Scheduler`**: Polled from the main loop; advances alarms once per tick and keeps the wall clock
//! - **`TickListener`**: Collaborators driven by the scheduler's ticks and seconds
//! - **`ReceiveTimeout`**: Detects the end of an unterminated UART message by line silence
//! - **`DailyAlarms`**: Time-of-day alarms checked against the wall clock
//!
//! Interrupt handlers only ever write a `PendingFlag` or push into a lock-free
//! single-producer/single-consumer byte ring. Every other piece of state lives
//! in main-loop context.

pub mod clock;
pub mod daily;
pub mod queue;
pub mod receive;
pub mod scheduler;
pub mod signal;
pub mod tick;
pub mod types;

pub use clock::{ClockError, WallTime};
pub use daily::{DailyAlarm, DailyAlarms};
pub use queue::{AlarmInfo, AlarmQueue, DEFAULT_CAPACITY, DispatchOutcome};
pub use receive::{
    AttachedReceiver, ByteSource, DEFAULT_QUIET_TICKS, RX_BUFFER_SIZE, ReceiveState,
    ReceiveTimeout,
};
pub use scheduler::{Scheduler, TickListener, TickReport};
pub use signal::PendingFlag;
pub use tick::{
    TICK_MS, TICK_RATE_HZ, TICKS_PER_SECOND, TickConfigError, TickTimer, TimerConfig,
    ms_to_ticks,
};
pub use types::{AlarmAction, AlarmError, AlarmId, AlarmMode};
