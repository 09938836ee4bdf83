//! Time-slice tick source: timer divisor arithmetic and the interrupt body.
//!
//! The tick is produced by a hardware up-counter with a 16-bit prescaler and a
//! 16-bit auto-reload register. Its update rate is
//!
//! ```text
//! rate = clock / (prescaler + 1) / (period + 1)
//! ```
//!
//! and a configuration is only accepted when both divisions are exact, so the
//! tick never drifts against the input clock. With the reference 84 MHz timer
//! clock: 84_000_000 / 8400 = 10 kHz counter, 10_000 / 100 = 100 Hz, which is
//! prescaler 8399 and period 99.

use crate::signal::PendingFlag;

/// Duration of one tick in milliseconds.
pub const TICK_MS: u32 = 10;

/// Tick frequency in hertz.
pub const TICK_RATE_HZ: u32 = 1000 / TICK_MS;

/// Number of ticks in one wall-clock second.
pub const TICKS_PER_SECOND: u32 = TICK_RATE_HZ;

/// Timer input clock of the reference board (APB2 timer clock).
pub const REFERENCE_CLOCK_HZ: u32 = 84_000_000;

/// Counter rate after the prescaler on the reference board.
pub const REFERENCE_COUNTER_HZ: u32 = 10_000;

const _: () = assert!(1000 % TICK_MS == 0, "TICK_MS must divide one second");

/// Timer register values for the reference board, checked at compile time.
pub const REFERENCE_CONFIG: TimerConfig =
    match TimerConfig::from_counter_rate(REFERENCE_CLOCK_HZ, REFERENCE_COUNTER_HZ, TICK_RATE_HZ) {
        Ok(config) => config,
        Err(_) => panic!("reference timer clock does not divide to the tick rate"),
    };

/// Largest divisor a 16-bit register can express (register value + 1).
const MAX_DIVISOR: u32 = 1 << 16;

/// Converts a duration in milliseconds to whole ticks, rounding down.
#[inline]
pub const fn ms_to_ticks(ms: u32) -> u32 {
    ms / TICK_MS
}

/// Converts a tick count to milliseconds.
#[inline]
pub const fn ticks_to_ms(ticks: u32) -> u32 {
    ticks.saturating_mul(TICK_MS)
}

/// Errors from timer divisor calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickConfigError {
    /// A clock or rate of zero was supplied.
    ZeroRate,

    /// The clock does not divide evenly into the requested rate.
    NonIntegralDivisor,

    /// The divisor does not fit into the 16-bit prescaler and period registers.
    RegisterOverflow,
}

impl core::fmt::Display for TickConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TickConfigError::ZeroRate => {
                write!(f, "clock and tick rates must be non-zero")
            }
            TickConfigError::NonIntegralDivisor => {
                write!(f, "clock does not divide evenly into the tick rate")
            }
            TickConfigError::RegisterOverflow => {
                write!(f, "divisor exceeds the 16-bit timer registers")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TickConfigError {}

/// Prescaler and auto-reload register values for the tick timer.
///
/// Both fields hold raw register values, i.e. the divisor minus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// Prescaler register (`clock / (prescaler + 1)` is the counter rate).
    pub prescaler: u16,

    /// Auto-reload register (`counter / (period + 1)` is the tick rate).
    pub period: u16,
}

impl TimerConfig {
    /// Builds a configuration from an explicit intermediate counter rate.
    ///
    /// This is how the reference board is set up: pick a round counter rate
    /// (10 kHz), then count `counter_hz / tick_hz` of those per tick.
    ///
    /// # Errors
    /// * `ZeroRate` - any argument is zero
    /// * `NonIntegralDivisor` - `clock_hz / counter_hz` or `counter_hz / tick_hz` is inexact
    /// * `RegisterOverflow` - either divisor exceeds 65536
    pub const fn from_counter_rate(
        clock_hz: u32,
        counter_hz: u32,
        tick_hz: u32,
    ) -> Result<Self, TickConfigError> {
        if clock_hz == 0 || counter_hz == 0 || tick_hz == 0 {
            return Err(TickConfigError::ZeroRate);
        }
        if clock_hz % counter_hz != 0 || counter_hz % tick_hz != 0 {
            return Err(TickConfigError::NonIntegralDivisor);
        }

        let prescale = clock_hz / counter_hz;
        let period = counter_hz / tick_hz;
        if prescale > MAX_DIVISOR || period > MAX_DIVISOR {
            return Err(TickConfigError::RegisterOverflow);
        }

        Ok(Self {
            prescaler: (prescale - 1) as u16,
            period: (period - 1) as u16,
        })
    }

    /// Derives a configuration for `tick_hz` directly from the clock.
    ///
    /// Splits the total divisor `clock_hz / tick_hz` into the smallest
    /// prescaler that leaves an exact period fitting 16 bits.
    ///
    /// # Errors
    /// * `ZeroRate` - either argument is zero
    /// * `NonIntegralDivisor` - `clock_hz` is not a multiple of `tick_hz`
    /// * `RegisterOverflow` - no exact factorisation fits both registers
    pub const fn derive(clock_hz: u32, tick_hz: u32) -> Result<Self, TickConfigError> {
        if clock_hz == 0 || tick_hz == 0 {
            return Err(TickConfigError::ZeroRate);
        }
        if clock_hz % tick_hz != 0 {
            return Err(TickConfigError::NonIntegralDivisor);
        }

        let divisor = clock_hz / tick_hz;
        let mut prescale = divisor.div_ceil(MAX_DIVISOR);

        while prescale <= MAX_DIVISOR && prescale <= divisor {
            if divisor % prescale == 0 {
                let period = divisor / prescale;
                return Ok(Self {
                    prescaler: (prescale - 1) as u16,
                    period: (period - 1) as u16,
                });
            }
            prescale += 1;
        }

        Err(TickConfigError::RegisterOverflow)
    }

    /// Total clock divisor, `(prescaler + 1) * (period + 1)`.
    #[inline]
    pub const fn divisor(&self) -> u64 {
        (self.prescaler as u64 + 1) * (self.period as u64 + 1)
    }

    /// Returns the exact tick rate produced from `clock_hz`, or `None` if the
    /// divisor leaves a remainder.
    pub const fn tick_rate_hz(&self, clock_hz: u32) -> Option<u32> {
        let divisor = self.divisor();
        let clock = clock_hz as u64;
        if clock % divisor != 0 {
            return None;
        }
        Some((clock / divisor) as u32)
    }

    /// Returns true if `clock_hz / (prescaler+1) / (period+1) == tick_hz` exactly.
    pub const fn verify(&self, clock_hz: u32, tick_hz: u32) -> bool {
        match self.tick_rate_hz(clock_hz) {
            Some(rate) => rate == tick_hz,
            None => false,
        }
    }
}

/// Trait for abstracting the periodic tick timer hardware.
///
/// Implement this over your HAL's basic timer (TIM10 on the reference board).
pub trait TickTimer {
    /// Writes the prescaler and auto-reload registers.
    fn configure(&mut self, config: TimerConfig);

    /// Enables the update interrupt and starts counting.
    fn enable(&mut self);

    /// Returns whether an update event is pending and clears the hardware
    /// pending bit.
    fn take_update(&mut self) -> bool;
}

/// Configures and starts the tick timer. Call once at boot.
pub fn start<T: TickTimer>(timer: &mut T, config: TimerConfig) {
    timer.configure(config);
    timer.enable();

    #[cfg(feature = "defmt")]
    defmt::debug!(
        "tick timer started: prescaler={=u16} period={=u16}",
        config.prescaler,
        config.period
    );
}

/// The tick interrupt body.
///
/// Clears the hardware pending bit and raises `tick`. Nothing else happens in
/// interrupt context; the alarm queue is advanced later by
/// [`Scheduler::process_tick`](crate::Scheduler::process_tick).
///
/// Returns true if an update event was handled.
#[inline]
pub fn handle_interrupt<T: TickTimer>(timer: &mut T, tick: &PendingFlag) -> bool {
    if timer.take_update() {
        tick.raise();
        true
    } else {
        false
    }
}
