//! One-bit handoff from interrupt context to the main loop.

use portable_atomic::{AtomicBool, Ordering};

/// A pending-request flag set by an interrupt handler and consumed by the main loop.
///
/// This is the only state an interrupt writes for the tick and for the external
/// button line. The flag is a `portable_atomic::AtomicBool`: native atomics
/// where the core has them, a `critical-section` on cores without
/// read-modify-write instructions (Cortex-M0/M0+). On those targets the
/// application supplies the critical-section implementation, e.g.
/// `cortex-m/critical-section-single-core`. Declare it as a `static` and share
/// it by reference:
///
/// ```
/// use tick_scheduler::PendingFlag;
///
/// static TICK: PendingFlag = PendingFlag::new();
///
/// // interrupt handler
/// TICK.raise();
///
/// // main loop
/// assert!(TICK.take());
/// assert!(!TICK.take());
/// ```
#[derive(Debug)]
pub struct PendingFlag {
    pending: AtomicBool,
}

impl PendingFlag {
    /// Creates a cleared flag.
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Marks a request as pending.
    ///
    /// Returns true if the previous request had not been taken yet, meaning the
    /// two requests have been coalesced into one.
    #[inline]
    pub fn raise(&self) -> bool {
        self.pending.swap(true, Ordering::AcqRel)
    }

    /// Clears the flag and returns whether it was set.
    #[inline]
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Returns whether a request is pending without clearing it.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for PendingFlag {
    fn default() -> Self {
        Self::new()
    }
}
