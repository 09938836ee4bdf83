//! End-of-message detection for an unterminated UART byte stream.
//!
//! A message is considered complete once the line has been quiet for a fixed
//! number of ticks. The byte interrupt never touches this state: it only
//! enqueues into a single-producer/single-consumer ring such as
//! `heapless::spsc::Queue`, and the main loop drains that ring through a
//! [`ByteSource`] before counting the tick.

use crate::scheduler::TickListener;
use heapless::Vec;

/// Quiet ticks that end a message (100 ms at the reference tick rate).
pub const DEFAULT_QUIET_TICKS: u16 = 10;

/// Receive buffer size of the reference firmware.
pub const RX_BUFFER_SIZE: usize = 300;

/// Phase of the current receive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveState {
    /// Nothing received since the last reset.
    Idle,
    /// Bytes are arriving; the quiet counter runs on every tick.
    Receiving,
    /// The line went quiet; the buffered message is ready for the parser.
    Complete,
}

/// Main-loop end of the byte ring.
pub trait ByteSource {
    /// Returns the next buffered byte, if any.
    fn next_byte(&mut self) -> Option<u8>;
}

/// Any `FnMut() -> Option<u8>`, typically `|| consumer.dequeue()`.
impl<F: FnMut() -> Option<u8>> ByteSource for F {
    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        self()
    }
}

/// Quiet-period receive detector with a bounded message buffer.
///
/// Bytes beyond `N` are dropped silently; the parser notices the truncation
/// when the message fails validation, and [`dropped`](Self::dropped) reports
/// how many were lost.
///
/// # Type Parameters
/// * `N` - Message buffer capacity in bytes
#[derive(Debug)]
pub struct ReceiveTimeout<const N: usize> {
    buffer: Vec<u8, N>,
    quiet_ticks: u16,
    threshold: u16,
    state: ReceiveState,
    dropped: usize,
}

impl<const N: usize> ReceiveTimeout<N> {
    /// Creates an idle detector using [`DEFAULT_QUIET_TICKS`].
    pub const fn new() -> Self {
        Self::with_threshold(DEFAULT_QUIET_TICKS)
    }

    /// Creates an idle detector that completes after `ticks` quiet ticks.
    ///
    /// A threshold of zero is treated as one.
    pub const fn with_threshold(ticks: u16) -> Self {
        Self {
            buffer: Vec::new(),
            quiet_ticks: 0,
            threshold: if ticks == 0 { 1 } else { ticks },
            state: ReceiveState::Idle,
            dropped: 0,
        }
    }

    /// Records one received byte.
    ///
    /// Starts a session when idle, resets the quiet counter, and reopens a
    /// completed session so the late byte is kept with its message.
    pub fn feed(&mut self, byte: u8) {
        if self.buffer.push(byte).is_err() {
            self.dropped = self.dropped.saturating_add(1);

            #[cfg(feature = "defmt")]
            if self.dropped == 1 {
                defmt::warn!("receive buffer full ({=usize} bytes), dropping input", N);
            }
        }

        self.quiet_ticks = 0;
        self.state = ReceiveState::Receiving;
    }

    /// Moves every byte currently available from `source` into the session.
    ///
    /// Returns the number of bytes taken.
    pub fn drain<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut taken = 0;
        while let Some(byte) = source.next_byte() {
            self.feed(byte);
            taken += 1;
        }
        taken
    }

    /// Counts one tick of silence.
    ///
    /// Returns true on the tick that completes the message.
    pub fn tick(&mut self) -> bool {
        if self.state != ReceiveState::Receiving {
            return false;
        }

        self.quiet_ticks = self.quiet_ticks.saturating_add(1);
        if self.quiet_ticks < self.threshold {
            return false;
        }

        self.state = ReceiveState::Complete;

        #[cfg(feature = "defmt")]
        defmt::debug!("receive complete: {=usize} bytes", self.buffer.len());

        true
    }

    /// Pairs the detector with its byte ring so that the scheduler drains the
    /// ring right before each quiet tick is counted.
    pub fn attach<S: ByteSource>(&mut self, source: S) -> AttachedReceiver<'_, S, N> {
        AttachedReceiver {
            receiver: self,
            source,
        }
    }

    /// Returns the completed message, or `None` while idle or receiving.
    pub fn message(&self) -> Option<&[u8]> {
        match self.state {
            ReceiveState::Complete => Some(&self.buffer),
            _ => None,
        }
    }

    /// Ends the session and returns to `Idle`, clearing the buffer, the quiet
    /// counter, the completion flag and the dropped-byte count.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.quiet_ticks = 0;
        self.state = ReceiveState::Idle;
        self.dropped = 0;
    }

    /// Returns the bytes buffered so far.
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the phase of the current session.
    pub fn state(&self) -> ReceiveState {
        self.state
    }

    /// Returns true once the line has been quiet for the threshold.
    pub fn is_complete(&self) -> bool {
        self.state == ReceiveState::Complete
    }

    /// Returns the ticks counted since the last byte.
    pub fn quiet_ticks(&self) -> u16 {
        self.quiet_ticks
    }

    /// Returns the quiet ticks that complete a message.
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Returns how many bytes of this session were dropped for lack of space.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<const N: usize> Default for ReceiveTimeout<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TickListener for ReceiveTimeout<N> {
    fn on_tick(&mut self) {
        self.tick();
    }
}

/// A [`ReceiveTimeout`] bound to its byte ring for one main-loop iteration.
///
/// Created by [`ReceiveTimeout::attach`].
pub struct AttachedReceiver<'r, S: ByteSource, const N: usize> {
    receiver: &'r mut ReceiveTimeout<N>,
    source: S,
}

impl<S: ByteSource, const N: usize> TickListener for AttachedReceiver<'_, S, N> {
    fn on_tick(&mut self) {
        self.receiver.drain(&mut self.source);
        self.receiver.tick();
    }
}
