//! Interrupt-fed input source.
//!
//! The expander interrupt handler publishes each bank sample into an
//! [`InterruptLatch`]; the control loop reads it through [`LatchedInput`].
//!
//! Ordering: the handler stores the sample, then bumps the sequence counter
//! with `Release`. The loop loads the counter with `Acquire`, so every
//! sample published before that counter value is visible. The loop
//! acknowledges the snapshot only after the resulting events are written;
//! a publish in between moves the counter past the snapshot and stays
//! pending.

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use crate::domain::InputSource;

/// Single-producer, single-consumer mailbox for bank samples.
///
/// Lives in a `static` shared by the interrupt handler and the control loop.
pub struct InterruptLatch<const BANKS: usize> {
    samples: [AtomicU16; BANKS],
    sequence: AtomicU32,
    acknowledged: AtomicU32,
}

impl<const BANKS: usize> InterruptLatch<BANKS> {
    /// Empty latch with all lines low.
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const LOW: AtomicU16 = AtomicU16::new(0);
        Self {
            samples: [LOW; BANKS],
            sequence: AtomicU32::new(0),
            acknowledged: AtomicU32::new(0),
        }
    }

    /// Interrupt side: record a fresh sample of `bank`.
    ///
    /// Samples of unknown banks are dropped.
    pub fn publish(&self, bank: u8, bits: u16) {
        if let Some(slot) = self.samples.get(bank as usize) {
            slot.store(bits, Ordering::Relaxed);
            self.sequence.fetch_add(1, Ordering::Release);
        }
    }

    /// Loop side: snapshot of the sequence if anything was published since
    /// the last [`complete`](Self::complete).
    pub fn take_pending(&self) -> Option<u32> {
        let sequence = self.sequence.load(Ordering::Acquire);
        (sequence != self.acknowledged.load(Ordering::Relaxed)).then_some(sequence)
    }

    /// Loop side: everything up to `snapshot` is handled.
    pub fn complete(&self, snapshot: u32) {
        self.acknowledged.store(snapshot, Ordering::Relaxed);
    }

    /// Latest sample of `bank`.
    pub fn latest(&self, bank: u8) -> Option<u16> {
        self.samples
            .get(bank as usize)
            .map(|slot| slot.load(Ordering::Relaxed))
    }
}

impl<const BANKS: usize> Default for InterruptLatch<BANKS> {
    fn default() -> Self {
        Self::new()
    }
}

/// A bank the latch does not carry.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSuchBank(pub u8);

/// [`InputSource`] reading from an [`InterruptLatch`].
pub struct LatchedInput<'a, const BANKS: usize> {
    latch: &'a InterruptLatch<BANKS>,
    snapshot: Option<u32>,
}

impl<'a, const BANKS: usize> LatchedInput<'a, BANKS> {
    /// Read from `latch`.
    pub fn new(latch: &'a InterruptLatch<BANKS>) -> Self {
        Self {
            latch,
            snapshot: None,
        }
    }
}

impl<const BANKS: usize> InputSource for LatchedInput<'_, BANKS> {
    type Error = NoSuchBank;

    async fn read_bank(&mut self, bank: u8) -> Result<u16, Self::Error> {
        self.latch.latest(bank).ok_or(NoSuchBank(bank))
    }

    fn pending(&mut self) -> bool {
        self.snapshot = self.latch.take_pending();
        self.snapshot.is_some()
    }

    fn acknowledge(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.latch.complete(snapshot);
        }
    }
}
