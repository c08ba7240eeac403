//! Debounced change detection.
//!
//! Each bank keeps the two most recent samples and the last confirmed
//! levels. Per tick:
//!
//! 1. `candidates = sample ^ former`, lines that differ from two ticks back
//! 2. shift: `former = previous`, `previous = sample`
//! 3. a candidate is a transition if it equals its previous sample (settled)
//!    and differs from its confirmed level
//!
//! A change must hold for two consecutive samples to be accepted, and each
//! accepted level change is reported once.

use super::value_objects::{ChannelId, LineState, MAX_BANKS};

/// A confirmed level change of one line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Line that changed.
    pub channel: ChannelId,
    /// New level.
    pub state: LineState,
}

#[derive(Debug, Clone, Copy, Default)]
struct BankHistory {
    former: u16,
    previous: u16,
    confirmed: u16,
    primed: bool,
}

impl BankHistory {
    fn is_settling(&self) -> bool {
        self.primed && (self.former != self.previous || self.previous != self.confirmed)
    }
}

/// Two-stage settle filter for up to [`MAX_BANKS`] banks of 16 lines.
#[derive(Debug, Clone, Default)]
pub struct ChannelDetector {
    banks: [BankHistory; MAX_BANKS],
}

impl ChannelDetector {
    /// Create a detector with no history.
    pub const fn new() -> Self {
        const EMPTY: BankHistory = BankHistory {
            former: 0,
            previous: 0,
            confirmed: 0,
            primed: false,
        };
        Self {
            banks: [EMPTY; MAX_BANKS],
        }
    }

    /// Feed one sample of `bank` and return the confirmed transitions.
    ///
    /// The first sample of a bank only seeds its history: levels present at
    /// start-up are not reported.
    pub fn sample(&mut self, bank: u8, bits: u16) -> Transitions {
        let Some(history) = self.banks.get_mut(bank as usize) else {
            return Transitions::none(bank);
        };

        if !history.primed {
            *history = BankHistory {
                former: bits,
                previous: bits,
                confirmed: bits,
                primed: true,
            };
            return Transitions::none(bank);
        }

        let candidates = bits ^ history.former;
        let settled = !(bits ^ history.previous);
        history.former = history.previous;
        history.previous = bits;

        let changed = candidates & settled & (bits ^ history.confirmed);
        history.confirmed ^= changed;

        if changed != 0 {
            trace!("bank {} changed {:016b} -> {:016b}", bank, changed, bits);
        }
        Transitions {
            bank,
            changed,
            levels: bits,
        }
    }

    /// Whether any bank still has a change waiting to settle or be confirmed.
    pub fn is_settling(&self) -> bool {
        self.banks.iter().any(BankHistory::is_settling)
    }

    /// Most recent raw sample of `bank`.
    pub fn last_sample(&self, bank: u8) -> Option<u16> {
        self.banks
            .get(bank as usize)
            .filter(|h| h.primed)
            .map(|h| h.previous)
    }

    /// Confirmed levels of `bank`.
    pub fn confirmed(&self, bank: u8) -> Option<u16> {
        self.banks
            .get(bank as usize)
            .filter(|h| h.primed)
            .map(|h| h.confirmed)
    }
}

/// Transitions found in one bank sample, lowest pin first.
#[derive(Debug, Clone)]
pub struct Transitions {
    bank: u8,
    changed: u16,
    levels: u16,
}

impl Transitions {
    fn none(bank: u8) -> Self {
        Self {
            bank,
            changed: 0,
            levels: 0,
        }
    }
}

impl Iterator for Transitions {
    type Item = Transition;

    fn next(&mut self) -> Option<Transition> {
        while self.changed != 0 {
            let pin = self.changed.trailing_zeros() as u8;
            self.changed &= self.changed - 1;
            if let Some(channel) = ChannelId::new(self.bank, pin) {
                return Some(Transition {
                    channel,
                    state: LineState::from_bit(self.levels & (1 << pin) != 0),
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.changed.count_ones() as usize))
    }
}
