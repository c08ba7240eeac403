//! Channel coordinate value object.

use core::fmt;

/// Lines behind one I/O expander.
pub const LINES_PER_BANK: usize = 16;

/// Expanders the logger can watch (32 lines).
pub const MAX_BANKS: usize = 2;

/// A monitored line, addressed by `(bank, pin)`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId {
    bank: u8,
    pin: u8,
}

impl ChannelId {
    /// Create a channel id, or `None` if the coordinates are out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use evlogger::ChannelId;
    ///
    /// let channel = ChannelId::new(1, 15).unwrap();
    /// assert_eq!(channel.index(), 31);
    /// assert!(ChannelId::new(2, 0).is_none());
    /// ```
    pub const fn new(bank: u8, pin: u8) -> Option<Self> {
        if (bank as usize) < MAX_BANKS && (pin as usize) < LINES_PER_BANK {
            Some(Self { bank, pin })
        } else {
            None
        }
    }

    /// Channel from its flat index `bank * 16 + pin`.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < MAX_BANKS * LINES_PER_BANK {
            Some(Self {
                bank: (index / LINES_PER_BANK) as u8,
                pin: (index % LINES_PER_BANK) as u8,
            })
        } else {
            None
        }
    }

    /// Expander index.
    #[inline]
    pub const fn bank(self) -> u8 {
        self.bank
    }

    /// Pin inside the expander.
    #[inline]
    pub const fn pin(self) -> u8 {
        self.pin
    }

    /// Flat index `bank * 16 + pin`.
    #[inline]
    pub const fn index(self) -> usize {
        self.bank as usize * LINES_PER_BANK + self.pin as usize
    }

    /// All channels of the first `banks` banks, in index order.
    pub fn all(banks: u8) -> impl Iterator<Item = ChannelId> {
        let count = (banks as usize).min(MAX_BANKS) * LINES_PER_BANK;
        (0..count).filter_map(Self::from_index)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{:x}c{:x}", self.bank, self.pin)
    }
}
