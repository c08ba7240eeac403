//! Debounced level of one line.

/// Level of a monitored line. A set bit in a bank sample means `On`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineState {
    /// Line reads high.
    On,
    /// Line reads low.
    Off,
}

impl LineState {
    /// State for a sampled bit.
    #[inline]
    pub const fn from_bit(bit: bool) -> Self {
        if bit { Self::On } else { Self::Off }
    }

    /// Whether this is `On`.
    #[inline]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Three-character, right-aligned label as stored in log records.
    pub const fn label(self) -> &'static [u8; 3] {
        match self {
            Self::On => b" ON",
            Self::Off => b"OFF",
        }
    }

    /// Parse a stored label.
    pub fn from_label(label: &[u8]) -> Option<Self> {
        match label {
            b" ON" => Some(Self::On),
            b"OFF" => Some(Self::Off),
            _ => None,
        }
    }
}
