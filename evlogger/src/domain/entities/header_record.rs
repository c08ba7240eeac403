//! Header record entity - the durable pointer to the log's live range.

use crate::domain::value_objects::LogAddress;

/// Bounds of the live log plus a write-order key.
///
/// Encoded as 8 little-endian bytes: `key: u32`, `newest: u16`, `oldest: u16`.
/// The key is `u32::MAX - unix_time`, so a newer record has a smaller key and
/// an erased slot (`0xFFFF_FFFF`) sorts as the oldest possible.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRecord {
    key: u32,
    newest: LogAddress,
    oldest: LogAddress,
}

impl HeaderRecord {
    /// Encoded size on the medium.
    pub const ENCODED_LEN: usize = 8;

    /// Key of a never-written slot.
    pub const ERASED_KEY: u32 = u32::MAX;

    /// Largest key a commit writes. Anything above is erased or torn.
    pub const MAX_KEY: u32 = 0xFEFF_FFFF;

    /// Empty log at address 0, never committed.
    pub const EMPTY: Self = Self {
        key: Self::ERASED_KEY,
        newest: LogAddress::new(0),
        oldest: LogAddress::new(0),
    };

    /// Create a record from its parts.
    pub const fn new(key: u32, newest: LogAddress, oldest: LogAddress) -> Self {
        Self {
            key,
            newest,
            oldest,
        }
    }

    /// Key for a commit made at `unix_time`.
    #[inline]
    pub const fn key_for(unix_time: u32) -> u32 {
        u32::MAX - unix_time
    }

    /// Write-order key. Smaller is newer.
    #[inline]
    pub const fn key(&self) -> u32 {
        self.key
    }

    /// Next write target.
    #[inline]
    pub const fn newest(&self) -> LogAddress {
        self.newest
    }

    /// Oldest live record.
    #[inline]
    pub const fn oldest(&self) -> LogAddress {
        self.oldest
    }

    /// Unix time the record was committed at.
    #[inline]
    pub const fn written_at(&self) -> u32 {
        u32::MAX - self.key
    }

    /// Whether the record describes an empty log.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.newest == self.oldest
    }

    /// Whether the slot was never written.
    #[inline]
    pub const fn is_erased(&self) -> bool {
        self.key == Self::ERASED_KEY
    }

    /// Whether the key is one a completed commit can have.
    #[inline]
    pub const fn is_committed(&self) -> bool {
        self.key <= Self::MAX_KEY
    }

    /// Same key, new bounds.
    pub const fn with_bounds(self, newest: LogAddress, oldest: LogAddress) -> Self {
        Self {
            newest,
            oldest,
            ..self
        }
    }

    /// Encode for the medium.
    ///
    /// # Examples
    ///
    /// ```
    /// use evlogger::{HeaderRecord, LogAddress};
    ///
    /// let record = HeaderRecord::new(0x0102_0304, LogAddress::new(0x00c0), LogAddress::new(0));
    /// assert_eq!(record.encode(), [0x04, 0x03, 0x02, 0x01, 0xc0, 0x00, 0x00, 0x00]);
    /// ```
    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut buf = [0u8; Self::ENCODED_LEN];
        buf[0..4].copy_from_slice(&self.key.to_le_bytes());
        buf[4..6].copy_from_slice(&self.newest.value().to_le_bytes());
        buf[6..8].copy_from_slice(&self.oldest.value().to_le_bytes());
        buf
    }

    /// Decode from the medium. Every 8-byte image decodes.
    pub fn decode(buf: &[u8; Self::ENCODED_LEN]) -> Self {
        Self {
            key: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            newest: LogAddress::new(u16::from_le_bytes([buf[4], buf[5]])),
            oldest: LogAddress::new(u16::from_le_bytes([buf[6], buf[7]])),
        }
    }

    /// Whether both bounds are record-aligned and inside a log of `capacity` bytes.
    pub fn is_plausible(&self, record_len: u32, capacity: u32) -> bool {
        [self.newest, self.oldest].iter().all(|addr| {
            let value = u32::from(addr.value());
            value < capacity && value % record_len == 0
        })
    }
}

impl Default for HeaderRecord {
    fn default() -> Self {
        Self::EMPTY
    }
}
