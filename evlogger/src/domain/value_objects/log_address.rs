//! Type-safe log address value object.

use core::fmt;

/// A byte address inside the circular log region.
///
/// Addresses are 16 bits wide on the medium. All arithmetic wraps at the
/// configured region capacity, which may be anything up to `0x1_0000`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LogAddress(u16);

impl LogAddress {
    /// Create a new log address.
    ///
    /// # Examples
    ///
    /// ```
    /// use evlogger::LogAddress;
    ///
    /// let addr = LogAddress::new(0x00c0);
    /// assert_eq!(addr.value(), 0x00c0);
    /// ```
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get the underlying u16 value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Move forward by `by` bytes, wrapping at `capacity`.
    ///
    /// # Examples
    ///
    /// ```
    /// use evlogger::LogAddress;
    ///
    /// assert_eq!(LogAddress::new(0xffc0).advance(64, 0x1_0000), LogAddress::new(0));
    /// ```
    #[inline]
    pub const fn advance(self, by: u32, capacity: u32) -> Self {
        Self(((self.0 as u32 + by % capacity) % capacity) as u16)
    }

    /// Move backward by `by` bytes, wrapping at `capacity`.
    #[inline]
    pub const fn retreat(self, by: u32, capacity: u32) -> Self {
        Self(((self.0 as u32 + capacity - by % capacity) % capacity) as u16)
    }

    /// Bytes between `older` and `self` walking forward, modulo `capacity`.
    #[inline]
    pub const fn distance_from(self, older: Self, capacity: u32) -> u32 {
        (self.0 as u32 + capacity - older.0 as u32) % capacity
    }
}

impl fmt::Display for LogAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl From<u16> for LogAddress {
    fn from(value: u16) -> Self {
        Self::new(value)
    }
}

impl From<LogAddress> for u16 {
    fn from(addr: LogAddress) -> Self {
        addr.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: u32 = 0x1_0000;

    #[test]
    fn test_advance_wraps_at_capacity() {
        assert_eq!(LogAddress::new(0).advance(64, FULL).value(), 64);
        assert_eq!(LogAddress::new(0xffc0).advance(64, FULL).value(), 0);
        assert_eq!(LogAddress::new(0x00c0).advance(64, 0x100).value(), 0);
    }

    #[test]
    fn test_retreat_wraps_at_capacity() {
        assert_eq!(LogAddress::new(0).retreat(64, FULL).value(), 0xffc0);
        assert_eq!(LogAddress::new(0).retreat(64, 0x100).value(), 0xc0);
        assert_eq!(LogAddress::new(0x80).retreat(64, FULL).value(), 0x40);
    }

    #[test]
    fn test_distance() {
        let newest = LogAddress::new(0x00c0);
        let oldest = LogAddress::new(0);
        assert_eq!(newest.distance_from(oldest, FULL), 0xc0);

        // Wrapped range
        let newest = LogAddress::new(0x0040);
        let oldest = LogAddress::new(0xff80);
        assert_eq!(newest.distance_from(oldest, FULL), 0xc0);

        assert_eq!(oldest.distance_from(oldest, FULL), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", LogAddress::new(0xc0)), "00c0");
    }
}
