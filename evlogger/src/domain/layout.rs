//! Storage geometry.

use super::entities::{HeaderRecord, NAME_LEN, RECORD_LEN};
use super::value_objects::{ChannelId, LINES_PER_BANK, LogAddress, MAX_BANKS};

/// Where header slots, channel names and log records live.
///
/// The header store holds the channel names at its low end and a rotating
/// set of header slots at its high end. Slots are written from
/// `header_start` downwards by `header_stride` and wrap back to
/// `header_start` after `header_end`. The log store is a separate address
/// space of `log_capacity` bytes.
///
/// All checks run in `const fn` constructors, so an invalid preset fails at
/// compile time.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    header_start: u32,
    header_end: u32,
    header_stride: u32,
    name_bank_stride: u32,
    name_pin_stride: u32,
    banks: u8,
    log_capacity: u32,
}

impl Layout {
    /// Create a layout.
    ///
    /// # Panics
    ///
    /// Panics if the slots overlap, do not tile `header_start..=header_end`,
    /// the name table reaches into the slots, the log capacity is not a
    /// non-zero multiple of the record width up to `0x1_0000`, or `banks`
    /// is not 1 or 2.
    pub const fn new(
        header_start: u32,
        header_end: u32,
        header_stride: u32,
        name_bank_stride: u32,
        name_pin_stride: u32,
        banks: u8,
        log_capacity: u32,
    ) -> Self {
        assert!(
            header_stride as usize >= HeaderRecord::ENCODED_LEN,
            "header stride smaller than a header record"
        );
        assert!(header_start >= header_end, "header_start below header_end");
        assert!(
            (header_start - header_end) % header_stride == 0,
            "header slots do not tile the header range"
        );
        assert!(
            banks >= 1 && banks as usize <= MAX_BANKS,
            "banks must be 1 or 2"
        );
        assert!(
            name_pin_stride as usize >= NAME_LEN,
            "name stride smaller than a name"
        );
        assert!(
            name_bank_stride >= name_pin_stride * LINES_PER_BANK as u32,
            "name banks overlap"
        );
        assert!(
            (banks as u32 - 1) * name_bank_stride
                + (LINES_PER_BANK as u32 - 1) * name_pin_stride
                + NAME_LEN as u32
                <= header_end,
            "name table overlaps header slots"
        );
        assert!(
            log_capacity > 0 && log_capacity % RECORD_LEN as u32 == 0,
            "log capacity must be a non-zero multiple of the record width"
        );
        assert!(log_capacity <= 0x1_0000, "log addresses are 16 bits");
        assert!(
            log_capacity >= 2 * RECORD_LEN as u32,
            "log must hold at least two record slots"
        );

        Self {
            header_start,
            header_end,
            header_stride,
            name_bank_stride,
            name_pin_stride,
            banks,
            log_capacity,
        }
    }

    /// Two 24LC512 EEPROMs: names and 480 header slots in the first, the
    /// 1024-slot record ring in the second.
    pub const fn dual_24lc512() -> Self {
        Self::new(0xFF80, 0x1000, 0x80, 0x800, 0x80, 2, 0x1_0000)
    }

    /// Same geometry with a different number of banks.
    pub const fn with_banks(self, banks: u8) -> Self {
        Self::new(
            self.header_start,
            self.header_end,
            self.header_stride,
            self.name_bank_stride,
            self.name_pin_stride,
            banks,
            self.log_capacity,
        )
    }

    /// Address of the first slot written in the rotation.
    #[inline]
    pub const fn header_start(&self) -> u32 {
        self.header_start
    }

    /// Address of the last slot in the rotation.
    #[inline]
    pub const fn header_end(&self) -> u32 {
        self.header_end
    }

    /// Distance between slots.
    #[inline]
    pub const fn header_stride(&self) -> u32 {
        self.header_stride
    }

    /// Number of header slots.
    #[inline]
    pub const fn slot_count(&self) -> u32 {
        (self.header_start - self.header_end) / self.header_stride + 1
    }

    /// Address of slot `index`; slot 0 is `header_start`.
    #[inline]
    pub const fn slot_address(&self, index: u32) -> u32 {
        self.header_start - (index % self.slot_count()) * self.header_stride
    }

    /// Slot written after the one at `address`.
    #[inline]
    pub const fn next_slot(&self, address: u32) -> u32 {
        if address <= self.header_end {
            self.header_start
        } else {
            address - self.header_stride
        }
    }

    /// Monitored banks.
    #[inline]
    pub const fn banks(&self) -> u8 {
        self.banks
    }

    /// Address of the stored name of `channel`.
    #[inline]
    pub const fn name_address(&self, channel: ChannelId) -> u32 {
        channel.bank() as u32 * self.name_bank_stride + channel.pin() as u32 * self.name_pin_stride
    }

    /// Size of the log ring in bytes.
    #[inline]
    pub const fn log_capacity(&self) -> u32 {
        self.log_capacity
    }

    /// Record slots in the ring.
    #[inline]
    pub const fn log_slots(&self) -> u32 {
        self.log_capacity / RECORD_LEN as u32
    }

    /// Records the ring can hold at once; one slot separates newest from oldest.
    #[inline]
    pub const fn max_records(&self) -> u32 {
        self.log_slots() - 1
    }

    /// Whether `address` is a record boundary inside the ring.
    #[inline]
    pub const fn is_record_address(&self, address: LogAddress) -> bool {
        (address.value() as u32) < self.log_capacity
            && address.value() as u32 % RECORD_LEN as u32 == 0
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::dual_24lc512()
    }
}
