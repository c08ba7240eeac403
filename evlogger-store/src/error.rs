//! Store-level errors.

use core::fmt;

/// Errors reported by the bundled [`ByteStore`](crate::ByteStore) adapters.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The access would run past the end of the store.
    OutOfBounds {
        /// First byte of the access.
        address: u32,
        /// Length of the access in bytes.
        len: usize,
    },
    /// The device rejected the operation.
    Device,
    /// Power was lost while the operation was in progress.
    PowerLoss,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { address, len } => write!(
                f,
                "Access of {} bytes at {:#06x} exceeds store bounds",
                len, address
            ),
            Self::Device => write!(f, "Device error"),
            Self::PowerLoss => write!(f, "Power lost during operation"),
        }
    }
}

impl core::error::Error for StoreError {}
