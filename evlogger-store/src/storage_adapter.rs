//! Adapter for `embedded-storage` drivers.
//!
//! Byte-writable EEPROMs (24LCxx family) and emulated-EEPROM flash drivers
//! usually implement `embedded_storage::Storage`, which hides page handling
//! and erase cycles behind plain `read`/`write` calls. This adapter maps a
//! window of such a device onto a [`ByteStore`].
//!
//! # Example
//!
//! ```ignore
//! use evlogger_store::{StorageAdapter, StorageRegion};
//!
//! let eeprom = Eeprom24x::new_24x512(i2c, SlaveAddr::Alternative(false, false, false));
//! let header_store = StorageAdapter::new(eeprom, StorageRegion::whole(0x1_0000));
//! ```

use embedded_storage::{ReadStorage, Storage};

use crate::{ByteStore, StoreError, check_bounds};

/// Window of a storage device exposed through the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageRegion {
    /// Byte offset of the window inside the device.
    pub base: u32,
    /// Length of the window in bytes.
    pub len: u32,
}

impl StorageRegion {
    /// Create a region of `len` bytes starting at `base`.
    pub const fn new(base: u32, len: u32) -> Self {
        Self { base, len }
    }

    /// The first `len` bytes of the device.
    pub const fn whole(len: u32) -> Self {
        Self { base: 0, len }
    }

    /// 24LC512: the full 64 KiB of one chip.
    pub const fn eeprom_24lc512() -> Self {
        Self::whole(0x1_0000)
    }
}

impl Default for StorageRegion {
    fn default() -> Self {
        Self::eeprom_24lc512()
    }
}

/// [`ByteStore`] over an `embedded_storage::Storage` device.
pub struct StorageAdapter<S> {
    storage: S,
    region: StorageRegion,
}

impl<S> StorageAdapter<S> {
    /// Wrap `storage`, exposing `region`.
    pub fn new(storage: S, region: StorageRegion) -> Self {
        Self { storage, region }
    }

    /// The exposed region.
    pub fn region(&self) -> &StorageRegion {
        &self.region
    }

    /// Consume the adapter and return the device.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S> ByteStore for StorageAdapter<S>
where
    S: Storage,
{
    type Error = StoreError;

    async fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        check_bounds(address, buf.len(), self.region.len)?;
        self.storage
            .read(self.region.base + address, buf)
            .map_err(|_| StoreError::Device)
    }

    async fn write(&mut self, address: u32, data: &[u8]) -> Result<(), Self::Error> {
        check_bounds(address, data.len(), self.region.len)?;
        self.storage
            .write(self.region.base + address, data)
            .map_err(|_| StoreError::Device)
    }

    fn capacity(&self) -> u32 {
        let device = u32::try_from(self.storage.capacity()).unwrap_or(u32::MAX);
        self.region.len.min(device.saturating_sub(self.region.base))
    }
}
