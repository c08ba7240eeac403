//! Heap-backed store with fault injection.
//!
//! `MemoryStore` behaves like an erased EEPROM: every byte starts as
//! [`ERASED_BYTE`](crate::ERASED_BYTE). It can simulate a power cut after a
//! given number of written bytes and hard read/write failures, which is what
//! the logger's recovery tests are built on.

use alloc::vec;
use alloc::vec::Vec;

use crate::{ByteStore, ERASED_BYTE, StoreError, check_bounds};

/// In-memory [`ByteStore`] with power-loss and failure injection.
///
/// # Example
///
/// ```ignore
/// use evlogger_store::{ByteStore, MemoryStore};
///
/// let mut store = MemoryStore::new(0x1_0000);
/// store.cut_power_after(3);
/// // Only the first three bytes reach the medium.
/// assert!(store.write(0, &[1, 2, 3, 4]).await.is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    bytes: Vec<u8>,
    /// Bytes that may still be written before the simulated power cut.
    power_budget: Option<usize>,
    powered: bool,
    fail_reads: bool,
    fail_writes: bool,
    /// Start address of every successful write, in order.
    write_log: Vec<u32>,
}

impl MemoryStore {
    /// Create an erased store of `capacity` bytes.
    pub fn new(capacity: u32) -> Self {
        Self {
            bytes: vec![ERASED_BYTE; capacity as usize],
            power_budget: None,
            powered: true,
            fail_reads: false,
            fail_writes: false,
            write_log: Vec::new(),
        }
    }

    /// Raw contents of the store.
    pub fn image(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable raw contents, for planting corrupt data in tests.
    pub fn image_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Let `bytes` more bytes reach the medium, then lose power.
    ///
    /// The write that crosses the budget stores its prefix and fails with
    /// [`StoreError::PowerLoss`]; every later operation fails the same way
    /// until [`restore_power`](Self::restore_power) is called.
    pub fn cut_power_after(&mut self, bytes: usize) {
        self.power_budget = Some(bytes);
    }

    /// Power the store back up. Contents are preserved.
    pub fn restore_power(&mut self) {
        self.power_budget = None;
        self.powered = true;
    }

    /// Whether a simulated power cut is in effect.
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Make every read fail with [`StoreError::Device`].
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every write fail with [`StoreError::Device`] without touching the medium.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Start addresses of all completed writes, oldest first.
    pub fn write_log(&self) -> &[u32] {
        &self.write_log
    }
}

impl ByteStore for MemoryStore {
    type Error = StoreError;

    async fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        if !self.powered {
            return Err(StoreError::PowerLoss);
        }
        if self.fail_reads {
            return Err(StoreError::Device);
        }
        check_bounds(address, buf.len(), self.capacity())?;

        let start = address as usize;
        buf.copy_from_slice(&self.bytes[start..start + buf.len()]);
        Ok(())
    }

    async fn write(&mut self, address: u32, data: &[u8]) -> Result<(), Self::Error> {
        if !self.powered {
            return Err(StoreError::PowerLoss);
        }
        if self.fail_writes {
            return Err(StoreError::Device);
        }
        check_bounds(address, data.len(), self.capacity())?;

        let start = address as usize;
        if let Some(budget) = self.power_budget {
            if data.len() > budget {
                // Torn write: only the prefix made it before the supply dropped
                self.bytes[start..start + budget].copy_from_slice(&data[..budget]);
                self.power_budget = Some(0);
                self.powered = false;
                return Err(StoreError::PowerLoss);
            }
            self.power_budget = Some(budget - data.len());
        }

        self.bytes[start..start + data.len()].copy_from_slice(data);
        self.write_log.push(address);
        Ok(())
    }

    fn capacity(&self) -> u32 {
        self.bytes.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_store_is_erased() {
        let mut store = MemoryStore::new(256);
        let mut buf = [0u8; 16];
        store.read(100, &mut buf).await.unwrap();
        assert_eq!(buf, [ERASED_BYTE; 16]);
        assert_eq!(store.capacity(), 256);
    }

    #[tokio::test]
    async fn test_read_write_roundtrip() {
        let mut store = MemoryStore::new(256);
        store.write(10, b"hello").await.unwrap();

        let mut buf = [0u8; 5];
        store.read(10, &mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");
        assert_eq!(store.write_log(), &[10]);
    }

    #[tokio::test]
    async fn test_out_of_bounds() {
        let mut store = MemoryStore::new(64);
        let err = store.write(60, &[0u8; 8]).await.unwrap_err();
        assert_eq!(err, StoreError::OutOfBounds { address: 60, len: 8 });
        assert!(store.write_log().is_empty());
    }

    #[tokio::test]
    async fn test_power_cut_leaves_prefix() {
        let mut store = MemoryStore::new(64);
        store.write(0, &[0xAA; 4]).await.unwrap();

        store.cut_power_after(2);
        let err = store.write(0, &[1, 2, 3, 4]).await.unwrap_err();
        assert_eq!(err, StoreError::PowerLoss);
        assert!(!store.is_powered());
        assert_eq!(&store.image()[..4], &[1, 2, 0xAA, 0xAA]);

        // Everything fails until power returns
        let mut buf = [0u8; 4];
        assert_eq!(store.read(0, &mut buf).await, Err(StoreError::PowerLoss));

        store.restore_power();
        store.read(0, &mut buf).await.unwrap();
        assert_eq!(buf, [1, 2, 0xAA, 0xAA]);
    }

    #[tokio::test]
    async fn test_power_budget_spans_writes() {
        let mut store = MemoryStore::new(64);
        store.cut_power_after(6);
        store.write(0, &[1; 4]).await.unwrap();
        assert!(store.write(8, &[2; 4]).await.is_err());
        assert_eq!(&store.image()[8..12], &[2, 2, ERASED_BYTE, ERASED_BYTE]);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let mut store = MemoryStore::new(64);
        store.set_fail_writes(true);
        assert_eq!(store.write(0, &[0]).await, Err(StoreError::Device));
        assert_eq!(store.image()[0], ERASED_BYTE);

        store.set_fail_writes(false);
        store.set_fail_reads(true);
        let mut buf = [0u8; 1];
        assert_eq!(store.read(0, &mut buf).await, Err(StoreError::Device));
    }
}
