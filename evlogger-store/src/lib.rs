//! Byte-addressable non-volatile store abstraction.
//!
//! The event logger keeps its header slots, channel names and log records in
//! small external memories (I²C EEPROMs on the reference hardware). This crate
//! defines the single port the logger core talks to, [`ByteStore`], and a few
//! adapters for it:
//!
//! - [`MemoryStore`] (feature `alloc`): heap-backed store with power-loss and
//!   failure injection, used by tests and simulations
//! - [`StorageAdapter`] (feature `embedded-storage`): any
//!   `embedded_storage::Storage` driver
//! - [`StreamStore`] (feature `stream`): any `embedded-io-async`
//!   `Read + Write + Seek` stream, e.g. a host file
//!
//! # Write semantics
//!
//! Writes are byte-granular. A write cut short by a power loss leaves a
//! *prefix* of the requested bytes on the medium and the remainder untouched.
//! The logger core relies on this to order its header commits.
//!
//! # Features
//!
//! - `alloc`: enable [`MemoryStore`]
//! - `embedded-storage`: enable [`StorageAdapter`]
//! - `stream`: enable [`StreamStore`]
//! - `std`: standard library support for the stream adapter
//! - `log` / `defmt`: logging support

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod error;

#[cfg(feature = "alloc")]
mod memory;

#[cfg(feature = "embedded-storage")]
mod storage_adapter;

#[cfg(feature = "stream")]
mod stream;

pub use error::StoreError;

#[cfg(feature = "alloc")]
pub use memory::MemoryStore;

#[cfg(feature = "embedded-storage")]
pub use storage_adapter::{StorageAdapter, StorageRegion};

#[cfg(feature = "stream")]
pub use stream::StreamStore;

/// Value of a byte that has never been written (or was erased).
pub const ERASED_BYTE: u8 = 0xFF;

/// Port for byte-addressable non-volatile storage.
///
/// Addresses are relative to the start of the store and must satisfy
/// `address + len <= capacity()`.
#[trait_variant::make(SendByteStore: Send)]
pub trait ByteStore {
    /// Error reported by the underlying device.
    type Error: core::fmt::Debug;

    /// Read `buf.len()` bytes starting at `address`.
    async fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` starting at `address`.
    ///
    /// Implementations must write bytes in ascending address order so that an
    /// interrupted write leaves a prefix of `data` behind.
    async fn write(&mut self, address: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Size of the store in bytes.
    fn capacity(&self) -> u32;
}

/// Check that `len` bytes at `address` fit inside a store of `capacity` bytes.
#[inline]
pub fn check_bounds(address: u32, len: usize, capacity: u32) -> Result<(), StoreError> {
    let end = u64::from(address) + len as u64;
    if end > u64::from(capacity) {
        Err(StoreError::OutOfBounds { address, len })
    } else {
        Ok(())
    }
}
