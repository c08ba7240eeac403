//! Stream-backed store.
//!
//! Provides a [`ByteStore`] over any `embedded_io_async::{Read, Write, Seek}`
//! stream. On a host this is how the logger's EEPROM images live in plain
//! files.

use embedded_io_async::{Read, Seek, SeekFrom, Write};

use crate::{ByteStore, ERASED_BYTE, StoreError, check_bounds};

/// [`ByteStore`] wrapper for async I/O streams.
///
/// Bytes past the current end of the stream read as erased, so a short or
/// freshly created image file behaves like a blank chip.
///
/// # Example
///
/// ```ignore
/// use embedded_io_adapters::tokio_1::FromTokio;
/// use evlogger_store::StreamStore;
///
/// let file = tokio::fs::OpenOptions::new().read(true).write(true).create(true).open("header.bin").await?;
/// let store = StreamStore::new(FromTokio::new(file), 0x1_0000);
/// ```
pub struct StreamStore<T> {
    inner: T,
    capacity: u32,
}

impl<T> StreamStore<T> {
    /// Wrap `inner`, exposing `capacity` bytes.
    pub fn new(inner: T, capacity: u32) -> Self {
        Self { inner, capacity }
    }

    /// Consume the wrapper and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> StreamStore<T>
where
    T: Read + Write + Seek,
{
    /// Fill the whole store with erased bytes.
    ///
    /// Writing past the end of a file zero-fills the gap on most file
    /// systems, and zeros are *not* erased bytes. New image files must be
    /// formatted before use.
    pub async fn format(&mut self) -> Result<(), StoreError> {
        const CHUNK: usize = 256;
        let erased = [ERASED_BYTE; CHUNK];
        let mut address = 0u32;
        while address < self.capacity {
            let len = CHUNK.min((self.capacity - address) as usize);
            self.write(address, &erased[..len]).await?;
            address += len as u32;
        }
        Ok(())
    }
}

impl<T> ByteStore for StreamStore<T>
where
    T: Read + Write + Seek,
{
    type Error = StoreError;

    async fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        check_bounds(address, buf.len(), self.capacity)?;
        self.inner
            .seek(SeekFrom::Start(u64::from(address)))
            .await
            .map_err(|_| StoreError::Device)?;

        let mut offset = 0;
        while offset < buf.len() {
            let n = self
                .inner
                .read(&mut buf[offset..])
                .await
                .map_err(|_| StoreError::Device)?;
            if n == 0 {
                // EOF: never-written bytes
                buf[offset..].fill(ERASED_BYTE);
                break;
            }
            offset += n;
        }
        Ok(())
    }

    async fn write(&mut self, address: u32, data: &[u8]) -> Result<(), Self::Error> {
        check_bounds(address, data.len(), self.capacity)?;
        self.inner
            .seek(SeekFrom::Start(u64::from(address)))
            .await
            .map_err(|_| StoreError::Device)?;

        let mut offset = 0;
        while offset < data.len() {
            let n = self
                .inner
                .write(&data[offset..])
                .await
                .map_err(|_| StoreError::Device)?;
            if n == 0 {
                return Err(StoreError::Device);
            }
            offset += n;
        }
        self.inner.flush().await.map_err(|_| StoreError::Device)
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io_adapters::tokio_1::FromTokio;

    async fn open_temp() -> (tempfile::TempDir, StreamStore<FromTokio<tokio::fs::File>>) {
        let dir = tempfile::tempdir().unwrap();
        let file = tokio::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(dir.path().join("image.bin"))
            .await
            .unwrap();
        (dir, StreamStore::new(FromTokio::new(file), 4096))
    }

    #[tokio::test]
    async fn test_empty_file_reads_erased() {
        let (_dir, mut store) = open_temp().await;
        let mut buf = [0u8; 8];
        store.read(100, &mut buf).await.unwrap();
        assert_eq!(buf, [ERASED_BYTE; 8]);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (_dir, mut store) = open_temp().await;
        store.write(64, b"2024-01-01").await.unwrap();

        let mut buf = [0u8; 10];
        store.read(64, &mut buf).await.unwrap();
        assert_eq!(&buf, b"2024-01-01");
    }

    #[tokio::test]
    async fn test_format_erases_everything() {
        let (_dir, mut store) = open_temp().await;
        store.write(0, &[0u8; 16]).await.unwrap();
        store.format().await.unwrap();

        let mut buf = [0u8; 16];
        store.read(0, &mut buf).await.unwrap();
        assert_eq!(buf, [ERASED_BYTE; 16]);
        store.read(4080, &mut buf).await.unwrap();
        assert_eq!(buf, [ERASED_BYTE; 16]);
    }

    #[tokio::test]
    async fn test_bounds() {
        let (_dir, mut store) = open_temp().await;
        assert!(store.write(4090, &[0; 8]).await.is_err());
    }
}
