//! Ring log of fixed-width records.
//!
//! ```text
//!   oldest              newest
//!     │                   │
//!     ▼                   ▼
//! ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! │   │ A │ B │ C │ D │   │   │   │   64-byte record slots
//! └───┴───┴───┴───┴───┴───┴───┴───┘
//!       ◄──────────── cursor walks newest → oldest
//! ```
//!
//! `newest` is the next write target and `oldest` the oldest live record;
//! both wrap at the log capacity. `newest == oldest` means empty, so one slot
//! always stays free and the ring holds `slots - 1` records. When an append
//! would make the two meet, `oldest` moves on and the oldest record is gone.

use evlogger_store::ByteStore;

use super::entities::{LogRecord, RECORD_LEN};
use super::error::LogError;
use super::header_directory::HeaderDirectory;
use super::layout::Layout;
use super::value_objects::LogAddress;

const STEP: u32 = RECORD_LEN as u32;

/// Append path and read path of the record ring.
///
/// Holds no bounds of its own; they live in the [`HeaderDirectory`].
#[derive(Debug, Clone, Copy)]
pub struct EventLog {
    layout: Layout,
}

impl EventLog {
    /// Create the log for `layout`.
    pub const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Records the ring can hold at once.
    #[inline]
    pub const fn capacity(&self) -> u32 {
        self.layout.max_records()
    }

    /// Live records, from address math only.
    pub fn len(&self, header: &HeaderDirectory) -> u32 {
        let current = header.current();
        current
            .newest()
            .distance_from(current.oldest(), self.layout.log_capacity())
            / STEP
    }

    /// Whether no record is live.
    pub fn is_empty(&self, header: &HeaderDirectory) -> bool {
        header.current().is_empty()
    }

    /// Write `record` at `newest`, advance the bounds and commit them.
    ///
    /// A full ring drops its oldest record. If the record write fails the
    /// header is left alone, so the advertised bounds still describe what
    /// is durably on the medium.
    pub async fn append<H, D>(
        &self,
        header: &mut HeaderDirectory,
        header_store: &mut H,
        data_store: &mut D,
        record: &LogRecord,
        unix_time: u32,
    ) -> Result<(), LogError<H::Error>>
    where
        H: ByteStore,
        D: ByteStore<Error = H::Error>,
    {
        let capacity = self.layout.log_capacity();
        let current = header.current();
        let target = current.newest();

        data_store
            .write(u32::from(target.value()), record.as_bytes())
            .await
            .map_err(LogError::StorageWrite)?;

        let newest = target.advance(STEP, capacity);
        let mut oldest = current.oldest();
        if newest == oldest {
            oldest = oldest.advance(STEP, capacity);
            debug!("log full, dropping record at {}", current.oldest());
        }

        header.commit(header_store, newest, oldest, unix_time).await
    }

    /// Lazy walk over the live records, newest first, at most `limit` of them.
    ///
    /// The cursor is a snapshot of the bounds; ask for a new one to restart.
    pub fn cursor(&self, header: &HeaderDirectory, limit: Option<u32>) -> LogCursor {
        let len = self.len(header);
        LogCursor {
            position: header.current().newest(),
            capacity: self.layout.log_capacity(),
            remaining: limit.map_or(len, |limit| limit.min(len)),
        }
    }

    /// Drop every live record without touching the log region.
    pub async fn truncate<S: ByteStore>(
        &self,
        header: &mut HeaderDirectory,
        header_store: &mut S,
        unix_time: u32,
    ) -> Result<(), LogError<S::Error>> {
        header.clear(header_store, unix_time).await
    }
}

/// Newest-first iterator over log records.
///
/// Reads one record per call to [`next`](Self::next). A failed read yields
/// an error for that record and the walk continues with the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogCursor {
    position: LogAddress,
    capacity: u32,
    remaining: u32,
}

impl LogCursor {
    /// Records still to come.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Read the next record, or `None` once the walk reached its end.
    pub async fn next<S: ByteStore>(
        &mut self,
        store: &mut S,
    ) -> Option<Result<LogRecord, LogError<S::Error>>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.position = self.position.retreat(STEP, self.capacity);

        let mut bytes = [0u8; RECORD_LEN];
        Some(
            store
                .read(u32::from(self.position.value()), &mut bytes)
                .await
                .map(|()| LogRecord::from_bytes(bytes))
                .map_err(LogError::StorageRead),
        )
    }
}
