//! Wear-leveled header directory.
//!
//! The log bounds are never rewritten in place. Every commit goes to the
//! next slot of a fixed rotation, so wear spreads over the whole slot range,
//! and the slot with the smallest write-order key is the current one.
//!
//! # Commit order
//!
//! A commit writes its slot in two steps:
//!
//! 1. the full 8-byte image with the key field still erased (`0xFFFF_FFFF`)
//! 2. the 4 key bytes
//!
//! Store writes land in ascending address order, so until the most
//! significant key byte is written the slot's key stays at or above
//! `0xFF00_0000`. Commits never write a key above
//! [`HeaderRecord::MAX_KEY`], so recovery ignores such a slot. A power cut
//! anywhere in the commit therefore leaves either the previous record or the
//! new one current, never new bounds under a stale key or the reverse.
//!
//! # Recovery
//!
//! [`recover`](HeaderDirectory::recover) reads every slot once. Slots that
//! are erased, torn, unreadable or hold bounds that are not record addresses
//! inside the log are skipped. Among the rest the smallest key wins; when several
//! slots share it, the one written last in the rotation wins, i.e. the tied
//! slot whose successor is not tied.

use evlogger_store::ByteStore;

use super::entities::{HeaderRecord, RECORD_LEN};
use super::error::LogError;
use super::layout::Layout;
use super::value_objects::LogAddress;

/// Crash-recoverable owner of the log bounds.
///
/// Holds an in-memory copy of the current record. All mutation goes
/// through [`commit`](Self::commit), which keeps the copy authoritative.
#[derive(Debug, Clone)]
pub struct HeaderDirectory {
    layout: Layout,
    current: HeaderRecord,
    /// Slot holding `current`. `header_end` before anything was found, so the
    /// first commit lands on `header_start`.
    slot: u32,
    recovered: bool,
}

impl HeaderDirectory {
    /// Create a directory for `layout`. Call [`recover`](Self::recover) before use.
    pub const fn new(layout: Layout) -> Self {
        Self {
            layout,
            current: HeaderRecord::EMPTY,
            slot: layout.header_end(),
            recovered: false,
        }
    }

    /// Storage geometry.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Scan all slots and load the current record.
    ///
    /// Runs in time proportional to the slot count. Never fails: with no
    /// usable slot the log is empty at address 0.
    pub async fn recover<S: ByteStore>(&mut self, store: &mut S) -> HeaderRecord {
        let count = self.layout.slot_count();

        // Best candidate so far: (slot index, record)
        let mut best: Option<(u32, HeaderRecord)> = None;
        // Tied run starting at index 0, for a tie that wraps the rotation
        let mut leading: Option<(u32, HeaderRecord)> = None;
        let mut skipped = 0u32;

        for index in 0..count {
            let address = self.layout.slot_address(index);
            let record = match self.read_slot(store, address).await {
                Ok(record) if self.is_usable(&record) => record,
                Ok(_) => continue,
                Err(_e) => {
                    skipped += 1;
                    continue;
                }
            };

            match best {
                Some((_, b)) if record.key() > b.key() => {}
                Some((_, b)) if record.key() == b.key() => {
                    if let Some((end, _)) = leading {
                        if end + 1 == index {
                            leading = Some((index, record));
                        }
                    }
                    best = Some((index, record));
                }
                _ => {
                    best = Some((index, record));
                    leading = (index == 0).then_some((index, record));
                }
            }
        }

        if skipped > 0 {
            warn!("header scan: {} unreadable slots skipped", skipped);
        }

        // A tied run covering both ends continues from the last slot to slot 0
        let chosen = match (best, leading) {
            (Some((index, _)), Some((end, record))) if index == count - 1 && end != index => {
                Some((end, record))
            }
            (best, _) => best,
        };

        match chosen {
            Some((index, record)) => {
                self.current = record;
                self.slot = self.layout.slot_address(index);
                info!(
                    "header recovered from slot {:04x}: newest {} oldest {}",
                    self.slot,
                    record.newest(),
                    record.oldest()
                );
            }
            None => {
                self.current = HeaderRecord::EMPTY;
                self.slot = self.layout.header_end();
                info!("no header found, starting with an empty log");
            }
        }
        self.recovered = true;
        self.current
    }

    /// Re-read the current slot.
    ///
    /// Keeps the cached record if the slot cannot be read or no longer holds
    /// a usable record.
    pub async fn reload<S: ByteStore>(&mut self, store: &mut S) -> HeaderRecord {
        match self.read_slot(store, self.slot).await {
            Ok(record) if self.is_usable(&record) && record.key() <= self.current.key() => {
                self.current = record;
            }
            Ok(_) => {}
            Err(e) => {
                debug!("header reload failed: {:?}", e);
            }
        }
        self.current
    }

    /// The cached current record.
    #[inline]
    pub fn current(&self) -> HeaderRecord {
        self.current
    }

    /// Address of the slot holding the current record.
    #[inline]
    pub fn slot_address(&self) -> u32 {
        self.slot
    }

    /// Time encoded in the current record's key, if one was ever committed.
    pub fn newest_time(&self) -> Option<u32> {
        self.current
            .is_committed()
            .then(|| self.current.written_at())
    }

    /// Whether [`recover`](Self::recover) has run.
    #[inline]
    pub fn is_recovered(&self) -> bool {
        self.recovered
    }

    /// Write new bounds to the next slot in the rotation.
    ///
    /// The key is derived from `unix_time` but never exceeds the current
    /// key, so a clock running backwards produces ties instead of making an
    /// older slot win. On failure the new bounds are kept in memory anyway
    /// and the error is returned.
    pub async fn commit<S: ByteStore>(
        &mut self,
        store: &mut S,
        newest: LogAddress,
        oldest: LogAddress,
        unix_time: u32,
    ) -> Result<(), LogError<S::Error>> {
        let key = HeaderRecord::key_for(unix_time)
            .min(self.current.key())
            .min(HeaderRecord::MAX_KEY);
        let record = HeaderRecord::new(key, newest, oldest);
        let slot = self.layout.next_slot(self.slot);

        self.current = record;
        self.slot = slot;

        let image = record.encode();
        let mut staged = image;
        staged[..4].copy_from_slice(&HeaderRecord::ERASED_KEY.to_le_bytes());

        let result = match store.write(slot, &staged).await {
            Ok(()) => store.write(slot, &image[..4]).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                trace!(
                    "header commit to {:04x}: newest {} oldest {}",
                    slot, newest, oldest
                );
                Ok(())
            }
            Err(e) => {
                warn!("header commit to {:04x} failed: {:?}", slot, e);
                Err(LogError::StorageWrite(e))
            }
        }
    }

    /// Mark every record as consumed: `oldest = newest`, then commit.
    ///
    /// Never touches the log region.
    pub async fn clear<S: ByteStore>(
        &mut self,
        store: &mut S,
        unix_time: u32,
    ) -> Result<(), LogError<S::Error>> {
        let newest = self.current.newest();
        self.commit(store, newest, newest, unix_time).await
    }

    /// Read and decode the slot at `address`.
    pub async fn read_slot<S: ByteStore>(
        &self,
        store: &mut S,
        address: u32,
    ) -> Result<HeaderRecord, S::Error> {
        let mut buf = [0u8; HeaderRecord::ENCODED_LEN];
        store.read(address, &mut buf).await?;
        Ok(HeaderRecord::decode(&buf))
    }

    fn is_usable(&self, record: &HeaderRecord) -> bool {
        record.is_committed() && record.is_plausible(RECORD_LEN as u32, self.layout.log_capacity())
    }
}
