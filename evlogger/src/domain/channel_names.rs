//! Channel name table.

use evlogger_store::ByteStore;

use super::entities::{ChannelName, NAME_LEN};
use super::error::LogError;
use super::layout::Layout;
use super::value_objects::ChannelId;

/// Per-line labels stored at the low end of the header store.
///
/// Names are read from the medium on every lookup; nothing is cached.
#[derive(Debug, Clone, Copy)]
pub struct ChannelNames {
    layout: Layout,
}

impl ChannelNames {
    /// Create the table for `layout`.
    pub const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Stored name of `channel`.
    pub async fn read<S: ByteStore>(
        &self,
        store: &mut S,
        channel: ChannelId,
    ) -> Result<ChannelName, LogError<S::Error>> {
        let mut raw = [0u8; NAME_LEN];
        store
            .read(self.layout.name_address(channel), &mut raw)
            .await
            .map_err(LogError::StorageRead)?;
        Ok(ChannelName::from_stored(channel, &raw))
    }

    /// Name of `channel`, or its placeholder if it cannot be read.
    pub async fn read_or_placeholder<S: ByteStore>(
        &self,
        store: &mut S,
        channel: ChannelId,
    ) -> ChannelName {
        match self.read(store, channel).await {
            Ok(name) => name,
            Err(_) => ChannelName::placeholder(channel),
        }
    }

    /// Store a new name for `channel`.
    pub async fn write<S: ByteStore>(
        &self,
        store: &mut S,
        channel: ChannelId,
        name: &ChannelName,
    ) -> Result<(), LogError<S::Error>> {
        store
            .write(self.layout.name_address(channel), name.as_bytes())
            .await
            .map_err(LogError::StorageWrite)?;
        debug!("channel {} renamed", channel);
        Ok(())
    }

    /// Reset every active channel to its placeholder.
    ///
    /// Stops at the first failed write.
    pub async fn reset_all<S: ByteStore>(&self, store: &mut S) -> Result<(), LogError<S::Error>> {
        for channel in ChannelId::all(self.layout.banks()) {
            self.write(store, channel, &ChannelName::placeholder(channel))
                .await?;
        }
        info!("channel names reset");
        Ok(())
    }
}
