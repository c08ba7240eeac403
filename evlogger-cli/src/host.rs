//! Host implementations of the logger's ports.
//!
//! - EEPROM images are plain files in the data directory, accessed through
//!   [`StreamStore`] and `embedded-io-adapters`
//! - the clock is the system clock plus an adjustable offset
//! - line levels come from a text file, one bank per line

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use embedded_io_adapters::tokio_1::FromTokio;
use evlogger::{Clock, ClockError, DateTime, InputSource, Logger, LoggerConfig};
use evlogger_store::StreamStore;
use log::info;

/// EEPROM image backed by a file.
pub type FileStore = StreamStore<FromTokio<tokio::fs::File>>;

/// Logger running on image files.
pub type HostLogger<I> = Logger<FileStore, FileStore, SystemClock, I>;

/// Size of the image holding names and header slots.
pub const HEADER_IMAGE_LEN: u32 = 0x1_0000;

/// Open `path` as a store of `capacity` bytes, formatting it if it is new.
pub async fn open_image(path: &Path, capacity: u32) -> Result<FileStore> {
    let exists = tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("checking {}", path.display()))?;
    let file = tokio::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .with_context(|| format!("opening {}", path.display()))?;

    let mut store = StreamStore::new(FromTokio::new(file), capacity);
    if !exists {
        store
            .format()
            .await
            .with_context(|| format!("formatting {}", path.display()))?;
        info!("created blank image {} ({} bytes)", path.display(), capacity);
    }
    Ok(store)
}

/// Open both images in `data_dir` and boot a logger on them.
pub async fn open_logger<I: InputSource>(
    data_dir: &Path,
    config: LoggerConfig,
    inputs: I,
) -> Result<HostLogger<I>> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("creating {}", data_dir.display()))?;

    let header = open_image(&data_dir.join("header.bin"), HEADER_IMAGE_LEN).await?;
    let data = open_image(&data_dir.join("data.bin"), config.layout.log_capacity()).await?;

    let mut logger = Logger::new(config, header, data, SystemClock::default(), inputs);
    logger.boot().await;
    Ok(logger)
}

/// System time shifted by an offset that `set` adjusts.
#[derive(Debug, Default)]
pub struct SystemClock {
    offset: i64,
}

impl SystemClock {
    fn unix_now(&self) -> i64 {
        Utc::now().timestamp() + self.offset
    }
}

impl Clock for SystemClock {
    async fn now(&mut self) -> Result<DateTime, ClockError> {
        u32::try_from(self.unix_now())
            .map(DateTime::from_unix)
            .map_err(|_| ClockError::InvalidTime)
    }

    async fn set(&mut self, time: DateTime) -> Result<(), ClockError> {
        self.offset = i64::from(time.to_unix()) - Utc::now().timestamp();
        Ok(())
    }
}

/// Line levels read from a text file.
///
/// Line `n` of the file (blank lines and `#` comments skipped) is bank `n`,
/// written as 16 binary digits (`_` allowed) or as `0x` hex. A missing file
/// or line reads as all lines off.
#[derive(Debug, Clone)]
pub struct FileInputs {
    path: PathBuf,
}

impl FileInputs {
    /// Read levels from `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl InputSource for FileInputs {
    type Error = io::Error;

    async fn read_bank(&mut self, bank: u8) -> Result<u16, Self::Error> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => parse_bank(&text, bank),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }
}

/// Levels of `bank` from the inputs file format.
pub fn parse_bank(text: &str, bank: u8) -> io::Result<u16> {
    let Some(line) = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .nth(bank as usize)
    else {
        return Ok(0);
    };

    let parsed = match line.strip_prefix("0x").or_else(|| line.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => u16::from_str_radix(&line.replace('_', ""), 2),
    };
    parsed.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("bank {}: {}", bank, e)))
}
