//! Power-loss resilient event logger core.
//!
//! Watches up to 32 digital alarm/status lines, timestamps every debounced
//! transition and keeps the events in a ring log on byte-erasable
//! non-volatile memory. The log bounds live in a wear-leveled header
//! directory that is recovered by a bounded scan after any uncontrolled
//! reset, with no battery-backed RAM involved.
//!
//! # Architecture
//!
//! The crate follows the ports-and-adapters split:
//!
//! ## Domain Layer (`domain`)
//! - **Value Objects**: `LogAddress`, `ChannelId`, `DateTime`, `LineState`, `Layout`
//! - **Entities**: `HeaderRecord`, `LogRecord`, `ChannelName`
//! - **Services**: `HeaderDirectory`, `EventLog`, `ChannelNames`, `ChannelDetector`
//! - **Ports**: `Clock`, `InputSource`, `ResponseSink` (storage comes from `evlogger-store`)
//!
//! ## Router (`router`)
//! Request parsing and chunked response writing for the text protocol.
//!
//! ## Adapter Layer (`adapters`)
//! - **`IoSink`**: `ResponseSink` over any `embedded_io_async::Write`
//! - **`InterruptLatch` / `LatchedInput`**: interrupt-fed `InputSource`
//!
//! ## Controller (`logger`)
//! [`Logger`] owns every piece of mutable state and runs one cooperative
//! control loop step at a time: poll inputs, serve one request.
//!
//! # Quick Start
//!
//! ```ignore
//! use evlogger::{Logger, LoggerConfig};
//!
//! let mut logger = Logger::new(LoggerConfig::default(), header_eeprom, data_eeprom, rtc, expanders);
//! logger.boot().await;
//!
//! loop {
//!     logger.poll_inputs().await;
//!     if let Some(request) = network.poll() {
//!         logger.serve(request.bytes(), &mut request.sink()).await?;
//!     }
//! }
//! ```
//!
//! # Features
//!
//! - `log`: log through the `log` facade (default)
//! - `defmt`: derive `defmt::Format` on value types
//! - `std`: standard library support for the I/O adapters

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![allow(async_fn_in_trait)]

// This must go first so the macros are visible to the other modules
mod fmt;
mod text;

pub mod adapters;
pub mod domain;
pub mod logger;
pub mod router;

pub use domain::{
    ChannelDetector, ChannelId, ChannelName, ChannelNames, Clock, ClockError, DateTime, EventLog,
    HeaderDirectory, HeaderRecord, InputSource, LINES_PER_BANK, Layout, LineState, LogAddress,
    LogCursor, LogError, LogRecord, MAX_BANKS, NAME_LEN, ProtocolError, RECORD_LEN, ResponseSink,
    Transition, Transitions,
};

pub use adapters::{InterruptLatch, IoSink, LatchedInput, NoSuchBank};
pub use logger::{BusyFlag, BusyGuard, Health, Logger, LoggerConfig, PollReport, Stats};
pub use router::{CHUNK_CAPACITY, Request, Status};

// Re-export the storage port so users can depend on this crate alone
pub use evlogger_store::{ByteStore, SendByteStore, StoreError};
