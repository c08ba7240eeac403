//! Domain layer - the logger's data model and services.
//!
//! ```text
//!     ┌────────────────────────────────────────────┐
//!     │              Domain Layer                  │
//!     │                                            │
//!     │  Value objects   LogAddress, ChannelId,    │
//!     │                  DateTime, LineState,      │
//!     │                  Layout                    │
//!     │  Entities        HeaderRecord, LogRecord,  │
//!     │                  ChannelName               │
//!     │                                            │
//!     │  Services        HeaderDirectory ◄── EventLog
//!     │                  ChannelNames              │
//!     │                  ChannelDetector           │
//!     │                        │                   │
//!     │  Ports           ByteStore (evlogger-store)│
//!     │                  Clock, InputSource,       │
//!     │                  ResponseSink              │
//!     └────────────────────────────────────────────┘
//! ```
//!
//! Services hold no storage handles. The controller passes the stores in by
//! reference on every call, so all mutable state has exactly one owner.

pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

mod channel_names;
mod detector;
mod event_log;
mod header_directory;
mod layout;

pub use channel_names::ChannelNames;
pub use detector::{ChannelDetector, Transition, Transitions};
pub use entities::{ChannelName, HeaderRecord, LogRecord, NAME_LEN, RECORD_LEN};
pub use error::{ClockError, LogError, ProtocolError};
pub use event_log::{EventLog, LogCursor};
pub use header_directory::HeaderDirectory;
pub use layout::Layout;
pub use ports::{Clock, InputSource, ResponseSink};
pub use value_objects::{ChannelId, DateTime, LINES_PER_BANK, LineState, LogAddress, MAX_BANKS};
