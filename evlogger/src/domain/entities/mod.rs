//! Domain entities.
//!
//! Fixed-width on-medium records. Each entity owns its byte encoding so no
//! other module does offset arithmetic on raw buffers.

mod channel_name;
mod header_record;
mod log_record;

pub use channel_name::{ChannelName, NAME_LEN};
pub use header_record::HeaderRecord;
pub use log_record::{LogRecord, RECORD_LEN};
