//! Value objects for the domain layer.
//!
//! Small validated `Copy` types that keep addresses, channel coordinates and
//! timestamps from being mixed up with plain integers.

mod channel_id;
mod date_time;
mod line_state;
mod log_address;

pub use channel_id::{ChannelId, LINES_PER_BANK, MAX_BANKS};
pub use date_time::DateTime;
pub use line_state::LineState;
pub use log_address::LogAddress;
