//! Log record entity.

use core::fmt::Write;

use super::ChannelName;
use crate::domain::value_objects::{DateTime, LineState};
use crate::text::TextBuf;

/// Width of one log record.
pub const RECORD_LEN: usize = 64;

const NAME_AT: usize = DateTime::TEXT_LEN + 1;
const STATE_AT: usize = NAME_AT + super::NAME_LEN + 1;

/// One event line: `YYYY-MM-DD HH:MM:SS <name:40> <state:3>`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LogRecord([u8; RECORD_LEN]);

impl LogRecord {
    /// Compose a record for a transition of `name` to `state` at `time`.
    ///
    /// # Examples
    ///
    /// ```
    /// use evlogger::{ChannelName, DateTime, LineState, LogRecord};
    ///
    /// let time = DateTime::new(2024, 5, 1, 8, 0, 0).unwrap();
    /// let record = LogRecord::compose(time, &ChannelName::from_text(b"door").unwrap(), LineState::On);
    /// assert!(record.as_bytes().starts_with(b"2024-05-01 08:00:00 "));
    /// assert!(record.as_bytes().ends_with(b"door  ON"));
    /// ```
    pub fn compose(time: DateTime, name: &ChannelName, state: LineState) -> Self {
        let mut buf = TextBuf::<RECORD_LEN>::new();
        // The three parts add up to exactly RECORD_LEN
        let _ = write!(buf, "{} ", time);
        let _ = buf.push_bytes(name.as_bytes());
        let _ = buf.push(b' ');
        let _ = buf.push_bytes(state.label());

        let mut bytes = [b' '; RECORD_LEN];
        bytes[..buf.len()].copy_from_slice(buf.as_bytes());
        Self(bytes)
    }

    /// Wrap raw bytes read from the medium.
    pub const fn from_bytes(bytes: [u8; RECORD_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub const fn as_bytes(&self) -> &[u8; RECORD_LEN] {
        &self.0
    }

    /// Timestamp field, if it parses.
    pub fn time(&self) -> Option<DateTime> {
        DateTime::parse(&self.0[..DateTime::TEXT_LEN])
    }

    /// The 40-byte name field.
    pub fn name(&self) -> &[u8] {
        &self.0[NAME_AT..NAME_AT + super::NAME_LEN]
    }

    /// State field, if it parses.
    pub fn state(&self) -> Option<LineState> {
        LineState::from_label(&self.0[STATE_AT..])
    }

    /// Whether every byte is still erased.
    pub fn is_erased(&self) -> bool {
        self.0.iter().all(|&b| b == evlogger_store::ERASED_BYTE)
    }
}

impl core::fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("LogRecord")
            .field(&core::str::from_utf8(&self.0).unwrap_or("<binary>"))
            .finish()
    }
}
