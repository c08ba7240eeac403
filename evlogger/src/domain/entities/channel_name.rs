//! Channel name entity.

use core::fmt::Write;

use crate::domain::value_objects::ChannelId;
use crate::text::TextBuf;

/// Stored width of a channel name.
pub const NAME_LEN: usize = 40;

const PAD: u8 = b' ';
const UNPRINTABLE: u8 = b'?';

/// Fixed-width label of one line, right-aligned and space padded.
///
/// Always holds exactly [`NAME_LEN`] printable ASCII bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ChannelName([u8; NAME_LEN]);

impl ChannelName {
    /// Default label, e.g. 36 spaces followed by `b1c3`.
    pub fn placeholder(channel: ChannelId) -> Self {
        let mut tag = TextBuf::<8>::new();
        // "b{x}c{x}" is at most four bytes for valid ids
        let _ = write!(tag, "{}", channel);
        Self::right_aligned(tag.as_bytes())
    }

    /// Name from user text: 1 to 40 printable ASCII bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use evlogger::ChannelName;
    ///
    /// let name = ChannelName::from_text(b"pump 1 fault").unwrap();
    /// assert_eq!(name.trimmed(), b"pump 1 fault");
    /// assert!(ChannelName::from_text(b"").is_none());
    /// ```
    pub fn from_text(text: &[u8]) -> Option<Self> {
        if text.is_empty() || text.len() > NAME_LEN || !text.iter().all(|&b| is_printable(b)) {
            return None;
        }
        Some(Self::right_aligned(text))
    }

    /// Name as read back from the medium.
    ///
    /// A fully erased slot yields the placeholder for `channel`; any other
    /// non-printable byte reads as `?`.
    pub fn from_stored(channel: ChannelId, stored: &[u8; NAME_LEN]) -> Self {
        if stored.iter().all(|&b| b == evlogger_store::ERASED_BYTE) {
            return Self::placeholder(channel);
        }
        let mut bytes = *stored;
        for b in bytes.iter_mut().filter(|b| !is_printable(**b)) {
            *b = UNPRINTABLE;
        }
        Self(bytes)
    }

    /// The full 40-byte field.
    pub fn as_bytes(&self) -> &[u8; NAME_LEN] {
        &self.0
    }

    /// The name without its leading padding.
    pub fn trimmed(&self) -> &[u8] {
        let start = self.0.iter().position(|&b| b != PAD).unwrap_or(NAME_LEN);
        &self.0[start..]
    }

    /// The full field as text.
    pub fn as_str(&self) -> &str {
        // Printable ASCII only
        core::str::from_utf8(&self.0).unwrap_or("")
    }

    fn right_aligned(text: &[u8]) -> Self {
        let mut bytes = [PAD; NAME_LEN];
        bytes[NAME_LEN - text.len()..].copy_from_slice(text);
        Self(bytes)
    }
}

impl core::fmt::Debug for ChannelName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("ChannelName").field(&self.as_str()).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelName {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

#[inline]
fn is_printable(b: u8) -> bool {
    (0x20..0x7f).contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let name = ChannelName::placeholder(ChannelId::new(1, 11).unwrap());
        assert_eq!(&name.as_bytes()[..36], &[b' '; 36]);
        assert_eq!(&name.as_bytes()[36..], b"b1cb");
        assert_eq!(name.trimmed(), b"b1cb");
    }

    #[test]
    fn test_from_text_right_aligns() {
        let name = ChannelName::from_text(b"door").unwrap();
        assert_eq!(&name.as_bytes()[36..], b"door");
        assert_eq!(name.as_str().len(), NAME_LEN);
    }

    #[test]
    fn test_from_text_limits() {
        assert!(ChannelName::from_text(&[b'x'; NAME_LEN]).is_some());
        assert!(ChannelName::from_text(&[b'x'; NAME_LEN + 1]).is_none());
        assert!(ChannelName::from_text(b"tab\there").is_none());
    }

    #[test]
    fn test_from_stored() {
        let channel = ChannelId::new(0, 2).unwrap();
        let erased = ChannelName::from_stored(channel, &[0xFF; NAME_LEN]);
        assert_eq!(erased, ChannelName::placeholder(channel));

        let mut raw = *ChannelName::from_text(b"ok").unwrap().as_bytes();
        raw[0] = 0xFF;
        raw[1] = 0x00;
        let name = ChannelName::from_stored(channel, &raw);
        assert_eq!(&name.as_bytes()[..2], b"??");
        assert_eq!(&name.as_bytes()[38..], b"ok");
    }
}
