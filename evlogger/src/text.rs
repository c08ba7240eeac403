//! Fixed-capacity text buffer used for records and response chunks.

use core::fmt;

/// Stack buffer that accepts `core::fmt` output up to `N` bytes.
///
/// Writes that would overflow fail with `fmt::Error` and leave the buffer
/// holding everything that fit.
#[derive(Clone)]
pub(crate) struct TextBuf<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> TextBuf<N> {
    pub(crate) const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    /// Append raw bytes. Fails without writing anything if they do not fit.
    pub(crate) fn push_bytes(&mut self, data: &[u8]) -> Result<(), fmt::Error> {
        if data.len() > N - self.len {
            return Err(fmt::Error);
        }
        self.bytes[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        Ok(())
    }

    pub(crate) fn push(&mut self, byte: u8) -> Result<(), fmt::Error> {
        self.push_bytes(&[byte])
    }
}

impl<const N: usize> fmt::Write for TextBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes())
    }
}
