//! Chunked response writing.

use core::fmt::{self, Write};

use crate::domain::{ProtocolError, ResponseSink};
use crate::text::TextBuf;

/// Largest chunk handed to a [`ResponseSink`].
pub const CHUNK_CAPACITY: usize = 128;

/// Response status.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 200
    Ok,
    /// 400
    BadRequest,
    /// 404
    NotFound,
    /// 500
    InternalError,
    /// 503
    Busy,
}

impl Status {
    /// Numeric status code.
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalError => 500,
            Self::Busy => 503,
        }
    }

    /// Reason phrase for the status line.
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::InternalError => "Internal Server Error",
            Self::Busy => "Service Unavailable",
        }
    }

    /// Body sent for an error status.
    pub const fn body(self) -> &'static [u8] {
        match self {
            Self::Ok => b"",
            Self::BadRequest => b"bad request\n",
            Self::NotFound => b"page not found\n",
            Self::InternalError => b"storage error\n",
            Self::Busy => b"busy\n",
        }
    }
}

impl From<ProtocolError> for Status {
    fn from(err: ProtocolError) -> Self {
        if err.is_bad_request() {
            Self::BadRequest
        } else {
            Self::NotFound
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// Buffers output into chunks of at most [`CHUNK_CAPACITY`] bytes.
///
/// A full chunk is only sent once more output arrives, so the chunk sent by
/// [`finish`](Self::finish) is always the one carrying the end marker.
pub(crate) struct ResponseWriter<'a, S> {
    sink: &'a mut S,
    chunk: TextBuf<CHUNK_CAPACITY>,
}

impl<'a, S: ResponseSink> ResponseWriter<'a, S> {
    pub(crate) fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            chunk: TextBuf::new(),
        }
    }

    /// Status line and fixed headers.
    pub(crate) async fn start(&mut self, status: Status) -> Result<(), S::Error> {
        let mut line = TextBuf::<48>::new();
        // Longest status line is well under 48 bytes
        let _ = write!(line, "HTTP/1.0 {}\r\n", status);
        self.write(line.as_bytes()).await?;
        self.write(b"Powered-By: evlogger\r\nContent-Type: text/plain\r\n\r\n")
            .await
    }

    pub(crate) async fn write(&mut self, mut data: &[u8]) -> Result<(), S::Error> {
        while !data.is_empty() {
            if self.chunk.len() == CHUNK_CAPACITY {
                self.sink.send(self.chunk.as_bytes(), false).await?;
                self.chunk.clear();
            }
            let n = (CHUNK_CAPACITY - self.chunk.len()).min(data.len());
            let _ = self.chunk.push_bytes(&data[..n]);
            data = &data[n..];
        }
        Ok(())
    }

    /// Format `args` and write the result; output past 96 bytes is cut.
    pub(crate) async fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), S::Error> {
        let mut line = TextBuf::<96>::new();
        let _ = line.write_fmt(args);
        self.write(line.as_bytes()).await
    }

    /// Send the last chunk with the end marker.
    pub(crate) async fn finish(self) -> Result<(), S::Error> {
        self.sink.send(self.chunk.as_bytes(), true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture {
        chunks: Vec<(Vec<u8>, bool)>,
    }

    impl ResponseSink for Capture {
        type Error = core::convert::Infallible;

        async fn send(&mut self, chunk: &[u8], last: bool) -> Result<(), Self::Error> {
            self.chunks.push((chunk.to_vec(), last));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_preamble() {
        let mut sink = Capture::default();
        let mut writer = ResponseWriter::new(&mut sink);
        writer.start(Status::NotFound).await.unwrap();
        writer.write(Status::NotFound.body()).await.unwrap();
        writer.finish().await.unwrap();

        assert_eq!(sink.chunks.len(), 1);
        let (body, last) = &sink.chunks[0];
        assert!(last);
        assert_eq!(
            body.as_slice(),
            b"HTTP/1.0 404 Not Found\r\nPowered-By: evlogger\r\nContent-Type: text/plain\r\n\r\npage not found\n"
        );
    }

    #[tokio::test]
    async fn test_chunks_are_bounded_and_last_is_marked() {
        let mut sink = Capture::default();
        let mut writer = ResponseWriter::new(&mut sink);
        for _ in 0..5 {
            writer.write(&[b'x'; 64]).await.unwrap();
        }
        writer.finish().await.unwrap();

        let sizes: Vec<usize> = sink.chunks.iter().map(|(c, _)| c.len()).collect();
        assert_eq!(sizes, vec![128, 128, 64]);
        let flags: Vec<bool> = sink.chunks.iter().map(|(_, last)| *last).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[tokio::test]
    async fn test_exact_multiple_keeps_final_chunk_for_marker() {
        let mut sink = Capture::default();
        let mut writer = ResponseWriter::new(&mut sink);
        writer.write(&[b'x'; 256]).await.unwrap();
        writer.finish().await.unwrap();

        assert_eq!(sink.chunks.len(), 2);
        assert_eq!(sink.chunks[1].0.len(), 128);
        assert!(sink.chunks[1].1);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Status::from(ProtocolError::UnknownPath), Status::NotFound);
        assert_eq!(Status::from(ProtocolError::BadTime), Status::BadRequest);
        assert_eq!(Status::Busy.code(), 503);
    }
}
