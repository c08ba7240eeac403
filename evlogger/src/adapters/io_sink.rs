//! `ResponseSink` over an `embedded-io-async` writer.

use embedded_io_async::Write;

use crate::domain::ResponseSink;

/// Streams response chunks into any [`embedded_io_async::Write`].
///
/// The writer is flushed after the last chunk. Closing the connection is up
/// to the caller.
///
/// # Example
///
/// ```ignore
/// use embedded_io_adapters::tokio_1::FromTokio;
/// use evlogger::IoSink;
///
/// let (stream, _) = listener.accept().await?;
/// let mut sink = IoSink::new(FromTokio::new(stream));
/// logger.serve(&request, &mut sink).await?;
/// ```
pub struct IoSink<W> {
    writer: W,
    sent: usize,
}

impl<W> IoSink<W> {
    /// Wrap `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, sent: 0 }
    }

    /// Bytes sent so far.
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResponseSink for IoSink<W> {
    type Error = W::Error;

    async fn send(&mut self, chunk: &[u8], last: bool) -> Result<(), Self::Error> {
        self.writer.write_all(chunk).await?;
        self.sent += chunk.len();
        if last {
            self.writer.flush().await?;
        }
        Ok(())
    }
}
