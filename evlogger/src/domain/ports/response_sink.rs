//! ResponseSink port.

/// Destination of a streamed response.
///
/// Responses arrive as bounded chunks; `last` marks the chunk that carries
/// the end-of-response marker. An empty chunk with `last` set is valid.
pub trait ResponseSink {
    /// Error reported by the connection.
    type Error: core::fmt::Debug;

    /// Send one chunk.
    async fn send(&mut self, chunk: &[u8], last: bool) -> Result<(), Self::Error>;
}
