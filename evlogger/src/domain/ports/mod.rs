//! Ports define the interfaces between the domain and the outside world.
//!
//! These are the **secondary (driven) ports** the logger needs besides
//! storage, which lives in `evlogger-store` as
//! [`ByteStore`](evlogger_store::ByteStore):
//!
//! - [`Clock`]: the real-time clock
//! - [`InputSource`]: the I/O expanders carrying the monitored lines
//! - [`ResponseSink`]: the network connection a response is streamed to

mod clock;
mod input_source;
mod response_sink;

pub use clock::Clock;
pub use input_source::InputSource;
pub use response_sink::ResponseSink;
