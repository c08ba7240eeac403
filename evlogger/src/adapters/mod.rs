//! Adapter layer - concrete implementations of the domain's ports.
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │      Domain Layer                │
//!     │  - InputSource (port)            │
//!     │  - ResponseSink (port)           │
//!     └────────────┬─────────────────────┘
//!                  │
//!                  │ implements
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │      Adapter Layer               │  ◄── This module
//!     │  - IoSink                        │
//!     │  - LatchedInput                  │
//!     └────────────┬─────────────────────┘
//!                  │
//!                  │ uses
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │  embedded-io-async / interrupts  │
//!     └──────────────────────────────────┘
//! ```

mod io_sink;
mod latched_input;

pub use io_sink::IoSink;
pub use latched_input::{InterruptLatch, LatchedInput, NoSuchBank};
