//! Clock port.

use crate::domain::error::ClockError;
use crate::domain::value_objects::DateTime;

/// Real-time clock.
///
/// Reads are used to stamp records and header commits; a failing clock only
/// degrades the health indicator.
pub trait Clock {
    /// Current wall-clock time.
    async fn now(&mut self) -> Result<DateTime, ClockError>;

    /// Set the wall-clock time.
    async fn set(&mut self, time: DateTime) -> Result<(), ClockError>;
}
