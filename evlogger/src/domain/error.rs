//! Domain-level errors.
//!
//! Storage failures come through the [`ByteStore`](evlogger_store::ByteStore)
//! port's own error type and are wrapped, never interpreted. Everything else
//! is a plain value the caller can match on.

use core::fmt;

/// Errors from log, header and name operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LogError<E> {
    /// A write to the medium failed. The previous durable state stays valid.
    StorageWrite(E),

    /// A read from the medium failed.
    StorageRead(E),

    /// A log or header mutation is already in flight.
    Busy,
}

impl<E> LogError<E> {
    /// Whether the medium reported the failure.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageWrite(_) | Self::StorageRead(_))
    }
}

impl<E: fmt::Display> fmt::Display for LogError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageWrite(e) => write!(f, "Storage write failed: {}", e),
            Self::StorageRead(e) => write!(f, "Storage read failed: {}", e),
            Self::Busy => write!(f, "Log is busy with another operation"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for LogError<E> {}

/// Reasons a request is rejected before it touches any state.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The request line is not a `GET <path>` line.
    MalformedRequest,

    /// No route matches the path.
    UnknownPath,

    /// Bank or pin out of range, or not a hex digit.
    BadChannel,

    /// Empty, too long or non-printable channel name.
    BadName,

    /// Time argument is not a valid calendar time.
    BadTime,
}

impl ProtocolError {
    /// Whether the client sent something unparsable (as opposed to an unknown path).
    pub fn is_bad_request(&self) -> bool {
        !matches!(self, Self::UnknownPath)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRequest => write!(f, "Malformed request line"),
            Self::UnknownPath => write!(f, "Unknown path"),
            Self::BadChannel => write!(f, "Invalid channel coordinates"),
            Self::BadName => write!(f, "Invalid channel name"),
            Self::BadTime => write!(f, "Invalid time"),
        }
    }
}

impl core::error::Error for ProtocolError {}

/// Errors reported by a [`Clock`](super::Clock).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClockError {
    /// The clock could not be reached.
    Unavailable,

    /// The clock returned or rejected an impossible time.
    InvalidTime,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "Clock unavailable"),
            Self::InvalidTime => write!(f, "Clock holds an invalid time"),
        }
    }
}

impl core::error::Error for ClockError {}
