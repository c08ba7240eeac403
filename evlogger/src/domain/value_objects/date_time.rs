//! Wall-clock timestamp value object.
//!
//! The logger stamps records with a plain calendar time in the
//! `YYYY-MM-DD HH:MM:SS` form the real-time clock reports. Calendar
//! validation and unix conversion go through the `time` crate.

use core::fmt;

use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Calendar date and time of day, UTC, second resolution.
///
/// Field order makes the derived ordering chronological.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    /// Width of the text form `YYYY-MM-DD HH:MM:SS`.
    pub const TEXT_LEN: usize = 19;

    /// Width of the compact form `YYYYMMDDhhmmss`.
    pub const COMPACT_LEN: usize = 14;

    /// Earliest representable year.
    pub const MIN_YEAR: u16 = 1970;

    /// Latest year the clock chip can hold.
    pub const MAX_YEAR: u16 = 2099;

    /// `1970-01-01 00:00:00`.
    pub const EPOCH: Self = Self {
        year: 1970,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Create a timestamp, or `None` if it is not a real calendar time.
    ///
    /// # Examples
    ///
    /// ```
    /// use evlogger::DateTime;
    ///
    /// assert!(DateTime::new(2024, 2, 29, 23, 59, 59).is_some());
    /// assert!(DateTime::new(2023, 2, 29, 0, 0, 0).is_none());
    /// ```
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return None;
        }
        let month_enum = Month::try_from(month).ok()?;
        Date::from_calendar_date(i32::from(year), month_enum, day).ok()?;
        Time::from_hms(hour, minute, second).ok()?;
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Timestamp for `secs` seconds after the unix epoch.
    ///
    /// Values past the end of [`MAX_YEAR`](Self::MAX_YEAR) clamp to its last second.
    pub fn from_unix(secs: u32) -> Self {
        let Ok(odt) = OffsetDateTime::from_unix_timestamp(i64::from(secs)) else {
            return Self::EPOCH;
        };
        let year = odt.year() as u16;
        if year > Self::MAX_YEAR {
            return Self {
                year: Self::MAX_YEAR,
                month: 12,
                day: 31,
                hour: 23,
                minute: 59,
                second: 59,
            };
        }
        Self {
            year,
            month: u8::from(odt.month()),
            day: odt.day(),
            hour: odt.hour(),
            minute: odt.minute(),
            second: odt.second(),
        }
    }

    /// Seconds since the unix epoch.
    pub fn to_unix(self) -> u32 {
        let primitive = Month::try_from(self.month)
            .ok()
            .and_then(|month| Date::from_calendar_date(i32::from(self.year), month, self.day).ok())
            .zip(Time::from_hms(self.hour, self.minute, self.second).ok())
            .map(|(date, time)| PrimitiveDateTime::new(date, time));
        match primitive {
            Some(dt) => u32::try_from(dt.assume_utc().unix_timestamp()).unwrap_or(0),
            None => 0,
        }
    }

    /// Parse `YYYY-MM-DD HH:MM:SS`.
    pub fn parse(text: &[u8]) -> Option<Self> {
        if text.len() != Self::TEXT_LEN {
            return None;
        }
        let separators = [(4, b'-'), (7, b'-'), (10, b' '), (13, b':'), (16, b':')];
        if separators.iter().any(|&(at, sep)| text[at] != sep) {
            return None;
        }
        Self::new(
            digits(&text[0..4])? as u16,
            digits(&text[5..7])? as u8,
            digits(&text[8..10])? as u8,
            digits(&text[11..13])? as u8,
            digits(&text[14..16])? as u8,
            digits(&text[17..19])? as u8,
        )
    }

    /// Parse `YYYYMMDDhhmmss`.
    pub fn parse_compact(text: &[u8]) -> Option<Self> {
        if text.len() != Self::COMPACT_LEN {
            return None;
        }
        Self::new(
            digits(&text[0..4])? as u16,
            digits(&text[4..6])? as u8,
            digits(&text[6..8])? as u8,
            digits(&text[8..10])? as u8,
            digits(&text[10..12])? as u8,
            digits(&text[12..14])? as u8,
        )
    }

    /// Year.
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Month, 1-12.
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Day of month, 1-31.
    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Hour, 0-23.
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute, 0-59.
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Second, 0-59.
    pub const fn second(&self) -> u8 {
        self.second
    }
}

impl Default for DateTime {
    fn default() -> Self {
        Self::EPOCH
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn digits(text: &[u8]) -> Option<u32> {
    text.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}
