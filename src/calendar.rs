//! Calendar date-time value
//!
//! A thin, validated wrapper around [`chrono::NaiveDateTime`]. All date
//! arithmetic goes through epoch seconds, and the usable range is an explicit
//! contract: anything outside [`EPOCH_MIN`]..=[`EPOCH_MAX`] is rejected on
//! construction and clamped by [`CalendarDateTime::plus_days`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use core::fmt;

use crate::config::DAY_SECONDS;

/// 1970-01-01T00:00:00
pub const EPOCH_MIN: i64 = 0;

/// 2099-12-31T23:59:59
pub const EPOCH_MAX: i64 = 4_102_444_799;

/// Short month names, 1-based
const MONTH_NAMES: [&str; 13] = [
    "---", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter month name (`"---"` for anything outside 1..=12)
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES.get(month as usize).copied().unwrap_or(MONTH_NAMES[0])
}

/// Calendar validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalendarError {
    /// Not a real calendar date or time of day
    InvalidDate,
    /// Day of week outside 1..=7
    InvalidDayOfWeek,
    /// Outside the supported epoch range
    OutOfRange,
}

/// An immutable, validated calendar date-time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDateTime {
    datetime: NaiveDateTime,
    /// 1 = Monday .. 7 = Sunday, as reported by the clock
    day_of_week: Option<u8>,
}

impl CalendarDateTime {
    /// Build from calendar fields
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, CalendarError> {
        let datetime = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .ok_or(CalendarError::InvalidDate)?;
        Self::from_naive(datetime)
    }

    /// Wrap a chrono value, checking the epoch range
    pub fn from_naive(datetime: NaiveDateTime) -> Result<Self, CalendarError> {
        let seconds = datetime.and_utc().timestamp();
        if !(EPOCH_MIN..=EPOCH_MAX).contains(&seconds) {
            return Err(CalendarError::OutOfRange);
        }
        Ok(Self {
            datetime,
            day_of_week: None,
        })
    }

    /// Convert back from epoch seconds (UTC)
    pub fn from_epoch_seconds(seconds: i64) -> Result<Self, CalendarError> {
        if !(EPOCH_MIN..=EPOCH_MAX).contains(&seconds) {
            return Err(CalendarError::OutOfRange);
        }
        let datetime = DateTime::from_timestamp(seconds, 0)
            .ok_or(CalendarError::OutOfRange)?
            .naive_utc();
        Ok(Self {
            datetime,
            day_of_week: Some(weekday_of(&datetime)),
        })
    }

    /// Attach the clock's day of week (1 = Monday)
    pub fn with_day_of_week(self, day_of_week: u8) -> Result<Self, CalendarError> {
        if !(1..=7).contains(&day_of_week) {
            return Err(CalendarError::InvalidDayOfWeek);
        }
        Ok(Self {
            day_of_week: Some(day_of_week),
            ..self
        })
    }

    /// Seconds since 1970-01-01T00:00:00 UTC
    pub fn epoch_seconds(&self) -> i64 {
        self.datetime.and_utc().timestamp()
    }

    /// Shift by whole days, clamping to the supported range
    ///
    /// The result carries the day of week computed from its date.
    pub fn plus_days(&self, days: i32) -> Self {
        self.plus_seconds(i64::from(days) * DAY_SECONDS)
    }

    /// Shift by seconds, clamping to the supported range
    pub fn plus_seconds(&self, seconds: i64) -> Self {
        let seconds = self
            .epoch_seconds()
            .saturating_add(seconds)
            .clamp(EPOCH_MIN, EPOCH_MAX);
        // Clamped into range above, so the conversion cannot fail
        Self::from_epoch_seconds(seconds).unwrap_or(*self)
    }

    pub fn year(&self) -> i32 {
        self.datetime.year()
    }

    pub fn month(&self) -> u32 {
        self.datetime.month()
    }

    /// Day of month
    pub fn day(&self) -> u32 {
        self.datetime.day()
    }

    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    pub fn minute(&self) -> u32 {
        self.datetime.minute()
    }

    pub fn second(&self) -> u32 {
        self.datetime.second()
    }

    /// Day of week if known (1 = Monday .. 7 = Sunday)
    pub fn day_of_week(&self) -> Option<u8> {
        self.day_of_week
    }
}

fn weekday_of(datetime: &NaiveDateTime) -> u8 {
    datetime.weekday().number_from_monday() as u8
}

impl fmt::Display for CalendarDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CalendarDateTime {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{=i32}-{=u32:02}-{=u32:02} {=u32:02}:{=u32:02}:{=u32:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        );
    }
}
