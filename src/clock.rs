//! Clock source
//!
//! Reads follow the `nb` convention: `WouldBlock` means the clock has no
//! usable time yet and the caller should come back later.

use core::convert::Infallible;

use crate::calendar::CalendarDateTime;

/// Something that knows the current date and time
pub trait ClockSource {
    type Error;

    /// Current date-time, or `WouldBlock` while the clock is not ready
    fn read(&mut self) -> nb::Result<CalendarDateTime, Self::Error>;

    /// Set the clock
    fn write(&mut self, value: CalendarDateTime) -> Result<(), Self::Error>;
}

/// Software real-time clock
///
/// Holds the last time it was set and is moved forward by whoever owns the
/// tick source. Sub-second remainders are carried between calls.
#[derive(Debug, Clone, Default)]
pub struct SoftRtc {
    now: Option<CalendarDateTime>,
    pending_ms: u32,
}

impl SoftRtc {
    /// A clock that has not been set yet
    pub const fn new() -> Self {
        Self {
            now: None,
            pending_ms: 0,
        }
    }

    /// A clock already running from `start`
    pub fn starting_at(start: CalendarDateTime) -> Self {
        Self {
            now: Some(start),
            pending_ms: 0,
        }
    }

    pub fn is_set(&self) -> bool {
        self.now.is_some()
    }

    /// Current value without the `nb` wrapper
    pub fn now(&self) -> Option<CalendarDateTime> {
        self.now
    }

    /// Move the clock forward by `millis`
    ///
    /// Does nothing until the clock has been set.
    pub fn advance_millis(&mut self, millis: u32) {
        let Some(now) = self.now else {
            return;
        };
        let total = self.pending_ms.saturating_add(millis);
        self.pending_ms = total % 1_000;
        let seconds = i64::from(total / 1_000);
        if seconds > 0 {
            self.now = Some(now.plus_seconds(seconds));
        }
    }
}

impl ClockSource for SoftRtc {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<CalendarDateTime, Infallible> {
        self.now.ok_or(nb::Error::WouldBlock)
    }

    fn write(&mut self, value: CalendarDateTime) -> Result<(), Infallible> {
        self.now = Some(value);
        self.pending_ms = 0;
        Ok(())
    }
}

/// Bounded exponential retry delay
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Backoff {
    initial_ms: u32,
    max_ms: u32,
    next_ms: u32,
}

impl Backoff {
    pub fn new(initial_ms: u32, max_ms: u32) -> Self {
        let initial_ms = initial_ms.max(1);
        let max_ms = max_ms.max(initial_ms);
        Self {
            initial_ms,
            max_ms,
            next_ms: initial_ms,
        }
    }

    /// Delay to wait now; the following one is doubled up to the cap
    pub fn next_delay(&mut self) -> u32 {
        let delay = self.next_ms;
        self.next_ms = delay.saturating_mul(2).min(self.max_ms);
        delay
    }

    /// Start again from the initial delay
    pub fn reset(&mut self) {
        self.next_ms = self.initial_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> CalendarDateTime {
        CalendarDateTime::new(2025, 12, 31, 23, 59, 58).unwrap()
    }

    #[test]
    fn test_unset_clock_would_block() {
        let mut rtc = SoftRtc::new();
        assert!(!rtc.is_set());
        assert_eq!(rtc.read(), Err(nb::Error::WouldBlock));

        rtc.advance_millis(5_000);
        assert_eq!(rtc.read(), Err(nb::Error::WouldBlock));

        rtc.write(start()).unwrap();
        assert_eq!(rtc.read(), Ok(start()));
    }

    #[test]
    fn test_advance_carries_milliseconds() {
        let mut rtc = SoftRtc::starting_at(start());
        rtc.advance_millis(600);
        assert_eq!(rtc.now(), Some(start()));

        rtc.advance_millis(600);
        assert_eq!(rtc.now().unwrap().second(), 59);

        // 200 ms left over + 1800 ms crosses the new year
        rtc.advance_millis(1_800);
        let now = rtc.read().unwrap();
        assert_eq!((now.year(), now.month(), now.day()), (2026, 1, 1));
        assert_eq!((now.hour(), now.minute(), now.second()), (0, 0, 1));
    }

    #[test]
    fn test_write_resets_remainder() {
        let mut rtc = SoftRtc::starting_at(start());
        rtc.advance_millis(900);
        rtc.write(start()).unwrap();
        rtc.advance_millis(200);
        assert_eq!(rtc.now(), Some(start()));
    }

    #[test]
    fn test_backoff_doubles_to_cap() {
        let mut backoff = Backoff::new(250, 2_000);
        let delays: [u32; 6] = core::array::from_fn(|_| backoff.next_delay());
        assert_eq!(delays, [250, 500, 1_000, 2_000, 2_000, 2_000]);

        backoff.reset();
        assert_eq!(backoff.next_delay(), 250);
    }

    #[test]
    fn test_backoff_degenerate_bounds() {
        let mut backoff = Backoff::new(0, 0);
        assert_eq!(backoff.next_delay(), 1);
        assert_eq!(backoff.next_delay(), 1);
    }
}
