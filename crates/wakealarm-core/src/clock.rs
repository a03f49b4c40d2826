//! Local wall-clock view derived from the system clock on demand.

use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
use log::warn;

use crate::io::SystemClock;

/// Anything earlier than 2016-01-01T00:00:00Z means the clock was never set.
pub const MIN_VALID_UNIX_SECS: u64 = 1_451_606_400;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClockError {
    NotSet,
    /// The clock holds a value jiff cannot represent.
    OutOfRange,
}

/// Builds the zone for a POSIX `TZ` rule such as `MST7MDT,M3.2.0,M11.1.0`.
///
/// A rule that does not parse falls back to UTC.
pub fn zone_from_rule(rule: &str) -> TimeZone {
    match TimeZone::posix(rule) {
        Ok(tz) => tz,
        Err(err) => {
            warn!("tz: cannot parse {:?} ({}); using UTC", rule, err);
            TimeZone::UTC
        }
    }
}

/// The most recent successful read of local time. Never persisted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LocalTime(DateTime);

impl LocalTime {
    pub const fn new(datetime: DateTime) -> Self {
        Self(datetime)
    }

    pub fn from_unix(unix_secs: u64, tz: &TimeZone) -> Result<Self, ClockError> {
        if unix_secs < MIN_VALID_UNIX_SECS {
            return Err(ClockError::NotSet);
        }
        let secs = i64::try_from(unix_secs).map_err(|_| ClockError::OutOfRange)?;
        let timestamp = Timestamp::from_second(secs).map_err(|_| ClockError::OutOfRange)?;
        Ok(Self(tz.to_datetime(timestamp)))
    }

    pub fn datetime(&self) -> DateTime {
        self.0
    }

    pub fn hour(&self) -> u8 {
        self.0.hour() as u8
    }

    pub fn minute(&self) -> u8 {
        self.0.minute() as u8
    }

    pub fn second(&self) -> u8 {
        self.0.second() as u8
    }
}

/// Reads the system clock and converts it through `tz`.
pub fn read_local<C>(clock: &C, tz: &TimeZone) -> Result<LocalTime, ClockError>
where
    C: SystemClock + ?Sized,
{
    LocalTime::from_unix(clock.now_unix_secs(), tz)
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday, date};

    use super::*;

    const MOUNTAIN: &str = "MST7MDT,M3.2.0,M11.1.0";

    #[test]
    fn unset_clock_is_rejected() {
        assert_eq!(
            LocalTime::from_unix(12, &TimeZone::UTC),
            Err(ClockError::NotSet)
        );
        assert_eq!(
            LocalTime::from_unix(MIN_VALID_UNIX_SECS - 1, &TimeZone::UTC),
            Err(ClockError::NotSet)
        );
    }

    #[test]
    fn unrepresentable_clock_is_rejected() {
        assert_eq!(
            LocalTime::from_unix(u64::MAX, &TimeZone::UTC),
            Err(ClockError::OutOfRange)
        );
    }

    #[test]
    fn utc_fields_are_split() {
        // 2025-01-15T13:05:09Z, a Wednesday.
        let time = LocalTime::from_unix(1_736_946_309, &TimeZone::UTC).unwrap();
        assert_eq!(time, LocalTime::new(date(2025, 1, 15).at(13, 5, 9, 0)));
        assert_eq!(time.datetime().weekday(), Weekday::Wednesday);
        assert_eq!((time.hour(), time.minute(), time.second()), (13, 5, 9));
    }

    #[test]
    fn timezone_shifts_into_previous_day() {
        let tz = zone_from_rule(MOUNTAIN);
        // 2025-01-15T03:00:00Z is 20:00 MST on the 14th.
        let time = LocalTime::from_unix(1_736_910_000, &tz).unwrap();
        assert_eq!(time, LocalTime::new(date(2025, 1, 14).at(20, 0, 0, 0)));
        assert_eq!(time.datetime().weekday(), Weekday::Tuesday);
    }

    #[test]
    fn daylight_time_is_applied_in_summer() {
        let tz = zone_from_rule(MOUNTAIN);
        // 2024-07-04T18:30:15Z is 12:30:15 MDT.
        let time = LocalTime::from_unix(1_720_117_815, &tz).unwrap();
        assert_eq!((time.hour(), time.minute(), time.second()), (12, 30, 15));
    }

    #[test]
    fn daylight_time_ends_on_first_november_sunday() {
        let tz = zone_from_rule(MOUNTAIN);
        // 2025-11-02T07:59:59Z is 01:59:59 MDT; one second later is 01:00 MST.
        let before = LocalTime::from_unix(1_762_070_399, &tz).unwrap();
        let after = LocalTime::from_unix(1_762_070_400, &tz).unwrap();
        assert_eq!((before.hour(), before.minute(), before.second()), (1, 59, 59));
        assert_eq!((after.hour(), after.minute(), after.second()), (1, 0, 0));
    }

    #[test]
    fn bad_rule_falls_back_to_utc() {
        let tz = zone_from_rule("not a zone");
        let time = LocalTime::from_unix(1_736_946_309, &tz).unwrap();
        assert_eq!(time.hour(), 13);
    }
}
