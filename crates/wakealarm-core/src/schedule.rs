//! Sizing the next suspend interval.

use core::time::Duration;

use crate::{clock::LocalTime, persist::AlarmSetting};

/// Upper bound on any suspend interval.
pub const SLEEP_CEILING: Duration = Duration::from_secs(3_600);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AlarmScheduler {
    ceiling: Duration,
}

impl Default for AlarmScheduler {
    fn default() -> Self {
        Self::new(SLEEP_CEILING)
    }
}

impl AlarmScheduler {
    pub const fn new(ceiling: Duration) -> Self {
        Self { ceiling }
    }

    /// Time until the alarm should next be evaluated, never above the ceiling.
    ///
    /// `now` is `None` when the clock could not be read; the ceiling is used.
    pub fn time_until_alarm(&self, alarm: AlarmSetting, now: Option<&LocalTime>) -> Duration {
        let Some(alarm_hour) = alarm.hour() else {
            return self.ceiling;
        };
        let Some(now) = now else {
            return self.ceiling;
        };

        let mut hour_diff = alarm_hour as i32 - now.hour() as i32;
        if hour_diff < 0 {
            hour_diff += 24;
        }

        let mut minute_diff = alarm.minute() as i32 - now.minute() as i32;
        if minute_diff < 0 {
            hour_diff -= 1;
            minute_diff += 60;
        }

        // Alarm passed earlier in this hour.
        if hour_diff == -1 {
            return self.ceiling;
        }

        let secs = hour_diff as i64 * 3_600 + minute_diff as i64 * 60 - now.second() as i64;
        if secs < 0 {
            // Inside the alarm minute already; the next occurrence is a day away.
            return self.ceiling;
        }

        Duration::from_secs(secs as u64).min(self.ceiling)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn at(hour: i8, minute: i8, second: i8) -> LocalTime {
        LocalTime::new(date(2025, 1, 15).at(hour, minute, second, 0))
    }

    fn alarm(hour: u8, minute: u8) -> AlarmSetting {
        AlarmSetting::at(hour, minute).unwrap()
    }

    #[test]
    fn disabled_alarm_always_returns_ceiling() {
        let scheduler = AlarmScheduler::default();
        for (hour, minute, second) in [(0, 0, 0), (6, 59, 59), (23, 59, 0), (12, 30, 30)] {
            assert_eq!(
                scheduler.time_until_alarm(AlarmSetting::disabled(), Some(&at(hour, minute, second))),
                SLEEP_CEILING
            );
        }
        assert_eq!(
            scheduler.time_until_alarm(AlarmSetting::disabled(), None),
            SLEEP_CEILING
        );
    }

    #[test]
    fn minute_borrow_that_passes_the_alarm_clamps_to_ceiling() {
        let scheduler = AlarmScheduler::default();
        assert_eq!(
            scheduler.time_until_alarm(alarm(23, 50), Some(&at(23, 55, 30))),
            SLEEP_CEILING
        );
    }

    #[test]
    fn far_future_alarm_is_clamped_to_ceiling() {
        let scheduler = AlarmScheduler::default();
        assert_eq!(
            scheduler.time_until_alarm(alarm(6, 0), Some(&at(23, 0, 0))),
            SLEEP_CEILING
        );
    }

    #[test]
    fn near_alarm_lands_on_the_minute() {
        let scheduler = AlarmScheduler::default();
        assert_eq!(
            scheduler.time_until_alarm(alarm(6, 30), Some(&at(6, 10, 15))),
            Duration::from_secs(20 * 60 - 15)
        );
        assert_eq!(
            scheduler.time_until_alarm(alarm(7, 5), Some(&at(6, 50, 0))),
            Duration::from_secs(15 * 60)
        );
        // Across midnight.
        assert_eq!(
            scheduler.time_until_alarm(alarm(0, 10), Some(&at(23, 55, 30))),
            Duration::from_secs(14 * 60 + 30)
        );
    }

    #[test]
    fn seconds_into_alarm_minute_wait_for_ceiling() {
        let scheduler = AlarmScheduler::default();
        assert_eq!(
            scheduler.time_until_alarm(alarm(6, 0), Some(&at(6, 0, 30))),
            SLEEP_CEILING
        );
        assert_eq!(
            scheduler.time_until_alarm(alarm(6, 0), Some(&at(6, 0, 0))),
            Duration::ZERO
        );
    }

    #[test]
    fn unreadable_clock_uses_ceiling() {
        let scheduler = AlarmScheduler::new(Duration::from_secs(600));
        assert_eq!(
            scheduler.time_until_alarm(alarm(6, 0), None),
            Duration::from_secs(600)
        );
    }
}
