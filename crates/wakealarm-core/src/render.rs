//! Text for the 16x2 character display.

use core::fmt::Write;

use heapless::String as HeaplessString;

use crate::{clock::LocalTime, persist::AlarmSetting};

pub const LINE_CHARS: usize = 16;

pub type Line = HeaplessString<LINE_CHARS>;

const DATE_FORMAT: &str = "%b %d %Y";
const TIME_FORMAT: &str = "%a, %H:%M:%S";

/// `Jan 15 2025` / `Wed, 06:05:09`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimeView {
    pub date: Line,
    pub time: Line,
}

impl TimeView {
    pub fn new(now: &LocalTime) -> Self {
        let datetime = now.datetime();

        let mut date = Line::new();
        let _ = write!(date, "{}", datetime.strftime(DATE_FORMAT));

        let mut time = Line::new();
        let _ = write!(time, "{}", datetime.strftime(TIME_FORMAT));

        Self { date, time }
    }
}

/// `6:05`, or `--:05` while the alarm is disabled.
pub fn alarm_line(alarm: AlarmSetting) -> Line {
    let mut line = Line::new();
    let _ = match alarm.hour() {
        Some(hour) => write!(line, "{}:{:02}", hour, alarm.minute()),
        None => write!(line, "--:{:02}", alarm.minute()),
    };
    line
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn time_view_matches_display_layout() {
        // A Sunday.
        let now = LocalTime::new(date(2025, 1, 5).at(6, 5, 9, 0));
        let view = TimeView::new(&now);
        assert_eq!(view.date.as_str(), "Jan 05 2025");
        assert_eq!(view.time.as_str(), "Sun, 06:05:09");
    }

    #[test]
    fn time_view_fits_longest_month_and_weekday() {
        let now = LocalTime::new(date(2025, 12, 31).at(23, 59, 59, 0));
        let view = TimeView::new(&now);
        assert_eq!(view.date.as_str(), "Dec 31 2025");
        assert_eq!(view.time.as_str(), "Wed, 23:59:59");
    }

    #[test]
    fn alarm_line_pads_minutes() {
        assert_eq!(alarm_line(AlarmSetting::at(6, 5).unwrap()).as_str(), "6:05");
        assert_eq!(alarm_line(AlarmSetting::at(23, 50).unwrap()).as_str(), "23:50");
        assert_eq!(alarm_line(AlarmSetting::disabled()).as_str(), "--:00");
    }
}
