//! State that survives deep sleep, and its retained-memory record.

use crate::wake::Mode;

const HOURS_PER_DAY: u8 = 24;
const MINUTES_PER_HOUR: u8 = 60;

const RECORD_MAGIC: [u8; 2] = *b"WA";
const RECORD_VERSION: u8 = 1;
const DISABLED_HOUR_RAW: i8 = -1;

/// Size of the encoded record in retained memory.
pub const RETAINED_LEN: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetainedStateError {
    BadMagic,
    BadVersion,
    BadChecksum,
    OutOfRange,
}

/// Configured alarm. The minute is kept while the alarm is disabled so that
/// re-enabling it from the hour button restores `0:MM`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AlarmSetting {
    hour: Option<u8>,
    minute: u8,
}

impl Default for AlarmSetting {
    fn default() -> Self {
        Self::disabled()
    }
}

impl AlarmSetting {
    pub const fn disabled() -> Self {
        Self {
            hour: None,
            minute: 0,
        }
    }

    /// Returns `None` when `hour > 23` or `minute > 59`.
    pub const fn at(hour: u8, minute: u8) -> Option<Self> {
        if hour >= HOURS_PER_DAY || minute >= MINUTES_PER_HOUR {
            return None;
        }
        Some(Self {
            hour: Some(hour),
            minute,
        })
    }

    pub const fn hour(self) -> Option<u8> {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }

    pub const fn is_enabled(self) -> bool {
        self.hour.is_some()
    }

    /// Hour in the `-1..=23` convention, -1 meaning disabled.
    pub const fn raw_hour(self) -> i8 {
        match self.hour {
            Some(hour) => hour as i8,
            None => DISABLED_HOUR_RAW,
        }
    }

    /// 23 wraps to disabled, disabled wraps to 0.
    pub fn increment_hour(&mut self) {
        self.hour = match self.hour {
            None => Some(0),
            Some(hour) if hour + 1 >= HOURS_PER_DAY => None,
            Some(hour) => Some(hour + 1),
        };
    }

    pub fn increment_minute_tens(&mut self) {
        self.minute = (self.minute + 10) % MINUTES_PER_HOUR;
    }

    pub fn increment_minute_ones(&mut self) {
        self.minute = (self.minute + 1) % MINUTES_PER_HOUR;
    }
}

/// Values retained across suspend.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PersistentState {
    pub alarm: AlarmSetting,
    pub mode: Mode,
}

impl Default for PersistentState {
    fn default() -> Self {
        Self::cold_start()
    }
}

impl PersistentState {
    /// Safe defaults after an uncontrolled reset.
    pub const fn cold_start() -> Self {
        Self {
            alarm: AlarmSetting::disabled(),
            mode: Mode::ColdStart,
        }
    }

    pub fn encode(&self) -> [u8; RETAINED_LEN] {
        let mut record = [0u8; RETAINED_LEN];
        record[0..2].copy_from_slice(&RECORD_MAGIC);
        record[2] = RECORD_VERSION;
        record[3] = self.alarm.raw_hour() as u8;
        record[4] = self.alarm.minute;
        record[5] = self.mode as u8;
        record[RETAINED_LEN - 1] = checksum(&record[..RETAINED_LEN - 1]);
        record
    }

    pub fn decode(record: &[u8; RETAINED_LEN]) -> Result<Self, RetainedStateError> {
        if record[0..2] != RECORD_MAGIC {
            return Err(RetainedStateError::BadMagic);
        }
        if record[2] != RECORD_VERSION {
            return Err(RetainedStateError::BadVersion);
        }
        if record[RETAINED_LEN - 1] != checksum(&record[..RETAINED_LEN - 1]) {
            return Err(RetainedStateError::BadChecksum);
        }

        let minute = record[4];
        let alarm = match record[3] as i8 {
            DISABLED_HOUR_RAW if minute < MINUTES_PER_HOUR => AlarmSetting { hour: None, minute },
            hour if hour >= 0 => {
                AlarmSetting::at(hour as u8, minute).ok_or(RetainedStateError::OutOfRange)?
            }
            _ => return Err(RetainedStateError::OutOfRange),
        };
        let mode = Mode::from_raw(record[5]).ok_or(RetainedStateError::OutOfRange)?;

        Ok(Self { alarm, mode })
    }
}

fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0xA5u8, |acc, b| acc.rotate_left(1) ^ b)
}

/// Backend that keeps [`PersistentState`] across suspend.
pub trait StateStore {
    type Error;

    fn load(&mut self) -> Result<Option<PersistentState>, Self::Error>;
    fn save(&mut self, state: &PersistentState) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tens_increment_wraps_modulo_sixty() {
        let mut alarm = AlarmSetting::at(6, 55).unwrap();
        alarm.increment_minute_tens();
        assert_eq!(alarm.minute(), 5);
        assert_eq!(alarm.hour(), Some(6));
    }

    #[test]
    fn ones_increment_wraps_modulo_sixty() {
        let mut alarm = AlarmSetting::at(6, 59).unwrap();
        alarm.increment_minute_ones();
        assert_eq!(alarm.minute(), 0);
        assert_eq!(alarm.hour(), Some(6));
    }

    #[test]
    fn hour_increment_passes_through_disabled() {
        let mut alarm = AlarmSetting::at(23, 15).unwrap();
        alarm.increment_hour();
        assert_eq!(alarm.raw_hour(), -1);
        assert!(!alarm.is_enabled());
        alarm.increment_hour();
        assert_eq!(alarm.raw_hour(), 0);
        assert_eq!(alarm.minute(), 15);
    }

    #[test]
    fn out_of_range_alarm_is_rejected() {
        assert_eq!(AlarmSetting::at(24, 0), None);
        assert_eq!(AlarmSetting::at(0, 60), None);
    }

    #[test]
    fn record_survives_encoding() {
        let state = PersistentState {
            alarm: AlarmSetting::at(6, 30).unwrap(),
            mode: Mode::AlarmCheck,
        };
        assert_eq!(PersistentState::decode(&state.encode()), Ok(state));

        let mut disabled = PersistentState::cold_start();
        disabled.alarm.increment_minute_tens();
        assert_eq!(PersistentState::decode(&disabled.encode()), Ok(disabled));
    }

    #[test]
    fn blank_or_damaged_records_are_rejected() {
        assert_eq!(
            PersistentState::decode(&[0; RETAINED_LEN]),
            Err(RetainedStateError::BadMagic)
        );

        let mut record = PersistentState::cold_start().encode();
        record[4] ^= 0x01;
        assert_eq!(
            PersistentState::decode(&record),
            Err(RetainedStateError::BadChecksum)
        );

        let mut record = PersistentState::cold_start().encode();
        record[3] = 30;
        record[RETAINED_LEN - 1] = checksum(&record[..RETAINED_LEN - 1]);
        assert_eq!(
            PersistentState::decode(&record),
            Err(RetainedStateError::OutOfRange)
        );
    }
}
