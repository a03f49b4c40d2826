use embedded_hal::digital::{Error as _, InputPin};
use log::warn;

use wakealarm_core::io::{InputLine, InputLines};

const LINE_COUNT: usize = 6;

/// The six push-button lines, in [`InputLine`] order.
///
/// Buttons pull their line to 3V3 against an external pull-down, so a high
/// level means pressed.
#[derive(Debug)]
pub struct ButtonLines<P> {
    pins: [P; LINE_COUNT],
    read_fault_logged: bool,
}

impl<P> ButtonLines<P>
where
    P: InputPin,
{
    /// `pins` are display, alarm-display, hour, minute-tens, minute-ones, off.
    pub fn new(pins: [P; LINE_COUNT]) -> Self {
        Self {
            pins,
            read_fault_logged: false,
        }
    }

    fn index(line: InputLine) -> usize {
        match line {
            InputLine::DisplayTime => 0,
            InputLine::DisplayAlarm => 1,
            InputLine::SetAlarmHour => 2,
            InputLine::SetAlarmMinuteTens => 3,
            InputLine::SetAlarmMinuteOnes => 4,
            InputLine::AlarmOff => 5,
        }
    }
}

impl<P> InputLines for ButtonLines<P>
where
    P: InputPin,
{
    fn is_asserted(&mut self, line: InputLine) -> bool {
        let pin = &mut self.pins[Self::index(line)];
        match pin.is_high() {
            Ok(high) => high,
            Err(err) => {
                if !self.read_fault_logged {
                    warn!("input: read of {:?} failed: {:?}", line, err.kind());
                    self.read_fault_logged = true;
                }
                false
            }
        }
    }
}
