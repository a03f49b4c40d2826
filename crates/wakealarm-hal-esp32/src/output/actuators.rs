use embedded_hal::digital::{Error as _, OutputPin, PinState};
use log::warn;

use wakealarm_core::io::{OutputLine, OutputLines};

const LINE_COUNT: usize = 4;

/// Status LED, motor driver inputs and buzzer, in [`OutputLine`] order.
#[derive(Debug)]
pub struct ActuatorLines<P> {
    pins: [P; LINE_COUNT],
}

impl<P> ActuatorLines<P>
where
    P: OutputPin,
{
    /// `pins` are status LED, motor clockwise, motor counter-clockwise, buzzer.
    /// Everything is driven low first.
    pub fn new(pins: [P; LINE_COUNT]) -> Self {
        let mut lines = Self { pins };
        lines.all_off();
        lines
    }

    /// Leaves the motor unpowered and the buzzer silent.
    pub fn all_off(&mut self) {
        for line in [
            OutputLine::StatusLed,
            OutputLine::MotorClockwise,
            OutputLine::MotorCounterClockwise,
            OutputLine::Buzzer,
        ] {
            self.set_output(line, false);
        }
    }

    fn index(line: OutputLine) -> usize {
        match line {
            OutputLine::StatusLed => 0,
            OutputLine::MotorClockwise => 1,
            OutputLine::MotorCounterClockwise => 2,
            OutputLine::Buzzer => 3,
        }
    }
}

impl<P> OutputLines for ActuatorLines<P>
where
    P: OutputPin,
{
    fn set_output(&mut self, line: OutputLine, on: bool) {
        let pin = &mut self.pins[Self::index(line)];
        if let Err(err) = pin.set_state(PinState::from(on)) {
            warn!("output: drive {:?}={} failed: {:?}", line, on, err.kind());
        }
    }
}
