//! Hardware seams: input lines, actuator lines, clock, delays and display.

use core::{fmt::Debug, time::Duration};

/// Logical input roles. Board glue maps these to GPIOs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputLine {
    /// Held to show the current time. Also a wake source.
    DisplayTime,
    /// Held to show and edit the alarm. Also a wake source.
    DisplayAlarm,
    SetAlarmHour,
    SetAlarmMinuteTens,
    SetAlarmMinuteOnes,
    AlarmOff,
}

impl InputLine {
    /// The two lines armed as deep-sleep wake sources.
    pub const WAKE_LINES: [Self; 2] = [Self::DisplayTime, Self::DisplayAlarm];
}

/// Logical output roles.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputLine {
    StatusLed,
    MotorClockwise,
    MotorCounterClockwise,
    Buzzer,
}

/// Polled, already-debounced input levels.
pub trait InputLines {
    fn is_asserted(&mut self, line: InputLine) -> bool;
}

pub trait OutputLines {
    fn set_output(&mut self, line: OutputLine, on: bool);
}

/// Authoritative system time, kept by the platform across deep sleep.
pub trait SystemClock {
    /// Seconds since the UNIX epoch, UTC. Unset clocks report a small value.
    fn now_unix_secs(&self) -> u64;

    fn set_unix_time(&mut self, unix_secs: u64, micros: u32);
}

/// Blocking wait for the single thread of control.
#[allow(async_fn_in_trait)]
pub trait Pause {
    async fn pause(&mut self, duration: Duration);
}

/// Everything the mode routines need from the board besides the display and
/// the network.
pub trait Board: InputLines + OutputLines + SystemClock + Pause {}

impl<T> Board for T where T: InputLines + OutputLines + SystemClock + Pause {}

/// Two-line character output.
pub trait TextDisplay {
    type Error: Debug;

    /// Power up, light, and clear the panel.
    fn begin(&mut self) -> Result<(), Self::Error>;
    fn clear(&mut self) -> Result<(), Self::Error>;
    fn show(&mut self, top: &str, bottom: &str) -> Result<(), Self::Error>;
}
