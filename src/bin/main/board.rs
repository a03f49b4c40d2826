use core::time::Duration;

use embassy_time::{Duration as EmbassyDuration, Timer};
use esp_hal::gpio::{Input, Output};
use wakealarm_core::io::{InputLine, InputLines, OutputLine, OutputLines, Pause, SystemClock};
use wakealarm_hal_esp32::{
    clock::RtcClock, input::lines::ButtonLines, output::actuators::ActuatorLines,
};

/// Buttons, actuators and the RTC clock behind the core's board traits.
pub(super) struct FirmwareBoard {
    buttons: ButtonLines<Input<'static>>,
    actuators: ActuatorLines<Output<'static>>,
    clock: RtcClock<'static>,
}

impl FirmwareBoard {
    pub(super) fn new(
        buttons: ButtonLines<Input<'static>>,
        actuators: ActuatorLines<Output<'static>>,
        clock: RtcClock<'static>,
    ) -> Self {
        Self {
            buttons,
            actuators,
            clock,
        }
    }

    /// Quiets the actuators and hands the RTC back for sleep entry.
    pub(super) fn shut_down(mut self) -> RtcClock<'static> {
        self.actuators.all_off();
        self.clock
    }
}

impl InputLines for FirmwareBoard {
    fn is_asserted(&mut self, line: InputLine) -> bool {
        self.buttons.is_asserted(line)
    }
}

impl OutputLines for FirmwareBoard {
    fn set_output(&mut self, line: OutputLine, on: bool) {
        self.actuators.set_output(line, on);
    }
}

impl SystemClock for FirmwareBoard {
    fn now_unix_secs(&self) -> u64 {
        self.clock.now_unix_secs()
    }

    fn set_unix_time(&mut self, unix_secs: u64, micros: u32) {
        self.clock.set_unix_time(unix_secs, micros);
    }
}

impl Pause for FirmwareBoard {
    async fn pause(&mut self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        Timer::after(EmbassyDuration::from_micros(micros)).await;
    }
}
