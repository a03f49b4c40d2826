use esp_hal::{
    gpio::RtcPin,
    peripherals::{GPIO36, GPIO39},
    rtc_cntl::sleep::{Ext1WakeupSource, TimerWakeupSource, WakeupLevel},
};
use log::warn;
use wakealarm_core::{
    io::InputLine,
    sleep::{SleepPlan, Suspend},
};
use wakealarm_hal_esp32::clock::RtcClock;

/// Deep sleep with EXT1 (any wake line high) and the RTC timer armed.
pub(super) struct DeepSleep {
    clock: RtcClock<'static>,
}

impl DeepSleep {
    pub(super) fn new(clock: RtcClock<'static>) -> Self {
        Self { clock }
    }
}

impl Suspend for DeepSleep {
    fn suspend(&mut self, plan: &SleepPlan) -> ! {
        for line in plan.wake_lines {
            if !matches!(line, InputLine::DisplayTime | InputLine::DisplayAlarm) {
                warn!("power: {:?} is not wired to an RTC pad", line);
            }
        }

        // GPIO36 = display button, GPIO39 = alarm-display button.
        let mut display_pin = unsafe { GPIO36::steal() };
        let mut alarm_pin = unsafe { GPIO39::steal() };
        let mut wake_pins: [&mut dyn RtcPin; 2] = [&mut display_pin, &mut alarm_pin];
        let buttons = Ext1WakeupSource::new(&mut wake_pins, WakeupLevel::High);
        let timer = TimerWakeupSource::new(plan.timer);

        self.clock.rtc_mut().sleep_deep(&[&buttons, &timer]);
    }
}
