//! System clock backed by the RTC, which keeps counting through deep sleep.

use esp_hal::rtc_cntl::Rtc;

use wakealarm_core::io::SystemClock;

const MICROS_PER_SEC: u64 = 1_000_000;

pub struct RtcClock<'d> {
    rtc: Rtc<'d>,
}

impl<'d> RtcClock<'d> {
    pub fn new(rtc: Rtc<'d>) -> Self {
        Self { rtc }
    }

    pub fn now_unix_micros(&self) -> u64 {
        self.rtc.current_time_us()
    }

    /// For sleep entry.
    pub fn rtc_mut(&mut self) -> &mut Rtc<'d> {
        &mut self.rtc
    }
}

impl SystemClock for RtcClock<'_> {
    fn now_unix_secs(&self) -> u64 {
        self.now_unix_micros() / MICROS_PER_SEC
    }

    fn set_unix_time(&mut self, unix_secs: u64, micros: u32) {
        self.rtc
            .set_current_time_us(unix_secs * MICROS_PER_SEC + micros as u64);
    }
}
