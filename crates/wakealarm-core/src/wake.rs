//! Wake-cause classification and the per-cycle mode it selects.

/// Platform wake source, as reported after reset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WakeCause {
    /// Power-on, reset button, reprogramming, or any non-deep-sleep reset.
    Reset,
    TimerExpired,
    /// An armed GPIO line reached its wake level.
    GpioLevel,
    /// Any other deep-sleep wake source (touch, ULP, ...).
    Other,
}

/// The logical reason this cycle is running.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WakeTrigger {
    ColdStart,
    TimerWake,
    ButtonWake,
}

/// Anything that is not a timer expiry or a GPIO level is a cold start.
pub const fn classify(cause: WakeCause) -> WakeTrigger {
    match cause {
        WakeCause::TimerExpired => WakeTrigger::TimerWake,
        WakeCause::GpioLevel => WakeTrigger::ButtonWake,
        WakeCause::Reset | WakeCause::Other => WakeTrigger::ColdStart,
    }
}

/// Mode-controller states. Every state's only successor is suspend.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Mode {
    ColdStart = 0,
    AlarmCheck = 1,
    ButtonInteraction = 2,
}

impl Mode {
    pub const fn for_trigger(trigger: WakeTrigger) -> Self {
        match trigger {
            WakeTrigger::ColdStart => Self::ColdStart,
            WakeTrigger::TimerWake => Self::AlarmCheck,
            WakeTrigger::ButtonWake => Self::ButtonInteraction,
        }
    }

    pub(crate) const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::ColdStart),
            1 => Some(Self::AlarmCheck),
            2 => Some(Self::ButtonInteraction),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ColdStart => "cold_start",
            Self::AlarmCheck => "alarm_check",
            Self::ButtonInteraction => "button_interaction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognised_causes_map_to_their_trigger() {
        assert_eq!(classify(WakeCause::TimerExpired), WakeTrigger::TimerWake);
        assert_eq!(classify(WakeCause::GpioLevel), WakeTrigger::ButtonWake);
    }

    #[test]
    fn unknown_causes_fall_back_to_cold_start() {
        assert_eq!(classify(WakeCause::Reset), WakeTrigger::ColdStart);
        assert_eq!(classify(WakeCause::Other), WakeTrigger::ColdStart);
    }

    #[test]
    fn triggers_select_modes() {
        assert_eq!(Mode::for_trigger(WakeTrigger::ColdStart), Mode::ColdStart);
        assert_eq!(Mode::for_trigger(WakeTrigger::TimerWake), Mode::AlarmCheck);
        assert_eq!(
            Mode::for_trigger(WakeTrigger::ButtonWake),
            Mode::ButtonInteraction
        );
    }
}
