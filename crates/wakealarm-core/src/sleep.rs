//! Arming wake sources, writing back retained state, and suspending.

use core::time::Duration;

use log::{info, warn};

use crate::{
    io::InputLine,
    persist::{PersistentState, StateStore},
};

/// What the next suspend waits for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SleepPlan {
    pub timer: Duration,
    /// Any of these going high wakes the device.
    pub wake_lines: [InputLine; 2],
}

impl SleepPlan {
    pub const fn after(timer: Duration) -> Self {
        Self {
            timer,
            wake_lines: InputLine::WAKE_LINES,
        }
    }
}

/// Platform suspend. Execution restarts from reset on wake.
pub trait Suspend {
    fn suspend(&mut self, plan: &SleepPlan) -> !;
}

pub struct SleepController<S, U> {
    store: S,
    suspender: U,
}

impl<S, U> SleepController<S, U>
where
    S: StateStore,
    S::Error: core::fmt::Debug,
    U: Suspend,
{
    pub fn new(store: S, suspender: U) -> Self {
        Self { store, suspender }
    }

    /// Writes `state` back. A failed write is logged; the next wake then
    /// decodes defaults.
    pub fn write_back(&mut self, state: &PersistentState) -> bool {
        match self.store.save(state) {
            Ok(()) => true,
            Err(err) => {
                warn!("sleep: failed to retain state: {:?}", err);
                false
            }
        }
    }

    pub fn sleep(mut self, plan: SleepPlan, state: &PersistentState) -> ! {
        self.write_back(state);
        info!(
            "sleep: mode={} alarm={} timer={}s",
            state.mode.as_str(),
            state.alarm.raw_hour(),
            plan.timer.as_secs()
        );
        self.suspender.suspend(&plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{persist::AlarmSetting, wake::Mode};

    #[derive(Default)]
    struct MemoryStore {
        saved: Option<PersistentState>,
        fail: bool,
    }

    impl StateStore for MemoryStore {
        type Error = ();

        fn load(&mut self) -> Result<Option<PersistentState>, Self::Error> {
            Ok(self.saved)
        }

        fn save(&mut self, state: &PersistentState) -> Result<(), Self::Error> {
            if self.fail {
                return Err(());
            }
            self.saved = Some(*state);
            Ok(())
        }
    }

    struct NeverSuspend;

    impl Suspend for NeverSuspend {
        fn suspend(&mut self, _plan: &SleepPlan) -> ! {
            unreachable!("not suspended in tests")
        }
    }

    #[test]
    fn plan_arms_both_wake_lines() {
        let plan = SleepPlan::after(Duration::from_secs(90));
        assert_eq!(
            plan.wake_lines,
            [InputLine::DisplayTime, InputLine::DisplayAlarm]
        );
        assert_eq!(plan.timer, Duration::from_secs(90));
    }

    #[test]
    fn write_back_stores_state() {
        let mut controller = SleepController::new(MemoryStore::default(), NeverSuspend);
        let state = PersistentState {
            alarm: AlarmSetting::at(7, 45).unwrap(),
            mode: Mode::ButtonInteraction,
        };
        assert!(controller.write_back(&state));
        assert_eq!(controller.store.saved, Some(state));
    }

    #[test]
    fn write_back_failure_is_reported() {
        let store = MemoryStore {
            saved: None,
            fail: true,
        };
        let mut controller = SleepController::new(store, NeverSuspend);
        assert!(!controller.write_back(&PersistentState::cold_start()));
    }
}
