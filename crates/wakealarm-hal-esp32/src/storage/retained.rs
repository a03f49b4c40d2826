//! [`PersistentState`] in RTC fast memory, which survives deep sleep but not
//! a power cycle.

use wakealarm_core::persist::{
    PersistentState, RETAINED_LEN, RetainedStateError, StateStore,
};

#[esp_hal::ram(unstable(rtc_fast, persistent))]
static mut RETAINED_RECORD: [u8; RETAINED_LEN] = [0; RETAINED_LEN];

/// Sole accessor of the retained record. Construct once per boot.
#[derive(Debug)]
pub struct RetainedStateStore {
    _private: (),
}

impl RetainedStateStore {
    /// # Safety
    ///
    /// Only one instance may exist at a time.
    pub unsafe fn take() -> Self {
        Self { _private: () }
    }

    fn read_record(&self) -> [u8; RETAINED_LEN] {
        unsafe { core::ptr::read_volatile(&raw const RETAINED_RECORD) }
    }

    fn write_record(&mut self, record: [u8; RETAINED_LEN]) {
        unsafe { core::ptr::write_volatile(&raw mut RETAINED_RECORD, record) }
    }
}

impl StateStore for RetainedStateStore {
    type Error = RetainedStateError;

    /// `Ok(None)` when nothing was ever written since power-up.
    fn load(&mut self) -> Result<Option<PersistentState>, Self::Error> {
        match PersistentState::decode(&self.read_record()) {
            Ok(state) => Ok(Some(state)),
            Err(RetainedStateError::BadMagic) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Plain RAM; the write cannot fail. Corruption shows up on the next
    /// [`Self::load`] as a decode error.
    fn save(&mut self, state: &PersistentState) -> Result<(), Self::Error> {
        self.write_record(state.encode());
        Ok(())
    }
}
