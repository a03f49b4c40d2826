//! Wi-Fi credentials and link bookkeeping for the time-sync transport.

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

/// Where a sync attempt has got to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ConnectivityState {
    RadioOff = 0,
    RadioOn = 1,
    Associated = 2,
    Connected = 3,
}

impl ConnectivityState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::RadioOn,
            2 => Self::Associated,
            3 => Self::Connected,
            _ => Self::RadioOff,
        }
    }
}

/// Wi-Fi credentials source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WifiConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl WifiConfig {
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self { ssid, password }
    }
}

/// Immutable connectivity snapshot for logs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectivitySnapshot {
    pub state: ConnectivityState,
    pub join_failures: u32,
}

/// Lock-free shared connectivity status.
#[derive(Debug)]
pub struct ConnectivityHandle {
    state: AtomicU8,
    join_failures: AtomicU32,
}

impl ConnectivityHandle {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectivityState::RadioOff as u8),
            join_failures: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> ConnectivitySnapshot {
        ConnectivitySnapshot {
            state: ConnectivityState::from_raw(self.state.load(Ordering::Acquire)),
            join_failures: self.join_failures.load(Ordering::Acquire),
        }
    }

    pub fn mark_radio_on(&self) {
        self.update_state(ConnectivityState::RadioOn);
    }

    pub fn mark_radio_off(&self) {
        self.update_state(ConnectivityState::RadioOff);
    }

    pub fn mark_associated(&self) {
        self.update_state(ConnectivityState::Associated);
    }

    pub fn mark_connected(&self) {
        self.update_state(ConnectivityState::Connected);
    }

    /// A join attempt failed; the link falls back to radio-on.
    pub fn note_join_failure(&self) {
        self.join_failures.fetch_add(1, Ordering::AcqRel);
        self.update_state(ConnectivityState::RadioOn);
    }

    fn update_state(&self, next: ConnectivityState) {
        self.state.store(next as u8, Ordering::Release);
    }
}

impl Default for ConnectivityHandle {
    fn default() -> Self {
        Self::new()
    }
}
