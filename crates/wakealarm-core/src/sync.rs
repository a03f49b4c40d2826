//! Network time synchronisation: radio up, join, SNTP, radio down.
//!
//! There is no overall timeout. An unreachable network keeps [`TimeSynchronizer::sync`]
//! retrying until connectivity returns.

use core::{fmt::Debug, time::Duration};

use log::{debug, info, warn};

use crate::{io::Board, sntp::NtpTime};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncConfig {
    pub link_retry_delay: Duration,
    pub first_request_timeout: Duration,
    pub request_timeout: Duration,
    pub ack_poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            link_retry_delay: Duration::from_millis(500),
            first_request_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
            ack_poll_interval: Duration::from_millis(500),
        }
    }
}

/// Radio, link and time-protocol access.
#[allow(async_fn_in_trait)]
pub trait SyncTransport {
    type Error: Debug;

    async fn radio_on(&mut self) -> Result<(), Self::Error>;

    /// One link-level connection attempt (association plus address).
    async fn join(&mut self) -> Result<(), Self::Error>;

    /// One time-protocol exchange bounded by `timeout`.
    async fn request_time(&mut self, timeout: Duration) -> Result<NtpTime, Self::Error>;

    /// Leaves the radio powered down.
    async fn radio_off(&mut self);
}

/// One-shot completion latch, reset at the start of every attempt.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SyncAcknowledgement {
    latched: bool,
}

impl SyncAcknowledgement {
    pub fn reset(&mut self) {
        self.latched = false;
    }

    pub fn latch(&mut self) {
        self.latched = true;
    }

    pub const fn is_latched(&self) -> bool {
        self.latched
    }
}

/// Counters from the last [`TimeSynchronizer::sync`] call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SyncReport {
    pub join_attempts: u32,
    pub request_attempts: u32,
    pub applied: Option<NtpTime>,
}

pub struct TimeSynchronizer<T> {
    transport: T,
    config: SyncConfig,
    ack: SyncAcknowledgement,
    last_report: SyncReport,
}

impl<T> TimeSynchronizer<T>
where
    T: SyncTransport,
{
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self {
            transport,
            config,
            ack: SyncAcknowledgement::default(),
            last_report: SyncReport::default(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub const fn acknowledged(&self) -> bool {
        self.ack.is_latched()
    }

    pub const fn last_report(&self) -> SyncReport {
        self.last_report
    }

    /// Blocks until the system clock has been set from the network.
    pub async fn sync<B>(&mut self, board: &mut B) -> SyncReport
    where
        B: Board + ?Sized,
    {
        self.ack.reset();
        let mut report = SyncReport::default();

        while let Err(err) = self.transport.radio_on().await {
            warn!("sync: radio start failed: {:?}", err);
            board.pause(self.config.link_retry_delay).await;
        }

        loop {
            report.join_attempts = report.join_attempts.saturating_add(1);
            match self.transport.join().await {
                Ok(()) => break,
                Err(err) => {
                    debug!(
                        "sync: join attempt {} failed: {:?}",
                        report.join_attempts, err
                    );
                    board.pause(self.config.link_retry_delay).await;
                }
            }
        }
        info!("sync: link up after {} attempt(s)", report.join_attempts);

        let mut timeout = self.config.first_request_timeout;
        while !self.ack.is_latched() {
            report.request_attempts = report.request_attempts.saturating_add(1);
            match self.transport.request_time(timeout).await {
                Ok(time) => {
                    board.set_unix_time(time.unix_secs, time.micros);
                    report.applied = Some(time);
                    self.ack.latch();
                }
                Err(err) => {
                    debug!(
                        "sync: request {} failed: {:?} (clock at {})",
                        report.request_attempts,
                        err,
                        board.now_unix_secs()
                    );
                    timeout = self.config.request_timeout;
                    board.pause(self.config.ack_poll_interval).await;
                }
            }
        }

        self.transport.radio_off().await;
        if let Some(time) = report.applied {
            info!(
                "sync: clock set to unix={} after {} request(s)",
                time.unix_secs, report.request_attempts
            );
        }

        self.last_report = report;
        report
    }
}
