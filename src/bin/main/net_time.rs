use core::time::Duration;

use embassy_net::{
    Stack,
    dns::{self, DnsQueryType},
    udp::{BindError, PacketMetadata, RecvError, SendError, UdpSocket},
};
use embassy_time::{Duration as EmbassyDuration, WithTimeout};
use esp_radio::wifi::{WifiController, WifiError};
use log::{debug, info};
use wakealarm_core::{
    sntp::{self, NTP_PORT, NtpTime, SntpError},
    sync::SyncTransport,
};
use wakealarm_hal_esp32::network::ConnectivityHandle;

use super::DHCP_TIMEOUT_SECS;

#[derive(Debug)]
pub(super) enum TransportError {
    Wifi(WifiError),
    DhcpTimeout,
    Dns(dns::Error),
    NoAddress,
    Bind(BindError),
    Send(SendError),
    Recv(RecvError),
    Timeout,
    Sntp(SntpError),
}

/// Wi-Fi station plus SNTP over the embassy-net stack.
pub(super) struct WifiSntpTransport<'a, 'd> {
    controller: &'a mut WifiController<'d>,
    stack: Stack<'d>,
    connectivity: &'static ConnectivityHandle,
    server: &'static str,
}

impl<'a, 'd> WifiSntpTransport<'a, 'd> {
    pub(super) fn new(
        controller: &'a mut WifiController<'d>,
        stack: Stack<'d>,
        connectivity: &'static ConnectivityHandle,
        server: &'static str,
    ) -> Self {
        Self {
            controller,
            stack,
            connectivity,
            server,
        }
    }

    async fn exchange(&mut self) -> Result<NtpTime, TransportError> {
        let addresses = self
            .stack
            .dns_query(self.server, DnsQueryType::A)
            .await
            .map_err(TransportError::Dns)?;
        let server = *addresses.first().ok_or(TransportError::NoAddress)?;
        debug!("sntp: {} resolved to {}", self.server, server);

        let mut rx_meta = [PacketMetadata::EMPTY; 1];
        let mut rx_buffer = [0u8; 128];
        let mut tx_meta = [PacketMetadata::EMPTY; 1];
        let mut tx_buffer = [0u8; 128];
        let mut socket = UdpSocket::new(
            self.stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(TransportError::Bind)?;

        socket
            .send_to(&sntp::request_packet(), (server, NTP_PORT))
            .await
            .map_err(TransportError::Send)?;

        let mut reply = [0u8; sntp::PACKET_LEN];
        let (len, _from) = socket
            .recv_from(&mut reply)
            .await
            .map_err(TransportError::Recv)?;
        sntp::parse_reply(&reply[..len]).map_err(TransportError::Sntp)
    }
}

impl SyncTransport for WifiSntpTransport<'_, '_> {
    type Error = TransportError;

    async fn radio_on(&mut self) -> Result<(), Self::Error> {
        if !self.controller.is_started().unwrap_or(false) {
            self.controller
                .start_async()
                .await
                .map_err(TransportError::Wifi)?;
        }
        self.connectivity.mark_radio_on();
        Ok(())
    }

    async fn join(&mut self) -> Result<(), Self::Error> {
        if let Err(err) = self.controller.connect_async().await {
            self.connectivity.note_join_failure();
            let _ = self.controller.disconnect_async().await;
            return Err(TransportError::Wifi(err));
        }
        self.connectivity.mark_associated();

        match self
            .stack
            .wait_config_up()
            .with_timeout(EmbassyDuration::from_secs(DHCP_TIMEOUT_SECS))
            .await
        {
            Ok(()) => {
                self.connectivity.mark_connected();
                info!("wifi connected and dhcp ready");
                Ok(())
            }
            Err(_) => {
                self.connectivity.note_join_failure();
                let _ = self.controller.disconnect_async().await;
                Err(TransportError::DhcpTimeout)
            }
        }
    }

    async fn request_time(&mut self, timeout: Duration) -> Result<NtpTime, Self::Error> {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.exchange()
            .with_timeout(EmbassyDuration::from_millis(millis))
            .await
            .map_err(|_| TransportError::Timeout)?
    }

    async fn radio_off(&mut self) {
        if matches!(self.controller.is_connected(), Ok(true)) {
            let _ = self.controller.disconnect_async().await;
        }
        if let Err(err) = self.controller.stop_async().await {
            info!("wifi stop failed: {:?}", err);
        }
        self.connectivity.mark_radio_off();
    }
}
