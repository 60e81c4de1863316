#![deny(unsafe_code)]
#![deny(warnings)]
//! SNTP client implementing `TimeSource`
//!
//! One NTPv3 client exchange per `sync` call. The result is only used to
//! give the log a wall-clock reference, so there is no retry and no RTC.

use defmt::{info, warn, Debug2Format};
use embassy_futures::select::{select, Either};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{Duration, Instant, Timer};
use hal_abstractions::{TimeError, TimeSource, Timestamp};

use super::config::SntpConfig;

const NTP_PORT: u16 = 123;
const NTP_PACKET_LEN: usize = 48;

/// SNTP client for time synchronization
pub struct SntpClient {
    stack: Stack<'static>,
    config: SntpConfig,
}

impl SntpClient {
    /// Create a new SNTP client with default configuration
    pub fn new(stack: Stack<'static>) -> Self {
        Self::with_config(stack, SntpConfig::default())
    }

    /// Create a new SNTP client with custom configuration
    pub fn with_config(stack: Stack<'static>, config: SntpConfig) -> Self {
        Self { stack, config }
    }

    async fn sntp_request(&self, server: &str) -> Result<Timestamp, TimeError> {
        let server_ip = self
            .stack
            .dns_query(server, DnsQueryType::A)
            .await
            .map_err(|_| TimeError::DnsError)?
            .first()
            .copied()
            .ok_or(TimeError::DnsError)?;

        let server_endpoint = IpEndpoint::new(server_ip, NTP_PORT);
        info!("Resolved {} to {}", server, Debug2Format(&server_endpoint));

        let mut rx_meta = [PacketMetadata::EMPTY; 2];
        let mut rx_buffer = [0u8; 64];
        let mut tx_meta = [PacketMetadata::EMPTY; 2];
        let mut tx_buffer = [0u8; 64];
        let mut socket = UdpSocket::new(
            self.stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|_| TimeError::SocketError)?;

        // NTP request: LI=0, VN=3, Mode=3 (Client)
        let mut ntp_packet = [0u8; NTP_PACKET_LEN];
        ntp_packet[0] = 0x1B;
        let transmit_time = Instant::now();
        socket
            .send_to(&ntp_packet, server_endpoint)
            .await
            .map_err(|_| TimeError::SocketError)?;

        let mut response = [0u8; NTP_PACKET_LEN];
        let timeout = Timer::after(Duration::from_millis(self.config.timeout_ms));
        let (recv_len, from_addr) = match select(timeout, socket.recv_from(&mut response)).await {
            Either::First(_) => return Err(TimeError::Timeout),
            Either::Second(result) => result.map_err(|_| TimeError::SocketError)?,
        };
        let receive_time = Instant::now();

        if recv_len < NTP_PACKET_LEN || from_addr.endpoint.addr != server_ip {
            return Err(TimeError::InvalidResponse);
        }

        let stratum = response[1];
        if stratum == 0 || stratum > self.config.max_stratum {
            warn!(
                "Invalid stratum {} (max {})",
                stratum, self.config.max_stratum
            );
            return Err(TimeError::ServerError);
        }

        let tx_timestamp_secs =
            u32::from_be_bytes([response[40], response[41], response[42], response[43]]) as u64;
        let tx_timestamp_frac =
            u32::from_be_bytes([response[44], response[45], response[46], response[47]]);

        let rtt = receive_time.duration_since(transmit_time);
        let rtt_correction_micros = rtt.as_micros() / 2;

        let timestamp = Timestamp::from_ntp(tx_timestamp_secs, tx_timestamp_frac)
            .add_micros(rtt_correction_micros);

        info!(
            "NTP timestamp: {}.{:06} UTC (stratum {}, RTT correction: {} µs)",
            timestamp.unix_secs, timestamp.micros, stratum, rtt_correction_micros
        );
        Ok(timestamp)
    }
}

impl TimeSource for SntpClient {
    async fn sync(&mut self, host: &str) -> Result<Timestamp, TimeError> {
        info!("Starting SNTP synchronization with {}", host);
        self.sntp_request(host).await
    }
}
