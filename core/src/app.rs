//! Top-level firmware sequence
//!
//! Startup: join the network (retried until it succeeds), synchronise the
//! clock once (failure only logged), initialize the reader (fatal on
//! failure). Then acquisition windows run back to back forever.

use core::convert::Infallible;

use embedded_hal_async::delay::DelayNs;
use hal_abstractions::{PowerControl, TimeSource, Timestamp, WifiLink};

use crate::clock::LocalTime;
use crate::config::Config;
use crate::cycle::AcquisitionCycle;
use crate::error::InitError;
use crate::init::initialize_reader;
use crate::reader::{RfidReader, VersionInfo};
use crate::report::ReportSink;

/// Everything the firmware drives, owned for the process lifetime
pub struct Firmware<R, L, T, P, D, S> {
    config: Config,
    reader: R,
    link: L,
    clock: T,
    power: P,
    delay: D,
    sink: S,
}

impl<R, L, T, P, D, S> Firmware<R, L, T, P, D, S>
where
    R: RfidReader,
    L: WifiLink,
    T: TimeSource,
    P: PowerControl,
    D: DelayNs,
    S: ReportSink,
{
    pub fn new(config: Config, reader: R, link: L, clock: T, power: P, delay: D, sink: S) -> Self {
        Self {
            config,
            reader,
            link,
            clock,
            power,
            delay,
            sink,
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Join the configured network, retrying until it works
    pub async fn bring_up_network(&mut self) -> u32 {
        let network = &self.config.network;
        info!("Connecting to {}", network.ssid);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.link.join(network.ssid, network.passphrase).await {
                Ok(()) => {
                    info!("WiFi connected after {} attempt(s)", attempts);
                    return attempts;
                }
                Err(e) => {
                    debug!("Join attempt {} failed: {}", attempts, e);
                    self.delay.delay_ms(network.retry_delay_ms).await;
                }
            }
        }
    }

    /// One clock synchronisation; `None` when it failed
    pub async fn sync_clock(&mut self) -> Option<Timestamp> {
        let time = &self.config.time;
        match self.clock.sync(time.host).await {
            Ok(timestamp) => {
                let local = LocalTime::from_timestamp(timestamp, time.local_offset_secs());
                info!("Local time: {}", local.render().as_str());
                Some(timestamp)
            }
            Err(e) => {
                warn!("Failed to obtain time: {}", e);
                None
            }
        }
    }

    /// Network, clock and reader bring-up
    pub async fn start(&mut self) -> Result<VersionInfo, InitError> {
        self.bring_up_network().await;
        self.sync_clock().await;
        info!("Initializing...");
        initialize_reader(&mut self.reader, &mut self.delay, &self.config.reader).await
    }

    /// Start up, then run acquisition windows forever
    ///
    /// Only returns on a fatal initialization error, before any read.
    pub async fn run(&mut self) -> Result<Infallible, InitError> {
        self.start().await?;

        let mut cycle: AcquisitionCycle = AcquisitionCycle::new(self.config.acquisition.clone());
        info!(
            "Acquisition: {} reads per window, {} s sleep",
            cycle.config().window_iterations,
            cycle.config().sleep_secs
        );
        loop {
            let summary = cycle
                .run_window(&mut self.reader, &mut self.sink, &mut self.power)
                .await;
            info!("Window done: {}", summary);
        }
    }
}
