#![deny(unsafe_code)]
#![deny(warnings)]
//! Wi-Fi hardware layer
//!
//! An ESP32 running ESP-Hosted sits on SPI2 and acts as the radio. The
//! `embassy_net_esp_hosted` runner owns the SPI traffic; `Control` is used
//! to bring the station interface up and associate.

use defmt::{info, warn, Debug2Format};
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice as SpiDeviceBus;
use embassy_futures::select::{select, Either};
use embassy_net::Stack;
use embassy_net_esp_hosted::{Control, NetDriver, Runner, State};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Output;
use embassy_stm32::mode::Async;
use embassy_stm32::spi::Spi;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use hal_abstractions::{LinkError, WifiLink};
use static_cell::StaticCell;

use super::config::WifiConfig;

type SpiBus = SpiDeviceBus<'static, CriticalSectionRawMutex, Spi<'static, Async>, Output<'static>>;

/// Runner type that must be polled alongside the network stack
pub type EspRunner = Runner<'static, SpiBus, ExtiInput<'static>, Output<'static>>;

/// ESP32 co-processor peripherals bundle
pub struct EspPeripherals<'a> {
    pub spi: Spi<'a, Async>,
    pub cs: Output<'a>,
    pub reset: Output<'a>,
    pub handshake: ExtiInput<'a>,
    pub ready: ExtiInput<'a>,
}

/// Initialize the ESP-Hosted co-processor
///
/// Returns device, control handle and runner. Runner must be continuously
/// polled for device operation.
pub async fn init_esp_hosted(
    periph: EspPeripherals<'static>,
) -> (NetDriver<'static>, Control<'static>, EspRunner) {
    let EspPeripherals {
        spi,
        cs,
        reset,
        handshake,
        ready,
    } = periph;

    type SpiBusType = embassy_sync::mutex::Mutex<CriticalSectionRawMutex, Spi<'static, Async>>;
    static SPI_BUS: StaticCell<SpiBusType> = StaticCell::new();
    let spi_bus = SPI_BUS.init(embassy_sync::mutex::Mutex::new(spi));
    let spi_device = SpiDeviceBus::new(spi_bus, cs);

    static STATE: StaticCell<State> = StaticCell::new();
    let state = STATE.init(State::new());

    let (device, control, runner) =
        embassy_net_esp_hosted::new(state, spi_device, handshake, ready, reset).await;

    info!("ESP-Hosted co-processor attached");

    (device, control, runner)
}

/// Station-mode link over the ESP-Hosted control channel
pub struct EspWifiLink {
    control: Control<'static>,
    stack: Stack<'static>,
    config: WifiConfig,
    initialized: bool,
}

impl EspWifiLink {
    pub fn new(control: Control<'static>, stack: Stack<'static>, config: WifiConfig) -> Self {
        Self {
            control,
            stack,
            config,
            initialized: false,
        }
    }

    fn log_address(&self) {
        if let Some(config) = self.stack.config_v4() {
            let ip = config.address.address();
            let octets = ip.octets();
            info!(
                "IP: {}.{}.{}.{}",
                octets[0], octets[1], octets[2], octets[3]
            );

            if let Some(gateway) = config.gateway {
                let gw_octets = gateway.octets();
                info!(
                    "Gateway: {}.{}.{}.{}",
                    gw_octets[0], gw_octets[1], gw_octets[2], gw_octets[3]
                );
            }
        }
    }
}

impl WifiLink for EspWifiLink {
    async fn join(&mut self, ssid: &str, passphrase: &str) -> Result<(), LinkError> {
        if !self.initialized {
            self.control.init().await.map_err(|e| {
                warn!("ESP-Hosted init failed: {}", Debug2Format(&e));
                LinkError::Radio
            })?;
            self.initialized = true;
        }

        self.control.connect(ssid, passphrase).await.map_err(|e| {
            warn!("Association with {} failed: {}", ssid, Debug2Format(&e));
            LinkError::JoinFailed
        })?;
        info!("Associated with {}, waiting for DHCP...", ssid);

        let lease_timeout = Timer::after(Duration::from_secs(self.config.dhcp_timeout_secs));
        match select(self.stack.wait_config_up(), lease_timeout).await {
            Either::First(()) => {
                info!("Network is UP!");
                self.log_address();
                Ok(())
            }
            Either::Second(()) => Err(LinkError::AddressTimeout),
        }
    }
}
