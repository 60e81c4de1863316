#![deny(warnings)]
//! Network side of the board
//!
//! - **`config`**: Configuration structs with `Default` implementations
//! - **`wifi`**: ESP32 (ESP-Hosted) bring-up and the `WifiLink` implementation
//! - **`sntp`**: SNTP client implementing `TimeSource`
//!
//! The ESP32 co-processor appears to embassy-net as an Ethernet-medium
//! device; the runner futures returned by `wifi::init_esp_hosted` and
//! `embassy_net::new` must be polled for as long as the link is used.

pub mod config;
pub mod sntp;
pub mod wifi;

pub use config::{firmware_config, WifiConfig};
pub use sntp::SntpClient;
pub use wifi::EspWifiLink;
