#![deny(unsafe_code)]
#![deny(warnings)]
//! Network configuration structures
//!
//! Credentials and the time server come from the build environment:
//!
//! ```text
//! RFID_WIFI_SSID=... RFID_WIFI_PASSPHRASE=... RFID_NTP_HOST=... cargo build --release
//! ```

use rfid_core::{Config, NetworkConfig, TimeConfig};

/// SNTP client configuration
#[derive(Debug, Clone)]
pub struct SntpConfig {
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum accepted stratum level (1-15)
    pub max_stratum: u8,
}

impl Default for SntpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_stratum: 3,
        }
    }
}

/// Wi-Fi station configuration
#[derive(Debug, Clone)]
pub struct WifiConfig {
    /// How long to wait for a DHCP lease after association
    pub dhcp_timeout_secs: u64,
    /// Random seed for network stack
    pub seed: u64,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            dhcp_timeout_secs: 10,
            seed: 0x1234_5678_u64,
        }
    }
}

/// Firmware configuration with build-time overrides applied
pub fn firmware_config() -> Config {
    let network = NetworkConfig::new(
        option_env!("RFID_WIFI_SSID").unwrap_or(""),
        option_env!("RFID_WIFI_PASSPHRASE").unwrap_or(""),
    );
    let time = TimeConfig {
        host: option_env!("RFID_NTP_HOST").unwrap_or("pool.ntp.org"),
        ..TimeConfig::default()
    };

    Config {
        network,
        time,
        ..Config::default()
    }
}
