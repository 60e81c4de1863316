//! Configuration structures
//!
//! Every value has a `Default` matching the reference deployment; boards
//! override what they need (credentials in particular).

use crate::reader::{AntennaPort, Region, TagProtocol};

/// Reader session parameters, applied once during initialization
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReaderConfig {
    /// Baud rate the session should run at
    pub baud_rate: u32,
    /// Rate the module uses after power-on
    pub default_baud_rate: u32,
    /// Regulatory region
    pub region: Region,
    /// Read TX power in centi-dBm (500 = 5.00 dBm)
    pub read_power_cdbm: i16,
    /// Air protocol
    pub protocol: TagProtocol,
    /// TX/RX antenna selection
    pub antenna: AntennaPort,
    /// Setup attempts before giving up
    pub init_attempts: u8,
    /// Pause between setup attempts in milliseconds
    pub retry_delay_ms: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            baud_rate: 38_400,
            default_baud_rate: 115_200,
            region: Region::Europe,
            // Higher values may brown out a USB-powered supply
            read_power_cdbm: 500,
            protocol: TagProtocol::Gen2,
            antenna: AntennaPort { tx: 1, rx: 1 },
            init_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Acquisition window parameters
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionConfig {
    /// Poll iterations per window
    pub window_iterations: u32,
    /// Emit a progress line every this many iterations (0 disables)
    pub progress_every: u32,
    /// Timeout handed to the reader for each single-tag read
    pub read_timeout_ms: u16,
    /// Suspension after a window that saw at least one tag
    pub sleep_secs: u32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            window_iterations: 1000,
            progress_every: 50,
            read_timeout_ms: 500,
            sleep_secs: 30,
        }
    }
}

/// Wi-Fi credentials
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkConfig {
    /// Network name
    pub ssid: &'static str,
    /// WPA passphrase
    pub passphrase: &'static str,
    /// Pause between join attempts in milliseconds
    pub retry_delay_ms: u32,
}

impl NetworkConfig {
    pub const fn new(ssid: &'static str, passphrase: &'static str) -> Self {
        Self {
            ssid,
            passphrase,
            retry_delay_ms: 500,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Time synchronisation endpoint and local offsets
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeConfig {
    /// NTP server hostname
    pub host: &'static str,
    /// Offset from UTC in seconds
    pub utc_offset_secs: i32,
    /// Seasonal (daylight saving) offset in seconds
    pub dst_offset_secs: i32,
}

impl TimeConfig {
    /// Total offset applied when rendering local time
    pub fn local_offset_secs(&self) -> i64 {
        self.utc_offset_secs as i64 + self.dst_offset_secs as i64
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            host: "pool.ntp.org",
            utc_offset_secs: 0,
            dst_offset_secs: 3600,
        }
    }
}

/// Complete firmware configuration
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub reader: ReaderConfig,
    pub acquisition: AcquisitionConfig,
    pub network: NetworkConfig,
    pub time: TimeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reader_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.baud_rate, 38_400);
        assert_eq!(config.default_baud_rate, 115_200);
        assert_eq!(config.region, Region::Europe);
        assert_eq!(config.read_power_cdbm, 500);
        assert_eq!(config.antenna, AntennaPort { tx: 1, rx: 1 });
    }

    #[test]
    fn test_default_acquisition_config() {
        let config = AcquisitionConfig::default();
        assert_eq!(config.window_iterations, 1000);
        assert_eq!(config.progress_every, 50);
        assert_eq!(config.sleep_secs, 30);
    }

    #[test]
    fn test_local_offset_combines_utc_and_dst() {
        let config = TimeConfig {
            host: "time.example.org",
            utc_offset_secs: -18_000,
            dst_offset_secs: 3600,
        };
        assert_eq!(config.local_offset_secs(), -14_400);
        assert_eq!(TimeConfig::default().local_offset_secs(), 3600);
    }
}
