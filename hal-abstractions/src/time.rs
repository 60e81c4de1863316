//! Wall-clock time source abstraction

use core::future::Future;

/// Timestamp with microsecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp {
    /// Unix timestamp in seconds since epoch (1970-01-01 00:00:00 UTC)
    pub unix_secs: u64,
    /// Microseconds component (0-999,999)
    pub micros: u32,
}

impl Timestamp {
    /// Create a new timestamp
    pub const fn new(unix_secs: u64, micros: u32) -> Self {
        Self { unix_secs, micros }
    }

    /// Convert from NTP timestamp (seconds since 1900-01-01)
    pub fn from_ntp(ntp_secs: u64, ntp_frac: u32) -> Self {
        /// NTP epoch offset (1900-01-01 to 1970-01-01 in seconds)
        const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

        let unix_secs = ntp_secs.saturating_sub(NTP_UNIX_OFFSET);
        // NTP fraction is in units of 2^-32 s
        let micros = ((ntp_frac as u64 * 1_000_000) >> 32) as u32;
        Self::new(unix_secs, micros)
    }

    /// Add `micros` microseconds, carrying into the seconds field
    pub fn add_micros(self, micros: u64) -> Self {
        let total = self.micros as u64 + micros;
        Self::new(
            self.unix_secs.saturating_add(total / 1_000_000),
            (total % 1_000_000) as u32,
        )
    }
}

/// Time synchronisation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// DNS resolution failed
    DnsError,
    /// Socket bind/send/receive error
    SocketError,
    /// Request timeout
    Timeout,
    /// Malformed or unexpected response
    InvalidResponse,
    /// Server not usable (e.g. unsynchronised stratum)
    ServerError,
}

impl core::fmt::Display for TimeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DnsError => write!(f, "DNS resolution failed"),
            Self::SocketError => write!(f, "Socket error"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::InvalidResponse => write!(f, "Invalid response"),
            Self::ServerError => write!(f, "Server error"),
        }
    }
}

impl core::error::Error for TimeError {}

/// Source of wall-clock time, queried once per call
pub trait TimeSource {
    fn sync(&mut self, host: &str) -> impl Future<Output = Result<Timestamp, TimeError>>;
}
