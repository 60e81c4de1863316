//! Error types shared across the crate

/// Reader transport and protocol errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReaderError {
    /// Serial port read/write failed
    Io,
    /// No complete response within the deadline
    Timeout,
    /// Response checksum mismatch
    BadCrc,
    /// Response too short or longer than its length byte allows
    Malformed,
    /// Response answers a different command (module is streaming reads)
    WrongOpcode { expected: u8, received: u8 },
    /// Module reported a non-zero status word
    Status(u16),
    /// Command payload does not fit a frame
    FrameTooLong,
    /// Read power outside 0..=2700 centi-dBm
    InvalidPower(i16),
}

impl core::fmt::Display for ReaderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "Serial I/O error"),
            Self::Timeout => write!(f, "Response timeout"),
            Self::BadCrc => write!(f, "Bad response CRC"),
            Self::Malformed => write!(f, "Malformed response"),
            Self::WrongOpcode { expected, received } => write!(
                f,
                "Wrong opcode in response (expected 0x{:02X}, got 0x{:02X})",
                expected, received
            ),
            Self::Status(code) => write!(f, "Reader status 0x{:04X}", code),
            Self::FrameTooLong => write!(f, "Command frame too long"),
            Self::InvalidPower(cdbm) => write!(f, "Read power {} cdBm out of range", cdbm),
        }
    }
}

impl core::error::Error for ReaderError {}

/// Terminal initialization failures
///
/// Any of these stops the firmware before the first acquisition window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// Module never answered a version request
    ReaderUnresponsive,
    /// Module answered but rejected a session parameter
    Configuration(ReaderError),
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ReaderUnresponsive => {
                write!(f, "Module failed to respond. Please check wiring.")
            }
            Self::Configuration(e) => write!(f, "Reader configuration failed: {}", e),
        }
    }
}

impl core::error::Error for InitError {}

impl From<ReaderError> for InitError {
    fn from(e: ReaderError) -> Self {
        InitError::Configuration(e)
    }
}

/// EPC encoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EpcError {
    /// EPC longer than the supported maximum
    TooLong { len: usize },
}

impl core::fmt::Display for EpcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooLong { len } => write!(f, "EPC of {} bytes is too long", len),
        }
    }
}

impl core::error::Error for EpcError {}

/// Observed-tag set has no room for another identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TagSetFull;

impl core::fmt::Display for TagSetFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Tag set full")
    }
}

impl core::error::Error for TagSetFull {}
