//! RFID reader interface and the M6E Nano driver
//!
//! - **`protocol`**: frame encoding, CRC and response decoding
//! - **`m6e`**: async driver speaking the protocol over a `ReaderSerial`
//!
//! The acquisition logic only sees the `RfidReader` trait.

use core::future::Future;

use crate::error::ReaderError;

pub mod m6e;
pub mod protocol;

pub use m6e::M6eNano;

/// Regulatory region codes understood by the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Region {
    India = 0x04,
    Japan = 0x05,
    China = 0x06,
    Europe = 0x08,
    Korea = 0x09,
    Australia = 0x0B,
    NewZealand = 0x0C,
    NorthAmerica = 0x0D,
    Open = 0xFF,
}

/// Air protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TagProtocol {
    /// EPC Class 1 Gen 2 (ISO 18000-63)
    Gen2 = 0x05,
}

/// Antenna selection for transmit and receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AntennaPort {
    pub tx: u8,
    pub rx: u8,
}

/// Identity block returned by the version command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VersionInfo {
    pub bootloader: [u8; 4],
    pub hardware: [u8; 4],
    pub firmware_date: [u8; 4],
    pub firmware: [u8; 4],
}

/// Result of one single-tag read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadOutcome {
    /// A tag answered; this many EPC bytes were written to the buffer
    Tag(usize),
    /// Nothing in range before the timeout (includes keepalives)
    NoTag,
    /// Transport or protocol failure
    Error(ReaderError),
}

/// Command vocabulary of the reader module
///
/// Commands are strictly sequential: one request, at most one response.
pub trait RfidReader {
    /// Set the local port to `baud` and drop anything already received
    fn open(&mut self, baud: u32) -> impl Future<Output = Result<(), ReaderError>>;

    fn get_version(&mut self) -> impl Future<Output = Result<VersionInfo, ReaderError>>;

    /// Leave continuous-read mode. No response is awaited.
    fn stop_reading(&mut self) -> impl Future<Output = Result<(), ReaderError>>;

    /// Ask the module to switch to `baud`. No response is awaited.
    fn set_baud(&mut self, baud: u32) -> impl Future<Output = Result<(), ReaderError>>;

    fn set_tag_protocol(
        &mut self,
        protocol: TagProtocol,
    ) -> impl Future<Output = Result<(), ReaderError>>;

    fn set_antenna_port(
        &mut self,
        port: AntennaPort,
    ) -> impl Future<Output = Result<(), ReaderError>>;

    fn set_region(&mut self, region: Region) -> impl Future<Output = Result<(), ReaderError>>;

    /// Read TX power in centi-dBm
    fn set_read_power(&mut self, cdbm: i16) -> impl Future<Output = Result<(), ReaderError>>;

    /// Read one tag's EPC into `epc`, waiting at most `timeout_ms` for a tag
    fn read_tag_epc(
        &mut self,
        epc: &mut [u8],
        timeout_ms: u16,
    ) -> impl Future<Output = ReadOutcome>;
}
