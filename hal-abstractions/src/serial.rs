//! Serial port used to talk to the reader module

use core::future::Future;

/// UART connected to the RFID reader
///
/// Reads and writes go through `embedded-io-async`; on top of that the
/// reader setup needs to retune the local baud rate and throw away
/// unsolicited bytes (the module prints a firmware banner after power-on).
pub trait ReaderSerial: embedded_io_async::Read + embedded_io_async::Write {
    /// Reconfigure the local side of the link to `baud`
    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Self::Error>;

    /// Drop every byte received so far
    fn discard_input(&mut self) -> impl Future<Output = ()>;
}
