#![deny(unsafe_code)]
#![deny(warnings)]
//! UART link to the M6E Nano
//!
//! TX is DMA-driven; RX runs into a DMA ring buffer so bytes arriving
//! between reads are not lost.

use embassy_futures::select::{select, Either};
use embassy_stm32::mode::Async;
use embassy_stm32::usart::{self, RingBufferedUartRx, UartTx};
use embassy_time::Timer;
use hal_abstractions::ReaderSerial;

/// Quiet time after which the receive side counts as drained
const DRAIN_QUIET_MS: u64 = 5;
const MAX_DRAIN_ROUNDS: usize = 64;

/// Errors from the reader UART
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ReaderPortError {
    /// Framing, noise, parity or overrun on the line
    Uart(usart::Error),
    /// Requested baud rate cannot be produced from the peripheral clock
    Config,
}

impl core::fmt::Display for ReaderPortError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Uart(e) => write!(f, "UART error: {:?}", e),
            Self::Config => write!(f, "Unsupported UART configuration"),
        }
    }
}

impl core::error::Error for ReaderPortError {}

impl embedded_io_async::Error for ReaderPortError {
    fn kind(&self) -> embedded_io_async::ErrorKind {
        match self {
            Self::Uart(_) => embedded_io_async::ErrorKind::Other,
            Self::Config => embedded_io_async::ErrorKind::InvalidInput,
        }
    }
}

impl From<usart::Error> for ReaderPortError {
    fn from(e: usart::Error) -> Self {
        Self::Uart(e)
    }
}

/// Split UART with a ring-buffered receiver
pub struct ReaderPort {
    tx: UartTx<'static, Async>,
    rx: RingBufferedUartRx<'static>,
    config: usart::Config,
}

impl ReaderPort {
    pub fn new(
        tx: UartTx<'static, Async>,
        rx: RingBufferedUartRx<'static>,
        config: usart::Config,
    ) -> Self {
        Self { tx, rx, config }
    }
}

impl embedded_io_async::ErrorType for ReaderPort {
    type Error = ReaderPortError;
}

impl embedded_io_async::Read for ReaderPort {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.rx.read(buf).await?)
    }
}

impl embedded_io_async::Write for ReaderPort {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.write(buf).await?;
        Ok(buf.len())
    }

    /// Waits on the transmission-complete interrupt for the last byte
    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(self.tx.flush().await?)
    }
}

impl ReaderSerial for ReaderPort {
    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Self::Error> {
        self.config.baudrate = baud;
        self.tx
            .set_config(&self.config)
            .map_err(|_| ReaderPortError::Config)?;
        self.rx
            .set_config(&self.config)
            .map_err(|_| ReaderPortError::Config)?;
        defmt::debug!("Reader UART now at {} baud", baud);
        Ok(())
    }

    async fn discard_input(&mut self) {
        let mut scratch = [0u8; 32];
        for _ in 0..MAX_DRAIN_ROUNDS {
            match select(
                self.rx.read(&mut scratch),
                Timer::after_millis(DRAIN_QUIET_MS),
            )
            .await
            {
                Either::First(Ok(n)) if n > 0 => continue,
                // Overruns while draining are expected; the buffer restarts clean
                Either::First(Err(_)) => continue,
                _ => break,
            }
        }
    }
}
