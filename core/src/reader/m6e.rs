//! Async driver for the ThingMagic M6E Nano
//!
//! Speaks the framed serial protocol from [`super::protocol`] over any board
//! port implementing `ReaderSerial`. Response deadlines are enforced by
//! racing the frame read against an `embedded-hal-async` delay.

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use hal_abstractions::ReaderSerial;

use super::protocol::{self, opcode, Response, MAX_RESPONSE_FRAME};
use super::{AntennaPort, ReadOutcome, Region, RfidReader, TagProtocol, VersionInfo};
use crate::error::ReaderError;

/// Deadline for ordinary command responses
pub const COMMAND_TIMEOUT_MS: u32 = 1000;
/// Extra time granted on top of a read's own timeout
pub const READ_GRACE_MS: u32 = 100;
/// Hardware ceiling for read TX power (27.00 dBm)
pub const MAX_READ_POWER_CDBM: i16 = 2700;

pub struct M6eNano<S, D> {
    port: S,
    delay: D,
}

impl<S, D> M6eNano<S, D>
where
    S: ReaderSerial,
    D: DelayNs,
{
    pub fn new(port: S, delay: D) -> Self {
        Self { port, delay }
    }

    /// Give the port and delay back
    pub fn release(self) -> (S, D) {
        (self.port, self.delay)
    }

    async fn send(&mut self, opcode: u8, data: &[u8]) -> Result<(), ReaderError> {
        let frame = protocol::encode_command(opcode, data)?;
        self.port.discard_input().await;
        self.port
            .write_all(&frame)
            .await
            .map_err(|_| ReaderError::Io)?;
        self.port.flush().await.map_err(|_| ReaderError::Io)
    }

    async fn receive(&mut self, timeout_ms: u32) -> Result<Response, ReaderError> {
        match select(
            read_frame(&mut self.port),
            self.delay.delay_ms(timeout_ms),
        )
        .await
        {
            Either::First(response) => response,
            Either::Second(()) => Err(ReaderError::Timeout),
        }
    }

    /// Send a command and wait for the response to that same command
    async fn exchange(
        &mut self,
        opcode: u8,
        data: &[u8],
        timeout_ms: u32,
    ) -> Result<Response, ReaderError> {
        self.send(opcode, data).await?;
        let response = self.receive(timeout_ms).await?;
        if response.opcode != opcode {
            return Err(ReaderError::WrongOpcode {
                expected: opcode,
                received: response.opcode,
            });
        }
        Ok(response)
    }

    /// `exchange`, additionally requiring a zero status word
    async fn command(&mut self, opcode: u8, data: &[u8]) -> Result<Response, ReaderError> {
        let response = self.exchange(opcode, data, COMMAND_TIMEOUT_MS).await?;
        match response.status {
            protocol::STATUS_OK => Ok(response),
            status => Err(ReaderError::Status(status)),
        }
    }
}

/// Hunt for a header byte, then read exactly one frame
async fn read_frame<S: ReaderSerial>(port: &mut S) -> Result<Response, ReaderError> {
    let mut frame = [0u8; MAX_RESPONSE_FRAME];

    loop {
        port.read_exact(&mut frame[..1])
            .await
            .map_err(|_| ReaderError::Io)?;
        if frame[0] == protocol::HEADER {
            break;
        }
    }

    port.read_exact(&mut frame[1..2])
        .await
        .map_err(|_| ReaderError::Io)?;
    let total = protocol::response_frame_len(frame[1]);
    port.read_exact(&mut frame[2..total])
        .await
        .map_err(|_| ReaderError::Io)?;

    protocol::decode_response(&frame[..total])
}

impl<S, D> RfidReader for M6eNano<S, D>
where
    S: ReaderSerial,
    D: DelayNs,
{
    async fn open(&mut self, baud: u32) -> Result<(), ReaderError> {
        self.port
            .set_baud_rate(baud)
            .map_err(|_| ReaderError::Io)?;
        self.port.discard_input().await;
        Ok(())
    }

    async fn get_version(&mut self) -> Result<VersionInfo, ReaderError> {
        let response = self.command(opcode::VERSION, &[]).await?;
        let block = |n: usize| -> Result<[u8; 4], ReaderError> {
            response
                .data
                .get(n * 4..n * 4 + 4)
                .and_then(|s| s.try_into().ok())
                .ok_or(ReaderError::Malformed)
        };
        Ok(VersionInfo {
            bootloader: block(0)?,
            hardware: block(1)?,
            firmware_date: block(2)?,
            firmware: block(3)?,
        })
    }

    async fn stop_reading(&mut self) -> Result<(), ReaderError> {
        self.send(opcode::MULTI_PROTOCOL_TAG_OP, &[0x00, 0x00, 0x02])
            .await
    }

    async fn set_baud(&mut self, baud: u32) -> Result<(), ReaderError> {
        // The module switches rates before it could answer
        self.send(opcode::SET_BAUD_RATE, &baud.to_be_bytes()).await
    }

    async fn set_tag_protocol(&mut self, protocol: TagProtocol) -> Result<(), ReaderError> {
        self.command(opcode::SET_TAG_PROTOCOL, &[0x00, protocol as u8])
            .await
            .map(|_| ())
    }

    async fn set_antenna_port(&mut self, port: AntennaPort) -> Result<(), ReaderError> {
        self.command(opcode::SET_ANTENNA_PORT, &[port.tx, port.rx])
            .await
            .map(|_| ())
    }

    async fn set_region(&mut self, region: Region) -> Result<(), ReaderError> {
        self.command(opcode::SET_REGION, &[region as u8])
            .await
            .map(|_| ())
    }

    async fn set_read_power(&mut self, cdbm: i16) -> Result<(), ReaderError> {
        if !(0..=MAX_READ_POWER_CDBM).contains(&cdbm) {
            return Err(ReaderError::InvalidPower(cdbm));
        }
        self.command(opcode::SET_READ_TX_POWER, &cdbm.to_be_bytes())
            .await
            .map(|_| ())
    }

    async fn read_tag_epc(&mut self, epc: &mut [u8], timeout_ms: u16) -> ReadOutcome {
        let request = protocol::read_epc_request(timeout_ms);
        let response = match self
            .exchange(
                opcode::READ_TAG_DATA,
                &request,
                timeout_ms as u32 + READ_GRACE_MS,
            )
            .await
        {
            Ok(response) => response,
            Err(ReaderError::Timeout) => return ReadOutcome::NoTag,
            Err(e) => return ReadOutcome::Error(e),
        };

        match response.status {
            protocol::STATUS_OK => {
                // First payload byte echoes the read options
                let payload = match response.data.get(1..) {
                    Some(payload) if !payload.is_empty() => payload,
                    _ => return ReadOutcome::Error(ReaderError::Malformed),
                };
                let len = payload.len().min(epc.len());
                epc[..len].copy_from_slice(&payload[..len]);
                ReadOutcome::Tag(len)
            }
            protocol::STATUS_NO_TAGS_FOUND => ReadOutcome::NoTag,
            status => ReadOutcome::Error(ReaderError::Status(status)),
        }
    }
}
