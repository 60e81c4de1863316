//! M6E Nano serial framing
//!
//! Command: `FF len opcode data[len] crc_hi crc_lo`
//! Response: `FF len opcode status_hi status_lo data[len] crc_hi crc_lo`
//!
//! The CRC covers every byte between the header and the CRC itself.

use heapless::Vec;

use crate::error::ReaderError;

pub const HEADER: u8 = 0xFF;

/// Opcodes used by the firmware
pub mod opcode {
    pub const VERSION: u8 = 0x03;
    pub const SET_BAUD_RATE: u8 = 0x06;
    pub const READ_TAG_DATA: u8 = 0x28;
    pub const MULTI_PROTOCOL_TAG_OP: u8 = 0x2F;
    pub const SET_ANTENNA_PORT: u8 = 0x91;
    pub const SET_READ_TX_POWER: u8 = 0x92;
    pub const SET_TAG_PROTOCOL: u8 = 0x93;
    pub const SET_REGION: u8 = 0x97;
}

/// Status word of a successful command
pub const STATUS_OK: u16 = 0x0000;
/// Read completed without any tag answering
pub const STATUS_NO_TAGS_FOUND: u16 = 0x0400;

/// Gen2 memory bank holding the EPC
pub const BANK_EPC: u8 = 0x01;
/// Word address of the EPC inside its bank (after CRC and PC words)
pub const EPC_WORD_ADDRESS: u32 = 0x02;

/// Largest command payload the firmware ever sends
pub const MAX_COMMAND_DATA: usize = 16;
/// Command frame: header, len, opcode, data, crc
pub const MAX_COMMAND_FRAME: usize = MAX_COMMAND_DATA + 5;
/// Response payload is bounded by the one-byte length field
pub const MAX_RESPONSE_DATA: usize = u8::MAX as usize;
/// Response frame: header, len, opcode, status, data, crc
pub const MAX_RESPONSE_FRAME: usize = MAX_RESPONSE_DATA + 7;

const CRC_TABLE: [u16; 16] = [
    0x0000, 0x1021, 0x2042, 0x3063, 0x4084, 0x50a5, 0x60c6, 0x70e7, 0x8108, 0x9129, 0xa14a,
    0xb16b, 0xc18c, 0xd1ad, 0xe1ce, 0xf1ef,
];

/// CRC-16 (poly 0x1021, init 0xFFFF) fed one nibble at a time
pub fn crc16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0xFFFF_u16, |crc, &byte| {
        let crc = ((crc << 4) | (byte >> 4) as u16) ^ CRC_TABLE[(crc >> 12) as usize];
        ((crc << 4) | (byte & 0x0F) as u16) ^ CRC_TABLE[(crc >> 12) as usize]
    })
}

/// Build a complete command frame
pub fn encode_command(opcode: u8, data: &[u8]) -> Result<Vec<u8, MAX_COMMAND_FRAME>, ReaderError> {
    if data.len() > MAX_COMMAND_DATA {
        return Err(ReaderError::FrameTooLong);
    }

    let mut frame = Vec::new();
    frame.push(HEADER).map_err(|_| ReaderError::FrameTooLong)?;
    frame
        .push(data.len() as u8)
        .map_err(|_| ReaderError::FrameTooLong)?;
    frame.push(opcode).map_err(|_| ReaderError::FrameTooLong)?;
    frame
        .extend_from_slice(data)
        .map_err(|_| ReaderError::FrameTooLong)?;

    let crc = crc16(&frame[1..]);
    frame
        .extend_from_slice(&crc.to_be_bytes())
        .map_err(|_| ReaderError::FrameTooLong)?;
    Ok(frame)
}

/// Decoded response frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub opcode: u8,
    pub status: u16,
    pub data: Vec<u8, MAX_RESPONSE_DATA>,
}

/// Total frame length announced by a response's length byte
pub const fn response_frame_len(data_len: u8) -> usize {
    data_len as usize + 7
}

/// Decode a response frame, starting at its header byte
pub fn decode_response(frame: &[u8]) -> Result<Response, ReaderError> {
    if frame.len() < 7 || frame[0] != HEADER {
        return Err(ReaderError::Malformed);
    }
    let total = response_frame_len(frame[1]);
    if frame.len() != total {
        return Err(ReaderError::Malformed);
    }

    let (body, crc) = frame[1..].split_at(total - 3);
    if crc16(body) != u16::from_be_bytes([crc[0], crc[1]]) {
        return Err(ReaderError::BadCrc);
    }

    let data = Vec::from_slice(&body[4..]).map_err(|_| ReaderError::Malformed)?;
    Ok(Response {
        opcode: body[1],
        status: u16::from_be_bytes([body[2], body[3]]),
        data,
    })
}

/// Payload of a read-tag-data request for the EPC bank
pub fn read_epc_request(timeout_ms: u16) -> [u8; 8] {
    let mut data = [0u8; 8];
    data[..2].copy_from_slice(&timeout_ms.to_be_bytes());
    data[2] = BANK_EPC;
    data[3..7].copy_from_slice(&EPC_WORD_ADDRESS.to_be_bytes());
    // Word count 0 reads the rest of the bank
    data[7] = 0x00;
    data
}

/// Build a response frame as the module would send it
#[cfg(test)]
pub(crate) fn encode_response(opcode: u8, status: u16, data: &[u8]) -> std::vec::Vec<u8> {
    let mut frame = std::vec![HEADER, data.len() as u8, opcode];
    frame.extend_from_slice(&status.to_be_bytes());
    frame.extend_from_slice(data);
    let crc = crc16(&frame[1..]);
    frame.extend_from_slice(&crc.to_be_bytes());
    frame
}
