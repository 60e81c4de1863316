//! EPC to tag identifier encoding

use heapless::String;

use crate::error::EpcError;

/// Longest EPC the firmware accepts (96-bit EPC)
pub const MAX_EPC_LEN: usize = 12;

/// Characters in the identifier of a maximum-length EPC
pub const TAG_ID_LEN: usize = MAX_EPC_LEN * 2;

/// Canonical tag identifier: uppercase hex, two characters per EPC byte
pub type TagId = String<TAG_ID_LEN>;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encode `epc` as an uppercase hexadecimal `TagId`
///
/// `[0x1A, 0x2B]` becomes `"1A2B"`. The result is always exactly twice as
/// long as the input.
pub fn encode_hex(epc: &[u8]) -> Result<TagId, EpcError> {
    if epc.len() > MAX_EPC_LEN {
        return Err(EpcError::TooLong { len: epc.len() });
    }

    let mut id = TagId::new();
    for byte in epc {
        for nibble in [byte >> 4, byte & 0x0F] {
            id.push(HEX_DIGITS[nibble as usize] as char)
                .map_err(|_| EpcError::TooLong { len: epc.len() })?;
        }
    }
    Ok(id)
}
