//! AAL5 CPCS-PDU serialization.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{AAL5_TRAILER_SIZE, ATM_CELL_PAYLOAD_SIZE};
use crate::crc::CrcCalculators;
use crate::error::AtmParsingError;

/// Wraps `payload` in an AAL5 CPCS-PDU: padding to a whole number of cells,
/// then UU, CPI, length and CRC-32.
///
/// # Errors
/// - [`AtmParsingError::ValueOutOfRange`] - payload longer than 65535 bytes
pub fn build_aal5_cpcs_pdu(payload: &[u8], uu: u8, cpi: u8) -> Result<Bytes, AtmParsingError> {
    let length = u16::try_from(payload.len()).map_err(|_| AtmParsingError::ValueOutOfRange {
        field: "aal5_length",
        max: u32::from(u16::MAX),
        got: u32::try_from(payload.len()).unwrap_or(u32::MAX),
    })?;

    let unpadded = payload.len() + AAL5_TRAILER_SIZE;
    let total = unpadded.div_ceil(ATM_CELL_PAYLOAD_SIZE) * ATM_CELL_PAYLOAD_SIZE;

    let mut buf = BytesMut::with_capacity(total);
    buf.put_slice(payload);
    buf.put_bytes(0, total - unpadded);
    buf.put_u8(uu);
    buf.put_u8(cpi);
    buf.put_u16(length);
    let crc = CrcCalculators::new().aal5_crc32(&buf);
    buf.put_u32(crc);
    Ok(buf.freeze())
}
