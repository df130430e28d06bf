//! Cell header and OAM cell serialization.

use bytes::{BufMut, Bytes, BytesMut};

use crate::atm::cell_header::{CellHeader, ReferencePoint};
use crate::atm::oam::OamType;
use crate::constants::{
    ATM_CELL_HEADER_SIZE, ATM_CELL_PAYLOAD_SIZE, ATM_CELL_SIZE, CELL_CLP_MASK,
    OAM_FUNCTION_SPECIFIC_SIZE,
};
use crate::crc::CrcCalculators;
use crate::error::AtmParsingError;

/// Filler for unused OAM function-specific bytes (I.610).
const OAM_UNUSED_OCTET: u8 = 0x6A;

fn check_range(field: &'static str, value: u32, max: u32) -> Result<(), AtmParsingError> {
    if value > max {
        return Err(AtmParsingError::ValueOutOfRange {
            field,
            max,
            got: value,
        });
    }
    Ok(())
}

/// Serializes a cell header, appending the HEC byte when `with_hec` is set.
///
/// The GFC is written only at the UNI; at the NNI those bits belong to the VPI.
///
/// # Errors
/// - [`AtmParsingError::ValueOutOfRange`] - VPI, GFC or PTI wider than the field
pub fn build_cell_header(
    header: &CellHeader,
    reference_point: ReferencePoint,
    with_hec: bool,
) -> Result<Bytes, AtmParsingError> {
    let vpi_max = (1u32 << reference_point.vpi_bits()) - 1;
    check_range("vpi", u32::from(header.vpi.value()), vpi_max)?;
    check_range("payload_type", u32::from(header.payload_type), 0x07)?;

    let first = match reference_point {
        ReferencePoint::Uni => {
            let gfc = header.gfc.unwrap_or(0);
            check_range("gfc", u32::from(gfc), 0x0F)?;
            (gfc << 4) | (header.vpi.value() >> 4) as u8
        }
        ReferencePoint::Nni => (header.vpi.value() >> 4) as u8,
    };
    let vci = header.vci.value();
    let raw = [
        first,
        (((header.vpi.value() & 0x0F) as u8) << 4) | (vci >> 12) as u8,
        (vci >> 4) as u8,
        (((vci & 0x0F) as u8) << 4)
            | (header.payload_type << 1)
            | if header.clp { CELL_CLP_MASK } else { 0 },
    ];

    let mut buf = BytesMut::with_capacity(ATM_CELL_HEADER_SIZE);
    buf.put_slice(&raw);
    if with_hec {
        buf.put_u8(CrcCalculators::new().hec(&raw));
    }
    Ok(buf.freeze())
}

/// Serializes a full 53-byte cell (header with HEC plus payload).
///
/// # Errors
/// - [`AtmParsingError::ValueOutOfRange`] - header field out of range, or a
///   payload that is not exactly 48 bytes
pub fn build_cell(
    header: &CellHeader,
    reference_point: ReferencePoint,
    payload: &[u8],
) -> Result<Bytes, AtmParsingError> {
    if payload.len() != ATM_CELL_PAYLOAD_SIZE {
        return Err(AtmParsingError::ValueOutOfRange {
            field: "cell_payload_len",
            max: ATM_CELL_PAYLOAD_SIZE as u32,
            got: payload.len() as u32,
        });
    }
    let head = build_cell_header(header, reference_point, true)?;
    let mut buf = BytesMut::with_capacity(ATM_CELL_SIZE);
    buf.put_slice(&head);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Builds a 48-byte OAM cell payload with a valid CRC-10.
///
/// Unused function-specific bytes are filled with 0x6A. The six reserved
/// bits in front of the CRC are zero.
///
/// # Errors
/// - [`AtmParsingError::ValueOutOfRange`] - function type wider than 4 bits
///   or more than 45 function-specific bytes
pub fn build_oam_cell(
    oam_type: OamType,
    function_type: u8,
    function_specific: &[u8],
) -> Result<Bytes, AtmParsingError> {
    let type_code = u8::from(oam_type);
    check_range("oam_type", u32::from(type_code), 0x0F)?;
    check_range("function_type", u32::from(function_type), 0x0F)?;
    check_range(
        "function_specific_len",
        function_specific.len() as u32,
        OAM_FUNCTION_SPECIFIC_SIZE as u32,
    )?;

    let mut buf = BytesMut::with_capacity(ATM_CELL_PAYLOAD_SIZE);
    buf.put_u8((type_code << 4) | function_type);
    buf.put_slice(function_specific);
    buf.put_bytes(
        OAM_UNUSED_OCTET,
        OAM_FUNCTION_SPECIFIC_SIZE - function_specific.len(),
    );
    let crc = CrcCalculators::new().crc10_with_tail(&buf, 0);
    buf.put_u16(crc);
    Ok(buf.freeze())
}
