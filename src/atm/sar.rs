//! Segmentation and reassembly (SAR) sub-layer headers for AAL1, AAL2 and AAL3/4.
//!
//! ```text
//!  AAL1 SAR-PDU header:    | CSI(1) SC(3) | CRC(3) P(1) |
//!  AAL3/4 SAR-PDU:         | ST(2) SN(4) MID(10) | payload(44) | LI(6) CRC(10) |
//!  AAL2 sub-header:        | OSF(6) SN(1) P(1) | CID(8) | LI(6) UUI(5) HEC(5) |
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{
    AAL1_SAR_HEADER_SIZE, AAL2_SUBHEADER_SIZE, AAL34_MAX_LI, AAL34_SAR_HEADER_SIZE,
    AAL34_SAR_TRAILER_SIZE, ATM_CELL_PAYLOAD_SIZE, CRC10_MASK,
};
use crate::crc::CrcCalculators;
use crate::diagnostics::{Diagnostics, Violation};
use crate::error::{AtmParsingError, ParseContext, ensure_len};

/// Generator for the AAL1 sequence number protection (x^3 + x + 1).
const AAL1_CRC3_POLY: u8 = 0b1011;

/// CRC-3 over the 4-bit AAL1 sequence number (CSI + SC).
pub fn aal1_snp_crc(sn: u8) -> u8 {
    let mut reg = (sn & 0x0F) << 3;
    for bit in (3..7).rev() {
        if reg & (1 << bit) != 0 {
            reg ^= AAL1_CRC3_POLY << (bit - 3);
        }
    }
    reg & 0x07
}

/// AAL1 SAR-PDU header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aal1Header {
    /// Convergence sublayer indication.
    pub csi: bool,
    /// Sequence count (3 bits).
    pub sequence_count: u8,
    /// Sequence number protection CRC-3.
    pub crc: u8,
    pub parity: bool,
    pub crc_ok: bool,
    pub parity_ok: bool,
}

/// Decodes the AAL1 SAR header and validates its protection bits.
pub fn decode_aal1(
    payload: &[u8],
    diagnostics: &mut Diagnostics,
) -> Result<Aal1Header, AtmParsingError> {
    ensure_len(payload, AAL1_SAR_HEADER_SIZE, ParseContext::Aal1SarPdu)?;
    let b = payload[0];
    let sn = b >> 4;
    let crc = (b >> 1) & 0x07;
    let crc_ok = aal1_snp_crc(sn) == crc;
    let parity_ok = b.count_ones() % 2 == 0;
    if !crc_ok {
        diagnostics.push(Violation::Aal1SnpCrcError);
    }
    if !parity_ok {
        diagnostics.push(Violation::Aal1ParityError);
    }
    Ok(Aal1Header {
        csi: b & 0x80 != 0,
        sequence_count: (b >> 4) & 0x07,
        crc,
        parity: b & 0x01 != 0,
        crc_ok,
        parity_ok,
    })
}

/// AAL3/4 segment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentType {
    /// Continuation of message.
    Com,
    /// End of message.
    Eom,
    /// Beginning of message.
    Bom,
    /// Single-segment message.
    Ssm,
}

impl From<u8> for SegmentType {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0b00 => SegmentType::Com,
            0b01 => SegmentType::Eom,
            0b10 => SegmentType::Bom,
            _ => SegmentType::Ssm,
        }
    }
}

/// AAL3/4 SAR-PDU header and trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aal34SarPdu {
    pub segment_type: SegmentType,
    pub sequence_number: u8,
    /// Multiplexing identifier (10 bits).
    pub mid: u16,
    /// Length indicator (6 bits).
    pub length_indicator: u8,
    pub crc10: u16,
    pub crc_ok: bool,
}

impl Aal34SarPdu {
    /// The part of the 44-byte payload field that carries data, or `None`
    /// when `sar_pdu` is too short to hold it.
    pub fn payload<'a>(&self, sar_pdu: &'a [u8]) -> Option<&'a [u8]> {
        let len = usize::from(self.length_indicator.min(AAL34_MAX_LI));
        sar_pdu.get(AAL34_SAR_HEADER_SIZE..AAL34_SAR_HEADER_SIZE + len)
    }
}

/// Decodes a 48-byte AAL3/4 SAR-PDU.
pub fn decode_aal34(
    payload: &[u8],
    crcs: &CrcCalculators,
    diagnostics: &mut Diagnostics,
) -> Result<Aal34SarPdu, AtmParsingError> {
    ensure_len(payload, ATM_CELL_PAYLOAD_SIZE, ParseContext::Aal34SarPdu)?;
    let sar = &payload[..ATM_CELL_PAYLOAD_SIZE];
    let trailer_at = ATM_CELL_PAYLOAD_SIZE - AAL34_SAR_TRAILER_SIZE;

    let segment_type = SegmentType::from(sar[0] >> 6);
    let sequence_number = (sar[0] >> 2) & 0x0F;
    let mid = (u16::from(sar[0] & 0x03) << 8) | u16::from(sar[1]);
    let trailer = u16::from_be_bytes([sar[trailer_at], sar[trailer_at + 1]]);
    let length_indicator = (trailer >> 10) as u8;
    let crc10 = trailer & CRC10_MASK;
    let crc_ok = crcs.crc10_residue(sar) == 0;

    if length_indicator > AAL34_MAX_LI {
        diagnostics.push(Violation::Aal34LengthInvalid {
            li: length_indicator,
        });
    }
    if !crc_ok {
        diagnostics.push(Violation::Aal34CrcError);
    }

    Ok(Aal34SarPdu {
        segment_type,
        sequence_number,
        mid,
        length_indicator,
        crc10,
        crc_ok,
    })
}

/// AAL2 start field followed by the CPS packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aal2SubHeader {
    /// Offset field of the start field (6 bits).
    pub offset: u8,
    pub sequence: bool,
    pub parity: bool,
    /// Channel identifier.
    pub cid: u8,
    /// Length indicator (6 bits).
    pub length_indicator: u8,
    /// User-to-user indication (5 bits).
    pub uui: u8,
    /// CPS packet header HEC (5 bits).
    pub hec: u8,
}

/// Decodes the 4-byte AAL2 subheader in front of a CPS packet.
pub fn decode_aal2_subheader(payload: &[u8]) -> Result<Aal2SubHeader, AtmParsingError> {
    ensure_len(payload, AAL2_SUBHEADER_SIZE, ParseContext::Aal2SubHeader)?;
    Ok(Aal2SubHeader {
        offset: payload[0] >> 2,
        sequence: payload[0] & 0x02 != 0,
        parity: payload[0] & 0x01 != 0,
        cid: payload[1],
        length_indicator: payload[2] >> 2,
        uui: ((payload[2] & 0x03) << 3) | (payload[3] >> 5),
        hec: payload[3] & 0x1F,
    })
}
