//! ATM cell header decoding (ITU-T I.361).
//!
//! ```text
//!  UNI:  | GFC(4) VPI(4) | VPI(4) VCI(4) | VCI(8) | VCI(4) PTI(3) CLP(1) | HEC(8) |
//!  NNI:  |    VPI(8)     | VPI(4) VCI(4) | VCI(8) | VCI(4) PTI(3) CLP(1) | HEC(8) |
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::atm::hec::{HecCorrectionResult, HeaderErrorCorrector};
use crate::atm::oam::{self, OamFlow};
use crate::constants::{
    ATM_CELL_HEADER_SIZE, ATM_CELL_HEADER_SIZE_NO_HEC, CELL_CLP_MASK, CELL_PTI_MASK,
    PTI_CONGESTION_BIT, PTI_OAM_BIT, PTI_SDU_TYPE_BIT, UNI_GFC_MASK,
};
use crate::error::{AtmError, AtmParsingError, ParseContext, ensure_len};
use crate::types::{Vci, Vpi};

/// Interface at which a cell was captured; decides the GFC/VPI split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReferencePoint {
    /// User-Network Interface: 4-bit GFC, 8-bit VPI.
    #[default]
    Uni,
    /// Network-Network Interface: 12-bit VPI.
    Nni,
}

impl ReferencePoint {
    /// Width of the VPI field in bits.
    pub const fn vpi_bits(self) -> u32 {
        match self {
            ReferencePoint::Uni => 8,
            ReferencePoint::Nni => 12,
        }
    }
}

impl fmt::Display for ReferencePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferencePoint::Uni => f.write_str("uni"),
            ReferencePoint::Nni => f.write_str("nni"),
        }
    }
}

impl FromStr for ReferencePoint {
    type Err = AtmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uni" => Ok(ReferencePoint::Uni),
            "nni" => Ok(ReferencePoint::Nni),
            other => Err(AtmError::InvalidConfig(format!(
                "unknown reference point '{}'",
                other
            ))),
        }
    }
}

/// Decoded ATM cell header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellHeader {
    /// Generic Flow Control; UNI only.
    pub gfc: Option<u8>,
    pub vpi: Vpi,
    pub vci: Vci,
    /// Payload Type Identifier (3 bits).
    pub payload_type: u8,
    /// Cell Loss Priority.
    pub clp: bool,
    /// HEC byte as received, when present.
    pub hec: Option<u8>,
}

impl CellHeader {
    /// Returns `true` if VCI/PTI mark this as an F4 or F5 OAM cell.
    pub fn is_oam(&self) -> bool {
        oam::is_oam(*self.vci, self.payload_type)
    }

    pub fn oam_flow(&self) -> Option<OamFlow> {
        OamFlow::classify(*self.vci, self.payload_type)
    }

    /// User data cell with explicit forward congestion indication.
    pub fn efci(&self) -> bool {
        self.payload_type & PTI_OAM_BIT == 0 && self.payload_type & PTI_CONGESTION_BIT != 0
    }

    /// User data cell with the ATM-user-to-ATM-user bit set (last cell of an AAL5 PDU).
    pub fn end_of_pdu(&self) -> bool {
        self.payload_type & PTI_OAM_BIT == 0 && self.payload_type & PTI_SDU_TYPE_BIT != 0
    }
}

/// Number of header bytes consumed for a given HEC setting.
pub const fn header_len(hec_present: bool) -> usize {
    if hec_present {
        ATM_CELL_HEADER_SIZE
    } else {
        ATM_CELL_HEADER_SIZE_NO_HEC
    }
}

/// Decodes a cell header and, when the HEC byte is present, checks it.
///
/// The header fields are always taken from the bytes as received, even when
/// the HEC check points at a correctable error.
///
/// # Errors
/// - [`AtmParsingError::NotEnoughData`] - fewer than 4 (or 5 with HEC) bytes
pub fn parse_cell_header(
    bytes: &[u8],
    reference_point: ReferencePoint,
    hec_present: bool,
) -> Result<(CellHeader, Option<HecCorrectionResult>), AtmParsingError> {
    ensure_len(bytes, header_len(hec_present), ParseContext::CellHeader)?;

    let (gfc, vpi) = match reference_point {
        ReferencePoint::Uni => (
            Some((bytes[0] & UNI_GFC_MASK) >> 4),
            (u16::from(bytes[0] & 0x0F) << 4) | u16::from(bytes[1] >> 4),
        ),
        ReferencePoint::Nni => (
            None,
            (u16::from(bytes[0]) << 4) | u16::from(bytes[1] >> 4),
        ),
    };
    let vci = (u16::from(bytes[1] & 0x0F) << 12)
        | (u16::from(bytes[2]) << 4)
        | u16::from(bytes[3] >> 4);
    let payload_type = (bytes[3] & CELL_PTI_MASK) >> 1;
    let clp = bytes[3] & CELL_CLP_MASK != 0;

    let (hec, correction) = if hec_present {
        let header = [bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]];
        (
            Some(bytes[4]),
            Some(HeaderErrorCorrector.correct(&header)),
        )
    } else {
        (None, None)
    };

    Ok((
        CellHeader {
            gfc,
            vpi: Vpi::new(vpi),
            vci: Vci::new(vci),
            payload_type,
            clp,
            hec,
        },
        correction,
    ))
}
