//! Per-cell headers inside ATM pseudowire packets.
//!
//! ```text
//!  N:1:      | VPI(12) | VCI(16) | PTI(3) C(1) |        (NNI layout, no HEC)
//!  1:1 VCC:  | M V RSV(2) PTI(3) C |
//!  1:1 VPC:  | M V RSV(2) PTI(3) C | VCI(16) |
//! ```

use serde::{Deserialize, Serialize};

use crate::atm::cell_header::{CellHeader, ReferencePoint, parse_cell_header};
use crate::atm::oam::{self, OamCell, decode_oam_cell};
use crate::constants::{
    ATM_CELL_PAYLOAD_SIZE, PW_11_ATM_BYTE_RSV_MASK, PW_11_VPC_CELL_HEADER_SIZE, PW_ATM_BYTE_C_BIT,
    PW_ATM_BYTE_M_BIT, PW_ATM_BYTE_V_BIT, PW_N1_CELL_HEADER_SIZE,
};
use crate::crc::CrcCalculators;
use crate::diagnostics::{Diagnostics, Violation};
use crate::error::{AtmParsingError, ParseContext, ensure_len};
use crate::pw::mode::PwEncapsulationMode;
use crate::types::Vci;

/// Compact header used by the 1:1 modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneToOneCellHeader {
    /// Transport mode bit.
    pub m: bool,
    /// VCI present bit.
    pub v: bool,
    pub reserved: u8,
    pub payload_type: u8,
    pub clp: bool,
    /// VCI, carried in VPC mode only.
    pub vci: Option<Vci>,
}

/// Header in front of one PW cell payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PwCellHeader {
    /// N:1 cells and AAL5-SDU admin cells.
    Full(CellHeader),
    OneToOne(OneToOneCellHeader),
}

impl PwCellHeader {
    pub fn payload_type(&self) -> u8 {
        match self {
            PwCellHeader::Full(h) => h.payload_type,
            PwCellHeader::OneToOne(h) => h.payload_type,
        }
    }

    pub fn clp(&self) -> bool {
        match self {
            PwCellHeader::Full(h) => h.clp,
            PwCellHeader::OneToOne(h) => h.clp,
        }
    }

    /// VCI, when the header carries one.
    pub fn vci(&self) -> Option<Vci> {
        match self {
            PwCellHeader::Full(h) => Some(h.vci),
            PwCellHeader::OneToOne(h) => h.vci,
        }
    }

    /// OAM classification from VCI and PTI. A missing VCI only allows F5 flows.
    pub fn is_oam(&self) -> bool {
        let vci = self.vci().map_or(0, Vci::value);
        oam::is_oam(vci, self.payload_type())
    }
}

/// Decodes a 4-byte N:1 cell header.
pub fn decode_n1_header(bytes: &[u8]) -> Result<PwCellHeader, AtmParsingError> {
    let (header, _) = parse_cell_header(bytes, ReferencePoint::Nni, false)
        .map_err(|_| not_enough(bytes, PW_N1_CELL_HEADER_SIZE))?;
    Ok(PwCellHeader::Full(header))
}

fn not_enough(bytes: &[u8], needed: usize) -> AtmParsingError {
    AtmParsingError::NotEnoughData {
        needed,
        got: bytes.len(),
        context: ParseContext::PwCellHeader,
    }
}

/// Decodes a 1:1 cell header and checks its V and reserved bits.
pub fn decode_one_to_one_header(
    bytes: &[u8],
    mode: PwEncapsulationMode,
    diagnostics: &mut Diagnostics,
) -> Result<PwCellHeader, AtmParsingError> {
    let vpc = mode == PwEncapsulationMode::OneToOneVpc;
    let needed = if vpc { PW_11_VPC_CELL_HEADER_SIZE } else { 1 };
    ensure_len(bytes, needed, ParseContext::PwCellHeader)?;

    let b = bytes[0];
    let v = b & PW_ATM_BYTE_V_BIT != 0;
    let reserved = (b & PW_11_ATM_BYTE_RSV_MASK) >> 4;
    if v != vpc {
        diagnostics.push(Violation::VciPresenceMismatch { expected: vpc });
    }
    if reserved != 0 {
        diagnostics.push(Violation::ReservedBitsNonZero { value: reserved });
    }
    Ok(PwCellHeader::OneToOne(OneToOneCellHeader {
        m: b & PW_ATM_BYTE_M_BIT != 0,
        v,
        reserved,
        payload_type: (b >> 1) & 0x07,
        clp: b & PW_ATM_BYTE_C_BIT != 0,
        vci: vpc.then(|| Vci::new(u16::from_be_bytes([bytes[1], bytes[2]]))),
    }))
}

/// Contents of one PW cell payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwCell<'a> {
    /// `None` for AAL5-PDU cells, which have no per-cell header.
    pub header: Option<PwCellHeader>,
    pub is_oam: bool,
    pub oam: Option<OamCell>,
    /// The 48 payload bytes.
    pub payload: &'a [u8],
}

/// Decodes one cell (header plus 48 bytes) of a cell-mode payload.
///
/// `force_oam` treats the cell as OAM regardless of its PTI, as for
/// AAL5-SDU admin cells.
pub fn decode_pw_cell<'a>(
    cell: &'a [u8],
    mode: PwEncapsulationMode,
    force_oam: bool,
    crcs: &CrcCalculators,
    diagnostics: &mut Diagnostics,
) -> Result<PwCell<'a>, AtmParsingError> {
    let header = match mode {
        PwEncapsulationMode::Aal5Pdu => None,
        PwEncapsulationMode::OneToOneVcc | PwEncapsulationMode::OneToOneVpc => {
            Some(decode_one_to_one_header(cell, mode, diagnostics)?)
        }
        _ => Some(decode_n1_header(cell)?),
    };
    let header_size = match (mode, force_oam) {
        (PwEncapsulationMode::Aal5Sdu, true) => PW_N1_CELL_HEADER_SIZE,
        _ => mode.cell_header_size(),
    };
    ensure_len(
        cell,
        header_size + ATM_CELL_PAYLOAD_SIZE,
        ParseContext::Cell,
    )?;
    let payload = &cell[header_size..header_size + ATM_CELL_PAYLOAD_SIZE];

    let is_oam = force_oam || header.is_some_and(|h| h.is_oam());
    let oam = if is_oam {
        Some(decode_oam_cell(payload, crcs, diagnostics)?)
    } else {
        None
    };
    Ok(PwCell {
        header,
        is_oam,
        oam,
        payload,
    })
}
