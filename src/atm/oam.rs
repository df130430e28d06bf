//! OAM (F4/F5) cell classification and decoding (ITU-T I.610).
//!
//! F4 flows run on the reserved VCIs 3 (segment) and 4 (end-to-end) of a
//! virtual path; F5 flows are marked by PTI 100 (segment) and 101
//! (end-to-end) on any virtual channel.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ATM_CELL_PAYLOAD_SIZE, CRC10_MASK, OAM_FUNCTION_SPECIFIC_SIZE, PTI_F5_END_TO_END,
    PTI_F5_SEGMENT, VCI_F4_END_TO_END, VCI_F4_SEGMENT,
};
use crate::crc::CrcCalculators;
use crate::diagnostics::{Diagnostics, Violation};
use crate::error::{AtmParsingError, ParseContext, ensure_len};

/// Decides whether a cell with this VCI and PTI is an OAM cell.
pub fn is_oam(vci: u16, pti: u8) -> bool {
    ((vci == VCI_F4_SEGMENT || vci == VCI_F4_END_TO_END) && (pti & 0b101) == 0)
        || (pti & 0b110) == 0b100
}

/// OAM flow a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OamFlow {
    F4Segment,
    F4EndToEnd,
    F5Segment,
    F5EndToEnd,
}

impl OamFlow {
    /// Flow for an OAM cell, `None` for anything [`is_oam`] rejects.
    pub fn classify(vci: u16, pti: u8) -> Option<Self> {
        if !is_oam(vci, pti) {
            return None;
        }
        match (vci, pti) {
            (_, PTI_F5_SEGMENT) => Some(OamFlow::F5Segment),
            (_, PTI_F5_END_TO_END) => Some(OamFlow::F5EndToEnd),
            (VCI_F4_SEGMENT, _) => Some(OamFlow::F4Segment),
            (VCI_F4_END_TO_END, _) => Some(OamFlow::F4EndToEnd),
            _ => None,
        }
    }
}

/// OAM type carried in the high nibble of the first payload byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OamType {
    FaultManagement,
    PerformanceManagement,
    ActivationDeactivation,
    SystemManagement,
    Unknown(u8),
}

impl From<u8> for OamType {
    fn from(value: u8) -> Self {
        match value {
            0x1 => OamType::FaultManagement,
            0x2 => OamType::PerformanceManagement,
            0x8 => OamType::ActivationDeactivation,
            0xF => OamType::SystemManagement,
            other => OamType::Unknown(other),
        }
    }
}

impl From<OamType> for u8 {
    fn from(value: OamType) -> Self {
        match value {
            OamType::FaultManagement => 0x1,
            OamType::PerformanceManagement => 0x2,
            OamType::ActivationDeactivation => 0x8,
            OamType::SystemManagement => 0xF,
            OamType::Unknown(other) => other,
        }
    }
}

impl OamType {
    /// Human-readable name of a function type under this OAM type.
    pub fn function_name(&self, function_type: u8) -> Option<&'static str> {
        match (self, function_type) {
            (OamType::FaultManagement, 0x0) => Some("AIS"),
            (OamType::FaultManagement, 0x1) => Some("RDI"),
            (OamType::FaultManagement, 0x4) => Some("Continuity Check"),
            (OamType::FaultManagement, 0x8) => Some("Loopback"),
            (OamType::PerformanceManagement, 0x0) => Some("Forward Monitoring"),
            (OamType::PerformanceManagement, 0x1) => Some("Backward Reporting"),
            (OamType::PerformanceManagement, 0x2) => Some("Monitoring and Reporting"),
            (OamType::ActivationDeactivation, 0x0) => Some("Performance Monitoring"),
            (OamType::ActivationDeactivation, 0x1) => Some("Continuity Check"),
            _ => None,
        }
    }
}

/// Decoded 48-byte OAM cell payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OamCell {
    pub oam_type: OamType,
    pub function_type: u8,
    pub function_specific: Vec<u8>,
    /// CRC-10 field as received.
    pub crc10: u16,
    pub crc_ok: bool,
}

impl OamCell {
    pub fn function_name(&self) -> Option<&'static str> {
        self.oam_type.function_name(self.function_type)
    }
}

/// Decodes an OAM cell payload and checks its CRC-10.
///
/// # Errors
/// - [`AtmParsingError::NotEnoughData`] - payload shorter than 48 bytes
pub fn decode_oam_cell(
    payload: &[u8],
    crcs: &CrcCalculators,
    diagnostics: &mut Diagnostics,
) -> Result<OamCell, AtmParsingError> {
    ensure_len(payload, ATM_CELL_PAYLOAD_SIZE, ParseContext::OamCell)?;
    let payload = &payload[..ATM_CELL_PAYLOAD_SIZE];

    let oam_type = OamType::from(payload[0] >> 4);
    let function_type = payload[0] & 0x0F;
    let function_specific = payload[1..1 + OAM_FUNCTION_SPECIFIC_SIZE].to_vec();
    let crc10 = u16::from_be_bytes([payload[46], payload[47]]) & CRC10_MASK;
    let crc_ok = crcs.crc10_residue(payload) == 0;
    if !crc_ok {
        diagnostics.push(Violation::OamCrcError);
    }

    Ok(OamCell {
        oam_type,
        function_type,
        function_specific,
        crc10,
        crc_ok,
    })
}
