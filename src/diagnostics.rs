//! Protocol anomaly reporting.
//!
//! Decoders never abort a packet because of a protocol violation. Each anomaly
//! is recorded as a [`Violation`] in a [`Diagnostics`] list that is returned
//! together with the best-effort decoded structure, the way a packet analyzer
//! attaches expert information to a dissection tree.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How serious a recorded anomaly is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational; the packet is well formed.
    Note,
    /// Suspicious but decodable.
    Warn,
    /// Malformed; decoding proceeded with fallback values.
    Error,
}

/// A protocol anomaly detected while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    /// HEC syndrome points at a single-bit error. The header is not modified.
    HecCorrectable { position: u8 },
    /// HEC syndrome matches no correctable pattern.
    HecUncorrectable,
    /// AAL5 CRC-32 did not leave the expected residue.
    Aal5CrcError,
    /// OAM cell CRC-10 did not leave a zero residue.
    OamCrcError,
    /// AAL1 sequence number protection CRC-3 mismatch.
    Aal1SnpCrcError,
    /// AAL1 SAR header does not have even parity.
    Aal1ParityError,
    /// AAL3/4 SAR-PDU CRC-10 did not leave a zero residue.
    Aal34CrcError,
    /// AAL3/4 length indicator exceeds the SAR-PDU payload size.
    Aal34LengthInvalid { li: u8 },
    /// Bytes left over after the last whole cell.
    BrokenCells { remainder: usize },
    /// The first four bits of the control word are not zero.
    NonZeroTopNibble { value: u8 },
    /// Reserved control word flags are set.
    ReservedFlagsNonZero { value: u8 },
    /// Reserved bits are set in a control word or cell header.
    ReservedBitsNonZero { value: u8 },
    /// The control word length field must be zero for this encapsulation.
    LengthMustBeZero { cw_len: u8 },
    /// Control word length leaves no room for payload.
    PayloadLenNonPositive { payload_from_cw: i64 },
    /// Control word length claims more payload than the packet carries.
    PayloadLenExceedsPacket {
        payload_from_cw: usize,
        payload_from_packet: usize,
    },
    /// Padding present in an encapsulation that does not allow it.
    UnexpectedPadding { padding: usize },
    /// Packet shorter than one control word plus one cell.
    PacketTooSmall { size: usize, min: usize },
    /// V bit does not match the 1:1 mode (VCC expects 0, VPC expects 1).
    VciPresenceMismatch { expected: bool },
    /// More than one admin cell in an AAL5-SDU packet.
    AdminCellCountExceeded { count: usize },
}

impl Violation {
    /// Severity of this violation.
    pub fn severity(&self) -> Severity {
        match self {
            Violation::HecCorrectable { .. } => Severity::Warn,
            Violation::ReservedBitsNonZero { .. } | Violation::ReservedFlagsNonZero { .. } => {
                Severity::Warn
            }
            Violation::AdminCellCountExceeded { .. } => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::HecCorrectable { position } => {
                write!(f, "HEC: correctable error in header bit {}", position)
            }
            Violation::HecUncorrectable => f.write_str("HEC: uncorrectable header error"),
            Violation::Aal5CrcError => f.write_str("AAL5 CRC-32 incorrect"),
            Violation::OamCrcError => f.write_str("OAM cell CRC-10 incorrect"),
            Violation::Aal1SnpCrcError => f.write_str("AAL1 SNP CRC-3 incorrect"),
            Violation::Aal1ParityError => f.write_str("AAL1 SNP parity incorrect"),
            Violation::Aal34CrcError => f.write_str("AAL3/4 CRC-10 incorrect"),
            Violation::Aal34LengthInvalid { li } => {
                write!(f, "AAL3/4 length indicator {} exceeds 44", li)
            }
            Violation::BrokenCells { remainder } => {
                write!(f, "{} extra byte(s) after the last whole cell", remainder)
            }
            Violation::NonZeroTopNibble { value } => {
                write!(f, "Bits 0..3 of control word must be 0, got 0x{:X}", value)
            }
            Violation::ReservedFlagsNonZero { value } => {
                write!(f, "Reserved flags must be 0, got 0x{:X}", value)
            }
            Violation::ReservedBitsNonZero { value } => {
                write!(f, "Reserved bits must be 0, got 0x{:X}", value)
            }
            Violation::LengthMustBeZero { cw_len } => {
                write!(f, "Length field must be 0, got {}", cw_len)
            }
            Violation::PayloadLenNonPositive { payload_from_cw } => write!(
                f,
                "Payload length derived from control word is {}",
                payload_from_cw
            ),
            Violation::PayloadLenExceedsPacket {
                payload_from_cw,
                payload_from_packet,
            } => write!(
                f,
                "Payload length from control word ({}) exceeds packet payload ({})",
                payload_from_cw, payload_from_packet
            ),
            Violation::UnexpectedPadding { padding } => {
                write!(f, "{} byte(s) of padding not allowed here", padding)
            }
            Violation::PacketTooSmall { size, min } => {
                write!(f, "Packet is {} bytes, at least {} expected", size, min)
            }
            Violation::VciPresenceMismatch { expected } => {
                write!(f, "V bit should be {}", u8::from(*expected))
            }
            Violation::AdminCellCountExceeded { count } => {
                write!(f, "{} admin cells, only 1 allowed", count)
            }
        }
    }
}

/// Ordered collection of violations for one packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    violations: Vec<Violation>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    pub fn push(&mut self, violation: Violation) {
        debug!(severity = ?violation.severity(), "{}", violation);
        self.violations.push(violation);
    }

    /// Moves all violations of `other` into `self`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// Returns `true` if any recorded violation satisfies `pred`.
    pub fn any(&self, pred: impl Fn(&Violation) -> bool) -> bool {
        self.violations.iter().any(pred)
    }

    /// Highest severity recorded, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.violations.iter().map(Violation::severity).max()
    }

    pub fn as_slice(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.violations
    }
}
