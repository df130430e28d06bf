//! ATM pseudowire encapsulation modes (RFC 4717).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ATM_CELL_PAYLOAD_SIZE, PW_11_VCC_CELL_HEADER_SIZE, PW_11_VPC_CELL_HEADER_SIZE,
    PW_CONTROL_WORD_SIZE, PW_GENERIC_CW_PREFIX_SIZE, PW_N1_CELL_HEADER_SIZE,
};

/// Size of an AAL5-SDU admin cell: 4-byte header without HEC plus payload.
pub const AAL5_SDU_ADMIN_CELL_SIZE: usize = PW_N1_CELL_HEADER_SIZE + ATM_CELL_PAYLOAD_SIZE;

/// How ATM traffic is carried in a pseudowire packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PwEncapsulationMode {
    /// N:1 cell mode, no control word.
    NToOneNoCw,
    /// N:1 cell mode with the preferred control word.
    NToOneCw,
    /// 1:1 VCC cell mode.
    OneToOneVcc,
    /// 1:1 VPC cell mode.
    OneToOneVpc,
    /// AAL5 PDU frame mode.
    Aal5Pdu,
    /// AAL5 SDU frame mode.
    Aal5Sdu,
}

impl fmt::Display for PwEncapsulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PwEncapsulationMode::NToOneNoCw => "N:1 (no CW)",
            PwEncapsulationMode::NToOneCw => "N:1",
            PwEncapsulationMode::OneToOneVcc => "1:1 VCC",
            PwEncapsulationMode::OneToOneVpc => "1:1 VPC",
            PwEncapsulationMode::Aal5Pdu => "AAL5 PDU",
            PwEncapsulationMode::Aal5Sdu => "AAL5 SDU",
        };
        f.write_str(s)
    }
}

impl PwEncapsulationMode {
    pub const ALL: [PwEncapsulationMode; 6] = [
        PwEncapsulationMode::NToOneNoCw,
        PwEncapsulationMode::NToOneCw,
        PwEncapsulationMode::OneToOneVcc,
        PwEncapsulationMode::OneToOneVpc,
        PwEncapsulationMode::Aal5Pdu,
        PwEncapsulationMode::Aal5Sdu,
    ];

    /// Every mode except N:1 without control word starts with one.
    pub fn has_control_word(self) -> bool {
        self != PwEncapsulationMode::NToOneNoCw
    }

    /// Modes whose control word carries flags and a length field.
    pub fn uses_preferred_cw(self) -> bool {
        matches!(
            self,
            PwEncapsulationMode::NToOneCw | PwEncapsulationMode::Aal5Sdu
        )
    }

    /// Modes whose control word ends in an ATM-specific byte.
    pub fn uses_generic_cw(self) -> bool {
        matches!(
            self,
            PwEncapsulationMode::OneToOneVcc
                | PwEncapsulationMode::OneToOneVpc
                | PwEncapsulationMode::Aal5Pdu
        )
    }

    /// The two 1:1 cell modes.
    pub fn is_one_to_one(self) -> bool {
        matches!(
            self,
            PwEncapsulationMode::OneToOneVcc | PwEncapsulationMode::OneToOneVpc
        )
    }

    /// Offset of the first payload byte.
    ///
    /// In 1:1 modes the last control word byte is the header of the first
    /// cell, so the cell area starts inside the control word.
    pub fn payload_offset(self) -> usize {
        match self {
            PwEncapsulationMode::NToOneNoCw => 0,
            PwEncapsulationMode::OneToOneVcc | PwEncapsulationMode::OneToOneVpc => {
                PW_GENERIC_CW_PREFIX_SIZE
            }
            _ => PW_CONTROL_WORD_SIZE,
        }
    }

    /// Bytes in front of each cell payload.
    pub fn cell_header_size(self) -> usize {
        match self {
            PwEncapsulationMode::NToOneNoCw | PwEncapsulationMode::NToOneCw => {
                PW_N1_CELL_HEADER_SIZE
            }
            PwEncapsulationMode::OneToOneVcc => PW_11_VCC_CELL_HEADER_SIZE,
            PwEncapsulationMode::OneToOneVpc => PW_11_VPC_CELL_HEADER_SIZE,
            PwEncapsulationMode::Aal5Pdu | PwEncapsulationMode::Aal5Sdu => 0,
        }
    }

    /// Size of one cell in the payload, `None` for AAL5-SDU payloads.
    pub fn cell_size(self) -> Option<usize> {
        match self {
            PwEncapsulationMode::Aal5Sdu => None,
            other => Some(other.cell_header_size() + ATM_CELL_PAYLOAD_SIZE),
        }
    }

    /// Smallest well-formed packet: control word plus one cell, or plus one
    /// byte of AAL5-SDU payload.
    pub fn min_packet_size(self, admin_cell: bool) -> usize {
        let body = match (self, admin_cell) {
            (PwEncapsulationMode::Aal5Sdu, true) => AAL5_SDU_ADMIN_CELL_SIZE,
            (PwEncapsulationMode::Aal5Sdu, false) => 1,
            (other, _) => other.cell_header_size() + ATM_CELL_PAYLOAD_SIZE,
        };
        self.payload_offset() + body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_sizes() {
        assert_eq!(PwEncapsulationMode::NToOneNoCw.cell_size(), Some(52));
        assert_eq!(PwEncapsulationMode::NToOneCw.cell_size(), Some(52));
        assert_eq!(PwEncapsulationMode::OneToOneVcc.cell_size(), Some(49));
        assert_eq!(PwEncapsulationMode::OneToOneVpc.cell_size(), Some(51));
        assert_eq!(PwEncapsulationMode::Aal5Pdu.cell_size(), Some(48));
        assert_eq!(PwEncapsulationMode::Aal5Sdu.cell_size(), None);
        assert_eq!(AAL5_SDU_ADMIN_CELL_SIZE, 52);
    }

    #[test]
    fn control_word_kinds_partition_modes() {
        for mode in PwEncapsulationMode::ALL {
            let kinds = [
                !mode.has_control_word(),
                mode.uses_preferred_cw(),
                mode.uses_generic_cw(),
            ];
            assert_eq!(kinds.iter().filter(|k| **k).count(), 1, "{}", mode);
        }
    }

    #[test]
    fn minimum_packet_sizes() {
        assert_eq!(PwEncapsulationMode::NToOneNoCw.min_packet_size(false), 52);
        assert_eq!(PwEncapsulationMode::NToOneCw.min_packet_size(false), 56);
        assert_eq!(PwEncapsulationMode::OneToOneVcc.min_packet_size(false), 52);
        assert_eq!(PwEncapsulationMode::OneToOneVpc.min_packet_size(false), 54);
        assert_eq!(PwEncapsulationMode::Aal5Pdu.min_packet_size(false), 52);
        assert_eq!(PwEncapsulationMode::Aal5Sdu.min_packet_size(false), 5);
        assert_eq!(PwEncapsulationMode::Aal5Sdu.min_packet_size(true), 56);
    }
}
