//! ATM pseudowire control word decoding and length validation.
//!
//! ```text
//!  preferred (N:1, AAL5 SDU):  | 0000 | flags(4) | RSV(2) LEN(6) | sequence number(16) |
//!  generic (1:1, AAL5 PDU):    | 0000 | RSV(4)   | sequence number(16) | ATM byte(8) |
//! ```
//!
//! The length field is only trusted when the configuration allows it and it
//! agrees with the packet size. On any disagreement the payload size falls
//! back to what the packet itself implies, so that cell segmentation always
//! runs on a best-effort size.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ControlWordOptions;
use crate::constants::{
    PW_AAL5_PDU_ATM_BYTE_RSV_MASK, PW_AAL5_PDU_E_BIT, PW_AAL5_PDU_U_BIT, PW_AAL5_SDU_C_BIT,
    PW_AAL5_SDU_E_BIT, PW_AAL5_SDU_T_BIT, PW_AAL5_SDU_U_BIT, PW_ATM_BYTE_C_BIT,
    PW_ATM_BYTE_M_BIT, PW_ATM_BYTE_V_BIT, PW_CONTROL_WORD_SIZE, PW_CW_BITS03_MASK,
    PW_CW_FLAGS_MASK, PW_CW_LENGTH_MASK, PW_CW_RSV_MASK,
};
use crate::diagnostics::{Diagnostics, Violation};
use crate::pw::mode::PwEncapsulationMode;
use crate::types::SequenceNumber;

/// Decoded PW control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwControlWord {
    /// First four bits; must be zero.
    pub bits_0_3: u8,
    /// Flags (preferred control word) or reserved bits (generic control word).
    pub flags_or_reserved: u8,
    /// Reserved bits in front of the length that were not read as length.
    pub length_reserved: u8,
    /// Length field; always 0 in a generic control word.
    pub length: u8,
    pub sequence: SequenceNumber,
    /// Trailing ATM-specific byte of a generic control word.
    pub atm_byte: Option<u8>,
}

impl PwControlWord {
    /// Decodes the four control word bytes for `mode`.
    ///
    /// `extend_length` reads the reserved bits in front of the length field as
    /// part of it.
    pub fn decode(bytes: [u8; 4], mode: PwEncapsulationMode, extend_length: bool) -> Self {
        let bits_0_3 = (bytes[0] & PW_CW_BITS03_MASK) >> 4;
        let flags_or_reserved = bytes[0] & PW_CW_FLAGS_MASK;
        if mode.uses_generic_cw() {
            return Self {
                bits_0_3,
                flags_or_reserved,
                length_reserved: 0,
                length: 0,
                sequence: SequenceNumber::new(u16::from_be_bytes([bytes[1], bytes[2]])),
                atm_byte: Some(bytes[3]),
            };
        }
        let (length_reserved, length) = if extend_length {
            (0, bytes[1])
        } else {
            ((bytes[1] & PW_CW_RSV_MASK) >> 6, bytes[1] & PW_CW_LENGTH_MASK)
        };
        Self {
            bits_0_3,
            flags_or_reserved,
            length_reserved,
            length,
            sequence: SequenceNumber::new(u16::from_be_bytes([bytes[2], bytes[3]])),
            atm_byte: None,
        }
    }

    /// AAL5 SDU T flag: the packet carries an ATM admin cell.
    pub fn admin_cell(&self) -> bool {
        self.atm_byte.is_none() && self.flags_or_reserved & PW_AAL5_SDU_T_BIT != 0
    }

    /// AAL5 SDU E flag (EFCI).
    pub fn sdu_efci(&self) -> bool {
        self.atm_byte.is_none() && self.flags_or_reserved & PW_AAL5_SDU_E_BIT != 0
    }

    /// AAL5 SDU C flag (CLP).
    pub fn sdu_clp(&self) -> bool {
        self.atm_byte.is_none() && self.flags_or_reserved & PW_AAL5_SDU_C_BIT != 0
    }

    /// AAL5 SDU U flag (command/response).
    pub fn sdu_command_response(&self) -> bool {
        self.atm_byte.is_none() && self.flags_or_reserved & PW_AAL5_SDU_U_BIT != 0
    }

    /// M bit of the ATM-specific byte.
    pub fn m_bit(&self) -> Option<bool> {
        self.atm_byte.map(|b| b & PW_ATM_BYTE_M_BIT != 0)
    }

    /// V bit of the ATM-specific byte.
    pub fn v_bit(&self) -> Option<bool> {
        self.atm_byte.map(|b| b & PW_ATM_BYTE_V_BIT != 0)
    }

    /// AAL5 PDU U bit: this fragment ends the PDU.
    pub fn pdu_end_of_frame(&self) -> Option<bool> {
        self.atm_byte.map(|b| b & PW_AAL5_PDU_U_BIT != 0)
    }

    /// AAL5 PDU E bit (EFCI).
    pub fn pdu_efci(&self) -> Option<bool> {
        self.atm_byte.map(|b| b & PW_AAL5_PDU_E_BIT != 0)
    }

    /// C bit of the ATM-specific byte (CLP).
    pub fn pdu_clp(&self) -> Option<bool> {
        self.atm_byte.map(|b| b & PW_ATM_BYTE_C_BIT != 0)
    }
}

/// Outcome of validating one control word against its packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlWordValidation {
    pub control_word: PwControlWord,
    pub payload_size: usize,
    pub padding_size: usize,
    pub diagnostics: Diagnostics,
}

/// Checks reserved bits and derives payload and padding sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlWordValidator;

impl ControlWordValidator {
    /// Validates `cw_bytes` for a packet of `packet_size` bytes.
    ///
    /// Never fails: every anomaly is recorded and the sizes fall back to the
    /// packet-derived values.
    pub fn validate(
        cw_bytes: [u8; 4],
        mode: PwEncapsulationMode,
        packet_size: usize,
        options: ControlWordOptions,
    ) -> ControlWordValidation {
        let mut diagnostics = Diagnostics::new();
        let extend = mode.uses_preferred_cw() && options.extend_length_with_reserved;
        let cw = PwControlWord::decode(cw_bytes, mode, extend);

        if cw.bits_0_3 != 0 {
            diagnostics.push(Violation::NonZeroTopNibble {
                value: cw.bits_0_3,
            });
        }
        match mode {
            PwEncapsulationMode::NToOneCw if cw.flags_or_reserved != 0 => {
                diagnostics.push(Violation::ReservedFlagsNonZero {
                    value: cw.flags_or_reserved,
                });
            }
            _ if mode.uses_generic_cw() && cw.flags_or_reserved != 0 => {
                diagnostics.push(Violation::ReservedBitsNonZero {
                    value: cw.flags_or_reserved,
                });
            }
            _ => {}
        }
        if cw.length_reserved != 0 {
            diagnostics.push(Violation::ReservedBitsNonZero {
                value: cw.length_reserved,
            });
        }
        if mode == PwEncapsulationMode::Aal5Pdu {
            let rsv = cw.atm_byte.unwrap_or(0) & PW_AAL5_PDU_ATM_BYTE_RSV_MASK;
            if rsv != 0 {
                diagnostics.push(Violation::ReservedBitsNonZero { value: rsv >> 3 });
            }
        }

        let payload_from_packet = packet_size.saturating_sub(mode.payload_offset());
        let padding_disallowed = mode == PwEncapsulationMode::NToOneCw || cw.admin_cell();
        let (payload_size, padding_size) = derive_payload_size(
            cw.length,
            payload_from_packet,
            options.allow_nonzero_length,
            padding_disallowed,
            &mut diagnostics,
        );

        ControlWordValidation {
            control_word: cw,
            payload_size,
            padding_size,
            diagnostics,
        }
    }
}

/// Payload and padding sizes from the length field, or from the packet when
/// the length field cannot be used.
fn derive_payload_size(
    cw_len: u8,
    payload_from_packet: usize,
    allow_nonzero_length: bool,
    padding_disallowed: bool,
    diagnostics: &mut Diagnostics,
) -> (usize, usize) {
    let fallback = (payload_from_packet, 0);
    if cw_len == 0 {
        return fallback;
    }
    if !allow_nonzero_length {
        diagnostics.push(Violation::LengthMustBeZero { cw_len });
        return fallback;
    }

    let payload_from_cw = i64::from(cw_len) - PW_CONTROL_WORD_SIZE as i64;
    if payload_from_cw <= 0 {
        diagnostics.push(Violation::PayloadLenNonPositive { payload_from_cw });
        return fallback;
    }
    let payload_from_cw = payload_from_cw as usize;
    if payload_from_cw > payload_from_packet {
        diagnostics.push(Violation::PayloadLenExceedsPacket {
            payload_from_cw,
            payload_from_packet,
        });
        return fallback;
    }

    let padding = payload_from_packet - payload_from_cw;
    if padding != 0 && padding_disallowed {
        diagnostics.push(Violation::UnexpectedPadding { padding });
        return fallback;
    }
    debug!(payload_from_cw, padding, "payload size taken from control word");
    (payload_from_cw, padding)
}
