//! PW control word serialization.

use crate::constants::{PW_CW_FLAGS_MASK, PW_CW_LENGTH_MASK};
use crate::error::AtmParsingError;
use crate::types::SequenceNumber;

/// Builds a preferred control word (N:1 cell mode, AAL5 SDU mode).
///
/// With `extended_length` the length may use the two reserved bits as well.
///
/// # Errors
/// - [`AtmParsingError::ValueOutOfRange`] - flags wider than 4 bits, or a
///   length wider than the length field
pub fn build_preferred_control_word(
    flags: u8,
    length: u8,
    sequence: SequenceNumber,
    extended_length: bool,
) -> Result<[u8; 4], AtmParsingError> {
    if flags > PW_CW_FLAGS_MASK {
        return Err(AtmParsingError::ValueOutOfRange {
            field: "cw_flags",
            max: u32::from(PW_CW_FLAGS_MASK),
            got: u32::from(flags),
        });
    }
    if !extended_length && length > PW_CW_LENGTH_MASK {
        return Err(AtmParsingError::ValueOutOfRange {
            field: "cw_length",
            max: u32::from(PW_CW_LENGTH_MASK),
            got: u32::from(length),
        });
    }
    let [seq_hi, seq_lo] = sequence.value().to_be_bytes();
    Ok([flags, length, seq_hi, seq_lo])
}

/// Builds a generic control word (1:1 cell mode, AAL5 PDU mode).
///
/// Only the low nibble of `reserved` is used. In 1:1 modes `atm_byte` doubles
/// as the header of the first cell.
pub fn build_generic_control_word(reserved: u8, sequence: SequenceNumber, atm_byte: u8) -> [u8; 4] {
    let [seq_hi, seq_lo] = sequence.value().to_be_bytes();
    [reserved & PW_CW_FLAGS_MASK, seq_hi, seq_lo, atm_byte]
}
