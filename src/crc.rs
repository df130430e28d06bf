//! ATM CRC (Cyclic Redundancy Check) calculation utilities.
//!
//! Wrappers around the `crc` crate for the three checks used by the ATM
//! layers:
//! - CRC-8/I.432.1 for the cell header HEC.
//! - CRC-32 for the AAL5 CPCS trailer. The trailer carries the CRC-32/BZIP2
//!   value; validation runs CRC-32/MPEG-2 (same polynomial and init, no final
//!   XOR) over the whole PDU and compares against the fixed residue.
//! - CRC-10 (polynomial 0x233) for OAM cells and AAL3/4 SAR-PDUs.

use std::fmt;

use crc::{CRC_8_I_432_1, CRC_10_ATM, CRC_32_BZIP2, CRC_32_MPEG_2, Crc};

use crate::constants::{AAL5_CRC32_RESIDUE, CRC10_MASK};

/// Low 10 bits of the CRC-10 generator polynomial (x^10 + x^9 + x^5 + x^4 + x + 1).
const CRC10_POLY: u16 = 0x233;

/// Pre-initialized CRC algorithm instances for the ATM checks.
///
/// Intended for reuse by a dissector that validates many cells.
pub struct CrcCalculators {
    hec_calculator: Crc<u8>,
    crc10_calculator: Crc<u16>,
    aal5_residue_calculator: Crc<u32>,
    aal5_trailer_calculator: Crc<u32>,
}

impl fmt::Debug for CrcCalculators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrcCalculators")
            .field("hec_calculator", &format_args!("Crc<u8>(I_432_1)"))
            .field("crc10_calculator", &format_args!("Crc<u16>(ATM)"))
            .field("aal5_residue_calculator", &format_args!("Crc<u32>(MPEG_2)"))
            .field("aal5_trailer_calculator", &format_args!("Crc<u32>(BZIP2)"))
            .finish()
    }
}

impl CrcCalculators {
    pub fn new() -> Self {
        Self {
            hec_calculator: Crc::<u8>::new(&CRC_8_I_432_1),
            crc10_calculator: Crc::<u16>::new(&CRC_10_ATM),
            aal5_residue_calculator: Crc::<u32>::new(&CRC_32_MPEG_2),
            aal5_trailer_calculator: Crc::<u32>::new(&CRC_32_BZIP2),
        }
    }

    /// HEC byte for the first four header bytes, coset leader included.
    #[inline]
    pub fn hec(&self, header: &[u8; 4]) -> u8 {
        self.hec_calculator.checksum(header)
    }

    /// CRC-32 value to place in an AAL5 trailer covering `input`
    /// (PDU content, padding, UU, CPI and length).
    #[inline]
    pub fn aal5_crc32(&self, input: &[u8]) -> u32 {
        self.aal5_trailer_calculator.checksum(input)
    }

    /// Register value after running the AAL5 CRC over a whole PDU, trailer included.
    #[inline]
    pub fn aal5_residue(&self, pdu: &[u8]) -> u32 {
        self.aal5_residue_calculator.checksum(pdu)
    }

    /// Returns `true` if a whole AAL5 PDU leaves the expected CRC-32 residue.
    #[inline]
    pub fn aal5_crc_ok(&self, pdu: &[u8]) -> bool {
        self.aal5_residue(pdu) == AAL5_CRC32_RESIDUE
    }

    /// CRC-10 remainder over a 48-byte payload with its CRC field in place.
    ///
    /// Zero means the payload is intact.
    #[inline]
    pub fn crc10_residue(&self, payload: &[u8]) -> u16 {
        self.crc10_calculator.checksum(payload)
    }

    /// CRC-10 value for a 48-byte payload whose last 16 bits are six
    /// message bits (`tail`, right aligned) followed by the CRC field.
    pub fn crc10_with_tail(&self, head: &[u8], tail: u8) -> u16 {
        let mut reg = self.crc10_calculator.checksum(head);
        for i in (0..6).rev() {
            let bit = u16::from((tail >> i) & 1);
            let top = ((reg >> 9) & 1) ^ bit;
            reg = (reg << 1) & CRC10_MASK;
            if top != 0 {
                reg ^= CRC10_POLY;
            }
        }
        reg
    }
}

impl Default for CrcCalculators {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the HEC byte for a cell header.
///
/// Creates a new `Crc<u8>` instance on each call; prefer [`CrcCalculators`]
/// when validating many cells.
pub fn calculate_hec(header: &[u8; 4]) -> u8 {
    let crc_calc: Crc<u8> = Crc::<u8>::new(&CRC_8_I_432_1);
    crc_calc.checksum(header)
}

/// Computes the CRC-32 stored in an AAL5 trailer.
pub fn calculate_aal5_crc32(input: &[u8]) -> u32 {
    let crc_calc: Crc<u32> = Crc::<u32>::new(&CRC_32_BZIP2);
    crc_calc.checksum(input)
}
