//! ATM Header Error Control (HEC) single-bit error detection.
//!
//! The HEC is a CRC-8 (x^8 + x^2 + x + 1) over the first four header bytes,
//! XORed with the coset leader 0x55 (ITU-T I.432.1). The 8-bit syndrome of a
//! received header identifies either an intact header, a single-bit error at a
//! known position, or an uncorrectable multi-bit error.
//!
//! Correction is reported, never applied: callers keep decoding the header
//! bytes exactly as received.

use serde::{Deserialize, Serialize};

use crate::constants::{HEC_COSET_LEADER, HEC_PROTECTED_BITS};

/// CRC-8 generator polynomial without the x^8 term.
const HEC_POLY: u8 = 0x07;

/// Error position table sentinel: syndrome of an intact header.
const NO_ERROR_DETECTED: i16 = -128;
/// Error position table sentinel: syndrome matches no single-bit error.
const UNCORRECTABLE_ERROR: i16 = 128;

const fn build_syndrome_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ HEC_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const fn fold_syndrome(table: &[u8; 256], bytes: &[u8; 5]) -> u8 {
    let mut syndrome = 0u8;
    let mut i = 0;
    while i < 4 {
        syndrome = table[(syndrome ^ bytes[i]) as usize];
        i += 1;
    }
    syndrome ^ bytes[4]
}

const fn build_error_position_table(syndromes: &[u8; 256]) -> [i16; 256] {
    let mut table = [UNCORRECTABLE_ERROR; 256];
    table[0] = NO_ERROR_DETECTED;
    let mut pos = 0;
    while pos < HEC_PROTECTED_BITS as usize {
        let mut pattern = [0u8; 5];
        pattern[pos / 8] = 0x80 >> (pos % 8);
        let syndrome = fold_syndrome(syndromes, &pattern);
        table[syndrome as usize] = pos as i16;
        pos += 1;
    }
    table
}

/// CRC-8 byte table used to fold the header into a syndrome.
pub(crate) const SYNDROME_TABLE: [u8; 256] = build_syndrome_table();

/// Maps a syndrome to a bit position in `0..40`, or to one of the two sentinels.
pub(crate) const ERROR_POSITION_TABLE: [i16; 256] = build_error_position_table(&SYNDROME_TABLE);

/// Outcome of checking a 5-byte cell header against its HEC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HecCorrectionResult {
    /// Header and HEC agree.
    NoErrorDetected,
    /// A single-bit error at this position (MSB of byte 0 is position 0).
    CorrectablePosition(u8),
    /// More than one bit is in error.
    Uncorrectable,
}

impl HecCorrectionResult {
    /// Interprets one error position table entry.
    fn from_table_entry(entry: i16) -> Self {
        match entry {
            NO_ERROR_DETECTED => HecCorrectionResult::NoErrorDetected,
            p if (0..HEC_PROTECTED_BITS as i16).contains(&p) => {
                HecCorrectionResult::CorrectablePosition(p as u8)
            }
            _ => HecCorrectionResult::Uncorrectable,
        }
    }

    /// True for any result other than an intact header.
    pub fn is_error(&self) -> bool {
        !matches!(self, HecCorrectionResult::NoErrorDetected)
    }
}

/// Table-driven HEC checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderErrorCorrector;

impl HeaderErrorCorrector {
    /// Creates a checker; the tables are static.
    pub fn new() -> Self {
        Self
    }

    /// Syndrome of a received header; zero for an intact header.
    pub fn syndrome(&self, header: &[u8; 5]) -> u8 {
        fold_syndrome(&SYNDROME_TABLE, header) ^ HEC_COSET_LEADER
    }

    /// Classifies an arbitrary syndrome value.
    pub fn classify_syndrome(&self, syndrome: u8) -> HecCorrectionResult {
        HecCorrectionResult::from_table_entry(ERROR_POSITION_TABLE[syndrome as usize])
    }

    /// Checks a header. The input bytes are never modified.
    pub fn correct(&self, header: &[u8; 5]) -> HecCorrectionResult {
        self.classify_syndrome(self.syndrome(header))
    }
}
