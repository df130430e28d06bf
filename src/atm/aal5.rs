//! AAL5 CPCS trailer extraction and validation (ITU-T I.363.5).
//!
//! ```text
//!  | CPCS-PDU payload | PAD (0..47) | UU(8) | CPI(8) | Length(16) | CRC-32(32) |
//! ```
//!
//! A trailer is only trusted when the capture holds the whole PDU and the
//! length field leaves a plausible amount of padding. Anything else is not an
//! error: the trailer is treated as absent and the bytes are passed on as-is.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{AAL5_MAX_PADDING, AAL5_TRAILER_SIZE, ATM_CELL_PAYLOAD_SIZE};
use crate::crc::CrcCalculators;
use crate::diagnostics::{Diagnostics, Violation};

/// Decoded AAL5 CPCS trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aal5Trailer {
    /// CPCS user-to-user indication.
    pub uu: u8,
    /// Common part indicator.
    pub cpi: u8,
    /// Length of the CPCS-PDU payload.
    pub length: u16,
    pub crc32: u32,
    pub computed_crc_ok: bool,
}

/// Why a trailer was not trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailerRejection {
    /// Fewer bytes captured than the PDU is long.
    Truncated,
    /// Not enough bytes for a trailer.
    TooShort,
    /// Length field is zero.
    ZeroLength,
    /// Length field points past the trailer.
    LengthTooLarge,
    /// More padding than a CPCS-PDU can carry.
    PaddingTooLarge,
}

/// Result of looking for a trailer in a reassembled PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aal5Extraction<'a> {
    pub trailer: Option<Aal5Trailer>,
    /// Bytes to hand downstream: the CPCS payload, or the whole buffer.
    pub content: &'a [u8],
    pub padding_len: usize,
    pub rejection: Option<TrailerRejection>,
}

/// Locates and validates AAL5 trailers.
#[derive(Debug, Default)]
pub struct Aal5TrailerProcessor {
    crcs: CrcCalculators,
}

impl Aal5TrailerProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the trailer guards and returns the padding length on success.
    fn locate(pdu: &[u8], reported_len: usize) -> Result<(u16, usize), TrailerRejection> {
        let captured_len = pdu.len();
        if captured_len < reported_len {
            return Err(TrailerRejection::Truncated);
        }
        if captured_len < AAL5_TRAILER_SIZE {
            return Err(TrailerRejection::TooShort);
        }
        let aal5_length = u16::from_be_bytes([pdu[captured_len - 6], pdu[captured_len - 5]]);
        if aal5_length == 0 {
            return Err(TrailerRejection::ZeroLength);
        }
        if usize::from(aal5_length) > captured_len - AAL5_TRAILER_SIZE {
            return Err(TrailerRejection::LengthTooLarge);
        }
        let pad_length = captured_len - usize::from(aal5_length) - AAL5_TRAILER_SIZE;
        if pad_length > AAL5_MAX_PADDING {
            return Err(TrailerRejection::PaddingTooLarge);
        }
        Ok((aal5_length, pad_length))
    }

    /// Reads the trailer of a reassembled PDU, or `None` if it cannot be trusted.
    ///
    /// `pdu` holds the captured bytes; `reported_len` is the PDU length on the wire.
    pub fn extract(&self, pdu: &[u8], reported_len: usize) -> Option<Aal5Trailer> {
        let (length, _) = Self::locate(pdu, reported_len).ok()?;
        let n = pdu.len();
        Some(Aal5Trailer {
            uu: pdu[n - 8],
            cpi: pdu[n - 7],
            length,
            crc32: u32::from_be_bytes([pdu[n - 4], pdu[n - 3], pdu[n - 2], pdu[n - 1]]),
            computed_crc_ok: self.crcs.aal5_crc_ok(pdu),
        })
    }

    /// Bytes to hand downstream: the CPCS payload when the trailer is
    /// trusted, otherwise everything up to `reported_len`.
    pub fn content_without_trailer<'a>(&self, pdu: &'a [u8], reported_len: usize) -> &'a [u8] {
        match Self::locate(pdu, reported_len) {
            Ok((length, _)) => &pdu[..usize::from(length)],
            Err(_) => &pdu[..reported_len.min(pdu.len())],
        }
    }

    /// Splits a reassembled PDU into trailer and downstream content.
    pub fn process<'a>(
        &self,
        pdu: &'a [u8],
        reported_len: usize,
        diagnostics: &mut Diagnostics,
    ) -> Aal5Extraction<'a> {
        match Self::locate(pdu, reported_len) {
            Ok((length, padding_len)) => {
                let trailer = self.extract(pdu, reported_len);
                if trailer.is_some_and(|t| !t.computed_crc_ok) {
                    diagnostics.push(Violation::Aal5CrcError);
                }
                Aal5Extraction {
                    trailer,
                    content: &pdu[..usize::from(length)],
                    padding_len,
                    rejection: None,
                }
            }
            Err(reason) => {
                debug!(?reason, len = pdu.len(), reported_len, "AAL5 trailer not used");
                Aal5Extraction {
                    trailer: None,
                    content: &pdu[..reported_len.min(pdu.len())],
                    padding_len: 0,
                    rejection: Some(reason),
                }
            }
        }
    }
}

/// Number of cells a reassembled PDU occupied, when it is a whole number of cells.
pub fn reassembled_cell_count(reported_len: usize) -> Option<usize> {
    (reported_len % ATM_CELL_PAYLOAD_SIZE == 0).then_some(reported_len / ATM_CELL_PAYLOAD_SIZE)
}
