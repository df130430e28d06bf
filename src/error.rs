//! ATM and ATM pseudowire error types.
//!
//! Hard errors are reserved for structural impossibility: a buffer that is
//! shorter than a fixed-size header or control word. Everything a decoder can
//! still make sense of is reported as a [`Violation`](crate::diagnostics::Violation)
//! next to the decoded value instead. The `thiserror` crate is used for the
//! error definitions.

use std::fmt;

use thiserror::Error;

/// Where in the decoding process a length check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseContext {
    /// ATM cell header (4 or 5 bytes).
    CellHeader,
    /// A full ATM cell (header plus 48-byte payload).
    Cell,
    /// OAM cell payload.
    OamCell,
    /// AAL1 SAR-PDU.
    Aal1SarPdu,
    /// AAL3/4 SAR-PDU.
    Aal34SarPdu,
    /// AAL2 start field and CPS packet header.
    Aal2SubHeader,
    /// PW control word.
    PwControlWord,
    /// PW per-cell header.
    PwCellHeader,
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseContext::CellHeader => "ATM cell header",
            ParseContext::Cell => "ATM cell",
            ParseContext::OamCell => "OAM cell",
            ParseContext::Aal1SarPdu => "AAL1 SAR-PDU",
            ParseContext::Aal34SarPdu => "AAL3/4 SAR-PDU",
            ParseContext::Aal2SubHeader => "AAL2 sub-header",
            ParseContext::PwControlWord => "PW control word",
            ParseContext::PwCellHeader => "PW cell header",
        };
        f.write_str(s)
    }
}

/// Errors that stop a single decoding step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtmParsingError {
    /// Insufficient data to decode a fixed-size structure.
    #[error("Incomplete data: needed {needed} bytes, got {got} for {context}")]
    NotEnoughData {
        needed: usize,
        got: usize,
        context: ParseContext,
    },

    /// A value supplied by the caller is outside the range the wire format can carry.
    #[error("Invalid value for {field}: {got} exceeds maximum {max}")]
    ValueOutOfRange {
        field: &'static str,
        max: u32,
        got: u32,
    },
}

/// Main error type for the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtmError {
    /// Error while decoding.
    #[error("Parsing error: {0}")]
    Parsing(#[from] AtmParsingError),

    /// A sub-dissector was registered twice for the same key.
    #[error("Handler for key {key} already registered in {table} table")]
    HandlerAlreadyRegistered { table: &'static str, key: String },

    /// A configuration value could not be interpreted.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Shorthand for a length guard.
pub(crate) fn ensure_len(
    data: &[u8],
    needed: usize,
    context: ParseContext,
) -> Result<(), AtmParsingError> {
    if data.len() < needed {
        return Err(AtmParsingError::NotEnoughData {
            needed,
            got: data.len(),
            context,
        });
    }
    Ok(())
}
