//! ATM cell layer and adaptation layers.
//!
//! Key components:
//! - `hec`: Header error control syndrome tables and single-bit error location.
//! - `cell_header`: UNI/NNI cell header decoding.
//! - `oam`: F4/F5 OAM classification and OAM cell decoding.
//! - `sar`: AAL1, AAL2 and AAL3/4 SAR headers of raw cells.
//! - `aal5`: AAL5 CPCS trailer extraction and CRC-32 validation.
//! - `dispatcher`: Routing of AAL payloads to sub-dissectors.
//! - `pseudo_header`: Capture metadata (AAL kind, traffic type, VPI/VCI).
//! - `dissector`: `AtmDissector`, the entry points for reassembled PDUs and raw cells.

pub mod aal5;
pub mod cell_header;
pub mod dispatcher;
pub mod dissector;
pub mod hec;
pub mod oam;
pub mod pseudo_header;
pub mod sar;

pub use self::aal5::{Aal5Extraction, Aal5Trailer, Aal5TrailerProcessor, TrailerRejection};
pub use self::cell_header::{CellHeader, ReferencePoint, parse_cell_header};
pub use self::dispatcher::{AalPayloadDispatcher, DecodedAs, Dispatched, sniff_aal5_payload};
pub use self::dissector::{AtmDissection, AtmDissector, CellDissection, CellPayload, CellsDissection};
pub use self::hec::{HecCorrectionResult, HeaderErrorCorrector};
pub use self::oam::{OamCell, OamFlow, OamType, decode_oam_cell, is_oam};
pub use self::pseudo_header::{AalKind, AtmPseudoHeader, TrafficType};
