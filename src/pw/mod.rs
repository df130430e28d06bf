//! ATM over MPLS pseudowires (RFC 4717).
//!
//! Key components:
//! - `mode`: The six encapsulation modes and their size constants.
//! - `control_word`: Control word decoding and payload length derivation.
//! - `segmenter`: Cell count and remainder arithmetic.
//! - `cell`: Per-cell headers and cell classification.
//! - `dissector`: `PwAtmDissector`, the per-packet entry point.

pub mod cell;
pub mod control_word;
pub mod dissector;
pub mod mode;
pub mod segmenter;

pub use self::cell::{OneToOneCellHeader, PwCell, PwCellHeader};
pub use self::control_word::{ControlWordValidation, ControlWordValidator, PwControlWord};
pub use self::dissector::{PwAtmDissection, PwAtmDissector};
pub use self::mode::PwEncapsulationMode;
pub use self::segmenter::{AtmPwCellSegmenter, Segmentation};
