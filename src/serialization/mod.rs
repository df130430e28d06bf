//! Builders for ATM and ATM pseudowire wire formats.
//!
//! The inverse of the decoders: used to generate test traffic and by callers
//! that need to emit cells, AAL5 PDUs or control words.

pub mod aal5;
pub mod cells;
pub mod control_word;

pub use self::aal5::build_aal5_cpcs_pdu;
pub use self::cells::{build_cell, build_cell_header, build_oam_cell};
pub use self::control_word::{build_generic_control_word, build_preferred_control_word};
