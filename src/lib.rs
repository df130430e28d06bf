//! `atmstar`: ATM cell, AAL and ATM-over-MPLS pseudowire decoding in Rust.
//!
//! This library decodes captured ATM traffic: raw cells with or without a
//! HEC byte, reassembled AAL PDUs, and RFC 4717 pseudowire packets in all six
//! encapsulation modes. Payloads it does not understand itself (LLC, PPP,
//! Ethernet, frame relay, IP, SSCOP) are handed to decoders the host
//! registers. The primary entry points are [`AtmDissector`] and
//! [`PwAtmDissector`].
//!
//! ## Core Concepts
//!
//! - **[`AtmDissector`]**: Decodes cells and reassembled PDUs described by an
//!   [`AtmPseudoHeader`], including HEC checking, OAM classification and the
//!   AAL5 trailer.
//! - **[`PwAtmDissector`]**: Decodes one pseudowire packet: control word
//!   validation, cell segmentation and per-cell decoding.
//! - **[`SubDissectorRegistry`]**: Host-supplied decoders, keyed by traffic
//!   type or by named hand-off.
//! - **[`Diagnostics`]**: Protocol anomalies are collected, not raised. Errors
//!   are reserved for input that cannot be decoded at all.
//!
//! ## Quick Start
//!
//! ```rust
//! use atmstar::atm::{AalKind, AtmPseudoHeader, DecodedAs};
//! use atmstar::registry::Handoff;
//! use atmstar::serialization::build_aal5_cpcs_pdu;
//! use atmstar::traits::{DecodedTree, FieldValue};
//! use atmstar::{AtmConfig, AtmDissector, SubDissectorRegistry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Register an LLC decoder that reports the SNAP ethertype
//!     let mut registry = SubDissectorRegistry::new();
//!     registry.register_handoff(
//!         Handoff::Llc,
//!         Box::new(|payload: &[u8]| {
//!             let ethertype = u16::from_be_bytes([*payload.get(6)?, *payload.get(7)?]);
//!             Some(DecodedTree::new("llc").with_field("ethertype", FieldValue::U16(ethertype)))
//!         }),
//!     )?;
//!     let dissector = AtmDissector::new(AtmConfig::default(), registry);
//!
//!     // LLC/SNAP-encapsulated IPv4 in an AAL5 CPCS-PDU
//!     let sdu = [0xAA, 0xAA, 0x03, 0x00, 0x00, 0x00, 0x08, 0x00, 0x45, 0x00];
//!     let pdu = build_aal5_cpcs_pdu(&sdu, 0, 0)?;
//!
//!     let ph = AtmPseudoHeader::new(AalKind::Aal5).with_vc(0, 32);
//!     let dissection = dissector.dissect_reassembled(&ph, &pdu, pdu.len())?;
//!
//!     assert_eq!(dissection.cell_count, Some(1));
//!     assert!(dissection.trailer.is_some_and(|t| t.computed_crc_ok));
//!     assert_eq!(dissection.dispatched.decoded_as, DecodedAs::LlcSnap);
//!     let tree = dissection.dispatched.tree.expect("LLC decoder accepted the payload");
//!     assert_eq!(tree.field("ethertype"), Some(&FieldValue::U16(0x0800)));
//!     assert!(dissection.diagnostics.is_empty());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pseudowires
//!
//! [`PwAtmDissector::dissect`] takes the encapsulation mode out of band, as
//! the label binding would supply it, and the packet starting at the control
//! word (or at the first cell in N:1 mode without a control word).

pub mod atm;
pub mod config;
pub mod constants;
pub mod crc;
pub mod diagnostics;
pub mod error;
pub mod pw;
pub mod registry;
pub mod serialization;
pub mod traits;
pub mod types;

pub use atm::{AalKind, AtmDissector, AtmPseudoHeader, ReferencePoint, TrafficType};
pub use config::{AtmConfig, ControlWordOptions, PwAtmConfig};
pub use diagnostics::{Diagnostics, Severity, Violation};
pub use error::{AtmError, AtmParsingError, ParseContext};
pub use pw::{PwAtmDissector, PwEncapsulationMode};
pub use registry::{Handoff, SubDissectorRegistry, TypeTable};
pub use traits::{DecodedTree, DecoderTable, SubDissector};
pub use types::{SequenceNumber, Vci, Vpi};
