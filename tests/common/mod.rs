//! Common test utilities for ATM and ATM pseudowire integration tests.
//!
//! Builders for cells and packets plus a registry of echo decoders that
//! report which hand-off received a payload.
#![allow(dead_code)]

use atmstar::atm::{CellHeader, OamType, ReferencePoint};
use atmstar::registry::{Handoff, SubDissectorRegistry, TypeTable};
use atmstar::serialization::{build_cell, build_cell_header, build_oam_cell};
use atmstar::traits::{DecodedTree, FieldValue};
use atmstar::types::{Vci, Vpi};

/// Every hand-off registered with a decoder that echoes its protocol name
/// and the payload length.
pub fn echo_registry() -> SubDissectorRegistry {
    let mut registry = SubDissectorRegistry::new();
    for (handoff, name) in [
        (Handoff::Sscop, "sscop"),
        (Handoff::Llc, "llc"),
        (Handoff::Ppp, "ppp"),
        (Handoff::Ethernet, "eth"),
        (Handoff::FrameRelay, "fr"),
        (Handoff::Ipv4, "ip"),
        (Handoff::Ipv6, "ipv6"),
    ] {
        registry
            .register_handoff(handoff, echo(name))
            .expect("fresh registry");
    }
    registry
}

/// Adds an echo decoder for `key` in `table`.
pub fn with_type_handler(
    mut registry: SubDissectorRegistry,
    table: TypeTable,
    key: u32,
    name: &'static str,
) -> SubDissectorRegistry {
    registry
        .register_type(table, key, echo(name))
        .expect("key not yet registered");
    registry
}

pub fn echo(name: &'static str) -> Box<dyn atmstar::SubDissector> {
    Box::new(move |payload: &[u8]| {
        Some(DecodedTree::new(name).with_field("len", FieldValue::U32(payload.len() as u32)))
    })
}

/// Cell header with the given addressing and no HEC recorded.
pub fn header(vpi: u16, vci: u16, pti: u8) -> CellHeader {
    CellHeader {
        gfc: Some(0),
        vpi: Vpi::new(vpi),
        vci: Vci::new(vci),
        payload_type: pti,
        clp: false,
        hec: None,
    }
}

/// 53-byte UNI cell with a correct HEC.
pub fn uni_cell(vpi: u16, vci: u16, pti: u8, payload: &[u8; 48]) -> Vec<u8> {
    build_cell(&header(vpi, vci, pti), ReferencePoint::Uni, payload)
        .expect("valid header")
        .to_vec()
}

/// 4-byte NNI header as used by N:1 pseudowire cells.
pub fn n1_cell(vpi: u16, vci: u16, pti: u8, payload: &[u8]) -> Vec<u8> {
    let mut h = header(vpi, vci, pti);
    h.gfc = None;
    let mut cell = build_cell_header(&h, ReferencePoint::Nni, false)
        .expect("valid header")
        .to_vec();
    cell.extend_from_slice(payload);
    cell
}

/// Loopback OAM cell payload with a valid CRC-10.
pub fn loopback_oam() -> Vec<u8> {
    build_oam_cell(OamType::FaultManagement, 8, &[0x01])
        .expect("valid OAM body")
        .to_vec()
}

/// Minimal IPv4 header followed by `extra` zero bytes.
pub fn ipv4_packet(extra: usize) -> Vec<u8> {
    let mut p = vec![
        0x45, 0x00, 0x00, 0x14, 0x12, 0x34, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 192, 168, 1, 1,
        192, 168, 1, 2,
    ];
    p.resize(p.len() + extra, 0);
    p
}

/// Name of the protocol that decoded a dispatched payload, if any.
pub fn decoded_by(tree: &Option<DecodedTree>) -> Option<&str> {
    tree.as_ref().map(|t| t.protocol.as_str())
}
