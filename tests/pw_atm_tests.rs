//! ATM pseudowire packets in all six encapsulation modes.

mod common;

use atmstar::atm::DecodedAs;
use atmstar::pw::PwCellHeader;
use atmstar::serialization::{
    build_aal5_cpcs_pdu, build_generic_control_word, build_preferred_control_word,
};
use atmstar::{
    ControlWordOptions, PwAtmConfig, PwAtmDissector, PwEncapsulationMode, SequenceNumber,
    Violation,
};

use common::{decoded_by, echo_registry, ipv4_packet, loopback_oam, n1_cell};

fn dissector() -> PwAtmDissector {
    PwAtmDissector::new(PwAtmConfig::default(), echo_registry())
}

#[test]
fn aal5_sdu_frame_with_zero_length() {
    let mut packet = vec![0x00, 0x00, 0x00, 0x05];
    packet.extend(ipv4_packet(46));
    assert_eq!(packet.len(), 70);

    let d = dissector().dissect(PwEncapsulationMode::Aal5Sdu, &packet).unwrap();
    assert_eq!(d.payload_size, 66);
    assert_eq!(d.padding_size, 0);
    assert_eq!(d.control_word.unwrap().sequence, 5u16);
    assert!(!d.is_admin_cell());
    let dispatched = d.dispatched.unwrap();
    assert_eq!(dispatched.decoded_as, DecodedAs::Ip { version: 4 });
    assert_eq!(dispatched.payload.len(), 66);
    assert!(d.diagnostics.is_empty());
}

#[test]
fn aal5_sdu_admin_cell_with_length_and_extra_bytes() {
    let mut packet = vec![0x08, 0x32, 0x00, 0x05];
    packet.extend(n1_cell(0, 5, 0, &loopback_oam()));
    packet.extend_from_slice(&[0u8; 46]);
    assert_eq!(packet.len(), 102);

    let d = dissector().dissect(PwEncapsulationMode::Aal5Sdu, &packet).unwrap();
    assert!(d.is_admin_cell());
    assert_eq!(d.payload_size, 98);
    let seg = d.segmentation.unwrap();
    assert_eq!((seg.cell_size, seg.cell_count, seg.remainder), (52, 1, 46));
    assert_eq!(
        d.diagnostics.as_slice(),
        &[
            Violation::LengthMustBeZero { cw_len: 0x32 },
            Violation::BrokenCells { remainder: 46 },
        ]
    );
    assert_eq!(d.cells.len(), 1);
    assert!(d.cells[0].is_oam);
    assert_eq!(d.cells[0].oam.as_ref().unwrap().function_name(), Some("Loopback"));
    assert!(d.dispatched.is_none());
}

#[test]
fn admin_cells_beyond_the_first_are_flagged() {
    let mut packet = vec![0x08, 0x00, 0x00, 0x01];
    for _ in 0..2 {
        packet.extend(n1_cell(0, 5, 0, &loopback_oam()));
    }
    let d = dissector().dissect(PwEncapsulationMode::Aal5Sdu, &packet).unwrap();
    assert_eq!(d.cells.len(), 1);
    assert_eq!(
        d.diagnostics.as_slice(),
        &[
            Violation::AdminCellCountExceeded { count: 2 },
            Violation::BrokenCells { remainder: 52 },
        ]
    );
}

#[test]
fn aal5_sdu_length_with_padding_when_allowed() {
    let config = PwAtmConfig {
        aal5_sdu: ControlWordOptions {
            allow_nonzero_length: true,
            extend_length_with_reserved: false,
        },
        ..Default::default()
    };
    let dissector = PwAtmDissector::new(config, echo_registry());
    let cw = build_preferred_control_word(0, 24, SequenceNumber::new(9), false).unwrap();
    let mut packet = cw.to_vec();
    packet.extend(ipv4_packet(0));
    packet.extend_from_slice(&[0u8; 40]);
    assert_eq!(packet.len(), 64);

    let d = dissector.dissect(PwEncapsulationMode::Aal5Sdu, &packet).unwrap();
    assert_eq!(d.payload_size, 20);
    assert_eq!(d.padding_size, 40);
    assert_eq!(d.dispatched.unwrap().payload.len(), 20);
    assert!(d.diagnostics.is_empty());
}

#[test]
fn n1_without_control_word_carries_cells_from_byte_zero() {
    let mut packet = n1_cell(0x123, 100, 0, &[0x11; 48]);
    packet.extend(n1_cell(0x123, 100, 0b101, &loopback_oam()));

    let d = dissector().dissect(PwEncapsulationMode::NToOneNoCw, &packet).unwrap();
    assert_eq!(d.control_word, None);
    assert_eq!(d.cells.len(), 2);
    assert!(!d.cells[0].is_oam);
    assert_eq!(d.cells[0].payload, &[0x11; 48][..]);
    assert!(d.cells[1].is_oam);
    match d.cells[0].header {
        Some(PwCellHeader::Full(h)) => {
            assert_eq!(h.vpi, 0x123u16);
            assert_eq!(h.vci, 100u16);
            assert_eq!(h.gfc, None);
        }
        other => panic!("unexpected header {:?}", other),
    }
    assert!(d.diagnostics.is_empty());
}

#[test]
fn n1_with_control_word_rejects_padding() {
    let config = PwAtmConfig {
        n1_cw: ControlWordOptions {
            allow_nonzero_length: true,
            extend_length_with_reserved: false,
        },
        ..Default::default()
    };
    let dissector = PwAtmDissector::new(config, echo_registry());
    // Length 56 = CW + one cell, but two cells follow.
    let mut packet = build_preferred_control_word(0, 56, SequenceNumber::new(1), false)
        .unwrap()
        .to_vec();
    packet.extend(n1_cell(1, 40, 0, &[0u8; 48]));
    packet.extend(n1_cell(1, 40, 0, &[0u8; 48]));

    let d = dissector.dissect(PwEncapsulationMode::NToOneCw, &packet).unwrap();
    assert_eq!(d.payload_size, 104);
    assert_eq!(d.padding_size, 0);
    assert_eq!(d.cells.len(), 2);
    assert_eq!(
        d.diagnostics.as_slice(),
        &[Violation::UnexpectedPadding { padding: 52 }]
    );
}

#[test]
fn n1_reserved_flags_are_reported() {
    let mut packet = vec![0x13, 0x00, 0x00, 0x01];
    packet.extend(n1_cell(1, 40, 0, &[0u8; 48]));
    let d = dissector().dissect(PwEncapsulationMode::NToOneCw, &packet).unwrap();
    assert_eq!(
        d.diagnostics.as_slice(),
        &[
            Violation::NonZeroTopNibble { value: 1 },
            Violation::ReservedFlagsNonZero { value: 3 },
        ]
    );
    assert_eq!(d.cells.len(), 1);
}

#[test]
fn one_to_one_vpc_cells() {
    // First cell header is the ATM byte of the control word: V=1, PTI=0.
    let mut packet = build_generic_control_word(0, SequenceNumber::new(2), 0x40).to_vec();
    packet.extend_from_slice(&[0x00, 0x20]);
    packet.extend_from_slice(&[0x22; 48]);
    // Second cell: V=1, PTI=101 (F5 end-to-end OAM), VCI 32.
    packet.extend_from_slice(&[0x4A, 0x00, 0x20]);
    packet.extend(loopback_oam());
    assert_eq!(packet.len(), 3 + 2 * 51);

    let d = dissector().dissect(PwEncapsulationMode::OneToOneVpc, &packet).unwrap();
    let seg = d.segmentation.unwrap();
    assert_eq!((seg.cell_size, seg.cell_count, seg.remainder), (51, 2, 0));
    assert_eq!(d.cells[0].header.unwrap().vci(), Some(32u16.into()));
    assert_eq!(d.cells[0].payload, &[0x22; 48][..]);
    assert!(d.cells[1].is_oam);
    assert!(d.cells[1].oam.as_ref().unwrap().crc_ok);
    assert!(d.diagnostics.is_empty());
}

#[test]
fn one_to_one_vcc_with_wrong_v_bit() {
    let mut packet = build_generic_control_word(0, SequenceNumber::new(2), 0x40).to_vec();
    packet.extend_from_slice(&[0x33; 48]);
    let d = dissector().dissect(PwEncapsulationMode::OneToOneVcc, &packet).unwrap();
    assert_eq!(d.cells.len(), 1);
    assert_eq!(
        d.diagnostics.as_slice(),
        &[Violation::VciPresenceMismatch { expected: false }]
    );
}

#[test]
fn aal5_pdu_last_fragment_is_reassembled() {
    let sdu = ipv4_packet(40);
    let pdu = build_aal5_cpcs_pdu(&sdu, 0, 0).unwrap();
    // U bit marks the final fragment.
    let mut packet = build_generic_control_word(0, SequenceNumber::new(3), 0x04).to_vec();
    packet.extend_from_slice(&pdu);

    let d = dissector().dissect(PwEncapsulationMode::Aal5Pdu, &packet).unwrap();
    assert_eq!(d.segmentation.unwrap().cell_count, pdu.len() / 48);
    assert!(d.trailer.unwrap().computed_crc_ok);
    let dispatched = d.dispatched.unwrap();
    assert_eq!(dispatched.payload, &sdu[..]);
    assert_eq!(decoded_by(&dispatched.tree), Some("ip"));
    assert!(d.diagnostics.is_empty());
}

#[test]
fn aal5_pdu_middle_fragment_is_not_dispatched() {
    let mut packet = build_generic_control_word(0, SequenceNumber::new(3), 0x00).to_vec();
    packet.extend_from_slice(&[0x45; 48]);
    let d = dissector().dissect(PwEncapsulationMode::Aal5Pdu, &packet).unwrap();
    assert_eq!(d.cells.len(), 1);
    assert_eq!(d.trailer, None);
    assert!(d.dispatched.is_none());
}

#[test]
fn aal5_pdu_reserved_atm_byte_bits() {
    let mut packet = build_generic_control_word(0, SequenceNumber::new(3), 0x08).to_vec();
    packet.extend_from_slice(&[0u8; 48]);
    let d = dissector().dissect(PwEncapsulationMode::Aal5Pdu, &packet).unwrap();
    assert_eq!(
        d.diagnostics.as_slice(),
        &[Violation::ReservedBitsNonZero { value: 1 }]
    );
}

#[test]
fn small_packet_is_flagged_and_still_decoded() {
    let mut packet = vec![0x00, 0x00, 0x00, 0x01];
    packet.extend_from_slice(&[0u8; 26]);
    let d = dissector().dissect(PwEncapsulationMode::NToOneCw, &packet).unwrap();
    assert_eq!(d.payload_size, 26);
    assert!(d.cells.is_empty());
    assert_eq!(
        d.diagnostics.as_slice(),
        &[
            Violation::PacketTooSmall { size: 30, min: 56 },
            Violation::BrokenCells { remainder: 26 },
        ]
    );
}

#[test]
fn packet_shorter_than_control_word_is_an_error() {
    for mode in PwEncapsulationMode::ALL {
        let result = dissector().dissect(mode, &[0x00, 0x00]);
        if mode.has_control_word() {
            assert!(result.is_err(), "{}", mode);
        } else {
            let d = result.unwrap();
            assert_eq!(d.segmentation.unwrap().remainder, 2);
        }
    }
}
