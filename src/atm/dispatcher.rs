//! Routing of AAL payloads to the decoder that understands them.
//!
//! Decision order, first match wins:
//!
//! 1. Signalling AAL (and LANE when configured) goes to SSCOP.
//! 2. AAL5 with a traffic-type hint goes through the AAL5 type table.
//! 3. AAL5 longer than seven bytes is sniffed: LLC/SNAP, PPP, bridged
//!    Ethernet, frame relay (2- then 4-byte header), bare IP.
//! 4. AAL2 has its sub-header stripped and goes through the AAL2 type table.
//! 5. Everything else is raw data.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atm::pseudo_header::{AalKind, TrafficType};
use crate::atm::sar::{Aal2SubHeader, decode_aal2_subheader};
use crate::constants::{
    AAL2_SUBHEADER_SIZE, AAL5_HEURISTIC_MIN_LENGTH, BRIDGED_ETHERNET_PAD_SIZE, FR_NLPID_CONTROL,
    LLC_SNAP_PREFIX, NLPID_IP, NLPID_IPV6, NLPID_PAD, NLPID_SNAP, PPP_PROTOCOL_IP,
};
use crate::registry::{Handoff, SubDissectorRegistry, TypeTable};
use crate::traits::DecodedTree;

/// What a payload was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodedAs {
    /// Signalling AAL, handed to SSCOP.
    Signalling,
    /// Claimed by the handler registered for this key in a traffic-type table.
    TrafficType { table: TypeTable, key: u32 },
    LlcSnap,
    Ppp,
    /// VC-multiplexed bridged Ethernet; the two pad bytes are stripped.
    BridgedEthernet,
    /// Frame relay network interworking with a 2- or 4-byte Q.922 header.
    FrameRelay { header_len: u8 },
    Ip { version: u8 },
    /// Nothing recognised the payload.
    Data,
}

impl DecodedAs {
    /// Named decoder this outcome hands the payload to, if any.
    pub fn handoff(self) -> Option<Handoff> {
        match self {
            DecodedAs::Signalling => Some(Handoff::Sscop),
            DecodedAs::LlcSnap => Some(Handoff::Llc),
            DecodedAs::Ppp => Some(Handoff::Ppp),
            DecodedAs::BridgedEthernet => Some(Handoff::Ethernet),
            DecodedAs::FrameRelay { .. } => Some(Handoff::FrameRelay),
            DecodedAs::Ip { version: 6 } => Some(Handoff::Ipv6),
            DecodedAs::Ip { .. } => Some(Handoff::Ipv4),
            DecodedAs::TrafficType { .. } | DecodedAs::Data => None,
        }
    }
}

/// Outcome of dispatching one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched<'a> {
    pub decoded_as: DecodedAs,
    /// Bytes handed to the chosen decoder (after any stripping).
    pub payload: &'a [u8],
    /// AAL2 sub-header, when one was stripped.
    pub aal2_subheader: Option<Aal2SubHeader>,
    /// What the sub-dissector produced; `None` if none is registered or it declined.
    pub tree: Option<DecodedTree>,
}

type Sniffer = fn(&[u8]) -> Option<DecodedAs>;

/// AAL5 payload heuristics in the order they are tried.
const AAL5_SNIFFERS: [(&str, Sniffer); 6] = [
    ("llc-snap", sniff_llc_snap),
    ("ppp", sniff_ppp),
    ("bridged-ethernet", sniff_bridged_ethernet),
    ("fr-2byte", sniff_frame_relay_2),
    ("fr-4byte", sniff_frame_relay_4),
    ("ip", sniff_ip),
];

fn sniff_llc_snap(p: &[u8]) -> Option<DecodedAs> {
    p.starts_with(&LLC_SNAP_PREFIX).then_some(DecodedAs::LlcSnap)
}

fn sniff_ppp(p: &[u8]) -> Option<DecodedAs> {
    let word = u16::from_be_bytes([p[0], p[1]]);
    ((word & 0x00FF) == PPP_PROTOCOL_IP).then_some(DecodedAs::Ppp)
}

fn sniff_bridged_ethernet(p: &[u8]) -> Option<DecodedAs> {
    (u16::from_be_bytes([p[0], p[1]]) == 0x0000).then_some(DecodedAs::BridgedEthernet)
}

/// NLPID check at `at`: Q.922 UI control byte followed by IP, IPv6 or pad + SNAP.
fn nlpid_at(p: &[u8], at: usize) -> bool {
    p[at] == FR_NLPID_CONTROL
        && (p[at + 1] == NLPID_IP
            || p[at + 1] == NLPID_IPV6
            || (p[at + 1] == NLPID_PAD && p[at + 2] == NLPID_SNAP))
}

fn sniff_frame_relay_2(p: &[u8]) -> Option<DecodedAs> {
    nlpid_at(p, 2).then_some(DecodedAs::FrameRelay { header_len: 2 })
}

fn sniff_frame_relay_4(p: &[u8]) -> Option<DecodedAs> {
    nlpid_at(p, 4).then_some(DecodedAs::FrameRelay { header_len: 4 })
}

fn sniff_ip(p: &[u8]) -> Option<DecodedAs> {
    match p[0] >> 4 {
        v @ (4 | 6) => Some(DecodedAs::Ip { version: v }),
        _ => None,
    }
}

/// Runs the AAL5 heuristics over `payload`.
///
/// Returns `None` for payloads of seven bytes or less, or when nothing matches.
pub fn sniff_aal5_payload(payload: &[u8]) -> Option<DecodedAs> {
    if payload.len() < AAL5_HEURISTIC_MIN_LENGTH {
        return None;
    }
    AAL5_SNIFFERS.iter().find_map(|(name, sniff)| {
        let hit = sniff(payload);
        if let Some(decoded_as) = hit {
            debug!(heuristic = *name, ?decoded_as, "AAL5 payload recognised");
        }
        hit
    })
}

/// Decides where an AAL payload goes and runs the matching sub-dissector.
#[derive(Debug, Clone, Copy)]
pub struct AalPayloadDispatcher<'r> {
    registry: &'r SubDissectorRegistry,
    lane_as_sscop: bool,
}

impl<'r> AalPayloadDispatcher<'r> {
    pub fn new(registry: &'r SubDissectorRegistry) -> Self {
        Self {
            registry,
            lane_as_sscop: false,
        }
    }

    /// Sends LANE traffic to the signalling decoder.
    pub fn with_lane_as_sscop(mut self, enabled: bool) -> Self {
        self.lane_as_sscop = enabled;
        self
    }

    fn handed_off<'a>(&self, decoded_as: DecodedAs, payload: &'a [u8]) -> Dispatched<'a> {
        let tree = decoded_as
            .handoff()
            .and_then(|h| self.registry.try_handoff(h, payload));
        Dispatched {
            decoded_as,
            payload,
            aal2_subheader: None,
            tree,
        }
    }

    fn raw(payload: &[u8]) -> Dispatched<'_> {
        Dispatched {
            decoded_as: DecodedAs::Data,
            payload,
            aal2_subheader: None,
            tree: None,
        }
    }

    /// Routes `payload` for an AAL kind, with an optional traffic-type hint.
    ///
    /// `aal2_no_phdr` says AAL2 payloads arrive without the 4-byte sub-header.
    pub fn dispatch<'a>(
        &self,
        aal: AalKind,
        payload: &'a [u8],
        traffic_type: Option<TrafficType>,
        aal2_no_phdr: bool,
    ) -> Dispatched<'a> {
        match aal {
            AalKind::SignallingAal => self.handed_off(DecodedAs::Signalling, payload),
            AalKind::Aal5 => self.dispatch_aal5(payload, traffic_type),
            AalKind::Aal2 => self.dispatch_aal2(payload, traffic_type, aal2_no_phdr),
            _ => Self::raw(payload),
        }
    }

    fn dispatch_aal5<'a>(
        &self,
        payload: &'a [u8],
        traffic_type: Option<TrafficType>,
    ) -> Dispatched<'a> {
        if let Some(tt) = traffic_type {
            if self.lane_as_sscop && tt == TrafficType::Lane {
                return self.handed_off(DecodedAs::Signalling, payload);
            }
            let key = u32::from(tt);
            if let Some(tree) = self.registry.try_type(TypeTable::Aal5, key, payload) {
                return Dispatched {
                    decoded_as: DecodedAs::TrafficType {
                        table: TypeTable::Aal5,
                        key,
                    },
                    payload,
                    aal2_subheader: None,
                    tree: Some(tree),
                };
            }
            debug!(key, "no AAL5 type handler, trying heuristics");
        }

        match sniff_aal5_payload(payload) {
            Some(DecodedAs::BridgedEthernet) => self.handed_off(
                DecodedAs::BridgedEthernet,
                &payload[BRIDGED_ETHERNET_PAD_SIZE..],
            ),
            Some(decoded_as) => self.handed_off(decoded_as, payload),
            None => Self::raw(payload),
        }
    }

    fn dispatch_aal2<'a>(
        &self,
        payload: &'a [u8],
        traffic_type: Option<TrafficType>,
        aal2_no_phdr: bool,
    ) -> Dispatched<'a> {
        let (aal2_subheader, rest) = if aal2_no_phdr {
            (None, payload)
        } else {
            match decode_aal2_subheader(payload) {
                Ok(sub) => (Some(sub), &payload[AAL2_SUBHEADER_SIZE..]),
                Err(err) => {
                    debug!(%err, "AAL2 payload too short for sub-header");
                    return Self::raw(payload);
                }
            }
        };
        let key = u32::from(traffic_type.unwrap_or(TrafficType::Unknown));
        let tree = self.registry.try_type(TypeTable::Aal2, key, rest);
        let decoded_as = if tree.is_some() {
            DecodedAs::TrafficType {
                table: TypeTable::Aal2,
                key,
            }
        } else {
            DecodedAs::Data
        };
        Dispatched {
            decoded_as,
            payload: rest,
            aal2_subheader,
            tree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{FieldValue, SubDissector};

    fn echo(protocol: &'static str) -> Box<dyn SubDissector> {
        Box::new(move |payload: &[u8]| {
            Some(DecodedTree::new(protocol).with_field("bytes", FieldValue::Bytes(payload.to_vec())))
        })
    }

    fn padded(prefix: &[u8]) -> Vec<u8> {
        let mut p = prefix.to_vec();
        p.resize(16, 0xEE);
        p
    }

    #[test]
    fn heuristic_examples() {
        assert_eq!(
            sniff_aal5_payload(&padded(&[0xAA, 0xAA, 0x03])),
            Some(DecodedAs::LlcSnap)
        );
        assert_eq!(sniff_aal5_payload(&padded(&[0xFF, 0x21])), Some(DecodedAs::Ppp));
        assert_eq!(
            sniff_aal5_payload(&padded(&[0x00, 0x00])),
            Some(DecodedAs::BridgedEthernet)
        );
        assert_eq!(
            sniff_aal5_payload(&padded(&[0x18, 0x41, 0x03, 0xCC])),
            Some(DecodedAs::FrameRelay { header_len: 2 })
        );
        assert_eq!(
            sniff_aal5_payload(&padded(&[0x18, 0x41, 0x03, 0x00, 0x80])),
            Some(DecodedAs::FrameRelay { header_len: 2 })
        );
        assert_eq!(
            sniff_aal5_payload(&padded(&[0x18, 0x41, 0x11, 0x22, 0x03, 0x8E])),
            Some(DecodedAs::FrameRelay { header_len: 4 })
        );
        assert_eq!(
            sniff_aal5_payload(&padded(&[0x45, 0x00])),
            Some(DecodedAs::Ip { version: 4 })
        );
        assert_eq!(
            sniff_aal5_payload(&padded(&[0x60, 0x01])),
            Some(DecodedAs::Ip { version: 6 })
        );
        assert_eq!(sniff_aal5_payload(&padded(&[0x12, 0x34])), None);
    }

    #[test]
    fn short_payloads_are_not_sniffed() {
        assert_eq!(sniff_aal5_payload(&[0xAA, 0xAA, 0x03, 0, 0, 0, 0]), None);
        assert_eq!(
            sniff_aal5_payload(&[0xAA, 0xAA, 0x03, 0, 0, 0, 0, 0]),
            Some(DecodedAs::LlcSnap)
        );
    }

    #[test]
    fn heuristic_order_is_preserved() {
        // 0x00 0x21: bridged Ethernet would match too, PPP is tried first.
        assert_eq!(sniff_aal5_payload(&padded(&[0x00, 0x21])), Some(DecodedAs::Ppp));
        // 0x45 0x00 0x03 0xCC: frame relay is tried before IP.
        assert_eq!(
            sniff_aal5_payload(&padded(&[0x45, 0x00, 0x03, 0xCC])),
            Some(DecodedAs::FrameRelay { header_len: 2 })
        );
        // LLC/SNAP prefix also satisfies the 2-byte frame relay check.
        assert_eq!(
            sniff_aal5_payload(&padded(&[0xAA, 0xAA, 0x03, 0xCC])),
            Some(DecodedAs::LlcSnap)
        );
    }

    #[test]
    fn signalling_goes_to_sscop() {
        let mut registry = SubDissectorRegistry::new();
        registry.register_handoff(Handoff::Sscop, echo("sscop")).unwrap();
        let dispatcher = AalPayloadDispatcher::new(&registry);
        let payload = padded(&[0xAA, 0xAA, 0x03]);
        let d = dispatcher.dispatch(AalKind::SignallingAal, &payload, None, false);
        assert_eq!(d.decoded_as, DecodedAs::Signalling);
        assert_eq!(d.tree.unwrap().protocol, "sscop");
    }

    #[test]
    fn traffic_type_table_wins_over_heuristics() {
        let mut registry = SubDissectorRegistry::new();
        registry
            .register_type(TypeTable::Aal5, u32::from(TrafficType::Lane), echo("lane"))
            .unwrap();
        let dispatcher = AalPayloadDispatcher::new(&registry);
        let payload = padded(&[0xAA, 0xAA, 0x03]);
        let d = dispatcher.dispatch(AalKind::Aal5, &payload, Some(TrafficType::Lane), false);
        assert_eq!(
            d.decoded_as,
            DecodedAs::TrafficType {
                table: TypeTable::Aal5,
                key: 3
            }
        );
        assert_eq!(d.tree.unwrap().protocol, "lane");
    }

    #[test]
    fn unregistered_traffic_type_falls_through() {
        let registry = SubDissectorRegistry::new();
        let dispatcher = AalPayloadDispatcher::new(&registry);
        let payload = padded(&[0xAA, 0xAA, 0x03]);
        let d = dispatcher.dispatch(AalKind::Aal5, &payload, Some(TrafficType::Ilmi), false);
        assert_eq!(d.decoded_as, DecodedAs::LlcSnap);
        assert!(d.tree.is_none());
    }

    #[test]
    fn lane_as_sscop_preference() {
        let registry = SubDissectorRegistry::new();
        let dispatcher = AalPayloadDispatcher::new(&registry).with_lane_as_sscop(true);
        let payload = padded(&[0x45]);
        let d = dispatcher.dispatch(AalKind::Aal5, &payload, Some(TrafficType::Lane), false);
        assert_eq!(d.decoded_as, DecodedAs::Signalling);
        let d = dispatcher.dispatch(AalKind::Aal5, &payload, Some(TrafficType::LlcMux), false);
        assert_eq!(d.decoded_as, DecodedAs::Ip { version: 4 });
    }

    #[test]
    fn bridged_ethernet_strips_pad() {
        let mut registry = SubDissectorRegistry::new();
        registry.register_handoff(Handoff::Ethernet, echo("eth")).unwrap();
        let dispatcher = AalPayloadDispatcher::new(&registry);
        let payload = padded(&[0x00, 0x00, 0x01, 0x02]);
        let d = dispatcher.dispatch(AalKind::Aal5, &payload, None, false);
        assert_eq!(d.decoded_as, DecodedAs::BridgedEthernet);
        assert_eq!(d.payload, &payload[2..]);
        let tree = d.tree.unwrap();
        assert_eq!(tree.field("bytes"), Some(&FieldValue::Bytes(payload[2..].to_vec())));
    }

    #[test]
    fn aal2_strips_subheader_and_uses_its_own_table() {
        let mut registry = SubDissectorRegistry::new();
        registry
            .register_type(TypeTable::Aal2, u32::from(TrafficType::UmtsFp), echo("umts_fp"))
            .unwrap();
        let dispatcher = AalPayloadDispatcher::new(&registry);
        let payload = [0x04, 0x08, 0x28, 0x00, 0x10, 0x20];

        let d = dispatcher.dispatch(AalKind::Aal2, &payload, Some(TrafficType::UmtsFp), false);
        assert_eq!(d.payload, &[0x10, 0x20]);
        assert_eq!(d.aal2_subheader.unwrap().cid, 8);
        assert_eq!(d.tree.unwrap().protocol, "umts_fp");

        let d = dispatcher.dispatch(AalKind::Aal2, &payload, Some(TrafficType::UmtsFp), true);
        assert_eq!(d.payload, &payload[..]);
        assert!(d.aal2_subheader.is_none());

        let d = dispatcher.dispatch(AalKind::Aal2, &payload, Some(TrafficType::GprsNs), false);
        assert_eq!(d.decoded_as, DecodedAs::Data);
        assert_eq!(d.payload, &[0x10, 0x20]);
    }

    #[test]
    fn other_aal_kinds_are_raw() {
        let registry = SubDissectorRegistry::new();
        let dispatcher = AalPayloadDispatcher::new(&registry);
        let payload = padded(&[0xAA, 0xAA, 0x03]);
        for aal in [AalKind::Aal1, AalKind::Aal34, AalKind::Unknown, AalKind::OamCell] {
            let d = dispatcher.dispatch(aal, &payload, None, false);
            assert_eq!(d.decoded_as, DecodedAs::Data);
            assert_eq!(d.payload, &payload[..]);
        }
    }
}
