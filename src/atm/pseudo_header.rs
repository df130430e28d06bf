//! Capture-side metadata that accompanies ATM traffic.
//!
//! The capture layer often knows the AAL and the traffic carried on a
//! connection before any byte is decoded; this pseudo-header is how it hands
//! that knowledge to the dissector.

use serde::{Deserialize, Serialize};

use crate::types::{Vci, Vpi};

/// ATM adaptation layer a cell or PDU belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AalKind {
    #[default]
    Unknown,
    Aal1,
    Aal2,
    Aal34,
    Aal5,
    /// User-defined AAL; raw cells are reclassified as OAM when VCI/PTI say so.
    UserAal,
    /// Signalling AAL (SSCOP over AAL5).
    SignallingAal,
    OamCell,
}

impl AalKind {
    /// Kinds that carry a reassembled CPCS-PDU with an AAL5 trailer.
    pub fn has_aal5_trailer(self) -> bool {
        matches!(self, AalKind::Aal5 | AalKind::SignallingAal)
    }

    /// Kinds whose raw cells may be upgraded to [`AalKind::OamCell`].
    pub fn may_be_oam(self) -> bool {
        matches!(self, AalKind::UserAal | AalKind::Unknown)
    }
}

/// Traffic carried over a connection, as numbered by capture pseudo-headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrafficType {
    Unknown,
    /// LLC multiplexed (RFC 2684).
    LlcMux,
    /// VC multiplexed (RFC 2684).
    VcMux,
    /// LAN emulation.
    Lane,
    /// Interim Local Management Interface.
    Ilmi,
    /// Frame relay interworking.
    FrameRelay,
    Spans,
    Ipsilon,
    UmtsFp,
    GprsNs,
    Sscop,
    Other(u32),
}

impl From<u32> for TrafficType {
    fn from(value: u32) -> Self {
        match value {
            0 => TrafficType::Unknown,
            1 => TrafficType::LlcMux,
            2 => TrafficType::VcMux,
            3 => TrafficType::Lane,
            4 => TrafficType::Ilmi,
            5 => TrafficType::FrameRelay,
            6 => TrafficType::Spans,
            7 => TrafficType::Ipsilon,
            8 => TrafficType::UmtsFp,
            9 => TrafficType::GprsNs,
            10 => TrafficType::Sscop,
            other => TrafficType::Other(other),
        }
    }
}

impl From<TrafficType> for u32 {
    fn from(value: TrafficType) -> Self {
        match value {
            TrafficType::Unknown => 0,
            TrafficType::LlcMux => 1,
            TrafficType::VcMux => 2,
            TrafficType::Lane => 3,
            TrafficType::Ilmi => 4,
            TrafficType::FrameRelay => 5,
            TrafficType::Spans => 6,
            TrafficType::Ipsilon => 7,
            TrafficType::UmtsFp => 8,
            TrafficType::GprsNs => 9,
            TrafficType::Sscop => 10,
            TrafficType::Other(other) => other,
        }
    }
}

/// Metadata supplied with a PDU or cell stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AtmPseudoHeader {
    pub aal: AalKind,
    /// Traffic type hint; `None` means unknown and triggers payload sniffing.
    pub traffic_type: Option<TrafficType>,
    pub vpi: Vpi,
    pub vci: Vci,
    /// Physical channel, direction or port.
    pub channel: u16,
    /// Number of cells the capture layer saw for this PDU.
    pub cells: u16,
    /// AAL2 traffic arrives without the start field / CPS header.
    pub aal2_no_phdr: bool,
}

impl AtmPseudoHeader {
    pub fn new(aal: AalKind) -> Self {
        Self {
            aal,
            ..Default::default()
        }
    }

    pub fn with_traffic_type(mut self, traffic_type: TrafficType) -> Self {
        self.traffic_type = Some(traffic_type);
        self
    }

    pub fn with_vc(mut self, vpi: u16, vci: u16) -> Self {
        self.vpi = Vpi::new(vpi);
        self.vci = Vci::new(vci);
        self
    }
}
