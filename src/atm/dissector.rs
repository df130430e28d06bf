//! ATM dissector entry points driven by a capture pseudo-header.
//!
//! Two shapes of input arrive from a capture layer: reassembled PDUs (the
//! capture hardware already glued the cells of a frame together) and raw
//! cells. Both end in the same payload dispatcher.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::atm::aal5::{Aal5Trailer, Aal5TrailerProcessor, TrailerRejection, reassembled_cell_count};
use crate::atm::cell_header::{CellHeader, header_len, parse_cell_header};
use crate::atm::dispatcher::{AalPayloadDispatcher, Dispatched};
use crate::atm::hec::HecCorrectionResult;
use crate::atm::oam::{OamCell, OamFlow, decode_oam_cell};
use crate::atm::pseudo_header::{AalKind, AtmPseudoHeader};
use crate::atm::sar::{
    Aal1Header, Aal2SubHeader, Aal34SarPdu, decode_aal1, decode_aal2_subheader, decode_aal34,
};
use crate::config::AtmConfig;
use crate::constants::ATM_CELL_PAYLOAD_SIZE;
use crate::crc::CrcCalculators;
use crate::diagnostics::{Diagnostics, Violation};
use crate::error::{AtmError, AtmParsingError, ParseContext};
use crate::registry::SubDissectorRegistry;

/// Result of dissecting a reassembled PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtmDissection<'a> {
    pub aal: AalKind,
    /// Cells the PDU occupied, when the reported length is a whole number of cells.
    pub cell_count: Option<usize>,
    pub trailer: Option<Aal5Trailer>,
    pub padding_len: usize,
    pub trailer_rejection: Option<TrailerRejection>,
    /// Decoded OAM body when the PDU is a single OAM cell payload.
    pub oam: Option<OamCell>,
    pub dispatched: Dispatched<'a>,
    pub diagnostics: Diagnostics,
}

/// SAR-level decoding of one raw cell payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellPayload {
    Oam(OamCell),
    Aal1(Aal1Header),
    Aal2(Aal2SubHeader),
    Aal34(Aal34SarPdu),
    /// AAL5 or unknown; carried as data.
    Data {
        /// PTI marks the last cell of an AAL5 PDU.
        end_of_pdu: bool,
    },
}

/// Result of dissecting one raw cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDissection<'a> {
    pub header: CellHeader,
    pub hec: Option<HecCorrectionResult>,
    /// AAL kind after OAM reclassification.
    pub aal: AalKind,
    pub oam_flow: Option<OamFlow>,
    /// The 48 payload bytes.
    pub payload: &'a [u8],
    pub decoded: CellPayload,
    pub diagnostics: Diagnostics,
}

/// Result of dissecting a run of raw cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellsDissection<'a> {
    pub cells: Vec<CellDissection<'a>>,
    /// Anomalies of the run itself (a trailing partial cell).
    pub diagnostics: Diagnostics,
}

impl CellsDissection<'_> {
    /// All violations of the run and of every cell, in order.
    pub fn all_violations(&self) -> impl Iterator<Item = &Violation> {
        self.cells
            .iter()
            .flat_map(|c| c.diagnostics.iter())
            .chain(self.diagnostics.iter())
    }
}

/// Decodes ATM traffic described by an [`AtmPseudoHeader`].
#[derive(Debug, Default)]
pub struct AtmDissector {
    config: AtmConfig,
    registry: SubDissectorRegistry,
    crcs: CrcCalculators,
    aal5: Aal5TrailerProcessor,
}

impl AtmDissector {
    pub fn new(config: AtmConfig, registry: SubDissectorRegistry) -> Self {
        Self {
            config,
            registry,
            crcs: CrcCalculators::new(),
            aal5: Aal5TrailerProcessor::new(),
        }
    }

    pub fn config(&self) -> &AtmConfig {
        &self.config
    }

    pub fn registry(&self) -> &SubDissectorRegistry {
        &self.registry
    }

    /// Payload dispatcher bound to this dissector's registry and preferences.
    pub fn dispatcher(&self) -> AalPayloadDispatcher<'_> {
        AalPayloadDispatcher::new(&self.registry)
            .with_lane_as_sscop(self.config.dissect_lane_as_sscop)
    }

    /// Dissects a reassembled PDU.
    ///
    /// `pdu` holds the captured bytes and `reported_len` the length on the wire.
    ///
    /// # Errors
    /// - [`AtmError::Parsing`] - an OAM PDU shorter than one cell payload
    pub fn dissect_reassembled<'a>(
        &self,
        ph: &AtmPseudoHeader,
        pdu: &'a [u8],
        reported_len: usize,
    ) -> Result<AtmDissection<'a>, AtmError> {
        trace!(aal = ?ph.aal, len = pdu.len(), reported_len, "dissect_reassembled");
        let mut diagnostics = Diagnostics::new();
        let cell_count = reassembled_cell_count(reported_len);

        let (trailer, padding_len, trailer_rejection, content) = if ph.aal.has_aal5_trailer() {
            let extraction = self.aal5.process(pdu, reported_len, &mut diagnostics);
            (
                extraction.trailer,
                extraction.padding_len,
                extraction.rejection,
                extraction.content,
            )
        } else {
            (None, 0, None, &pdu[..reported_len.min(pdu.len())])
        };

        let oam = if ph.aal == AalKind::OamCell {
            Some(decode_oam_cell(content, &self.crcs, &mut diagnostics)?)
        } else {
            None
        };

        let dispatched =
            self.dispatcher()
                .dispatch(ph.aal, content, ph.traffic_type, ph.aal2_no_phdr);

        Ok(AtmDissection {
            aal: ph.aal,
            cell_count,
            trailer,
            padding_len,
            trailer_rejection,
            oam,
            dispatched,
            diagnostics,
        })
    }

    /// Size of one raw cell under the current HEC setting.
    pub fn cell_len(&self) -> usize {
        header_len(self.config.hec_present) + ATM_CELL_PAYLOAD_SIZE
    }

    /// Dissects one raw cell (header plus 48-byte payload).
    ///
    /// # Errors
    /// - [`AtmError::Parsing`] - `cell` is shorter than one cell
    pub fn dissect_cell<'a>(
        &self,
        ph: &AtmPseudoHeader,
        cell: &'a [u8],
    ) -> Result<CellDissection<'a>, AtmError> {
        let cell_len = self.cell_len();
        if cell.len() < cell_len {
            return Err(AtmParsingError::NotEnoughData {
                needed: cell_len,
                got: cell.len(),
                context: ParseContext::Cell,
            }
            .into());
        }
        let mut diagnostics = Diagnostics::new();
        let (header, hec) =
            parse_cell_header(cell, self.config.reference_point, self.config.hec_present)?;
        match hec {
            Some(HecCorrectionResult::CorrectablePosition(position)) => {
                diagnostics.push(Violation::HecCorrectable { position });
            }
            Some(HecCorrectionResult::Uncorrectable) => {
                diagnostics.push(Violation::HecUncorrectable);
            }
            _ => {}
        }

        let aal = if ph.aal.may_be_oam() && header.is_oam() {
            AalKind::OamCell
        } else {
            ph.aal
        };
        trace!(vpi = %header.vpi, vci = %header.vci, pti = header.payload_type, ?aal, "cell");

        let payload_at = header_len(self.config.hec_present);
        let payload = &cell[payload_at..payload_at + ATM_CELL_PAYLOAD_SIZE];
        let decoded = match aal {
            AalKind::OamCell => {
                CellPayload::Oam(decode_oam_cell(payload, &self.crcs, &mut diagnostics)?)
            }
            AalKind::Aal1 => CellPayload::Aal1(decode_aal1(payload, &mut diagnostics)?),
            AalKind::Aal2 => CellPayload::Aal2(decode_aal2_subheader(payload)?),
            AalKind::Aal34 => {
                CellPayload::Aal34(decode_aal34(payload, &self.crcs, &mut diagnostics)?)
            }
            _ => CellPayload::Data {
                end_of_pdu: header.end_of_pdu(),
            },
        };

        Ok(CellDissection {
            header,
            hec,
            aal,
            oam_flow: header.oam_flow(),
            payload,
            decoded,
            diagnostics,
        })
    }

    /// Dissects consecutive raw cells; trailing bytes are reported, not decoded.
    ///
    /// # Errors
    /// Propagates the first error of [`dissect_cell`](Self::dissect_cell).
    pub fn dissect_cells<'a>(
        &self,
        ph: &AtmPseudoHeader,
        bytes: &'a [u8],
    ) -> Result<CellsDissection<'a>, AtmError> {
        let chunks = bytes.chunks_exact(self.cell_len());
        let remainder = chunks.remainder().len();
        let cells = chunks
            .map(|cell| self.dissect_cell(ph, cell))
            .collect::<Result<Vec<_>, _>>()?;

        let mut diagnostics = Diagnostics::new();
        if remainder != 0 {
            debug!(cells = cells.len(), remainder, "partial cell at end of run");
            diagnostics.push(Violation::BrokenCells { remainder });
        }
        Ok(CellsDissection { cells, diagnostics })
    }
}
