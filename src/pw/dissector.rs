//! ATM-over-MPLS pseudowire dissector (RFC 4717).
//!
//! A packet is decoded in three steps: the control word is validated and
//! settles the payload size, the payload is cut into cells (or handed on as
//! an AAL5 frame), and each cell is classified as OAM or user data.

use tracing::{debug, trace};

use crate::atm::aal5::{Aal5Trailer, Aal5TrailerProcessor};
use crate::atm::dispatcher::{AalPayloadDispatcher, Dispatched};
use crate::atm::pseudo_header::AalKind;
use crate::config::{ControlWordOptions, PwAtmConfig};
use crate::constants::PW_CONTROL_WORD_SIZE;
use crate::crc::CrcCalculators;
use crate::diagnostics::{Diagnostics, Violation};
use crate::error::{AtmError, AtmParsingError, ParseContext};
use crate::pw::cell::{PwCell, decode_pw_cell};
use crate::pw::control_word::{ControlWordValidator, PwControlWord};
use crate::pw::mode::PwEncapsulationMode;
use crate::pw::segmenter::{AtmPwCellSegmenter, Segmentation};
use crate::registry::SubDissectorRegistry;

/// Everything decoded from one PW packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwAtmDissection<'a> {
    pub mode: PwEncapsulationMode,
    /// `None` in N:1 mode without control word.
    pub control_word: Option<PwControlWord>,
    pub payload_size: usize,
    pub padding_size: usize,
    /// Cell accounting, for modes that carry cells.
    pub segmentation: Option<Segmentation>,
    pub cells: Vec<PwCell<'a>>,
    /// AAL5 trailer of a complete AAL5-PDU frame.
    pub trailer: Option<Aal5Trailer>,
    /// Where an AAL5 payload went, for the frame modes.
    pub dispatched: Option<Dispatched<'a>>,
    pub diagnostics: Diagnostics,
}

impl PwAtmDissection<'_> {
    /// Whether the packet carried an AAL5-SDU admin cell.
    pub fn is_admin_cell(&self) -> bool {
        self.mode == PwEncapsulationMode::Aal5Sdu
            && self.control_word.is_some_and(|cw| cw.admin_cell())
    }
}

/// Decodes ATM pseudowire packets.
#[derive(Debug, Default)]
pub struct PwAtmDissector {
    config: PwAtmConfig,
    registry: SubDissectorRegistry,
    crcs: CrcCalculators,
    aal5: Aal5TrailerProcessor,
}

impl PwAtmDissector {
    pub fn new(config: PwAtmConfig, registry: SubDissectorRegistry) -> Self {
        Self {
            config,
            registry,
            crcs: CrcCalculators::new(),
            aal5: Aal5TrailerProcessor::new(),
        }
    }

    pub fn config(&self) -> &PwAtmConfig {
        &self.config
    }

    fn options(&self, mode: PwEncapsulationMode) -> ControlWordOptions {
        match mode {
            PwEncapsulationMode::NToOneCw => self.config.n1_cw,
            PwEncapsulationMode::Aal5Sdu => self.config.aal5_sdu,
            _ => ControlWordOptions::default(),
        }
    }

    /// Decodes one PW packet carried in `mode`.
    ///
    /// # Errors
    /// - [`AtmError::Parsing`] - the packet is shorter than its control word
    pub fn dissect<'a>(
        &self,
        mode: PwEncapsulationMode,
        packet: &'a [u8],
    ) -> Result<PwAtmDissection<'a>, AtmError> {
        trace!(%mode, len = packet.len(), "dissect pw-atm");
        let mut diagnostics = Diagnostics::new();

        let (control_word, payload_size, padding_size) = if mode.has_control_word() {
            let cw_bytes: [u8; PW_CONTROL_WORD_SIZE] = packet
                .get(..PW_CONTROL_WORD_SIZE)
                .and_then(|b| b.try_into().ok())
                .ok_or(AtmParsingError::NotEnoughData {
                    needed: PW_CONTROL_WORD_SIZE,
                    got: packet.len(),
                    context: ParseContext::PwControlWord,
                })?;
            let validation =
                ControlWordValidator::validate(cw_bytes, mode, packet.len(), self.options(mode));
            diagnostics.extend(validation.diagnostics);
            (
                Some(validation.control_word),
                validation.payload_size,
                validation.padding_size,
            )
        } else {
            (None, packet.len(), 0)
        };

        let admin_cell = mode == PwEncapsulationMode::Aal5Sdu
            && control_word.is_some_and(|cw| cw.admin_cell());
        let min = mode.min_packet_size(admin_cell);
        if packet.len() < min {
            diagnostics.push(Violation::PacketTooSmall {
                size: packet.len(),
                min,
            });
        }

        let start = mode.payload_offset();
        let payload = &packet[start..start + payload_size];

        let mut dissection = PwAtmDissection {
            mode,
            control_word,
            payload_size,
            padding_size,
            segmentation: None,
            cells: Vec::new(),
            trailer: None,
            dispatched: None,
            diagnostics,
        };

        match mode {
            PwEncapsulationMode::Aal5Sdu if !admin_cell => {
                dissection.dispatched = Some(self.dispatcher().dispatch(
                    AalKind::Aal5,
                    payload,
                    None,
                    false,
                ));
            }
            PwEncapsulationMode::Aal5Sdu => {
                let seg = AtmPwCellSegmenter::segment_admin(payload_size);
                if seg.was_clamped() {
                    dissection.diagnostics.push(Violation::AdminCellCountExceeded {
                        count: seg.unclamped_count,
                    });
                }
                self.decode_cells(&mut dissection, payload, seg, true)?;
            }
            _ => {
                if let Some(seg) = AtmPwCellSegmenter::segment(mode, payload_size) {
                    self.decode_cells(&mut dissection, payload, seg, false)?;
                }
                if mode == PwEncapsulationMode::Aal5Pdu {
                    self.finish_aal5_frame(&mut dissection, payload);
                }
            }
        }
        Ok(dissection)
    }

    fn dispatcher(&self) -> AalPayloadDispatcher<'_> {
        AalPayloadDispatcher::new(&self.registry)
    }

    fn decode_cells<'a>(
        &self,
        dissection: &mut PwAtmDissection<'a>,
        payload: &'a [u8],
        seg: Segmentation,
        admin: bool,
    ) -> Result<(), AtmError> {
        if seg.is_broken() {
            debug!(remainder = seg.remainder, cells = seg.cell_count, "broken cells");
            dissection.diagnostics.push(Violation::BrokenCells {
                remainder: seg.remainder,
            });
        }
        for cell in payload.chunks_exact(seg.cell_size).take(seg.cell_count) {
            let decoded = decode_pw_cell(
                cell,
                dissection.mode,
                admin,
                &self.crcs,
                &mut dissection.diagnostics,
            )?;
            dissection.cells.push(decoded);
        }
        dissection.segmentation = Some(seg);
        Ok(())
    }

    /// Reads the trailer and dispatches the frame once the last fragment arrived.
    fn finish_aal5_frame<'a>(&self, dissection: &mut PwAtmDissection<'a>, payload: &'a [u8]) {
        let last_fragment = dissection
            .control_word
            .and_then(|cw| cw.pdu_end_of_frame())
            .unwrap_or(false);
        if !last_fragment {
            return;
        }
        let extraction = self
            .aal5
            .process(payload, payload.len(), &mut dissection.diagnostics);
        dissection.trailer = extraction.trailer;
        dissection.dispatched =
            Some(self.dispatcher().dispatch(AalKind::Aal5, extraction.content, None, false));
    }
}
