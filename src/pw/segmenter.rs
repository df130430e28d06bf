//! Cutting a pseudowire payload into cells.

use serde::{Deserialize, Serialize};

use crate::pw::mode::{AAL5_SDU_ADMIN_CELL_SIZE, PwEncapsulationMode};

/// Whole cells in a payload and the bytes left over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub cell_size: usize,
    pub cell_count: usize,
    /// Bytes after the last whole cell. Non-zero means broken cells.
    pub remainder: usize,
    /// Cell count before any clamping.
    pub unclamped_count: usize,
}

impl Segmentation {
    pub fn is_broken(&self) -> bool {
        self.remainder != 0
    }

    pub fn was_clamped(&self) -> bool {
        self.unclamped_count != self.cell_count
    }
}

fn split(payload_size: usize, cell_size: usize, max_cells: Option<usize>) -> Segmentation {
    let unclamped_count = payload_size / cell_size;
    let cell_count = max_cells.map_or(unclamped_count, |max| unclamped_count.min(max));
    Segmentation {
        cell_size,
        cell_count,
        remainder: payload_size - cell_count * cell_size,
        unclamped_count,
    }
}

/// Computes cell counts from a payload size that the control word
/// validation already settled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtmPwCellSegmenter;

impl AtmPwCellSegmenter {
    /// Segments a cell-mode payload.
    ///
    /// Returns `None` for AAL5-SDU payloads, which are not cells.
    pub fn segment(mode: PwEncapsulationMode, payload_size: usize) -> Option<Segmentation> {
        mode.cell_size()
            .map(|cell_size| split(payload_size, cell_size, None))
    }

    /// Segments an AAL5-SDU admin cell payload; at most one cell is counted.
    pub fn segment_admin(payload_size: usize) -> Segmentation {
        split(payload_size, AAL5_SDU_ADMIN_CELL_SIZE, Some(1))
    }
}
