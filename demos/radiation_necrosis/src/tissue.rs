//! Initial tissue: healthy parenchyma seeded with tumor metastases.

use cs_agent::{AgentResult, Cell};
use cs_core::{Random, Real3, SimRng};

use crate::model::{CellType, RadiationState};

/// Layout of the initial tissue block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TissueLayout {
    pub healthy_cells:    usize,
    /// Healthy cells fill the cube `[-half_extent, half_extent)³`.
    pub half_extent:      f64,
    /// Fraction of healthy cells that are neurons; the rest are glia.
    pub neuron_fraction:  f64,
    pub metastases:       usize,
    pub cells_per_lesion: usize,
    /// Metastasis centres fall within `[-lesion_extent, lesion_extent)³`.
    pub lesion_extent:    f64,
    /// Tumor cells scatter up to this far from their lesion centre per axis.
    pub lesion_radius:    f64,
}

impl Default for TissueLayout {
    fn default() -> Self {
        Self {
            healthy_cells:    3_000,
            half_extent:      200.0,
            neuron_fraction:  0.7,
            metastases:       3,
            cells_per_lesion: 80,
            lesion_extent:    150.0,
            lesion_radius:    10.0,
        }
    }
}

impl TissueLayout {
    pub fn total_cells(&self) -> usize {
        self.healthy_cells + self.metastases * self.cells_per_lesion
    }
}

const NEURON_DIAMETER: f64 = 15.0;
const GLIA_DIAMETER: f64 = 12.0;
const TUMOR_DIAMETER: f64 = 18.0;
const TUMOR_METABOLIC_HEALTH: f64 = 1.2;

fn uniform_point(rng: &mut SimRng, half: f64) -> Real3 {
    let x = rng.uniform_range(-half, half);
    let y = rng.uniform_range(-half, half);
    let z = rng.uniform_range(-half, half);
    Real3::new(x, y, z)
}

/// Build every cell of the initial tissue, healthy cells first.
pub fn build(layout: &TissueLayout, rng: &mut SimRng) -> AgentResult<Vec<Cell<RadiationState>>> {
    let mut cells = Vec::with_capacity(layout.total_cells());

    for _ in 0..layout.healthy_cells {
        let position = uniform_point(rng, layout.half_extent);
        let (cell_type, diameter) = if rng.uniform() < layout.neuron_fraction {
            (CellType::Neuron, NEURON_DIAMETER)
        } else {
            (CellType::Glia, GLIA_DIAMETER)
        };
        cells.push(Cell::with_diameter(position, diameter)?.with_ext(RadiationState::of_type(cell_type)));
    }

    for _ in 0..layout.metastases {
        let centre = uniform_point(rng, layout.lesion_extent);
        for _ in 0..layout.cells_per_lesion {
            let position = centre + uniform_point(rng, layout.lesion_radius);
            let state = RadiationState {
                metabolic_health: TUMOR_METABOLIC_HEALTH,
                ..RadiationState::of_type(CellType::Tumor)
            };
            cells.push(Cell::with_diameter(position, TUMOR_DIAMETER)?.with_ext(state));
        }
    }

    Ok(cells)
}
