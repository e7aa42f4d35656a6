//! Per-cell radiobiological state and model parameters.
//!
//! One step represents five hours of tissue time.

use std::fmt;

/// Tissue compartment a cell belongs to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellType {
    #[default]
    Neuron,
    Glia,
    Tumor,
    Necrotic,
    /// Activated microglia recruited by inflammation.
    Inflammatory,
}

impl CellType {
    pub const ALL: [CellType; 5] = [
        CellType::Neuron,
        CellType::Glia,
        CellType::Tumor,
        CellType::Necrotic,
        CellType::Inflammatory,
    ];

    /// Damage per Gy relative to glia, from the α/β ratio of each tissue.
    pub fn radiosensitivity(self) -> f64 {
        match self {
            CellType::Neuron => 1.5,
            CellType::Tumor => 0.7,
            _ => 1.0,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellType::Neuron => "neuron",
            CellType::Glia => "glia",
            CellType::Tumor => "tumor",
            CellType::Necrotic => "necrotic",
            CellType::Inflammatory => "inflammatory",
        })
    }
}

/// Extension column carried by every cell in this model.
#[derive(Clone, Debug, PartialEq)]
pub struct RadiationState {
    pub cell_type:        CellType,
    /// Accumulated dose in Gy.
    pub dose:             f64,
    /// 0 (quiescent) to 2 (maximal).
    pub inflammation:     f64,
    /// 0 (dead) to 1.5 (hypermetabolic).
    pub metabolic_health: f64,
    pub damage:           f64,
    /// 0.1 (floor) to 1 (normoxic).
    pub oxygen:           f64,
    /// Steps spent necrotic; drives clearance.
    pub necrotic_steps:   u32,
}

impl Default for RadiationState {
    fn default() -> Self {
        Self {
            cell_type:        CellType::Neuron,
            dose:             0.0,
            inflammation:     0.0,
            metabolic_health: 1.0,
            damage:           0.0,
            oxygen:           1.0,
            necrotic_steps:   0,
        }
    }
}

impl RadiationState {
    pub fn of_type(cell_type: CellType) -> Self {
        Self { cell_type, ..Self::default() }
    }

    pub fn is_alive(&self) -> bool {
        self.cell_type != CellType::Necrotic && self.metabolic_health > 0.1
    }

    pub fn is_necrotic(&self) -> bool {
        self.cell_type == CellType::Necrotic
    }
}

/// Treatment protocol and population limits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RadiationParams {
    /// Single-fraction dose in Gy.
    pub dose:             f64,
    /// Step at which the dose is delivered.
    pub treatment_step:   u64,
    /// Tumor proliferation stops once the population reaches this size.
    pub tumor_cap:        usize,
    /// Immune recruitment stops once the population reaches this size.
    pub immune_cap:       usize,
    /// Necrotic cells are cleared after this many steps.  `None` keeps them.
    pub clearance_steps:  Option<u32>,
}

impl Default for RadiationParams {
    fn default() -> Self {
        Self {
            dose:            30.0,
            treatment_step:  20,
            tumor_cap:       3_000,
            immune_cap:      3_500,
            clearance_steps: Some(120),
        }
    }
}
