//! Population census and the milestone observer that logs it.

use std::collections::BTreeMap;

use cs_agent::AgentStore;
use cs_core::Step;
use cs_sim::{SimObserver, StepSummary};
use tracing::info;

use crate::model::{CellType, RadiationState};

/// Counts per cell type plus mean damage and inflammation of living cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Census {
    pub counts:            [usize; 5],
    pub mean_damage:       f64,
    pub mean_inflammation: f64,
}

impl Census {
    pub fn take(states: &[RadiationState]) -> Self {
        let mut census = Census::default();
        let (mut damage, mut inflammation, mut living) = (0.0, 0.0, 0usize);
        for state in states {
            census.counts[Self::slot(state.cell_type)] += 1;
            if !state.is_necrotic() {
                damage += state.damage;
                inflammation += state.inflammation;
                living += 1;
            }
        }
        if living > 0 {
            census.mean_damage = damage / living as f64;
            census.mean_inflammation = inflammation / living as f64;
        }
        census
    }

    pub fn count(&self, cell_type: CellType) -> usize {
        self.counts[Self::slot(cell_type)]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Necrotic share of the population, 0 when empty.
    pub fn necrotic_fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => self.count(CellType::Necrotic) as f64 / n as f64,
        }
    }

    fn slot(cell_type: CellType) -> usize {
        match cell_type {
            CellType::Neuron => 0,
            CellType::Glia => 1,
            CellType::Tumor => 2,
            CellType::Necrotic => 3,
            CellType::Inflammatory => 4,
        }
    }
}

/// Logs a census at named steps and keeps running spawn and clearance
/// totals.
pub struct MilestoneObserver {
    milestones:    BTreeMap<u64, &'static str>,
    pub spawned:   usize,
    pub cleared:   usize,
    pub history:   Vec<(Step, Census)>,
}

impl MilestoneObserver {
    /// Milestones for a five-hour step with treatment at `treatment_step`.
    pub fn new(treatment_step: u64, last_step: u64) -> Self {
        let t = treatment_step;
        let milestones = BTreeMap::from([
            (t.saturating_sub(1), "pre-treatment phase complete"),
            (t, "radiation delivered"),
            (t + 2, "early post-radiation response"),
            (t + 10, "acute radiation effects"),
            (t + 35, "early delayed effects"),
            (t + 100, "subacute effects"),
            (t + 200, "late delayed effects"),
            (t + 300, "chronic effects"),
            (last_step, "long-term observation complete"),
        ]);
        Self { milestones, spawned: 0, cleared: 0, history: Vec::new() }
    }
}

impl SimObserver<RadiationState> for MilestoneObserver {
    fn on_step_end(&mut self, summary: &StepSummary) {
        self.spawned += summary.spawned;
        self.cleared += summary.removed;
    }

    fn on_snapshot(&mut self, step: Step, agents: &AgentStore<RadiationState>) {
        let Some(label) = self.milestones.get(&step.0) else {
            return;
        };
        let census = Census::take(agents.cells().exts());
        info!(
            %step,
            hours        = (step.0 + 1) * 5,
            cells        = census.total(),
            tumor        = census.count(CellType::Tumor),
            necrotic     = census.count(CellType::Necrotic),
            inflammatory = census.count(CellType::Inflammatory),
            damage       = census.mean_damage,
            inflammation = census.mean_inflammation,
            "{label}"
        );
        self.history.push((step, census));
    }
}
