//! Unit tests for the radiation-necrosis model.

use approx::assert_relative_eq;

use cs_agent::{Agent, Cell, Geometry};
use cs_behavior::{Behavior, Intent, NoEnvironment, SimContext};
use cs_core::{AgentRng, AgentUid, Real3, SimRng, Step};

use crate::behaviors::{CellDynamics, InflammatoryResponse, RadiationTherapy};
use crate::model::{CellType, RadiationParams, RadiationState};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn ctx(step: u64, agent_count: usize) -> SimContext<'static> {
    SimContext::new(Step(step), 1.0, agent_count, &NoEnvironment)
}

fn cell(cell_type: CellType, diameter: f64) -> Cell<RadiationState> {
    Cell::with_diameter(Real3::ZERO, diameter)
        .unwrap()
        .with_ext(RadiationState::of_type(cell_type))
}

fn rng(seed: u64) -> AgentRng {
    AgentRng::new(seed, AgentUid(0))
}

// ── Model ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod model_tests {
    use super::*;

    #[test]
    fn radiosensitivity_by_type() {
        assert_eq!(CellType::Neuron.radiosensitivity(), 1.5);
        assert_eq!(CellType::Glia.radiosensitivity(), 1.0);
        assert_eq!(CellType::Tumor.radiosensitivity(), 0.7);
        assert_eq!(CellType::Inflammatory.radiosensitivity(), 1.0);
    }

    #[test]
    fn alive_requires_non_necrotic_and_metabolism() {
        assert!(RadiationState::default().is_alive());
        assert!(!RadiationState::of_type(CellType::Necrotic).is_alive());
        let starving = RadiationState { metabolic_health: 0.05, ..RadiationState::default() };
        assert!(!starving.is_alive());
    }
}

// ── RadiationTherapy ──────────────────────────────────────────────────────────

#[cfg(test)]
mod therapy_tests {
    use super::*;

    #[test]
    fn dose_delivered_once_at_treatment_step() {
        let params = RadiationParams::default();
        let mut therapy = RadiationTherapy::new(params);
        let mut neuron = cell(CellType::Neuron, 15.0);

        therapy.run(&mut neuron, &ctx(19, 1), &mut rng(0)).unwrap();
        assert_eq!(neuron.ext().dose, 0.0);

        therapy.run(&mut neuron, &ctx(20, 1), &mut rng(0)).unwrap();
        assert_eq!(neuron.ext().dose, 30.0);
        assert_relative_eq!(neuron.ext().damage, 45.0);
        assert_relative_eq!(neuron.ext().metabolic_health, 1.0 - 4.5);

        // Rerunning the same step does not add another fraction.
        therapy.run(&mut neuron, &ctx(20, 1), &mut rng(0)).unwrap();
        assert_eq!(neuron.ext().dose, 30.0);
    }

    #[test]
    fn tumor_takes_less_damage() {
        let mut therapy = RadiationTherapy::new(RadiationParams::default());
        let mut tumor = cell(CellType::Tumor, 18.0);
        therapy.run(&mut tumor, &ctx(20, 1), &mut rng(0)).unwrap();
        assert_relative_eq!(tumor.ext().damage, 21.0);
    }

    #[test]
    fn necrotic_cells_are_not_irradiated() {
        let mut therapy = RadiationTherapy::new(RadiationParams::default());
        let mut dead = cell(CellType::Necrotic, 10.0);
        therapy.run(&mut dead, &ctx(20, 1), &mut rng(0)).unwrap();
        assert_eq!(dead.ext().dose, 0.0);
    }
}

// ── CellDynamics ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod dynamics_tests {
    use super::*;

    #[test]
    fn necrotic_cells_are_cleared_after_limit() {
        let params = RadiationParams { clearance_steps: Some(3), ..RadiationParams::default() };
        let mut dynamics = CellDynamics::new(params);
        let mut dead = cell(CellType::Necrotic, 10.0);
        let mut r = rng(1);

        for _ in 0..2 {
            let intents = dynamics.run(&mut dead, &ctx(0, 1), &mut r).unwrap();
            assert!(intents.is_empty());
        }
        let intents = dynamics.run(&mut dead, &ctx(0, 1), &mut r).unwrap();
        assert!(matches!(intents.as_slice(), [Intent::Remove]));
        assert_eq!(dead.ext().necrotic_steps, 3);
    }

    #[test]
    fn necrotic_cells_persist_without_clearance() {
        let params = RadiationParams { clearance_steps: None, ..RadiationParams::default() };
        let mut dynamics = CellDynamics::new(params);
        let mut dead = cell(CellType::Necrotic, 10.0);
        let mut r = rng(2);
        for _ in 0..500 {
            assert!(dynamics.run(&mut dead, &ctx(0, 1), &mut r).unwrap().is_empty());
        }
    }

    #[test]
    fn severe_damage_kills_and_shrinks() {
        let mut dynamics = CellDynamics::new(RadiationParams::default());
        let mut doomed = cell(CellType::Glia, 12.0);
        doomed.ext_mut().damage = 100.0;
        let mut r = rng(3);

        for _ in 0..200 {
            dynamics.run(&mut doomed, &ctx(0, 1), &mut r).unwrap();
            if doomed.ext().is_necrotic() {
                break;
            }
        }
        assert!(doomed.ext().is_necrotic());
        assert_eq!(doomed.ext().metabolic_health, 0.0);
        assert_relative_eq!(doomed.diameter(), 12.0 * 0.7, max_relative = 1e-12);
    }

    #[test]
    fn tumor_proliferation_respects_cap() {
        let params = RadiationParams::default();
        let mut dynamics = CellDynamics::new(params);
        let mut r = rng(4);

        let mut spawned = 0;
        for _ in 0..2_000 {
            let mut tumor = cell(CellType::Tumor, 18.0);
            let intents = dynamics.run(&mut tumor, &ctx(0, params.tumor_cap), &mut r).unwrap();
            spawned += intents.len();
        }
        assert_eq!(spawned, 0);
    }

    #[test]
    fn tumor_offspring_inherit_attenuated_dose() {
        let mut dynamics = CellDynamics::new(RadiationParams::default());
        let mut r = rng(5);

        let mut offspring = None;
        for _ in 0..5_000 {
            let mut tumor = cell(CellType::Tumor, 18.0);
            tumor.ext_mut().dose = 5.0;
            let intents = dynamics.run(&mut tumor, &ctx(0, 100), &mut r).unwrap();
            if let Some(Intent::Spawn { cell, behaviors }) = intents.into_iter().next() {
                offspring = Some((cell, behaviors));
                break;
            }
        }
        let (daughter, behaviors) = offspring.expect("a tumor cell should proliferate");
        assert_eq!(daughter.ext().cell_type, CellType::Tumor);
        assert_relative_eq!(daughter.ext().dose, 4.0);
        assert!((18.0 * 0.8..=18.0 * 1.2).contains(&daughter.diameter()));
        assert!(daughter.position().length() <= 5.0 * 3f64.sqrt());
        let names: Vec<_> = behaviors.iter().map(|b| b.name()).collect();
        assert_eq!(names, ["RadiationTherapy", "CellDynamics"]);
    }

    #[test]
    fn oxygen_never_drops_below_floor() {
        let mut dynamics = CellDynamics::new(RadiationParams { clearance_steps: None, ..Default::default() });
        let mut neuron = cell(CellType::Neuron, 15.0);
        let mut r = rng(6);
        for step in 0..400 {
            dynamics.run(&mut neuron, &ctx(step, 1), &mut r).unwrap();
            assert!(neuron.ext().oxygen >= 0.1);
        }
    }
}

// ── InflammatoryResponse ──────────────────────────────────────────────────────

#[cfg(test)]
mod inflammation_tests {
    use super::*;

    #[test]
    fn necrotic_cells_do_not_respond() {
        let mut response = InflammatoryResponse::new(RadiationParams::default());
        let mut dead = cell(CellType::Necrotic, 10.0);
        dead.ext_mut().damage = 500.0;
        let before = dead.ext().clone();
        for _ in 0..100 {
            response.run(&mut dead, &ctx(30, 1), &mut rng(7)).unwrap();
        }
        assert_eq!(*dead.ext(), before);
    }

    #[test]
    fn inflammation_bounded_and_recruits() {
        let params = RadiationParams::default();
        let mut response = InflammatoryResponse::new(params);
        let mut inflamed = cell(CellType::Glia, 12.0);
        inflamed.ext_mut().damage = 500.0;
        let mut r = rng(8);

        let mut recruits = Vec::new();
        for _ in 0..2_000 {
            for intent in response.run(&mut inflamed, &ctx(30, 10), &mut r).unwrap() {
                if let Intent::Spawn { cell, behaviors } = intent {
                    recruits.push((cell, behaviors.len()));
                }
            }
            let level = inflamed.ext().inflammation;
            assert!((0.0..=2.0).contains(&level), "inflammation {level}");
            assert!(inflamed.ext().metabolic_health >= 0.1);
        }

        assert!(!recruits.is_empty());
        let (immune, behaviors) = &recruits[0];
        assert_eq!(immune.ext().cell_type, CellType::Inflammatory);
        assert_eq!(immune.ext().inflammation, 0.8);
        assert_eq!(immune.diameter(), 10.0);
        assert_eq!(*behaviors, 3);
    }

    #[test]
    fn recruitment_stops_at_cap() {
        let params = RadiationParams::default();
        let mut response = InflammatoryResponse::new(params);
        let mut inflamed = cell(CellType::Glia, 12.0);
        inflamed.ext_mut().inflammation = 2.0;
        inflamed.ext_mut().damage = 500.0;
        let mut r = rng(9);
        for _ in 0..2_000 {
            let intents = response.run(&mut inflamed, &ctx(30, params.immune_cap), &mut r).unwrap();
            assert!(intents.is_empty());
        }
    }
}

// ── Tissue and census ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tissue_tests {
    use super::*;
    use crate::census::Census;
    use crate::tissue::{self, TissueLayout};

    #[test]
    fn default_layout_population() {
        let layout = TissueLayout::default();
        let cells = tissue::build(&layout, &mut SimRng::new(42)).unwrap();
        assert_eq!(cells.len(), 3_240);

        let states: Vec<_> = cells.iter().map(|c| c.ext().clone()).collect();
        let census = Census::take(&states);
        assert_eq!(census.count(CellType::Tumor), 240);
        assert_eq!(census.count(CellType::Necrotic), 0);
        let neurons = census.count(CellType::Neuron) as f64 / 3_000.0;
        assert!((0.65..0.75).contains(&neurons), "neuron fraction {neurons}");

        for c in &cells[..3_000] {
            let p = c.position();
            assert!(p.abs().max_element() <= 200.0);
            let expected = if c.ext().cell_type == CellType::Neuron { 15.0 } else { 12.0 };
            assert_eq!(c.diameter(), expected);
        }
        for c in &cells[3_000..] {
            assert_eq!(c.diameter(), 18.0);
            assert_eq!(c.ext().metabolic_health, 1.2);
            assert!(c.position().abs().max_element() <= 160.0);
        }
    }

    #[test]
    fn census_means_skip_necrotic() {
        let states = vec![
            RadiationState { damage: 2.0, inflammation: 0.4, ..RadiationState::default() },
            RadiationState { damage: 4.0, inflammation: 0.2, ..RadiationState::of_type(CellType::Tumor) },
            RadiationState { damage: 100.0, ..RadiationState::of_type(CellType::Necrotic) },
        ];
        let census = Census::take(&states);
        assert_eq!(census.total(), 3);
        assert_relative_eq!(census.mean_damage, 3.0);
        assert_relative_eq!(census.mean_inflammation, 0.3);
        assert_relative_eq!(census.necrotic_fraction(), 1.0 / 3.0);
        assert_eq!(Census::take(&[]).necrotic_fraction(), 0.0);
    }
}

// ── End to end ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sim_tests {
    use cs_agent::AgentStoreBuilder;
    use cs_core::SimConfig;
    use cs_sim::{NoopObserver, SimBuilder};

    use super::*;
    use crate::behaviors::tissue_behaviors;
    use crate::census::Census;
    use crate::tissue::{self, TissueLayout};

    fn small_run(steps: u64) -> (Vec<AgentUid>, Vec<RadiationState>) {
        let layout = TissueLayout {
            healthy_cells:    200,
            metastases:       1,
            cells_per_lesion: 20,
            ..TissueLayout::default()
        };
        let cells = tissue::build(&layout, &mut SimRng::new(7)).unwrap();
        let (store, rngs) = AgentStoreBuilder::new(7).agents(cells).build();
        let config = SimConfig { total_steps: steps, time_step: 1.0, seed: 7, ..SimConfig::default() };
        let mut sim = SimBuilder::new(config, store, rngs)
            .same_behaviors(tissue_behaviors(RadiationParams::default()))
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();
        (sim.agents().uids().to_vec(), sim.agents().cells().exts().to_vec())
    }

    #[test]
    fn every_original_cell_is_irradiated() {
        let (uids, states) = small_run(21);
        for (uid, state) in uids.iter().zip(&states) {
            if uid.0 < 220 {
                assert_eq!(state.dose, 30.0, "cell {uid} missed its dose");
            }
        }
    }

    #[test]
    fn runs_are_reproducible() {
        let (u1, s1) = small_run(40);
        let (u2, s2) = small_run(40);
        assert_eq!(u1, u2);
        assert_eq!(s1, s2);
        assert_eq!(Census::take(&s1), Census::take(&s2));
    }
}
