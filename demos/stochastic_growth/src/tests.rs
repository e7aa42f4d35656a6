//! Unit tests for the growth demo.

use approx::assert_relative_eq;

use cs_agent::{Cell, Geometry};
use cs_behavior::{Behavior, Environment, GrowthPopulation, SimContext};
use cs_core::{AgentId, AgentRng, AgentUid, Real3, Step};

use crate::mechanics::{AllPairs, Displacement};

fn environment_of(cells: &[Cell]) -> AllPairs {
    let positions: Vec<Real3> = cells.iter().map(|c| c.position()).collect();
    let diameters: Vec<f64> = cells.iter().map(|c| c.diameter()).collect();
    let mut env = AllPairs::default();
    env.update(&positions, &diameters);
    env
}

// ── AllPairs ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod all_pairs_tests {
    use super::*;

    #[test]
    fn reports_agents_within_radius_inclusive() {
        let cells = vec![
            Cell::new(Real3::ZERO),
            Cell::new(Real3::new(5.0, 0.0, 0.0)),
            Cell::new(Real3::new(0.0, 12.0, 0.0)),
        ];
        let env = environment_of(&cells);

        let mut found = Vec::new();
        env.for_each_neighbor(Real3::ZERO, 5.0, &mut |n| found.push(n.id));
        assert_eq!(found, vec![AgentId(0), AgentId(1)]);

        found.clear();
        env.for_each_neighbor(Real3::new(100.0, 0.0, 0.0), 5.0, &mut |n| found.push(n.id));
        assert!(found.is_empty());
    }

    #[test]
    fn update_replaces_previous_snapshot() {
        let mut env = environment_of(&[Cell::new(Real3::ZERO), Cell::new(Real3::ZERO)]);
        env.update(&[Real3::new(1.0, 1.0, 1.0)], &[8.0]);

        let mut found = Vec::new();
        env.for_each_neighbor(Real3::new(1.0, 1.0, 1.0), 0.5, &mut |n| found.push((n.id, n.diameter)));
        assert_eq!(found, vec![(AgentId(0), 8.0)]);
    }
}

// ── Displacement ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod displacement_tests {
    use super::*;

    fn step(cells: &mut [Cell]) {
        let env = environment_of(cells);
        let ctx = SimContext::new(Step(0), 1.0, cells.len(), &env);
        let mut displacement = Displacement::default();
        let mut rng = AgentRng::new(0, AgentUid(0));
        for cell in cells.iter_mut() {
            displacement.run(cell, &ctx, &mut rng).unwrap();
        }
    }

    #[test]
    fn overlapping_cells_move_apart_symmetrically() {
        let mut cells = vec![
            Cell::new(Real3::new(-2.0, 0.0, 0.0)),
            Cell::new(Real3::new(2.0, 0.0, 0.0)),
        ];
        step(&mut cells);

        let left = cells[0].position();
        let right = cells[1].position();
        assert!(left.x < -2.0);
        assert!(right.x > 2.0);
        assert_relative_eq!(left.x, -right.x, epsilon = 1e-12);
        assert_eq!(left.y, 0.0);
        assert_relative_eq!(cells[0].mass_location().x, left.x, epsilon = 1e-12);
    }

    #[test]
    fn movement_is_capped() {
        let mut cells = vec![
            Cell::with_diameter(Real3::new(-0.5, 0.0, 0.0), 40.0).unwrap(),
            Cell::with_diameter(Real3::new(0.5, 0.0, 0.0), 40.0).unwrap(),
        ];
        step(&mut cells);
        let moved = cells[0].position().distance(Real3::new(-0.5, 0.0, 0.0));
        assert_relative_eq!(moved, Displacement::default().max_displacement, epsilon = 1e-9);
    }

    #[test]
    fn isolated_cell_stays_put() {
        let mut cells = vec![
            Cell::new(Real3::ZERO),
            Cell::new(Real3::new(100.0, 0.0, 0.0)),
        ];
        step(&mut cells);
        assert_eq!(cells[0].position(), Real3::ZERO);
        assert_eq!(cells[1].position(), Real3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn copied_to_daughters() {
        assert!(Behavior::<()>::copy_on_divide(&Displacement::default()));
    }
}

// ── End to end ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod growth_tests {
    use super::*;
    use crate::grow;

    #[test]
    fn tissue_grows_and_every_cell_keeps_its_behaviors() {
        let (summary, observer) = grow(GrowthPopulation::fast_growing(), 11, 150).unwrap();
        assert!(summary.agents > 8, "no division in 150 steps");
        assert_eq!(summary.agents, 8 + observer.divisions);
        assert_eq!(summary.with_behavior, summary.agents);
        assert_eq!(observer.peak_agents, summary.agents);
        assert!(summary.min_diameter.unwrap() > 0.0);
        assert!(summary.mean_threshold.unwrap() >= 5.0);
        assert!(summary.mean_growth_rate.unwrap() >= 10.0);
    }

    #[test]
    fn same_seed_same_tissue() {
        let a = grow(GrowthPopulation::default(), 3, 120).unwrap();
        let b = grow(GrowthPopulation::default(), 3, 120).unwrap();
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn invalid_population_rejected() {
        let broken = GrowthPopulation::new(40.0, -1.0, 300.0, 50.0);
        assert!(grow(broken, 1, 10).is_err());
    }
}
