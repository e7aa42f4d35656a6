//! Unit tests for cs-agent.

use cs_core::{AgentRng, AgentUid, Real3};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rng(seed: u64) -> AgentRng {
    AgentRng::new(seed, AgentUid(0))
}

// ── Backend layouts ───────────────────────────────────────────────────────────

#[cfg(test)]
mod backend_tests {
    use crate::backend::{Accessor, Single};

    #[test]
    fn single_holds_one_value() {
        let mut col = Single(3.5_f64);
        assert_eq!(col.len(), 1);
        *col.get_mut(0) += 1.0;
        assert_eq!(*col.get(0), 4.5);
    }

    #[test]
    fn vec_and_slice_columns_agree() {
        let mut v = vec![1.0_f64, 2.0, 3.0];
        assert_eq!(*Accessor::get(&v, 2), 3.0);
        {
            let mut s: &mut [f64] = &mut v[..];
            *Accessor::get_mut(&mut s, 1) = 7.0;
            assert_eq!(Accessor::len(&s), 3);
        }
        assert_eq!(v, vec![1.0, 7.0, 3.0]);
    }
}

// ── Cell fields ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod cell_tests {
    use approx::assert_relative_eq;
    use cs_core::{AgentId, LocalFrame, VOLUME_FLOOR, sphere_volume};

    use super::*;
    use crate::{Agent, AgentError, AgentKind, Cell, Geometry};

    #[test]
    fn defaults() {
        let cell: Cell = Cell::new(Real3::new(1.0, 2.0, 3.0));
        assert_eq!(cell.kind(), AgentKind::Cell);
        assert_eq!(cell.diameter(), 10.0);
        assert_relative_eq!(cell.volume(), sphere_volume(10.0), max_relative = 1e-12);
        assert_eq!(cell.density(), 1.0);
        assert_eq!(cell.adherence(), 0.0);
        assert_eq!(cell.axes(), LocalFrame::GLOBAL);
        assert_eq!(cell.mass_location(), cell.position());
        assert_eq!(cell.tractor_force(), Real3::ZERO);
        assert!(cell.neighbors().is_empty());
    }

    #[test]
    fn diameter_and_volume_stay_consistent() {
        let mut cell: Cell = Cell::new(Real3::ZERO);
        cell.set_diameter(12.0).unwrap();
        assert_relative_eq!(cell.volume(), sphere_volume(12.0), max_relative = 1e-12);
        cell.set_volume(1000.0).unwrap();
        assert_relative_eq!(sphere_volume(cell.diameter()), 1000.0, max_relative = 1e-12);
        cell.change_volume(300.0, 0.01);
        assert_relative_eq!(cell.volume(), 1003.0, max_relative = 1e-12);
        assert_relative_eq!(sphere_volume(cell.diameter()), cell.volume(), max_relative = 1e-12);
    }

    #[test]
    fn invalid_setters_leave_cell_unchanged() {
        let mut cell: Cell = Cell::new(Real3::ZERO);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-4] {
            assert!(matches!(
                cell.set_diameter(bad),
                Err(AgentError::InvalidValue { field: "diameter", .. })
            ));
        }
        assert!(cell.set_volume(VOLUME_FLOOR / 2.0).is_err());
        assert!(cell.set_density(0.0).is_err());
        assert!(cell.set_mass(-3.0).is_err());
        assert_eq!(cell.diameter(), 10.0);
        assert_eq!(cell.density(), 1.0);
        assert!(Cell::<()>::with_diameter(Real3::ZERO, -2.0).is_err());
    }

    #[test]
    fn shrinking_clamps_at_floor() {
        let mut cell: Cell = Cell::new(Real3::ZERO);
        cell.change_volume(-1e9, 1.0);
        assert_eq!(cell.volume(), VOLUME_FLOOR);
        assert!(cell.diameter() > 0.0);
    }

    #[test]
    fn mass_sets_density() {
        let mut cell: Cell = Cell::new(Real3::ZERO);
        let v = cell.volume();
        cell.set_mass(2.0 * v).unwrap();
        assert_relative_eq!(cell.density(), 2.0, max_relative = 1e-12);
        assert_relative_eq!(cell.mass(), 2.0 * v, max_relative = 1e-12);
    }

    #[test]
    fn mass_location_update_leaves_position() {
        let mut cell: Cell = Cell::new(Real3::ZERO);
        cell.update_mass_location(Real3::new(1.0, 0.0, -1.0));
        assert_eq!(cell.mass_location(), Real3::new(1.0, 0.0, -1.0));
        assert_eq!(cell.position(), Real3::ZERO);
    }

    #[test]
    fn neighbor_list_is_bounded() {
        let mut cell: Cell = Cell::new(Real3::ZERO);
        let ids: Vec<AgentId> = (0..12).map(AgentId).collect();
        cell.set_neighbors(&ids);
        assert_eq!(cell.neighbors().len(), crate::cell::NEIGHBOR_CAPACITY);
        assert_eq!(cell.neighbors()[0], AgentId(0));
    }

    #[test]
    fn custom_axes_must_be_orthonormal() {
        let rotated = LocalFrame::new(Real3::Z, Real3::X, Real3::Y);
        let cell: Cell = Cell::new(Real3::ZERO).with_axes(rotated).unwrap();
        assert_eq!(cell.axes(), rotated);

        let stretched = LocalFrame::new(Real3::X * 2.0, Real3::Y, Real3::Z);
        let skewed = LocalFrame::new(Real3::X, Real3::new(1.0, 1.0, 0.0).normalize(), Real3::Z);
        for frame in [stretched, skewed] {
            assert!(matches!(
                Cell::<()>::new(Real3::ZERO).with_axes(frame),
                Err(AgentError::NonOrthonormalAxes)
            ));
        }
    }

    #[test]
    fn extension_state_roundtrips() {
        let mut cell = Cell::new(Real3::ZERO).with_ext(7_u32);
        assert_eq!(*cell.ext(), 7);
        *cell.ext_mut() += 1;
        assert_eq!(*cell.ext(), 8);
    }
}

// ── Division ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod division_tests {
    use std::f64::consts::TAU;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use cs_core::{LocalFrame, Random, SimRng};

    use super::*;
    use crate::{Agent, AgentError, Cell, Divisible, Division, Geometry};

    #[test]
    fn equal_split_of_diameter_twenty() {
        let mut mother: Cell = Cell::with_diameter(Real3::ZERO, 20.0).unwrap();
        let before = mother.volume();
        assert_relative_eq!(before, 4188.79, max_relative = 1e-6);

        let daughter = mother.divide(&mut rng(1), Division::with_ratio(1.0)).unwrap();
        let expected = 20.0 / 2f64.cbrt();
        assert_relative_eq!(mother.diameter(), expected, max_relative = 1e-12);
        assert_relative_eq!(daughter.diameter(), expected, max_relative = 1e-12);
        assert_relative_eq!(mother.diameter(), 15.874, epsilon = 1e-3);
        assert_relative_eq!(mother.volume() + daughter.volume(), before, max_relative = 1e-9);
    }

    #[test]
    fn volume_is_conserved() {
        let mut sim_rng = SimRng::new(5);
        let mut r = rng(5);
        for _ in 0..500 {
            let d = sim_rng.uniform_range(1.0, 50.0);
            let q = sim_rng.uniform_range(0.05, 5.0);
            let mut mother: Cell = Cell::with_diameter(Real3::ZERO, d).unwrap();
            let before = mother.volume();
            let daughter = mother.divide(&mut r, Division::with_ratio(q)).unwrap();
            assert_relative_eq!(mother.volume() + daughter.volume(), before, max_relative = 1e-9);
            assert_relative_eq!(daughter.volume() / mother.volume(), q, max_relative = 1e-9);
        }
    }

    #[test]
    fn displacements_are_opposite_and_sum_to_quarter_radius() {
        let origin = Real3::new(3.0, -4.0, 5.0);
        let mut mother: Cell = Cell::with_diameter(origin, 16.0).unwrap();
        let daughter = mother
            .divide(&mut rng(2), Division::at_angles(1.1, 2.3).ratio(0.7))
            .unwrap();
        let d_mother = mother.position() - origin;
        let d_daughter = daughter.position() - origin;

        assert_relative_eq!(d_mother.length() + d_daughter.length(), 16.0 / 2.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(d_mother.normalize().dot(d_daughter.normalize()), -1.0, epsilon = 1e-12);
        // larger cell moves less
        assert!(mother.volume() > daughter.volume());
        assert!(d_mother.length() < d_daughter.length());
        assert_eq!(mother.mass_location(), mother.position());
        assert_eq!(daughter.mass_location(), daughter.position());
    }

    #[test]
    fn cartesian_axis_separates_along_that_direction() {
        let mut mother: Cell = Cell::with_diameter(Real3::ZERO, 8.0).unwrap();
        let daughter = mother
            .divide(&mut rng(3), Division::along(Real3::new(0.0, 5.0, 0.0)).ratio(1.0))
            .unwrap();
        assert_abs_diff_eq!(daughter.position().y, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(mother.position().y, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(daughter.position().x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(daughter.position().z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn absorbing_the_daughter_undoes_division() {
        let start = Real3::new(3.0, -1.0, 2.0);
        let mut mother: Cell = Cell::with_diameter(start, 24.0).unwrap();
        let before = mother.volume();

        let daughter = mother.divide(&mut rng(9), Division::random()).unwrap();
        assert!(mother.diameter() < 24.0);
        mother.absorb(&daughter);

        assert_relative_eq!(mother.volume(), before, max_relative = 1e-12);
        assert_relative_eq!(mother.diameter(), 24.0, max_relative = 1e-12);
        assert_abs_diff_eq!(mother.mass_location().distance(start), 0.0, epsilon = 1e-12);
        assert_eq!(mother.position(), mother.mass_location());
    }

    #[test]
    fn cartesian_axis_respects_rotated_frame() {
        let frame = LocalFrame::new(Real3::Z, Real3::X, Real3::Y);
        let mut mother: Cell = Cell::with_diameter(Real3::ZERO, 8.0).unwrap().with_axes(frame).unwrap();
        let dir = Real3::new(1.0, 1.0, 0.0).normalize();
        let daughter = mother.divide(&mut rng(3), Division::along(dir).ratio(1.0)).unwrap();
        let moved = daughter.position().normalize();
        assert_abs_diff_eq!(moved.dot(dir), 1.0, epsilon = 1e-12);
        assert_eq!(daughter.axes(), frame);
    }

    #[test]
    fn daughter_inherits_mother_state() {
        let mut mother = Cell::with_diameter(Real3::ZERO, 12.0).unwrap().with_ext(42_i32);
        mother.set_adherence(0.3);
        mother.set_density(1.7).unwrap();
        mother.set_tractor_force(Real3::X);
        mother.set_neighbors(&[cs_core::AgentId(4)]);
        let daughter = mother.divide(&mut rng(4), Division::random()).unwrap();
        assert_eq!(*daughter.ext(), 42);
        assert_eq!(daughter.adherence(), 0.3);
        assert_eq!(daughter.density(), 1.7);
        assert_eq!(daughter.tractor_force(), Real3::ZERO);
        assert!(daughter.neighbors().is_empty());
        assert_eq!(daughter.kind(), mother.kind());
    }

    #[test]
    fn invalid_ratio_leaves_mother_unmutated() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut mother: Cell = Cell::with_diameter(Real3::new(1.0, 1.0, 1.0), 20.0).unwrap();
            let err = mother.divide(&mut rng(6), Division::with_ratio(bad)).unwrap_err();
            assert!(matches!(err, AgentError::InvalidVolumeRatio(_)));
            assert_eq!(mother.diameter(), 20.0);
            assert_eq!(mother.position(), Real3::new(1.0, 1.0, 1.0));
        }
    }

    #[test]
    fn degenerate_axis_is_rejected() {
        let mut mother: Cell = Cell::with_diameter(Real3::ZERO, 20.0).unwrap();
        let err = mother.divide(&mut rng(7), Division::along(Real3::ZERO)).unwrap_err();
        assert!(matches!(err, AgentError::DegenerateAxis));
        assert_eq!(mother.diameter(), 20.0);
    }

    #[test]
    fn tiny_daughter_below_floor_is_rejected() {
        let mut mother: Cell = Cell::with_diameter(Real3::ZERO, 0.02).unwrap();
        let err = mother.divide(&mut rng(8), Division::with_ratio(1e-6)).unwrap_err();
        assert!(matches!(err, AgentError::BelowVolumeFloor { .. }));
        assert_eq!(mother.diameter(), 0.02);
    }

    #[test]
    fn inert_spheres_cannot_divide() {
        let mut sphere: Cell = Cell::inert(Real3::ZERO, 10.0).unwrap();
        let err = sphere.divide(&mut rng(9), Division::random()).unwrap_err();
        assert!(matches!(err, AgentError::Unsupported { .. }));
    }

    #[test]
    fn default_ratio_within_bounds() {
        let mut r = rng(10);
        for _ in 0..1_000 {
            let mut mother: Cell = Cell::with_diameter(Real3::ZERO, 20.0).unwrap();
            let daughter = mother.divide(&mut r, Division::random()).unwrap();
            let q = daughter.volume() / mother.volume();
            assert!((0.9 - 1e-9..1.1 + 1e-9).contains(&q), "ratio {q}");
        }
    }

    /// Kolmogorov–Smirnov statistic of `samples` against `cdf`.
    fn ks_statistic(mut samples: Vec<f64>, cdf: impl Fn(f64) -> f64) -> f64 {
        samples.sort_by(|a, b| a.total_cmp(b));
        let n = samples.len() as f64;
        samples
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let f = cdf(x);
                (f - i as f64 / n).abs().max(((i + 1) as f64 / n - f).abs())
            })
            .fold(0.0, f64::max)
    }

    #[test]
    fn default_axis_is_uniform_on_sphere() {
        let n = 10_000;
        let mut r = rng(2024);
        let mut azimuths = Vec::with_capacity(n);
        let mut polars = Vec::with_capacity(n);
        for _ in 0..n {
            let mut mother: Cell = Cell::with_diameter(Real3::ZERO, 20.0).unwrap();
            let daughter = mother.divide(&mut r, Division::random()).unwrap();
            let dir = (daughter.position() - mother.position()).normalize();
            let mut theta = dir.y.atan2(dir.x);
            if theta < 0.0 {
                theta += TAU;
            }
            azimuths.push(theta);
            polars.push(dir.z.clamp(-1.0, 1.0).acos());
        }

        // α = 0.001 critical value
        let critical = 1.95 / (n as f64).sqrt();
        let d_theta = ks_statistic(azimuths, |t| t / TAU);
        let d_phi = ks_statistic(polars, |p| (1.0 - p.cos()) / 2.0);
        assert!(d_theta < critical, "azimuth KS {d_theta} >= {critical}");
        assert!(d_phi < critical, "polar KS {d_phi} >= {critical}");
    }
}

// ── Layout equivalence ────────────────────────────────────────────────────────

#[cfg(test)]
mod layout_tests {
    use crate::{Agent, AgentStoreBuilder, Cell, Divisible, Division, Geometry};

    use super::*;

    fn sample_cell() -> Cell<u8> {
        let mut c = Cell::with_diameter(Real3::new(1.0, -2.0, 0.5), 17.0)
            .unwrap()
            .with_ext(3_u8);
        c.set_adherence(0.25);
        c
    }

    #[test]
    fn scalar_and_columnar_reads_match() {
        let scalar = sample_cell();
        let (mut store, _rngs) = AgentStoreBuilder::new(0).agent(sample_cell()).build();
        let slot = store.slot(cs_core::AgentId(0)).unwrap();
        assert_eq!(slot.position(), scalar.position());
        assert_eq!(slot.diameter().to_bits(), scalar.diameter().to_bits());
        assert_eq!(slot.volume().to_bits(), scalar.volume().to_bits());
        assert_eq!(slot.adherence(), scalar.adherence());
        assert_eq!(*slot.ext(), *scalar.ext());
        // repeated reads are stable
        assert_eq!(slot.position(), slot.position());
        assert_eq!(slot.diameter().to_bits(), slot.diameter().to_bits());
    }

    #[test]
    fn scalar_and_columnar_division_match() {
        let mut scalar = sample_cell();
        let daughter_a = scalar.divide(&mut rng(77), Division::random()).unwrap();

        let (mut store, _rngs) = AgentStoreBuilder::new(0)
            .agent(Cell::new(Real3::ZERO).with_ext(0_u8))
            .agent(sample_cell())
            .build();
        let mut slot = store.slot(cs_core::AgentId(1)).unwrap();
        let daughter_b = slot.divide(&mut rng(77), Division::random()).unwrap();

        assert_eq!(slot.position(), scalar.position());
        assert_eq!(slot.diameter().to_bits(), scalar.diameter().to_bits());
        assert_eq!(daughter_a.position(), daughter_b.position());
        assert_eq!(daughter_a.volume().to_bits(), daughter_b.volume().to_bits());
        assert_eq!(*daughter_b.ext(), 3);
    }

    #[test]
    fn window_chunks_cover_store_in_order() {
        let (mut store, _rngs) = AgentStoreBuilder::<()>::new(0)
            .agents((0..10).map(|i| Cell::new(Real3::new(i as f64, 0.0, 0.0))))
            .build();
        let chunks = store.window().into_chunks(4);
        assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![4, 4, 2]);

        for mut chunk in chunks {
            for i in 0..chunk.len() {
                let mut slot = crate::CellSlot::new(&mut chunk, i);
                let p = slot.position();
                slot.set_position(p + Real3::Y);
            }
        }
        for (i, p) in store.positions().iter().enumerate() {
            assert_eq!(*p, Real3::new(i as f64, 1.0, 0.0));
        }
    }
}

// ── Force ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod force_tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{Cell, DEFAULT_INTER_OBJECT_COEFFICIENT, Geometry, force_between_spheres};

    #[test]
    fn overlapping_spheres_repel() {
        let a: Cell = Cell::new(Real3::ZERO);
        let f = a.force_from(Real3::new(8.0, 0.0, 0.0), 10.0);
        // r = 6.5 each, δ = 5, R = 3.25, F = 2·5 − √16.25
        let expected = 10.0 - 16.25f64.sqrt();
        assert_relative_eq!(f.x, -expected, max_relative = 1e-12);
        assert_eq!(f.y, 0.0);
        assert_eq!(f.z, 0.0);
    }

    #[test]
    fn distant_spheres_do_not_interact() {
        let a: Cell = Cell::new(Real3::ZERO);
        assert_eq!(a.force_from(Real3::new(13.5, 0.0, 0.0), 10.0), Real3::ZERO);
    }

    #[test]
    fn force_is_antisymmetric() {
        let c1 = Real3::new(0.3, 1.0, -2.0);
        let c2 = Real3::new(4.0, 2.5, 1.0);
        let f12 = force_between_spheres(c1, 9.0, c2, 7.0, DEFAULT_INTER_OBJECT_COEFFICIENT);
        let f21 = force_between_spheres(c2, 7.0, c1, 9.0, DEFAULT_INTER_OBJECT_COEFFICIENT);
        assert_relative_eq!((f12 + f21).length(), 0.0, epsilon = 1e-12);
        assert!(f12.length() > 0.0);
    }

    #[test]
    fn coincident_centers_give_zero() {
        let f = force_between_spheres(Real3::ONE, 10.0, Real3::ONE, 10.0, 0.15);
        assert_eq!(f, Real3::ZERO);
    }

    #[test]
    fn thin_overlap_attracts() {
        // δ = 0.1, R = 3.25: 2·0.1 − √0.325 < 0
        let f = force_between_spheres(Real3::ZERO, 10.0, Real3::new(12.9, 0.0, 0.0), 10.0, 0.15);
        assert!(f.x > 0.0);
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store_tests {
    use cs_core::AgentId;

    use super::*;
    use crate::{AgentStoreBuilder, Cell, Geometry};

    #[test]
    fn uids_follow_insertion_order() {
        let (mut store, mut rngs) = AgentStoreBuilder::<()>::new(1)
            .agents((0..3).map(|_| Cell::new(Real3::ZERO)))
            .build();
        assert_eq!(store.uids(), &[AgentUid(0), AgentUid(1), AgentUid(2)]);
        let uid = store.push(Cell::new(Real3::X));
        rngs.push(uid);
        assert_eq!(uid, AgentUid(3));
        assert_eq!(rngs.len(), 4);
    }

    #[test]
    fn retain_compacts_in_order() {
        let (mut store, mut rngs) = AgentStoreBuilder::<()>::new(1)
            .agents((0..5).map(|i| Cell::new(Real3::new(i as f64, 0.0, 0.0))))
            .build();
        let removed = store.retain(&mut rngs, &[true, false, true, false, true]);
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 3);
        assert_eq!(rngs.len(), 3);
        let xs: Vec<f64> = store.positions().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0]);
        assert_eq!(store.index_of(AgentUid(4)), Some(AgentId(2)));
        assert_eq!(store.index_of(AgentUid(1)), None);
    }

    #[test]
    fn rng_streams_survive_compaction() {
        use cs_core::Random;

        let (mut store, mut rngs) = AgentStoreBuilder::<()>::new(9)
            .agents((0..3).map(|_| Cell::new(Real3::ZERO)))
            .build();
        store.retain(&mut rngs, &[false, true, true]);
        let mut fresh = AgentRng::new(9, AgentUid(2));
        assert_eq!(rngs.get_mut(AgentId(1)).uniform().to_bits(), fresh.uniform().to_bits());
    }

    #[test]
    fn out_of_range_access_is_none() {
        let (mut store, _rngs) = AgentStoreBuilder::<()>::new(0).agent(Cell::new(Real3::ZERO)).build();
        assert!(store.get(AgentId(1)).is_none());
        assert!(store.slot(AgentId(1)).is_none());
        assert_eq!(store.get(AgentId(0)).unwrap().diameter(), 10.0);
    }
}
