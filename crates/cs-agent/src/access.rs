//! Capability interfaces and the index-based accessor they are written on.
//!
//! Every algorithm on a cell reads and writes through a `(columns, index)`
//! pair supplied by [`CellIndex`].  A free-standing [`Cell<X>`] yields
//! `(self, 0)`; a [`CellSlot`] yields `(store, i)`.  Blanket impls then give
//! both the same [`Geometry`], [`Divisible`], and [`Agent`] behaviour, which
//! is what makes scalar and columnar results identical.
//!
//! Behaviors only ever see `&mut dyn Agent<Ext = X>`; they query
//! [`Agent::kind`] instead of recovering a concrete type.

use cs_core::{AgentId, AgentRng, LocalFrame, Real3, VOLUME_FLOOR, sphere_diameter, sphere_volume};

use crate::backend::{Accessor, Backend, Scalar};
use crate::cell::{Cell, CellData, Extension, NEIGHBOR_CAPACITY};
use crate::division::{Division, absorb_at, divide_at};
use crate::force::{DEFAULT_INTER_OBJECT_COEFFICIENT, force_between_spheres};
use crate::{AgentError, AgentKind, AgentResult};

// ── Validation helpers ────────────────────────────────────────────────────────

pub(crate) fn check_diameter(diameter: f64) -> AgentResult<()> {
    if diameter.is_finite() && diameter > 0.0 && sphere_volume(diameter) >= VOLUME_FLOOR {
        Ok(())
    } else {
        Err(AgentError::InvalidValue { field: "diameter", value: diameter })
    }
}

fn check_volume(volume: f64) -> AgentResult<()> {
    if volume.is_finite() && volume >= VOLUME_FLOOR {
        Ok(())
    } else {
        Err(AgentError::InvalidValue { field: "volume", value: volume })
    }
}

fn check_positive(field: &'static str, value: f64) -> AgentResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AgentError::InvalidValue { field, value })
    }
}

// ── CellIndex ─────────────────────────────────────────────────────────────────

/// Locates one cell inside some [`CellData`].
pub trait CellIndex {
    type Layout: Backend;
    type State: Extension;

    fn columns(&self) -> (&CellData<Self::Layout, Self::State>, usize);
    fn columns_mut(&mut self) -> (&mut CellData<Self::Layout, Self::State>, usize);
}

impl<X: Extension> CellIndex for CellData<Scalar, X> {
    type Layout = Scalar;
    type State = X;

    #[inline(always)]
    fn columns(&self) -> (&CellData<Scalar, X>, usize) {
        (self, 0)
    }

    #[inline(always)]
    fn columns_mut(&mut self) -> (&mut CellData<Scalar, X>, usize) {
        (self, 0)
    }
}

/// One cell of a columnar store, addressed by index.
pub struct CellSlot<'s, B: Backend, X: Extension> {
    data: &'s mut CellData<B, X>,
    idx:  usize,
}

impl<'s, B: Backend, X: Extension> CellSlot<'s, B, X> {
    #[inline]
    pub fn new(data: &'s mut CellData<B, X>, idx: usize) -> Self {
        Self { data, idx }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.idx
    }
}

impl<B: Backend, X: Extension> CellIndex for CellSlot<'_, B, X> {
    type Layout = B;
    type State = X;

    #[inline(always)]
    fn columns(&self) -> (&CellData<B, X>, usize) {
        (&*self.data, self.idx)
    }

    #[inline(always)]
    fn columns_mut(&mut self) -> (&mut CellData<B, X>, usize) {
        (&mut *self.data, self.idx)
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Spatial and physical state of a sphere.
///
/// Setters that could break an invariant return an error and leave the agent
/// untouched.  [`change_volume`][Self::change_volume] clamps at
/// [`VOLUME_FLOOR`] instead.
pub trait Geometry {
    fn position(&self) -> Real3;
    fn set_position(&mut self, position: Real3);

    fn mass_location(&self) -> Real3;
    fn set_mass_location(&mut self, location: Real3);
    /// Shift the mass location by `delta`.
    fn update_mass_location(&mut self, delta: Real3);

    fn tractor_force(&self) -> Real3;
    fn set_tractor_force(&mut self, force: Real3);

    fn diameter(&self) -> f64;
    /// Set the diameter and recompute the volume.
    fn set_diameter(&mut self, diameter: f64) -> AgentResult<()>;

    fn volume(&self) -> f64;
    /// Set the volume and recompute the diameter.
    fn set_volume(&mut self, volume: f64) -> AgentResult<()>;
    /// Grow (or shrink) by `speed * time_step`, never below the floor.
    fn change_volume(&mut self, speed: f64, time_step: f64);

    fn adherence(&self) -> f64;
    fn set_adherence(&mut self, adherence: f64);

    fn density(&self) -> f64;
    fn set_density(&mut self, density: f64) -> AgentResult<()>;

    /// `density * volume`.
    fn mass(&self) -> f64;
    /// Set the mass by adjusting the density; the volume is unchanged.
    fn set_mass(&mut self, mass: f64) -> AgentResult<()>;

    fn axes(&self) -> LocalFrame;

    fn neighbors(&self) -> &[AgentId];
    /// Replace the neighbor list, keeping at most [`NEIGHBOR_CAPACITY`] ids.
    fn set_neighbors(&mut self, neighbors: &[AgentId]);

    /// Force acting on this sphere from a sphere at `other_mass_location`.
    fn force_from(&self, other_mass_location: Real3, other_diameter: f64) -> Real3;
}

impl<T: CellIndex> Geometry for T {
    #[inline]
    fn position(&self) -> Real3 {
        let (c, i) = self.columns();
        *c.position.get(i)
    }

    #[inline]
    fn set_position(&mut self, position: Real3) {
        let (c, i) = self.columns_mut();
        *c.position.get_mut(i) = position;
    }

    #[inline]
    fn mass_location(&self) -> Real3 {
        let (c, i) = self.columns();
        *c.mass_location.get(i)
    }

    #[inline]
    fn set_mass_location(&mut self, location: Real3) {
        let (c, i) = self.columns_mut();
        *c.mass_location.get_mut(i) = location;
    }

    #[inline]
    fn update_mass_location(&mut self, delta: Real3) {
        let (c, i) = self.columns_mut();
        *c.mass_location.get_mut(i) += delta;
    }

    #[inline]
    fn tractor_force(&self) -> Real3 {
        let (c, i) = self.columns();
        *c.tractor_force.get(i)
    }

    #[inline]
    fn set_tractor_force(&mut self, force: Real3) {
        let (c, i) = self.columns_mut();
        *c.tractor_force.get_mut(i) = force;
    }

    #[inline]
    fn diameter(&self) -> f64 {
        let (c, i) = self.columns();
        *c.diameter.get(i)
    }

    fn set_diameter(&mut self, diameter: f64) -> AgentResult<()> {
        check_diameter(diameter)?;
        let (c, i) = self.columns_mut();
        *c.diameter.get_mut(i) = diameter;
        *c.volume.get_mut(i) = sphere_volume(diameter);
        Ok(())
    }

    #[inline]
    fn volume(&self) -> f64 {
        let (c, i) = self.columns();
        *c.volume.get(i)
    }

    fn set_volume(&mut self, volume: f64) -> AgentResult<()> {
        check_volume(volume)?;
        let (c, i) = self.columns_mut();
        *c.volume.get_mut(i) = volume;
        *c.diameter.get_mut(i) = sphere_diameter(volume);
        Ok(())
    }

    fn change_volume(&mut self, speed: f64, time_step: f64) {
        let delta = speed * time_step;
        if !delta.is_finite() {
            return;
        }
        let (c, i) = self.columns_mut();
        let volume = (*c.volume.get(i) + delta).max(VOLUME_FLOOR);
        *c.volume.get_mut(i) = volume;
        *c.diameter.get_mut(i) = sphere_diameter(volume);
    }

    #[inline]
    fn adherence(&self) -> f64 {
        let (c, i) = self.columns();
        *c.adherence.get(i)
    }

    #[inline]
    fn set_adherence(&mut self, adherence: f64) {
        let (c, i) = self.columns_mut();
        *c.adherence.get_mut(i) = adherence;
    }

    #[inline]
    fn density(&self) -> f64 {
        let (c, i) = self.columns();
        *c.density.get(i)
    }

    fn set_density(&mut self, density: f64) -> AgentResult<()> {
        check_positive("density", density)?;
        let (c, i) = self.columns_mut();
        *c.density.get_mut(i) = density;
        Ok(())
    }

    #[inline]
    fn mass(&self) -> f64 {
        self.density() * self.volume()
    }

    fn set_mass(&mut self, mass: f64) -> AgentResult<()> {
        check_positive("mass", mass)?;
        let density = mass / self.volume();
        check_positive("density", density)?;
        let (c, i) = self.columns_mut();
        *c.density.get_mut(i) = density;
        Ok(())
    }

    #[inline]
    fn axes(&self) -> LocalFrame {
        let (c, i) = self.columns();
        *c.axes.get(i)
    }

    #[inline]
    fn neighbors(&self) -> &[AgentId] {
        let (c, i) = self.columns();
        c.neighbors.get(i).as_slice()
    }

    fn set_neighbors(&mut self, neighbors: &[AgentId]) {
        let keep = neighbors.len().min(NEIGHBOR_CAPACITY);
        let (c, i) = self.columns_mut();
        let list = c.neighbors.get_mut(i);
        list.clear();
        list.extend_from_slice(&neighbors[..keep]);
    }

    fn force_from(&self, other_mass_location: Real3, other_diameter: f64) -> Real3 {
        force_between_spheres(
            self.mass_location(),
            self.diameter(),
            other_mass_location,
            other_diameter,
            DEFAULT_INTER_OBJECT_COEFFICIENT,
        )
    }
}

// ── Divisible / Agent ─────────────────────────────────────────────────────────

/// Volume-conserving division into two cells.
pub trait Divisible {
    type Ext: Extension;

    /// Split this agent in place and return the daughter.
    ///
    /// The daughter is not inserted anywhere; that is the caller's job.
    fn divide(&mut self, rng: &mut AgentRng, division: Division) -> AgentResult<Cell<Self::Ext>>;

    /// Take a daughter's volume back, moving to the pair's volume-weighted
    /// centre.  Undoes [`divide`][Self::divide] when neither cell has moved
    /// since.
    fn absorb(&mut self, daughter: &Cell<Self::Ext>);
}

impl<T: CellIndex> Divisible for T {
    type Ext = <T as CellIndex>::State;

    fn divide(&mut self, rng: &mut AgentRng, division: Division) -> AgentResult<Cell<Self::Ext>> {
        let (c, i) = self.columns_mut();
        divide_at(c, i, rng, division)
    }

    fn absorb(&mut self, daughter: &Cell<Self::Ext>) {
        let (c, i) = self.columns_mut();
        absorb_at(c, i, daughter);
    }
}

/// The full capability set a behavior receives.
pub trait Agent: Geometry + Divisible {
    fn kind(&self) -> AgentKind;
    fn ext(&self) -> &Self::Ext;
    fn ext_mut(&mut self) -> &mut Self::Ext;

    /// Copy this agent out as a free-standing cell.
    fn snapshot(&self) -> Cell<Self::Ext>;
}

impl<T: CellIndex> Agent for T {
    #[inline]
    fn kind(&self) -> AgentKind {
        let (c, i) = self.columns();
        *c.kind.get(i)
    }

    #[inline]
    fn ext(&self) -> &<T as CellIndex>::State {
        let (c, i) = self.columns();
        c.ext.get(i)
    }

    #[inline]
    fn ext_mut(&mut self) -> &mut <T as CellIndex>::State {
        let (c, i) = self.columns_mut();
        c.ext.get_mut(i)
    }

    fn snapshot(&self) -> Cell<<T as CellIndex>::State> {
        let (c, i) = self.columns();
        crate::cell::gather(c, i)
    }
}
