//! The cell entity: one field list, stored under any [`Backend`].
//!
//! `CellData<B, X>` names every field of a cell once.  The backend decides
//! whether each field is a single value ([`Cell<X>`]), a `Vec` column
//! ([`CellColumns<X>`]), or a borrowed window over part of a column store
//! ([`CellWindow<X>`]).
//!
//! `X` is the application's extension state (radiation dose, cell type, …),
//! stored as one more column so application code never needs a subclass.

use std::fmt;

use cs_core::{AgentId, LocalFrame, Real3, sphere_volume};
use smallvec::SmallVec;

use crate::backend::{Accessor, Backend, Field, Scalar, Single, Soa, SoaSlice};
use crate::{AgentError, AgentKind, AgentResult};

/// Application state carried alongside the built-in cell fields.
pub trait Extension: Field + Default + fmt::Debug {}

impl<T: Field + Default + fmt::Debug> Extension for T {}

/// Inline capacity of a cell's neighbor list.
pub const NEIGHBOR_CAPACITY: usize = 8;

/// Bounded neighbor list; stays inline up to [`NEIGHBOR_CAPACITY`] entries.
pub type Neighbors = SmallVec<[AgentId; NEIGHBOR_CAPACITY]>;

/// Diameter of a cell created without an explicit one.
pub const DEFAULT_DIAMETER: f64 = 10.0;

/// Density of a newly created cell.
pub const DEFAULT_DENSITY: f64 = 1.0;

/// Allowed deviation from unit length and perpendicularity of custom axes.
const AXES_TOLERANCE: f64 = 1e-9;

// ── CellData ──────────────────────────────────────────────────────────────────

/// Every field of a cell, each held in a `B::Column`.
///
/// Fields are crate-private: writes go through [`Geometry`][crate::Geometry]
/// so diameter and volume can never disagree.
pub struct CellData<B: Backend, X: Extension = ()> {
    pub(crate) position:      B::Column<Real3>,
    pub(crate) mass_location: B::Column<Real3>,
    pub(crate) tractor_force: B::Column<Real3>,
    pub(crate) diameter:      B::Column<f64>,
    pub(crate) volume:        B::Column<f64>,
    pub(crate) adherence:     B::Column<f64>,
    pub(crate) density:       B::Column<f64>,
    pub(crate) axes:          B::Column<LocalFrame>,
    pub(crate) neighbors:     B::Column<Neighbors>,
    pub(crate) kind:          B::Column<AgentKind>,
    pub(crate) ext:           B::Column<X>,
}

/// A single, free-standing cell.
pub type Cell<X = ()> = CellData<Scalar, X>;

/// Columnar storage for many cells.
pub type CellColumns<X = ()> = CellData<Soa, X>;

/// A mutable window over a contiguous range of [`CellColumns`].
pub type CellWindow<'a, X = ()> = CellData<SoaSlice<'a>, X>;

// ── Cell (scalar) ─────────────────────────────────────────────────────────────

impl<X: Extension> CellData<Scalar, X> {
    /// A cell of [`DEFAULT_DIAMETER`] at `position`.
    pub fn new(position: Real3) -> Self {
        Self::assemble(position, DEFAULT_DIAMETER, AgentKind::Cell)
    }

    /// A cell of the given diameter at `position`.
    pub fn with_diameter(position: Real3, diameter: f64) -> AgentResult<Self> {
        crate::access::check_diameter(diameter)?;
        Ok(Self::assemble(position, diameter, AgentKind::Cell))
    }

    /// A passive sphere that exerts forces but never divides.
    pub fn inert(position: Real3, diameter: f64) -> AgentResult<Self> {
        crate::access::check_diameter(diameter)?;
        Ok(Self::assemble(position, diameter, AgentKind::Inert))
    }

    /// Replace the extension state.
    pub fn with_ext(mut self, ext: X) -> Self {
        self.ext = Single(ext);
        self
    }

    /// Replace the local frame.  Division displaces along these axes, so a
    /// frame that is not orthonormal is rejected.
    pub fn with_axes(mut self, axes: LocalFrame) -> AgentResult<Self> {
        if !axes.is_orthonormal(AXES_TOLERANCE) {
            return Err(AgentError::NonOrthonormalAxes);
        }
        self.axes = Single(axes);
        Ok(self)
    }

    fn assemble(position: Real3, diameter: f64, kind: AgentKind) -> Self {
        Self {
            position:      Single(position),
            mass_location: Single(position),
            tractor_force: Single(Real3::ZERO),
            diameter:      Single(diameter),
            volume:        Single(sphere_volume(diameter)),
            adherence:     Single(0.0),
            density:       Single(DEFAULT_DENSITY),
            axes:          Single(LocalFrame::GLOBAL),
            neighbors:     Single(Neighbors::new()),
            kind:          Single(kind),
            ext:           Single(X::default()),
        }
    }
}

impl<X: Extension> Clone for CellData<Scalar, X> {
    fn clone(&self) -> Self {
        Self {
            position:      self.position.clone(),
            mass_location: self.mass_location.clone(),
            tractor_force: self.tractor_force.clone(),
            diameter:      self.diameter.clone(),
            volume:        self.volume.clone(),
            adherence:     self.adherence.clone(),
            density:       self.density.clone(),
            axes:          self.axes.clone(),
            neighbors:     self.neighbors.clone(),
            kind:          self.kind.clone(),
            ext:           self.ext.clone(),
        }
    }
}

impl<X: Extension> fmt::Debug for CellData<Scalar, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("kind", &self.kind.0)
            .field("position", &self.position.0)
            .field("diameter", &self.diameter.0)
            .field("volume", &self.volume.0)
            .field("ext", &self.ext.0)
            .finish_non_exhaustive()
    }
}

// ── CellColumns (SoA) ─────────────────────────────────────────────────────────

impl<X: Extension> Default for CellData<Soa, X> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<X: Extension> CellData<Soa, X> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            position:      Vec::with_capacity(n),
            mass_location: Vec::with_capacity(n),
            tractor_force: Vec::with_capacity(n),
            diameter:      Vec::with_capacity(n),
            volume:        Vec::with_capacity(n),
            adherence:     Vec::with_capacity(n),
            density:       Vec::with_capacity(n),
            axes:          Vec::with_capacity(n),
            neighbors:     Vec::with_capacity(n),
            kind:          Vec::with_capacity(n),
            ext:           Vec::with_capacity(n),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.diameter.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diameter.is_empty()
    }

    /// Append one cell to every column.
    pub fn push(&mut self, cell: Cell<X>) {
        self.position.push(cell.position.0);
        self.mass_location.push(cell.mass_location.0);
        self.tractor_force.push(cell.tractor_force.0);
        self.diameter.push(cell.diameter.0);
        self.volume.push(cell.volume.0);
        self.adherence.push(cell.adherence.0);
        self.density.push(cell.density.0);
        self.axes.push(cell.axes.0);
        self.neighbors.push(cell.neighbors.0);
        self.kind.push(cell.kind.0);
        self.ext.push(cell.ext.0);
    }

    /// Copy the cell at `idx` out of the columns.
    pub fn get(&self, idx: usize) -> Cell<X> {
        gather(self, idx)
    }

    /// Keep the cells whose `keep` entry is `true`, preserving order.
    ///
    /// `keep.len()` must equal `self.len()`.
    pub(crate) fn retain_mask(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.len());
        retain_by_mask(&mut self.position, keep);
        retain_by_mask(&mut self.mass_location, keep);
        retain_by_mask(&mut self.tractor_force, keep);
        retain_by_mask(&mut self.diameter, keep);
        retain_by_mask(&mut self.volume, keep);
        retain_by_mask(&mut self.adherence, keep);
        retain_by_mask(&mut self.density, keep);
        retain_by_mask(&mut self.axes, keep);
        retain_by_mask(&mut self.neighbors, keep);
        retain_by_mask(&mut self.kind, keep);
        retain_by_mask(&mut self.ext, keep);
    }

    /// Borrow every column as one mutable window.
    pub fn window(&mut self) -> CellWindow<'_, X> {
        CellData {
            position:      &mut self.position[..],
            mass_location: &mut self.mass_location[..],
            tractor_force: &mut self.tractor_force[..],
            diameter:      &mut self.diameter[..],
            volume:        &mut self.volume[..],
            adherence:     &mut self.adherence[..],
            density:       &mut self.density[..],
            axes:          &mut self.axes[..],
            neighbors:     &mut self.neighbors[..],
            kind:          &mut self.kind[..],
            ext:           &mut self.ext[..],
        }
    }

    // ── Column reads ──────────────────────────────────────────────────────

    pub fn positions(&self) -> &[Real3] {
        &self.position
    }

    pub fn mass_locations(&self) -> &[Real3] {
        &self.mass_location
    }

    pub fn diameters(&self) -> &[f64] {
        &self.diameter
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volume
    }

    pub fn densities(&self) -> &[f64] {
        &self.density
    }

    pub fn kinds(&self) -> &[AgentKind] {
        &self.kind
    }

    pub fn exts(&self) -> &[X] {
        &self.ext
    }
}

/// Copy the cell at `idx` of any layout into a free-standing cell.
pub(crate) fn gather<B: Backend, X: Extension>(c: &CellData<B, X>, idx: usize) -> Cell<X> {
    Cell {
        position:      Single(*c.position.get(idx)),
        mass_location: Single(*c.mass_location.get(idx)),
        tractor_force: Single(*c.tractor_force.get(idx)),
        diameter:      Single(*c.diameter.get(idx)),
        volume:        Single(*c.volume.get(idx)),
        adherence:     Single(*c.adherence.get(idx)),
        density:       Single(*c.density.get(idx)),
        axes:          Single(*c.axes.get(idx)),
        neighbors:     Single(c.neighbors.get(idx).clone()),
        kind:          Single(*c.kind.get(idx)),
        ext:           Single(c.ext.get(idx).clone()),
    }
}

fn retain_by_mask<T>(column: &mut Vec<T>, keep: &[bool]) {
    let mut i = 0;
    column.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
}

// ── CellWindow (SoA slice) ────────────────────────────────────────────────────

impl<'a, X: Extension> CellData<SoaSlice<'a>, X> {
    #[inline]
    pub fn len(&self) -> usize {
        self.diameter.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diameter.is_empty()
    }

    /// Split into `[0, mid)` and `[mid, len)`.
    pub fn split_at(self, mid: usize) -> (Self, Self) {
        let CellData {
            position,
            mass_location,
            tractor_force,
            diameter,
            volume,
            adherence,
            density,
            axes,
            neighbors,
            kind,
            ext,
        } = self;
        let (position_a, position_b) = position.split_at_mut(mid);
        let (mass_a, mass_b) = mass_location.split_at_mut(mid);
        let (tractor_a, tractor_b) = tractor_force.split_at_mut(mid);
        let (diameter_a, diameter_b) = diameter.split_at_mut(mid);
        let (volume_a, volume_b) = volume.split_at_mut(mid);
        let (adherence_a, adherence_b) = adherence.split_at_mut(mid);
        let (density_a, density_b) = density.split_at_mut(mid);
        let (axes_a, axes_b) = axes.split_at_mut(mid);
        let (neighbors_a, neighbors_b) = neighbors.split_at_mut(mid);
        let (kind_a, kind_b) = kind.split_at_mut(mid);
        let (ext_a, ext_b) = ext.split_at_mut(mid);
        (
            CellData {
                position:      position_a,
                mass_location: mass_a,
                tractor_force: tractor_a,
                diameter:      diameter_a,
                volume:        volume_a,
                adherence:     adherence_a,
                density:       density_a,
                axes:          axes_a,
                neighbors:     neighbors_a,
                kind:          kind_a,
                ext:           ext_a,
            },
            CellData {
                position:      position_b,
                mass_location: mass_b,
                tractor_force: tractor_b,
                diameter:      diameter_b,
                volume:        volume_b,
                adherence:     adherence_b,
                density:       density_b,
                axes:          axes_b,
                neighbors:     neighbors_b,
                kind:          kind_b,
                ext:           ext_b,
            },
        )
    }

    /// Cut into consecutive windows of at most `size` cells.
    pub fn into_chunks(self, size: usize) -> Vec<Self> {
        let size = size.max(1);
        let mut chunks = Vec::with_capacity(self.len().div_ceil(size));
        let mut rest = self;
        while rest.len() > size {
            let (head, tail) = rest.split_at(size);
            chunks.push(head);
            rest = tail;
        }
        if !rest.is_empty() {
            chunks.push(rest);
        }
        chunks
    }
}
