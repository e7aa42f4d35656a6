//! Volume-conserving division.
//!
//! # Algorithm
//!
//! Given the mother's diameter `d`, a volume ratio `q` (daughter over
//! remaining mother) and a direction in the mother's local frame:
//!
//! ```text
//! radius = d / 2
//! r1     = radius / ∛(1 + q)          mother after division
//! r2     = radius / ∛(1 + 1/q)        daughter
//! total  = radius / 4                 distance between the two new centers
//! d2     = total / (q + 1)            daughter's shift along +dir
//! d1     = total - d2                 mother's shift along -dir
//! ```
//!
//! `r1³ + r2³ = radius³`, so volume is conserved up to rounding, and the
//! larger cell moves the shorter distance.
//!
//! # Axis parameterisation
//!
//! The canonical form is the local angle pair `(phi, theta)`.  A Cartesian
//! direction given in global coordinates is converted once, by projecting it
//! onto the mother's axes, and then goes through the same path.
//!
//! Unspecified parameters are drawn from the caller's RNG in this order:
//! volume ratio `~ U[0.9, 1.1)`, then `theta = 2π·u`, then
//! `phi = acos(2u - 1)` (uniform on the sphere).

use std::f64::consts::TAU;

use cs_core::{AgentRng, Random, Real3, VOLUME_FLOOR, sphere_diameter, sphere_volume};
use tracing::trace;

use crate::backend::{Accessor, Backend, Single};
use crate::cell::{Cell, CellData, Extension, Neighbors};
use crate::kind::Capability;
use crate::{AgentError, AgentResult};

/// Lower bound of the default volume ratio.
pub const DEFAULT_RATIO_MIN: f64 = 0.9;
/// Upper bound of the default volume ratio.
pub const DEFAULT_RATIO_MAX: f64 = 1.1;

/// Direction along which mother and daughter separate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DivisionAxis {
    /// Polar angle `phi` and azimuth `theta` in the mother's local frame.
    Angles { phi: f64, theta: f64 },
    /// A global Cartesian direction; need not be normalised.
    Direction(Real3),
}

/// Parameters of one division.  `None` fields are drawn at random.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Division {
    pub volume_ratio: Option<f64>,
    pub axis:         Option<DivisionAxis>,
}

impl Division {
    /// Random ratio, random axis.
    pub fn random() -> Self {
        Self::default()
    }

    /// Fixed volume ratio, random axis.
    pub fn with_ratio(volume_ratio: f64) -> Self {
        Self { volume_ratio: Some(volume_ratio), axis: None }
    }

    /// Random ratio, separation along a global direction.
    pub fn along(direction: Real3) -> Self {
        Self { volume_ratio: None, axis: Some(DivisionAxis::Direction(direction)) }
    }

    /// Random ratio, separation along local angles.
    pub fn at_angles(phi: f64, theta: f64) -> Self {
        Self { volume_ratio: None, axis: Some(DivisionAxis::Angles { phi, theta }) }
    }

    /// Override the volume ratio.
    pub fn ratio(mut self, volume_ratio: f64) -> Self {
        self.volume_ratio = Some(volume_ratio);
        self
    }
}

/// Divide the cell at `idx` of `c` in place and return the daughter.
///
/// On error the mother is untouched (the RNG may have advanced).
pub(crate) fn divide_at<B: Backend, X: Extension>(
    c:        &mut CellData<B, X>,
    idx:      usize,
    rng:      &mut AgentRng,
    division: Division,
) -> AgentResult<Cell<X>> {
    let kind = *c.kind.get(idx);
    if !kind.supports(Capability::Division) {
        return Err(AgentError::Unsupported { kind, capability: Capability::Division });
    }

    // ── Resolve parameters ────────────────────────────────────────────────
    let ratio = match division.volume_ratio {
        Some(q) => q,
        None => rng.uniform_range(DEFAULT_RATIO_MIN, DEFAULT_RATIO_MAX),
    };
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(AgentError::InvalidVolumeRatio(ratio));
    }

    let axes = *c.axes.get(idx);
    let (phi, theta) = match division.axis {
        Some(DivisionAxis::Angles { phi, theta }) => {
            if !(phi.is_finite() && theta.is_finite()) {
                return Err(AgentError::DegenerateAxis);
            }
            (phi, theta)
        }
        Some(DivisionAxis::Direction(v)) => axes.polar_angles(v).ok_or(AgentError::DegenerateAxis)?,
        None => {
            let theta = TAU * rng.uniform();
            let phi = (2.0 * rng.uniform() - 1.0).acos();
            (phi, theta)
        }
    };

    // ── Radii and displacements ───────────────────────────────────────────
    let radius = 0.5 * *c.diameter.get(idx);
    let r1 = radius / (1.0 + ratio).cbrt();
    let r2 = radius / (1.0 + 1.0 / ratio).cbrt();
    let (mother_volume, daughter_volume) = (sphere_volume(2.0 * r1), sphere_volume(2.0 * r2));
    if mother_volume < VOLUME_FLOOR || daughter_volume < VOLUME_FLOOR {
        return Err(AgentError::BelowVolumeFloor {
            volume: mother_volume.min(daughter_volume),
        });
    }

    let dir = axes.direction(phi, theta);
    let total = radius / 4.0;
    let d2 = total / (ratio + 1.0);
    let d1 = total - d2;
    let origin = *c.mass_location.get(idx);

    // ── Daughter ──────────────────────────────────────────────────────────
    let daughter_center = origin + dir * d2;
    let daughter = Cell {
        position:      Single(daughter_center),
        mass_location: Single(daughter_center),
        tractor_force: Single(Real3::ZERO),
        diameter:      Single(2.0 * r2),
        volume:        Single(daughter_volume),
        adherence:     Single(*c.adherence.get(idx)),
        density:       Single(*c.density.get(idx)),
        axes:          Single(axes),
        neighbors:     Single(Neighbors::new()),
        kind:          Single(kind),
        ext:           Single(c.ext.get(idx).clone()),
    };

    // ── Mother ────────────────────────────────────────────────────────────
    let mother_center = origin - dir * d1;
    *c.diameter.get_mut(idx) = 2.0 * r1;
    *c.volume.get_mut(idx) = mother_volume;
    *c.mass_location.get_mut(idx) = mother_center;
    *c.position.get_mut(idx) = mother_center;

    trace!(ratio, phi, theta, r1, r2, "divided");
    Ok(daughter)
}

/// Fold `daughter` back into the cell at `idx` of `c`.
///
/// Volumes add and the mass location moves to the volume-weighted centre of
/// the two.  Division keeps that centre at the mother's old mass location,
/// so absorbing an unmoved daughter restores the mother exactly.
pub(crate) fn absorb_at<B: Backend, X: Extension>(c: &mut CellData<B, X>, idx: usize, daughter: &Cell<X>) {
    let (v1, v2) = (*c.volume.get(idx), *daughter.volume.get(0));
    let volume = v1 + v2;
    let center = (*c.mass_location.get(idx) * v1 + *daughter.mass_location.get(0) * v2) / volume;

    *c.volume.get_mut(idx) = volume;
    *c.diameter.get_mut(idx) = sphere_diameter(volume);
    *c.mass_location.get_mut(idx) = center;
    *c.position.get_mut(idx) = center;
    trace!(v1, v2, "absorbed daughter");
}
