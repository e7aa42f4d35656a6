//! Pairwise sphere–sphere interaction force.
//!
//! Both radii are enlarged by `10 · min(iof₁, iof₂)` (the inter-object
//! coefficient), then:
//!
//! ```text
//! δ = r₁ + r₂ − |c₁ − c₂|          overlap; δ < 0 → no force
//! R = r₁·r₂ / (r₁ + r₂)
//! F = k·δ − γ·√(R·δ)              k = 2 (repulsion), γ = 1 (attraction)
//! force on 1 = F / |c₁ − c₂| · (c₁ − c₂)
//! ```
//!
//! Large overlaps push apart; a thin overlap shell (where `γ·√(Rδ)` wins)
//! pulls together.  Coincident centers have no defined direction and
//! produce zero force.

use cs_core::Real3;

/// Default inter-object coefficient of a sphere.
pub const DEFAULT_INTER_OBJECT_COEFFICIENT: f64 = 0.15;

/// Below this center distance two spheres count as coincident.
const COINCIDENT_DISTANCE: f64 = 1e-8;

/// Coefficients of the sphere force law.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereForce {
    /// Repulsion stiffness `k`.
    pub repulsion:  f64,
    /// Attraction coefficient `γ`.
    pub attraction: f64,
}

impl Default for SphereForce {
    fn default() -> Self {
        Self { repulsion: 2.0, attraction: 1.0 }
    }
}

impl SphereForce {
    /// Force on sphere 1 exerted by sphere 2.
    pub fn between(
        &self,
        center_1:   Real3,
        diameter_1: f64,
        iof_1:      f64,
        center_2:   Real3,
        diameter_2: f64,
        iof_2:      f64,
    ) -> Real3 {
        let additional = 10.0 * iof_1.min(iof_2);
        let r1 = 0.5 * diameter_1 + additional;
        let r2 = 0.5 * diameter_2 + additional;

        let offset = center_1 - center_2;
        let distance = offset.length();
        if distance < COINCIDENT_DISTANCE {
            return Real3::ZERO;
        }

        let delta = r1 + r2 - distance;
        if delta < 0.0 {
            return Real3::ZERO;
        }

        let r = r1 * r2 / (r1 + r2);
        let magnitude = self.repulsion * delta - self.attraction * (r * delta).sqrt();
        offset * (magnitude / distance)
    }
}

/// Force on sphere 1 from sphere 2 under the default law, both spheres
/// sharing inter-object coefficient `iof`.
#[inline]
pub fn force_between_spheres(
    center_1:   Real3,
    diameter_1: f64,
    center_2:   Real3,
    diameter_2: f64,
    iof:        f64,
) -> Real3 {
    SphereForce::default().between(center_1, diameter_1, iof, center_2, diameter_2, iof)
}
