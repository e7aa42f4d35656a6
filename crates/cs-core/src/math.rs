//! Vector math shared by every crate: 3D points, sphere geometry, and the
//! per-agent local coordinate frame.
//!
//! # Sphere geometry
//!
//! Agents are spheres.  Volume and diameter are tied together by
//!
//!   V = π/6 · d³        d = ∛(6V/π)
//!
//! and no agent may shrink below [`VOLUME_FLOOR`] (the volume of a sphere of
//! diameter 0.01).
//!
//! # Angles
//!
//! Directions in an agent's local frame are written as a polar angle `phi`
//! (measured from the local z axis) and an azimuth `theta` (measured from the
//! local x axis in the local xy plane):
//!
//!   local = (cos θ · sin φ,  sin θ · sin φ,  cos φ)

use std::f64::consts::PI;

/// Double-precision 3D vector used for positions, forces, and axes.
pub type Real3 = glam::DVec3;

/// Smallest volume an agent may have.
pub const VOLUME_FLOOR: f64 = 5.235_987_7e-7;

/// Below this length a direction is considered degenerate.
const DEGENERATE_LENGTH: f64 = 1e-12;

/// Volume of a sphere with the given diameter.
#[inline]
pub fn sphere_volume(diameter: f64) -> f64 {
    PI / 6.0 * diameter * diameter * diameter
}

/// Diameter of a sphere with the given volume.
#[inline]
pub fn sphere_diameter(volume: f64) -> f64 {
    (6.0 * volume / PI).cbrt()
}

/// Unit vector for the angle pair `(phi, theta)` in local coordinates.
#[inline]
pub fn unit_from_angles(phi: f64, theta: f64) -> Real3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Real3::new(cos_theta * sin_phi, sin_theta * sin_phi, cos_phi)
}

// ── LocalFrame ────────────────────────────────────────────────────────────────

/// Three orthonormal axes attached to an agent.
///
/// Frames are only ever copied from a parent or left at the global basis, so
/// orthonormality never has to be re-established.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalFrame {
    pub x: Real3,
    pub y: Real3,
    pub z: Real3,
}

impl Default for LocalFrame {
    fn default() -> Self {
        Self::GLOBAL
    }
}

impl LocalFrame {
    /// The global basis.
    pub const GLOBAL: LocalFrame = LocalFrame {
        x: Real3::X,
        y: Real3::Y,
        z: Real3::Z,
    };

    pub fn new(x: Real3, y: Real3, z: Real3) -> Self {
        Self { x, y, z }
    }

    /// Express a local-frame vector in global coordinates.
    #[inline]
    pub fn to_global(&self, local: Real3) -> Real3 {
        self.x * local.x + self.y * local.y + self.z * local.z
    }

    /// Express a global vector in this frame's coordinates.
    #[inline]
    pub fn to_local(&self, global: Real3) -> Real3 {
        Real3::new(global.dot(self.x), global.dot(self.y), global.dot(self.z))
    }

    /// Global unit direction for the local angle pair `(phi, theta)`.
    #[inline]
    pub fn direction(&self, phi: f64, theta: f64) -> Real3 {
        self.to_global(unit_from_angles(phi, theta))
    }

    /// Unit-length, mutually perpendicular axes, each within `tolerance`.
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let unit = [self.x, self.y, self.z].iter().all(|a| (a.length_squared() - 1.0).abs() <= tolerance);
        let perpendicular = self.x.dot(self.y).abs() <= tolerance
            && self.y.dot(self.z).abs() <= tolerance
            && self.z.dot(self.x).abs() <= tolerance;
        unit && perpendicular
    }

    /// Local `(phi, theta)` of a global direction.
    ///
    /// Returns `None` for a zero-length or non-finite vector.
    pub fn polar_angles(&self, global: Real3) -> Option<(f64, f64)> {
        if !global.is_finite() || global.length() < DEGENERATE_LENGTH {
            return None;
        }
        let local = self.to_local(global);
        let phi = (local.x * local.x + local.y * local.y).sqrt().atan2(local.z);
        let theta = local.y.atan2(local.x);
        Some((phi, theta))
    }
}
