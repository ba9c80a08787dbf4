//! Random point samplers for the two formations.
//!
//! Every particle has two homes: a point somewhere inside the scatter sphere
//! and a point near the surface of the tree cone. Both samplers take the RNG
//! explicitly so callers can seed it for reproducible runs.
//!
//! ```ignore
//! use rand::thread_rng;
//! use tinsel::geometry::{cone_point, sphere_point};
//!
//! let mut rng = thread_rng();
//! let cloud = sphere_point(&mut rng, 15.0);
//! let branch = cone_point(&mut rng, 12.0, 4.5, 0.3, 0.8);
//! ```

use crate::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Azimuth advance per unit of normalized height on the cone.
///
/// Points sampled with increasing heights wind around the trunk, which is
/// what gives the tree its visible spiral.
pub const CONE_SPIRAL_TURNS: f32 = 25.0;

/// Dimensions of one tree formation and its scatter cloud.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeShape {
    /// Cone height, centered vertically on the origin.
    pub height: f32,
    /// Cone radius at the base.
    pub base_radius: f32,
    /// Radius of the sphere that holds scattered positions.
    pub scatter_radius: f32,
}

impl TreeShape {
    /// Shape shared by needles, ornaments and lights.
    pub const DECORATIONS: TreeShape = TreeShape {
        height: 12.0,
        base_radius: 4.5,
        scatter_radius: 15.0,
    };

    /// Shape used for photo ornaments: shorter and wider so photos sit just
    /// outside the needle layer, with a tighter scatter cloud.
    pub const PHOTOS: TreeShape = TreeShape {
        height: 10.0,
        base_radius: 5.0,
        scatter_radius: 12.0,
    };
}

impl Default for TreeShape {
    fn default() -> Self {
        Self::DECORATIONS
    }
}

/// Random point inside a sphere of given radius, centered at origin.
///
/// Distribution is uniform throughout the volume: the polar angle is drawn
/// as `acos(2v - 1)` so the poles are not oversampled, and the radius is
/// `radius * cbrt(u)` so the center is not oversampled.
pub fn sphere_point<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let theta = rng.gen_range(0.0..TAU);
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let r = radius * rng.gen::<f32>().cbrt();

    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// Point near the surface of an upright cone centered vertically on the origin.
///
/// * `height` - Total cone height
/// * `base_radius` - Radius at the base
/// * `normalized_height` - 0.0 at the base, 1.0 at the apex
/// * `jitter` - Maximum radial perturbation in either direction
///
/// The vertical coordinate is exact (`normalized_height * height - height / 2`);
/// only the radius and azimuth are randomized.
pub fn cone_point<R: Rng + ?Sized>(
    rng: &mut R,
    height: f32,
    base_radius: f32,
    normalized_height: f32,
    jitter: f32,
) -> Vec3 {
    let radius = cone_radius(base_radius, normalized_height);
    let angle = normalized_height * CONE_SPIRAL_TURNS + rng.gen_range(0.0..TAU);
    let r = if jitter > 0.0 {
        radius + rng.gen_range(-jitter..jitter)
    } else {
        radius
    };

    Vec3::new(
        r * angle.cos(),
        cone_height(height, normalized_height),
        r * angle.sin(),
    )
}

/// Radius of the cone at a normalized height, before jitter.
#[inline]
pub fn cone_radius(base_radius: f32, normalized_height: f32) -> f32 {
    base_radius * (1.0 - normalized_height)
}

/// World-space y of a normalized height on a cone centered on the origin.
#[inline]
pub fn cone_height(height: f32, normalized_height: f32) -> f32 {
    normalized_height * height - height / 2.0
}
