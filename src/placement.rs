//! Where uploaded photos hang.
//!
//! A photo's tree position is a pure function of its insertion index:
//! photos cycle through four height bands in the middle of the tree and step
//! 120° around the trunk each time, floating a little outside the needles.
//! Only the scatter position is random, and it is drawn exactly once when the
//! photo is committed.

use crate::geometry::{cone_height, cone_radius, sphere_point, TreeShape};
use crate::state::FormationMode;
use crate::Vec3;
use rand::Rng;
use std::f32::consts::PI;

/// Lowest normalized height a photo may hang at.
pub const BAND_BASE: f32 = 0.2;
/// Height step between consecutive photos.
pub const BAND_STEP: f32 = 0.15;
/// Width of the band of heights photos cycle through.
pub const BAND_SPAN: f32 = 0.6;
/// Number of distinct heights in the cycle (`BAND_SPAN / BAND_STEP`).
pub const BAND_COUNT: usize = 4;
/// Angular step between consecutive photos.
pub const ANGLE_STEP: f32 = PI / 1.5;
/// Distance photos float outside the cone surface.
pub const SURFACE_OFFSET: f32 = 0.8;

/// Fixed targets for one photo, computed once at upload time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhotoPlacement {
    /// Home inside the photo scatter sphere.
    pub scatter: Vec3,
    /// Home on the photo spiral around the tree.
    pub tree: Vec3,
    /// Always 1.0; the animator applies the formation's display scale on top.
    pub scale: f32,
    /// Always zero; photos are billboards.
    pub rest_rotation: Vec3,
}

impl PhotoPlacement {
    /// Target position for the given formation.
    #[inline]
    pub fn target(&self, mode: FormationMode) -> Vec3 {
        match mode {
            FormationMode::Scattered => self.scatter,
            FormationMode::TreeShape => self.tree,
        }
    }
}

/// Normalized height of the band for the photo at `index`.
///
/// Equal to `BAND_BASE + (index * BAND_STEP) mod BAND_SPAN`, evaluated on the
/// integer side so float rounding can never produce a fifth band.
pub fn band_height(index: usize) -> f32 {
    BAND_BASE + (index % BAND_COUNT) as f32 * BAND_STEP
}

/// Tree position for the photo at `index`.
///
/// Unlike [`cone_point`](crate::geometry::cone_point) this has no random
/// azimuth: the angle is `index * ANGLE_STEP` and the radius is pushed
/// [`SURFACE_OFFSET`] outside the cone, so photos are evenly spaced and never
/// sink into the needle layer.
pub fn tree_position(index: usize, shape: &TreeShape) -> Vec3 {
    let height = band_height(index);
    let angle = index as f32 * ANGLE_STEP;
    let radius = cone_radius(shape.base_radius, height) + SURFACE_OFFSET;

    Vec3::new(
        radius * angle.cos(),
        cone_height(shape.height, height),
        radius * angle.sin(),
    )
}

/// Plan the placement for the photo at `index`.
pub fn plan_photo<R: Rng + ?Sized>(rng: &mut R, index: usize, shape: &TreeShape) -> PhotoPlacement {
    PhotoPlacement {
        scatter: sphere_point(rng, shape.scatter_radius),
        tree: tree_position(index, shape),
        scale: 1.0,
        rest_rotation: Vec3::ZERO,
    }
}
