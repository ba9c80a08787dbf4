//! Decoration categories and their per-particle records.
//!
//! The tree is built from three fixed categories of instanced particles:
//!
//! | Category | Look | Tree jitter | Scale range |
//! |----------|------|-------------|-------------|
//! | [`Category::Needle`] | dark green, fuzzy volume | 0.8 | 0.5 - 1.2 |
//! | [`Category::Ornament`] | gold / deep red baubles | 0.2 | 0.8 - 1.5 |
//! | [`Category::Light`] | twinkling warm fairy lights | 0.2 | 0.5 - 1.0 |
//!
//! Everything that differs between categories lives in a [`Behavior`] table
//! so the animator runs one loop for all of them.

use crate::geometry::{cone_point, sphere_point, TreeShape};
use crate::state::FormationMode;
use crate::Vec3;
use rand::Rng;
use std::f32::consts::PI;

/// A decoration category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Green needle cones that form the tree body.
    Needle,
    /// Metallic baubles.
    Ornament,
    /// Small emissive fairy lights.
    Light,
}

impl Category {
    /// All categories, in draw order.
    pub const ALL: [Category; 3] = [Category::Needle, Category::Ornament, Category::Light];

    /// Static behavior table for this category.
    pub fn behavior(self) -> &'static Behavior {
        match self {
            Category::Needle => &NEEDLE,
            Category::Ornament => &ORNAMENT,
            Category::Light => &LIGHT,
        }
    }

    /// Lowercase name, used in logs and labels.
    pub fn name(self) -> &'static str {
        match self {
            Category::Needle => "needle",
            Category::Ornament => "ornament",
            Category::Light => "light",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How an instance's rotation evolves each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationPolicy {
    /// Tumble on x and y by `rate` rad/frame while scattered; settle toward
    /// the rest rotation while on the tree.
    Tumble { rate: f32 },
    /// Spin on the y axis by `rate` rad/frame regardless of formation.
    SpinY { rate: f32 },
    /// Rotation is never touched.
    Still,
}

/// How an instance's scale evolves each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalePolicy {
    /// Smooth toward the record's fixed scale.
    Smooth,
    /// `scale = base * (0.8 + 0.4 * twinkle)`, with
    /// `twinkle = 0.5 + 0.5 * sin(speed * t + phase * i)`.
    Twinkle { speed: f32, phase: f32 },
}

/// Per-instance color assignment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tint {
    /// One shared color (`0xRRGGBB`), baked into the material.
    Uniform(u32),
    /// Even instances get `even`, odd instances get `odd`. Static for the session.
    Alternate { even: u32, odd: u32 },
    /// `hue = base_hue + swing * sin(t + i)` at fixed saturation and lightness.
    Shimmer {
        base_hue: f32,
        swing: f32,
        saturation: f32,
        lightness: f32,
    },
}

impl Tint {
    /// Whether the color changes from frame to frame.
    pub fn is_animated(&self) -> bool {
        matches!(self, Tint::Shimmer { .. })
    }
}

/// Everything that varies between decoration categories.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Behavior {
    /// Maximum radial jitter around the cone surface.
    pub jitter: f32,
    /// Uniform scale range `[min, max)` drawn once per particle.
    pub scale_range: (f32, f32),
    /// Exponential smoothing factor per frame.
    pub smoothing: f32,
    /// Amplitude of the drift added to the target while scattered.
    pub float_amplitude: f32,
    pub rotation: RotationPolicy,
    pub scale: ScalePolicy,
    pub tint: Tint,
}

/// Default smoothing factor for decorations.
pub const DECORATION_SMOOTHING: f32 = 0.05;

static NEEDLE: Behavior = Behavior {
    jitter: 0.8,
    scale_range: (0.5, 1.2),
    smoothing: DECORATION_SMOOTHING,
    float_amplitude: 0.1,
    rotation: RotationPolicy::Tumble { rate: 0.01 },
    scale: ScalePolicy::Smooth,
    tint: Tint::Uniform(0x0b3d18),
};

static ORNAMENT: Behavior = Behavior {
    jitter: 0.2,
    scale_range: (0.8, 1.5),
    smoothing: DECORATION_SMOOTHING,
    float_amplitude: 0.0,
    rotation: RotationPolicy::SpinY { rate: 0.005 },
    scale: ScalePolicy::Smooth,
    tint: Tint::Alternate {
        even: 0xFFD700,
        odd: 0x880000,
    },
};

static LIGHT: Behavior = Behavior {
    jitter: 0.2,
    scale_range: (0.5, 1.0),
    smoothing: DECORATION_SMOOTHING,
    float_amplitude: 0.0,
    rotation: RotationPolicy::Still,
    scale: ScalePolicy::Twinkle {
        speed: 3.0,
        phase: 10.0,
    },
    tint: Tint::Shimmer {
        base_hue: 0.08,
        swing: 0.02,
        saturation: 1.0,
        lightness: 0.6,
    },
};

/// Maximum vertical noise added to a particle's evenly spaced tree height.
pub const HEIGHT_NOISE: f32 = 0.05;

/// Immutable targets for a single particle.
///
/// Only the rendered transform (held in an
/// [`InstanceBuffer`](crate::animator::InstanceBuffer)) moves; these never do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleRecord {
    /// Home inside the scatter sphere.
    pub scatter: Vec3,
    /// Home near the tree cone.
    pub tree: Vec3,
    /// Fixed base scale.
    pub scale: f32,
    /// Euler rotation (radians) the particle settles to on the tree.
    pub rest_rotation: Vec3,
}

impl ParticleRecord {
    /// Target position for the given formation.
    #[inline]
    pub fn target(&self, mode: FormationMode) -> Vec3 {
        match mode {
            FormationMode::Scattered => self.scatter,
            FormationMode::TreeShape => self.tree,
        }
    }
}

/// Build `count` particle records for a category using the default
/// decoration shape and a thread-local RNG.
pub fn build_dataset(count: usize, category: Category) -> Vec<ParticleRecord> {
    build_dataset_with(&mut rand::thread_rng(), count, category, &TreeShape::DECORATIONS)
}

/// Build `count` particle records for a category.
///
/// Particle `i` climbs the tree at `i / count`, nudged by up to
/// [`HEIGHT_NOISE`] and clamped to `[0, 1]`, so tree heights rise with the
/// index while avoiding a perfect line.
///
/// # Panics
///
/// Panics if `count` is zero.
pub fn build_dataset_with<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    category: Category,
    shape: &TreeShape,
) -> Vec<ParticleRecord> {
    assert!(count > 0, "{category} dataset needs at least one particle");

    let behavior = category.behavior();
    let (min_scale, max_scale) = behavior.scale_range;

    let records: Vec<ParticleRecord> = (0..count)
        .map(|i| {
            let linear = i as f32 / count as f32;
            let height = (linear + rng.gen_range(-HEIGHT_NOISE..HEIGHT_NOISE)).clamp(0.0, 1.0);

            let tree = cone_point(rng, shape.height, shape.base_radius, height, behavior.jitter);
            let scatter = sphere_point(rng, shape.scatter_radius);
            let scale = rng.gen_range(min_scale..max_scale);
            let rest_rotation = Vec3::new(
                rng.gen_range(0.0..PI),
                rng.gen_range(0.0..PI),
                rng.gen_range(0.0..PI),
            );

            ParticleRecord {
                scatter,
                tree,
                scale,
                rest_rotation,
            }
        })
        .collect();

    log::debug!("built {} {} records", records.len(), category);
    records
}
