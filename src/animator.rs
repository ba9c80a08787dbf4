//! Per-frame smoothing of instanced transforms toward the active formation.
//!
//! Each decoration category owns a [`CategoryAnimator`]: its immutable
//! [`ParticleRecord`]s and an [`InstanceBuffer`] holding the rendered
//! position, rotation, scale and color of every instance as separate arrays.
//! Photos get a [`PhotoAnimator`] over the same buffer type.
//!
//! Every frame, for every instance:
//!
//! 1. Pick the target (tree or scatter home), plus any drift the category
//!    adds while scattered.
//! 2. `position = lerp(position, target, α)` per axis.
//! 3. Apply the category's rotation, scale and tint policy.
//!
//! Buffers are sized once when the animator is created and are never
//! reallocated by [`CategoryAnimator::step`]. Nothing here does I/O or
//! returns errors; an out-of-range instance index is a bug and panics.

use crate::color;
use crate::decoration::{Category, ParticleRecord, RotationPolicy, ScalePolicy, Tint};
use crate::state::{FormationMode, UserPhoto};
use crate::Vec3;
use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Quat};

/// Smoothing factor for photos; slower than decorations so they feel heavier.
pub const PHOTO_SMOOTHING: f32 = 0.03;

/// Amplitude of the vertical bob added to photos every frame.
pub const PHOTO_BOB: f32 = 0.005;

/// Photo display scale while floating free.
pub const PHOTO_SCALE_SCATTERED: f32 = 1.5;

/// Photo display scale while hanging on the tree.
pub const PHOTO_SCALE_TREE: f32 = 1.2;

/// Photo display scale for a formation.
#[inline]
pub fn photo_display_scale(mode: FormationMode) -> f32 {
    match mode {
        FormationMode::Scattered => PHOTO_SCALE_SCATTERED,
        FormationMode::TreeShape => PHOTO_SCALE_TREE,
    }
}

/// One instance as uploaded to the GPU.
///
/// Rotation is a quaternion (`xyzw`) built from the Euler angles at pack time.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub position: [f32; 3],
    pub scale: f32,
    pub rotation: [f32; 4],
    pub color: [f32; 4],
}

/// Rendered transforms for one instanced mesh, stored struct-of-arrays.
///
/// Index `i` in every array belongs to instance `i`.
#[derive(Clone, Debug, Default)]
pub struct InstanceBuffer {
    positions: Vec<Vec3>,
    rotations: Vec<Vec3>,
    scales: Vec<f32>,
    colors: Vec<Vec3>,
}

impl InstanceBuffer {
    /// Buffer for `count` instances, all at the origin with unit scale.
    pub fn new(count: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; count],
            rotations: vec![Vec3::ZERO; count],
            scales: vec![1.0; count],
            colors: vec![Vec3::ONE; count],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        self.positions[i]
    }

    /// Euler rotation (XYZ, radians) of instance `i`.
    #[inline]
    pub fn rotation(&self, i: usize) -> Vec3 {
        self.rotations[i]
    }

    #[inline]
    pub fn scale(&self, i: usize) -> f32 {
        self.scales[i]
    }

    #[inline]
    pub fn color(&self, i: usize) -> Vec3 {
        self.colors[i]
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Place instance `i` directly, without smoothing.
    pub fn set(&mut self, i: usize, position: Vec3, rotation: Vec3, scale: f32) {
        self.positions[i] = position;
        self.rotations[i] = rotation;
        self.scales[i] = scale;
    }

    pub fn set_color(&mut self, i: usize, color: Vec3) {
        self.colors[i] = color;
    }

    /// Append one instance. Only photos grow their buffer, once per upload.
    pub fn push(&mut self, position: Vec3, rotation: Vec3, scale: f32, color: Vec3) {
        self.positions.push(position);
        self.rotations.push(rotation);
        self.scales.push(scale);
        self.colors.push(color);
    }

    /// Pack every instance into `out`, which must be at least `len()` long.
    pub fn pack_into(&self, out: &mut [InstanceRaw]) {
        assert!(out.len() >= self.len(), "instance staging buffer too small");
        for (i, raw) in out.iter_mut().take(self.len()).enumerate() {
            let r = self.rotations[i];
            let c = self.colors[i];
            *raw = InstanceRaw {
                position: self.positions[i].to_array(),
                scale: self.scales[i],
                rotation: Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z).to_array(),
                color: [c.x, c.y, c.z, 1.0],
            };
        }
    }
}

/// Drives one decoration category toward the active formation.
#[derive(Clone, Debug)]
pub struct CategoryAnimator {
    category: Category,
    records: Vec<ParticleRecord>,
    buffer: InstanceBuffer,
}

impl CategoryAnimator {
    /// Create an animator with every instance already at its scatter home.
    pub fn new(category: Category, records: Vec<ParticleRecord>) -> Self {
        let buffer = InstanceBuffer::new(records.len());
        let mut animator = Self {
            category,
            records,
            buffer,
        };
        animator.reset();
        animator
    }

    /// Snap every instance to its scatter home with its base scale and
    /// static color. No smoothing.
    pub fn reset(&mut self) {
        let tint = self.category.behavior().tint;
        for (i, record) in self.records.iter().enumerate() {
            self.buffer.set(i, record.scatter, Vec3::ZERO, record.scale);
            self.buffer.set_color(i, tint_color(&tint, i, 0.0));
        }
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    pub fn buffer(&self) -> &InstanceBuffer {
        &self.buffer
    }

    /// Where instance `i` is heading this frame.
    pub fn target_position(&self, i: usize, mode: FormationMode, t: f32) -> Vec3 {
        let behavior = self.category.behavior();
        let mut target = self.records[i].target(mode);

        if mode == FormationMode::Scattered && behavior.float_amplitude > 0.0 {
            let phase = i as f32;
            target.x += (t + phase).sin() * behavior.float_amplitude;
            target.y += (t * 0.5 + phase).cos() * behavior.float_amplitude;
        }

        target
    }

    /// Advance every instance by one frame.
    pub fn step(&mut self, mode: FormationMode, t: f32) {
        let behavior = *self.category.behavior();
        let alpha = behavior.smoothing;

        for i in 0..self.records.len() {
            let target = self.target_position(i, mode, t);
            let record = &self.records[i];
            let buffer = &mut self.buffer;

            buffer.positions[i] = buffer.positions[i].lerp(target, alpha);

            match behavior.rotation {
                RotationPolicy::Tumble { rate } => match mode {
                    FormationMode::Scattered => {
                        buffer.rotations[i].x += rate;
                        buffer.rotations[i].y += rate;
                    }
                    FormationMode::TreeShape => {
                        buffer.rotations[i] = buffer.rotations[i].lerp(record.rest_rotation, alpha);
                    }
                },
                RotationPolicy::SpinY { rate } => buffer.rotations[i].y += rate,
                RotationPolicy::Still => {}
            }

            buffer.scales[i] = match behavior.scale {
                ScalePolicy::Smooth => lerp(buffer.scales[i], record.scale, alpha),
                ScalePolicy::Twinkle { speed, phase } => {
                    let twinkle = 0.5 + 0.5 * (speed * t + phase * i as f32).sin();
                    record.scale * (0.8 + 0.4 * twinkle)
                }
            };

            if behavior.tint.is_animated() {
                buffer.colors[i] = tint_color(&behavior.tint, i, t);
            }
        }
    }
}

/// Color of instance `i` at time `t` under a tint policy.
pub fn tint_color(tint: &Tint, i: usize, t: f32) -> Vec3 {
    match *tint {
        Tint::Uniform(rgb) => color::hex(rgb),
        Tint::Alternate { even, odd } => color::hex(if i % 2 == 0 { even } else { odd }),
        Tint::Shimmer {
            base_hue,
            swing,
            saturation,
            lightness,
        } => color::hsl(base_hue + swing * (t + i as f32).sin(), saturation, lightness),
    }
}

/// Drives the photo billboards.
///
/// Photos have no rotation policy (they always face the camera); only
/// position and scale are smoothed.
#[derive(Clone, Debug, Default)]
pub struct PhotoAnimator {
    buffer: InstanceBuffer,
}

impl PhotoAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &InstanceBuffer {
        &self.buffer
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Seed instances for photos committed since the last call, at their
    /// scatter home with the placement scale.
    pub fn sync(&mut self, photos: &[UserPhoto]) {
        for photo in &photos[self.buffer.len().min(photos.len())..] {
            let placement = &photo.placement;
            self.buffer.push(
                placement.scatter,
                placement.rest_rotation,
                placement.scale,
                Vec3::ONE,
            );
        }
    }

    /// Advance every photo by one frame.
    pub fn step(&mut self, photos: &[UserPhoto], mode: FormationMode, t: f32) {
        self.sync(photos);

        let display_scale = photo_display_scale(mode);
        for (i, photo) in photos.iter().enumerate() {
            let target = photo.placement.target(mode);
            let buffer = &mut self.buffer;

            let mut position = buffer.positions[i].lerp(target, PHOTO_SMOOTHING);
            position.y += (t + i as f32).sin() * PHOTO_BOB;
            buffer.positions[i] = position;
            buffer.scales[i] = lerp(buffer.scales[i], display_scale, PHOTO_SMOOTHING);
        }
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoration::build_dataset_with;
    use crate::geometry::TreeShape;
    use crate::placement::plan_photo;
    use crate::state::PhotoId;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn animator(category: Category, count: usize) -> CategoryAnimator {
        let mut rng = SmallRng::seed_from_u64(99);
        let records = build_dataset_with(&mut rng, count, category, &TreeShape::DECORATIONS);
        CategoryAnimator::new(category, records)
    }

    #[test]
    fn test_seeded_at_scatter() {
        for category in Category::ALL {
            let anim = animator(category, 64);
            for (i, record) in anim.records().iter().enumerate() {
                assert_eq!(anim.buffer().position(i), record.scatter);
                assert_eq!(anim.buffer().scale(i), record.scale);
            }
        }
    }

    #[test]
    fn test_tree_target_when_assembled() {
        let anim = animator(Category::Needle, 32);
        for (i, record) in anim.records().iter().enumerate() {
            assert_eq!(anim.target_position(i, FormationMode::TreeShape, 3.7), record.tree);
        }
    }

    #[test]
    fn test_needle_float_only_when_scattered() {
        let anim = animator(Category::Needle, 8);
        let record = anim.records()[5];
        let target = anim.target_position(5, FormationMode::Scattered, 1.0);
        let offset = target - record.scatter;
        assert!((offset.x - (6.0f32).sin() * 0.1).abs() < 1e-5);
        assert!((offset.y - (5.5f32).cos() * 0.1).abs() < 1e-5);
        assert_eq!(offset.z, 0.0);

        let ornaments = animator(Category::Ornament, 8);
        assert_eq!(
            ornaments.target_position(5, FormationMode::Scattered, 1.0),
            ornaments.records()[5].scatter
        );
    }

    #[test]
    fn test_converges_geometrically() {
        let mut anim = animator(Category::Ornament, 50);
        let initial: Vec<f32> = anim
            .records()
            .iter()
            .map(|r| (r.scatter - r.tree).length())
            .collect();

        let alpha = Category::Ornament.behavior().smoothing;
        for n in 1..=200 {
            anim.step(FormationMode::TreeShape, n as f32 / 60.0);
            let bound = (1.0 - alpha).powi(n);
            for (i, record) in anim.records().iter().enumerate() {
                let dist = (anim.buffer().position(i) - record.tree).length();
                assert!(dist <= bound * initial[i] + 1e-3, "frame {n} instance {i}");
            }
        }
        for (i, record) in anim.records().iter().enumerate() {
            assert!((anim.buffer().position(i) - record.tree).length() < 0.01);
        }
    }

    #[test]
    fn test_needle_tumble_and_settle() {
        let mut anim = animator(Category::Needle, 4);
        for _ in 0..10 {
            anim.step(FormationMode::Scattered, 0.0);
        }
        let r = anim.buffer().rotation(2);
        assert!((r.x - 0.1).abs() < 1e-5);
        assert!((r.y - 0.1).abs() < 1e-5);
        assert_eq!(r.z, 0.0);

        for _ in 0..400 {
            anim.step(FormationMode::TreeShape, 0.0);
        }
        let rest = anim.records()[2].rest_rotation;
        assert!((anim.buffer().rotation(2) - rest).length() < 1e-3);
    }

    #[test]
    fn test_ornament_spin_ignores_mode() {
        let mut anim = animator(Category::Ornament, 4);
        anim.step(FormationMode::Scattered, 0.0);
        anim.step(FormationMode::TreeShape, 0.0);
        let r = anim.buffer().rotation(1);
        assert!((r.y - 0.01).abs() < 1e-6);
        assert_eq!(r.x, 0.0);
    }

    #[test]
    fn test_ornament_colors_alternate() {
        let mut anim = animator(Category::Ornament, 6);
        anim.step(FormationMode::TreeShape, 2.0);
        let gold = color::hex(0xFFD700);
        let red = color::hex(0x880000);
        for i in 0..6 {
            let expected = if i % 2 == 0 { gold } else { red };
            assert_eq!(anim.buffer().color(i), expected);
        }
    }

    #[test]
    fn test_light_twinkle_and_shimmer() {
        let mut anim = animator(Category::Light, 40);
        for frame in 0..120 {
            let t = frame as f32 / 60.0;
            anim.step(FormationMode::Scattered, t);
            for (i, record) in anim.records().iter().enumerate() {
                let s = anim.buffer().scale(i);
                assert!(s >= record.scale * 0.8 - 1e-5 && s <= record.scale * 1.2 + 1e-5);
                let twinkle = 0.5 + 0.5 * (3.0 * t + 10.0 * i as f32).sin();
                assert!((s - record.scale * (0.8 + 0.4 * twinkle)).abs() < 1e-5);

                // Amber to orange: red saturated, blue at the lightness floor.
                let c = anim.buffer().color(i);
                assert!((c.x - 1.0).abs() < 1e-4);
                assert!((c.z - 0.2).abs() < 1e-4);
                assert!(c.y > 0.4 && c.y < 0.8, "green {}", c.y);
            }
        }
        assert_eq!(anim.buffer().rotation(3), Vec3::ZERO);
    }

    #[test]
    fn test_pack_into() {
        let anim = animator(Category::Light, 3);
        let mut raw = vec![InstanceRaw::default(); 4];
        anim.buffer().pack_into(&mut raw);
        assert_eq!(raw[1].position, anim.records()[1].scatter.to_array());
        assert_eq!(raw[1].scale, anim.records()[1].scale);
        assert_eq!(raw[1].rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(raw[3], InstanceRaw::default());
    }

    fn photos(count: usize) -> Vec<UserPhoto> {
        let mut rng = SmallRng::seed_from_u64(17);
        (0..count)
            .map(|i| UserPhoto {
                id: PhotoId::generate(&mut rng),
                image: String::new(),
                placement: plan_photo(&mut rng, i, &TreeShape::PHOTOS),
            })
            .collect()
    }

    #[test]
    fn test_photo_sync_seeds_new_photos() {
        let list = photos(3);
        let mut anim = PhotoAnimator::new();
        anim.sync(&list[..2]);
        assert_eq!(anim.len(), 2);
        anim.sync(&list);
        assert_eq!(anim.len(), 3);
        assert_eq!(anim.buffer().position(2), list[2].placement.scatter);
        assert_eq!(anim.buffer().scale(2), 1.0);
    }

    #[test]
    fn test_photo_heads_to_tree_and_scales() {
        let list = photos(2);
        let mut anim = PhotoAnimator::new();
        for frame in 0..600 {
            anim.step(&list, FormationMode::TreeShape, frame as f32 / 60.0);
        }
        for (i, photo) in list.iter().enumerate() {
            // The bob keeps a small residual oscillation.
            assert!((anim.buffer().position(i) - photo.placement.tree).length() < 0.25);
            assert!((anim.buffer().scale(i) - PHOTO_SCALE_TREE).abs() < 1e-3);
        }
        for frame in 0..600 {
            anim.step(&list, FormationMode::Scattered, frame as f32 / 60.0);
        }
        assert!((anim.buffer().scale(0) - PHOTO_SCALE_SCATTERED).abs() < 1e-3);
        assert_eq!(anim.buffer().rotation(0), Vec3::ZERO);
    }
}
