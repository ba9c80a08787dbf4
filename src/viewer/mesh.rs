//! Procedural meshes for the instanced decorations and the photo quad.
//!
//! Meshes are unindexed triangle lists in local space. Instance transforms
//! (position, quaternion, uniform scale) are applied in the vertex shader.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use tinsel::Category;

/// Needle cone: radius, height, radial segments.
const NEEDLE_CONE: (f32, f32, u32) = (0.1, 0.4, 4);
/// Ornament sphere: radius, latitude and longitude divisions.
const ORNAMENT_SPHERE: (f32, u32, u32) = (0.25, 16, 24);
const LIGHT_SPHERE: (f32, u32, u32) = (0.05, 6, 8);

/// Photo quad size in world units (polaroid aspect).
pub const PHOTO_SIZE: [f32; 2] = [1.5, 1.8];

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.normalize_or_zero().to_array(),
        }
    }
}

/// Corner of the photo quad in camera-aligned units, with its texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    pub corner: [f32; 2],
    pub uv: [f32; 2],
}

/// Mesh used for every instance of a category.
pub fn category_mesh(category: Category) -> Vec<MeshVertex> {
    match category {
        Category::Needle => {
            let (radius, height, segments) = NEEDLE_CONE;
            cone(radius, height, segments)
        }
        Category::Ornament => {
            let (radius, lat, lon) = ORNAMENT_SPHERE;
            sphere(radius, lat, lon)
        }
        Category::Light => {
            let (radius, lat, lon) = LIGHT_SPHERE;
            sphere(radius, lat, lon)
        }
    }
}

/// Two triangles covering a [`PHOTO_SIZE`] rectangle centered on the origin.
pub fn photo_quad() -> [QuadVertex; 6] {
    let [w, h] = PHOTO_SIZE;
    let c = |x: f32, y: f32| QuadVertex {
        corner: [x * w, y * h],
        uv: [x + 0.5, 0.5 - y],
    };
    [
        c(-0.5, -0.5),
        c(0.5, -0.5),
        c(0.5, 0.5),
        c(-0.5, -0.5),
        c(0.5, 0.5),
        c(-0.5, 0.5),
    ]
}

/// Cone along +Y, centered on half its height, apex up.
pub fn cone(radius: f32, height: f32, segments: u32) -> Vec<MeshVertex> {
    let half = height * 0.5;
    let apex = Vec3::new(0.0, half, 0.0);
    let base_center = Vec3::new(0.0, -half, 0.0);
    let slope = radius / height;

    let rim = |k: u32| {
        let angle = k as f32 / segments as f32 * TAU;
        let (s, c) = angle.sin_cos();
        (Vec3::new(radius * s, -half, radius * c), Vec3::new(s, slope, c))
    };

    let mut vertices = Vec::with_capacity(segments as usize * 6);
    for k in 0..segments {
        let (a, na) = rim(k);
        let (b, nb) = rim(k + 1);

        vertices.push(MeshVertex::new(a, na));
        vertices.push(MeshVertex::new(b, nb));
        vertices.push(MeshVertex::new(apex, na + nb));

        vertices.push(MeshVertex::new(base_center, Vec3::NEG_Y));
        vertices.push(MeshVertex::new(b, Vec3::NEG_Y));
        vertices.push(MeshVertex::new(a, Vec3::NEG_Y));
    }
    vertices
}

/// UV sphere centered on the origin.
pub fn sphere(radius: f32, lat_divs: u32, lon_divs: u32) -> Vec<MeshVertex> {
    let point = |lat: u32, lon: u32| {
        let theta = lat as f32 / lat_divs as f32 * PI;
        let phi = lon as f32 / lon_divs as f32 * TAU;
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        let normal = Vec3::new(st * sp, ct, st * cp);
        MeshVertex::new(normal * radius, normal)
    };

    let mut vertices = Vec::with_capacity((lat_divs * lon_divs * 6) as usize);
    for lat in 0..lat_divs {
        for lon in 0..lon_divs {
            let a = point(lat, lon);
            let b = point(lat + 1, lon);
            let c = point(lat + 1, lon + 1);
            let d = point(lat, lon + 1);
            vertices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    vertices
}
