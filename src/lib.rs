//! # Tinsel
//!
//! A particle Christmas tree that morphs between a free-floating sphere cloud
//! and an assembled cone, decorated with photo ornaments.
//!
//! Tinsel handles the scene side (sampling, per-frame smoothing, photo
//! placement and the upload pipeline) and leaves drawing to whatever renderer
//! reads the instance buffers. The `tinsel` binary is one such renderer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tinsel::prelude::*;
//! use std::time::Instant;
//!
//! let mut scene = Scene::new(&SceneConfig::default());
//! let mut uploads = UploadQueue::new();
//! let mut clock = FrameClock::new();
//!
//! uploads.submit_file("family.jpg");
//!
//! loop {
//!     let now = Instant::now();
//!     uploads.commit_ready(scene.store_mut(), now);
//!     scene.frame(clock.tick(), now);
//!     // draw scene.decorations() and scene.photo_animator()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Formations
//!
//! Every instance has two homes: a point inside the scatter sphere and a point
//! on the tree cone. [`FormationMode`] selects which one everything heads
//! toward; switching it never teleports anything, instances glide there by
//! exponential smoothing.
//!
//! ### Categories
//!
//! | Category | Default count | Motion | Color |
//! |----------|---------------|--------|-------|
//! | [`Category::Needle`] | 3000 | tumbles, drifts while scattered | dark green |
//! | [`Category::Ornament`] | 150 | spins about Y | gold / red alternating |
//! | [`Category::Light`] | 400 | twinkles | shimmering warm hue |
//!
//! ### Photos
//!
//! Uploaded images are composed into polaroids on a worker thread
//! ([`UploadQueue`]) and committed to the [`TreeStore`]. The insertion index
//! fixes each photo's spot on a spiral around the tree. Adding a photo while
//! scattered schedules an automatic switch to the tree shortly after.

pub mod animator;
pub mod color;
pub mod config;
pub mod decoration;
pub mod error;
pub mod geometry;
pub mod placement;
pub mod polaroid;
pub mod scene;
pub mod state;
pub mod time;
pub mod upload;

pub use animator::{CategoryAnimator, InstanceBuffer, InstanceRaw, PhotoAnimator};
pub use bytemuck;
pub use config::SceneConfig;
pub use decoration::{Category, ParticleRecord};
pub use error::{PolaroidError, UploadError, ViewerError};
pub use geometry::TreeShape;
pub use glam::{Vec2, Vec3, Vec4};
pub use placement::PhotoPlacement;
pub use scene::Scene;
pub use state::{FormationMode, PhotoId, TreeStore, UserPhoto};
pub use time::FrameClock;
pub use upload::{CommittedPhoto, UploadQueue, UploadTicket};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use tinsel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::animator::{CategoryAnimator, InstanceBuffer, InstanceRaw, PhotoAnimator};
    pub use crate::config::SceneConfig;
    pub use crate::decoration::Category;
    pub use crate::geometry::TreeShape;
    pub use crate::polaroid::{process_file, process_upload, PolaroidLayout};
    pub use crate::scene::Scene;
    pub use crate::state::{FormationMode, TreeStore, UserPhoto};
    pub use crate::time::FrameClock;
    pub use crate::upload::UploadQueue;
    pub use crate::{Vec2, Vec3, Vec4};
}
