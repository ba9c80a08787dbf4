//! The whole tree: decorations, photos and session state.

use crate::animator::{CategoryAnimator, PhotoAnimator};
use crate::config::SceneConfig;
use crate::decoration::{build_dataset_with, Category};
use crate::state::{FormationMode, TreeStore, UserPhoto};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Instant;

/// Everything the renderer draws, advanced once per frame.
///
/// ```ignore
/// let mut scene = Scene::new(&SceneConfig::default());
/// let mut clock = FrameClock::new();
/// loop {
///     scene.frame(clock.tick(), Instant::now());
///     renderer.draw(&scene);
/// }
/// ```
#[derive(Debug)]
pub struct Scene {
    store: TreeStore,
    /// One animator per category, in [`Category::ALL`] order.
    decorations: Vec<CategoryAnimator>,
    photos: PhotoAnimator,
}

impl Scene {
    /// Build every dataset and seed every instance at its scatter home.
    pub fn new(config: &SceneConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let decorations = Category::ALL
            .iter()
            .map(|&category| {
                let records = build_dataset_with(
                    &mut rng,
                    config.count(category),
                    category,
                    &config.decoration_shape,
                );
                CategoryAnimator::new(category, records)
            })
            .collect();

        let store = match config.seed {
            Some(seed) => TreeStore::seeded(seed.wrapping_add(1)),
            None => TreeStore::new(),
        }
        .with_auto_delay(config.auto_assemble_delay)
        .with_photo_shape(config.photo_shape);

        Self {
            store,
            decorations,
            photos: PhotoAnimator::new(),
        }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TreeStore {
        &mut self.store
    }

    #[inline]
    pub fn mode(&self) -> FormationMode {
        self.store.mode()
    }

    pub fn set_mode(&mut self, mode: FormationMode) {
        self.store.set_mode(mode);
    }

    pub fn toggle_mode(&mut self) {
        self.store.toggle_mode();
    }

    /// Commit an encoded photo. See [`TreeStore::add_photo`].
    pub fn add_photo(&mut self, image: String, now: Instant) -> &UserPhoto {
        self.store.add_photo(image, now)
    }

    pub fn photos(&self) -> &[UserPhoto] {
        self.store.photos()
    }

    /// Animator for one decoration category.
    pub fn animator(&self, category: Category) -> &CategoryAnimator {
        let index = Category::ALL
            .iter()
            .position(|&c| c == category)
            .unwrap_or_else(|| unreachable!("every category has an animator"));
        &self.decorations[index]
    }

    pub fn decorations(&self) -> &[CategoryAnimator] {
        &self.decorations
    }

    pub fn photo_animator(&self) -> &PhotoAnimator {
        &self.photos
    }

    /// Advance one frame: fire a due auto-assemble, then step every animator
    /// toward the active formation.
    ///
    /// * `t` - animation time in seconds (drives shimmer, twinkle and drift)
    /// * `now` - wall-clock instant (drives the auto-assemble timer)
    pub fn frame(&mut self, t: f32, now: Instant) {
        self.store.tick(now);
        let mode = self.store.mode();

        for animator in &mut self.decorations {
            animator.step(mode, t);
        }
        self.photos.step(self.store.photos(), mode, t);
    }

    /// One-line summary for a title bar or status line.
    pub fn status_line(&self) -> String {
        let mode = self.mode();
        format!(
            "[{}] {} | Add Memory ({})",
            mode.action_label(),
            mode.status_label(),
            self.store.photo_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn small() -> SceneConfig {
        SceneConfig::default()
            .with_needle_count(30)
            .with_ornament_count(6)
            .with_light_count(10)
            .with_seed(1)
    }

    #[test]
    fn test_counts_per_category() {
        let scene = Scene::new(&small());
        assert_eq!(scene.animator(Category::Needle).len(), 30);
        assert_eq!(scene.animator(Category::Ornament).len(), 6);
        assert_eq!(scene.animator(Category::Light).len(), 10);
        assert_eq!(scene.animator(Category::Light).category(), Category::Light);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = Scene::new(&small());
        let b = Scene::new(&small());
        assert_eq!(
            a.animator(Category::Needle).records(),
            b.animator(Category::Needle).records()
        );
    }

    #[test]
    fn test_frame_steps_photos() {
        let mut scene = Scene::new(&small());
        let now = Instant::now();
        scene.add_photo("data:image/jpeg;base64,AAAA".into(), now);
        scene.frame(0.0, now);
        assert_eq!(scene.photo_animator().len(), 1);
    }

    #[test]
    fn test_repeated_set_mode_is_continuous() {
        let mut a = Scene::new(&small());
        let mut b = Scene::new(&small());
        let now = Instant::now();
        for scene in [&mut a, &mut b] {
            scene.add_photo("data:image/jpeg;base64,AAAA".into(), now);
        }

        // Re-assert whatever mode is active, across the auto-assemble.
        let mut t = 0.0f32;
        for _ in 0..60 {
            t += 1.0 / 60.0;
            let at = now + Duration::from_secs_f32(t);
            a.set_mode(a.mode());
            a.frame(t, at);
            b.frame(t, at);
        }

        for (x, y) in a.decorations().iter().zip(b.decorations()) {
            assert_eq!(x.buffer().positions(), y.buffer().positions());
            assert_eq!(x.buffer().scales(), y.buffer().scales());
            assert_eq!(x.buffer().colors(), y.buffer().colors());
        }
        assert_eq!(
            a.photo_animator().buffer().positions(),
            b.photo_animator().buffer().positions()
        );
        assert_eq!(a.mode(), FormationMode::TreeShape);
    }

    #[test]
    fn test_status_line() {
        let mut scene = Scene::new(&small());
        assert_eq!(scene.status_line(), "[ASSEMBLE TREE] Floating Zero-G | Add Memory (0)");
        scene.toggle_mode();
        assert_eq!(scene.status_line(), "[SCATTER ELEMENTS] Structure Formed | Add Memory (0)");
    }
}
