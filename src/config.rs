//! Scene configuration.

use crate::decoration::Category;
use crate::geometry::TreeShape;
use crate::state::AUTO_ASSEMBLE_DELAY;
use std::time::Duration;

/// Instance counts, tree dimensions and timing for a [`Scene`](crate::Scene).
///
/// # Example
///
/// ```ignore
/// let config = SceneConfig::default()
///     .with_needle_count(5_000)
///     .with_seed(7);
/// let scene = Scene::new(&config);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub needle_count: usize,
    pub ornament_count: usize,
    pub light_count: usize,
    /// Shape shared by all decoration categories.
    pub decoration_shape: TreeShape,
    /// Shape photo placements are planned against.
    pub photo_shape: TreeShape,
    /// Delay between an upload and the automatic switch to the tree.
    pub auto_assemble_delay: Duration,
    /// Fixed RNG seed for datasets, photo ids and photo scatter positions.
    /// `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            needle_count: 3000,
            ornament_count: 150,
            light_count: 400,
            decoration_shape: TreeShape::DECORATIONS,
            photo_shape: TreeShape::PHOTOS,
            auto_assemble_delay: AUTO_ASSEMBLE_DELAY,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instances for a category.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Needle => self.needle_count,
            Category::Ornament => self.ornament_count,
            Category::Light => self.light_count,
        }
    }

    pub fn with_needle_count(mut self, count: usize) -> Self {
        self.needle_count = count;
        self
    }

    pub fn with_ornament_count(mut self, count: usize) -> Self {
        self.ornament_count = count;
        self
    }

    pub fn with_light_count(mut self, count: usize) -> Self {
        self.light_count = count;
        self
    }

    pub fn with_decoration_shape(mut self, shape: TreeShape) -> Self {
        self.decoration_shape = shape;
        self
    }

    pub fn with_photo_shape(mut self, shape: TreeShape) -> Self {
        self.photo_shape = shape;
        self
    }

    pub fn with_auto_assemble_delay(mut self, delay: Duration) -> Self {
        self.auto_assemble_delay = delay;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.count(Category::Needle), 3000);
        assert_eq!(config.count(Category::Ornament), 150);
        assert_eq!(config.count(Category::Light), 400);
        assert_eq!(config.auto_assemble_delay, Duration::from_millis(500));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_builder() {
        let config = SceneConfig::new()
            .with_needle_count(10)
            .with_ornament_count(2)
            .with_light_count(3)
            .with_auto_assemble_delay(Duration::ZERO)
            .with_seed(5);
        assert_eq!(config.count(Category::Needle), 10);
        assert_eq!(config.count(Category::Ornament), 2);
        assert_eq!(config.count(Category::Light), 3);
        assert_eq!(config.auto_assemble_delay, Duration::ZERO);
        assert_eq!(config.seed, Some(5));
    }
}
