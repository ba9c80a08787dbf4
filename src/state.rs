//! Session state: the active formation and the uploaded photos.
//!
//! [`TreeStore`] is the only writer of both. The frame loop reads the mode
//! every frame and calls [`TreeStore::tick`] so a pending auto-assemble can
//! fire; user actions call [`TreeStore::set_mode`] and
//! [`TreeStore::add_photo`].
//!
//! # Auto-assemble
//!
//! Adding a photo while scattered schedules a one-shot switch to
//! [`FormationMode::TreeShape`] after a short delay so the new photo's spot on
//! the tree becomes visible. At most one switch is pending at a time: another
//! upload replaces it and an explicit mode change cancels it.

use crate::geometry::TreeShape;
use crate::placement::{plan_photo, PhotoPlacement};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::{Duration, Instant};

/// Delay between a photo upload and the automatic switch to the tree.
pub const AUTO_ASSEMBLE_DELAY: Duration = Duration::from_millis(500);

/// Which formation every particle is heading toward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FormationMode {
    /// Free-floating sphere cloud.
    #[default]
    Scattered,
    /// Assembled cone.
    TreeShape,
}

impl FormationMode {
    /// The other formation.
    pub fn toggled(self) -> Self {
        match self {
            FormationMode::Scattered => FormationMode::TreeShape,
            FormationMode::TreeShape => FormationMode::Scattered,
        }
    }

    /// Label for the control that switches away from this mode.
    pub fn action_label(self) -> &'static str {
        match self {
            FormationMode::Scattered => "ASSEMBLE TREE",
            FormationMode::TreeShape => "SCATTER ELEMENTS",
        }
    }

    /// Short status line for this mode.
    pub fn status_label(self) -> &'static str {
        match self {
            FormationMode::Scattered => "Floating Zero-G",
            FormationMode::TreeShape => "Structure Formed",
        }
    }
}

impl fmt::Display for FormationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormationMode::Scattered => f.write_str("SCATTERED"),
            FormationMode::TreeShape => f.write_str("TREE_SHAPE"),
        }
    }
}

/// Opaque photo identifier, stable for the photo's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhotoId(String);

impl PhotoId {
    /// Length of generated identifiers.
    pub const LEN: usize = 9;

    /// Random lowercase base-36 identifier.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let id = (0..Self::LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        PhotoId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A committed photo ornament.
#[derive(Clone, Debug)]
pub struct UserPhoto {
    pub id: PhotoId,
    /// Encoded polaroid as a `data:image/jpeg;base64,…` URI.
    pub image: String,
    /// Fixed targets, planned from the insertion index at commit time.
    pub placement: PhotoPlacement,
}

/// A scheduled one-shot mode switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTransition {
    pub due: Instant,
    pub target: FormationMode,
}

/// Formation mode and photo list for one session.
#[derive(Debug)]
pub struct TreeStore {
    mode: FormationMode,
    photos: Vec<UserPhoto>,
    pending: Option<PendingTransition>,
    auto_delay: Duration,
    photo_shape: TreeShape,
    rng: SmallRng,
}

impl TreeStore {
    /// Empty store, scattered, with the default delay and photo shape.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Empty store whose photo ids and scatter positions come from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            mode: FormationMode::default(),
            photos: Vec::new(),
            pending: None,
            auto_delay: AUTO_ASSEMBLE_DELAY,
            photo_shape: TreeShape::PHOTOS,
            rng,
        }
    }

    /// Set the delay before the automatic switch to the tree.
    pub fn with_auto_delay(mut self, delay: Duration) -> Self {
        self.auto_delay = delay;
        self
    }

    /// Set the shape photos are planned against.
    pub fn with_photo_shape(mut self, shape: TreeShape) -> Self {
        self.photo_shape = shape;
        self
    }

    #[inline]
    pub fn mode(&self) -> FormationMode {
        self.mode
    }

    /// Photos in insertion (display) order.
    #[inline]
    pub fn photos(&self) -> &[UserPhoto] {
        &self.photos
    }

    #[inline]
    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    /// The scheduled auto-assemble, if any.
    #[inline]
    pub fn pending(&self) -> Option<PendingTransition> {
        self.pending
    }

    /// Switch to `mode`, cancelling any pending switch.
    ///
    /// Setting the mode that is already active is a no-op: a pending
    /// auto-assemble stays scheduled and smoothing continues undisturbed.
    pub fn set_mode(&mut self, mode: FormationMode) {
        if self.mode == mode {
            return;
        }
        if self.pending.take().is_some() {
            log::debug!("explicit mode change cancelled pending auto-assemble");
        }
        log::debug!("formation {} -> {}", self.mode, mode);
        self.mode = mode;
    }

    /// Switch to the other formation.
    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    /// Commit an encoded photo and plan its placement.
    ///
    /// The insertion index is the current photo count, so placements are
    /// assigned strictly in commit order. If the store is scattered, an
    /// auto-assemble is scheduled for `now + delay`, replacing any earlier one.
    pub fn add_photo(&mut self, image: String, now: Instant) -> &UserPhoto {
        let index = self.photos.len();
        let placement = plan_photo(&mut self.rng, index, &self.photo_shape);
        let id = PhotoId::generate(&mut self.rng);
        log::info!("photo {} committed at index {}", id, index);

        if self.mode == FormationMode::Scattered {
            self.pending = Some(PendingTransition {
                due: now + self.auto_delay,
                target: FormationMode::TreeShape,
            });
        }

        self.photos.push(UserPhoto {
            id,
            image,
            placement,
        });
        &self.photos[index]
    }

    /// Fire the pending switch if it is due. Returns the new mode if it fired.
    pub fn tick(&mut self, now: Instant) -> Option<FormationMode> {
        match self.pending {
            Some(pending) if now >= pending.due => {
                self.pending = None;
                log::debug!("auto-assemble fired: {} -> {}", self.mode, pending.target);
                self.mode = pending.target;
                Some(pending.target)
            }
            _ => None,
        }
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::tree_position;

    const IMAGE: &str = "data:image/jpeg;base64,AAAA";

    #[test]
    fn test_defaults() {
        let store = TreeStore::seeded(1);
        assert_eq!(store.mode(), FormationMode::Scattered);
        assert_eq!(store.photo_count(), 0);
        assert!(store.pending().is_none());
    }

    #[test]
    fn test_set_mode_is_idempotent() {
        let mut store = TreeStore::seeded(1);
        store.set_mode(FormationMode::TreeShape);
        store.set_mode(FormationMode::TreeShape);
        assert_eq!(store.mode(), FormationMode::TreeShape);
        store.toggle_mode();
        assert_eq!(store.mode(), FormationMode::Scattered);
    }

    #[test]
    fn test_add_photo_schedules_assemble() {
        let mut store = TreeStore::seeded(2);
        let t0 = Instant::now();
        let photo = store.add_photo(IMAGE.to_string(), t0).clone();

        assert_eq!(store.photo_count(), 1);
        assert_eq!(photo.placement.tree, tree_position(0, &TreeShape::PHOTOS));
        assert_eq!(photo.id.as_str().len(), PhotoId::LEN);

        assert_eq!(store.tick(t0 + Duration::from_millis(499)), None);
        assert_eq!(store.mode(), FormationMode::Scattered);
        assert_eq!(
            store.tick(t0 + AUTO_ASSEMBLE_DELAY),
            Some(FormationMode::TreeShape)
        );
        assert_eq!(store.mode(), FormationMode::TreeShape);

        // One-shot.
        assert_eq!(store.tick(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_no_schedule_when_already_assembled() {
        let mut store = TreeStore::seeded(3);
        store.set_mode(FormationMode::TreeShape);
        store.add_photo(IMAGE.to_string(), Instant::now());
        assert!(store.pending().is_none());
    }

    #[test]
    fn test_second_upload_replaces_pending() {
        let mut store = TreeStore::seeded(4);
        let t0 = Instant::now();
        store.add_photo(IMAGE.to_string(), t0);
        let t1 = t0 + Duration::from_millis(300);
        store.add_photo(IMAGE.to_string(), t1);

        let pending = store.pending().unwrap();
        assert_eq!(pending.due, t1 + AUTO_ASSEMBLE_DELAY);
        assert_eq!(store.tick(t0 + AUTO_ASSEMBLE_DELAY), None);
        assert_eq!(store.tick(t1 + AUTO_ASSEMBLE_DELAY), Some(FormationMode::TreeShape));
    }

    #[test]
    fn test_explicit_mode_cancels_pending() {
        let mut store = TreeStore::seeded(5);
        let t0 = Instant::now();
        store.add_photo(IMAGE.to_string(), t0);
        store.set_mode(FormationMode::TreeShape);
        store.set_mode(FormationMode::Scattered);
        assert!(store.pending().is_none());
        assert_eq!(store.tick(t0 + Duration::from_secs(1)), None);
        assert_eq!(store.mode(), FormationMode::Scattered);
    }

    #[test]
    fn test_same_mode_keeps_pending() {
        let mut store = TreeStore::seeded(5);
        let t0 = Instant::now();
        store.add_photo(IMAGE.to_string(), t0);
        store.set_mode(FormationMode::Scattered);

        assert_eq!(store.pending().map(|p| p.due), Some(t0 + AUTO_ASSEMBLE_DELAY));
        assert_eq!(
            store.tick(t0 + AUTO_ASSEMBLE_DELAY),
            Some(FormationMode::TreeShape)
        );
        assert_eq!(store.mode(), FormationMode::TreeShape);
    }

    #[test]
    fn test_placements_follow_insertion_order() {
        let mut store = TreeStore::seeded(6).with_auto_delay(Duration::ZERO);
        let now = Instant::now();
        for _ in 0..6 {
            store.add_photo(IMAGE.to_string(), now);
        }
        for (i, photo) in store.photos().iter().enumerate() {
            assert_eq!(photo.placement.tree, tree_position(i, &TreeShape::PHOTOS));
        }
        let mut ids: Vec<&str> = store.photos().iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_labels() {
        assert_eq!(FormationMode::Scattered.action_label(), "ASSEMBLE TREE");
        assert_eq!(FormationMode::TreeShape.status_label(), "Structure Formed");
        assert_eq!(FormationMode::TreeShape.to_string(), "TREE_SHAPE");
    }
}
