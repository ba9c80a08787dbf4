//! End-to-end tests through the public API: uploads, the auto-assemble
//! transition, convergence and photo layout.

use std::io::Cursor;
use std::time::{Duration, Instant};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tinsel::polaroid::{load_data_uri, process_upload, JPEG_DATA_URI_PREFIX};
use tinsel::upload::commit;
use tinsel::{Category, FormationMode, Scene, SceneConfig, UploadQueue, Vec3};

const FRAME: f32 = 1.0 / 60.0;

fn small_scene(seed: u64) -> Scene {
    Scene::new(
        &SceneConfig::default()
            .with_needle_count(200)
            .with_ornament_count(20)
            .with_light_count(40)
            .with_seed(seed),
    )
}

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Run `frames` frames starting at animation time `t`, returning the end time.
fn run_frames(scene: &mut Scene, mut t: f32, frames: usize, now: Instant) -> f32 {
    for _ in 0..frames {
        t += FRAME;
        scene.frame(t, now);
    }
    t
}

// ============================================================================
// Upload -> auto-assemble -> convergence
// ============================================================================

#[test]
fn test_upload_assembles_tree_and_converges() {
    let mut scene = small_scene(11);
    let mut uploads = UploadQueue::new();
    uploads.submit_bytes(png(120, 80, [30, 90, 200, 255]));

    let completed = uploads
        .wait(Duration::from_secs(30))
        .expect("upload should finish");
    let t0 = Instant::now();
    let committed = commit(completed, scene.store_mut(), t0).expect("photo committed");
    assert_eq!(committed.id, scene.photos()[0].id);
    assert_eq!(scene.photos().len(), 1);
    assert_eq!(scene.mode(), FormationMode::Scattered);

    scene.frame(0.0, t0 + Duration::from_millis(100));
    assert_eq!(scene.mode(), FormationMode::Scattered);

    let due = t0 + Duration::from_millis(500);
    scene.frame(FRAME, due);
    assert_eq!(scene.mode(), FormationMode::TreeShape);

    run_frames(&mut scene, FRAME, 800, due);

    for category in Category::ALL {
        let animator = scene.animator(category);
        for (i, record) in animator.records().iter().enumerate() {
            let p = animator.buffer().position(i);
            assert!(
                p.distance(record.tree) < 1e-2,
                "{category} {i} stuck at {p:?}, tree home {:?}",
                record.tree
            );
        }
    }

    let photo = &scene.photos()[0];
    let p = scene.photo_animator().buffer().position(0);
    assert!(p.distance(photo.placement.tree) < 0.25, "photo at {p:?}");
    assert!((scene.photo_animator().buffer().scale(0) - 1.2).abs() < 1e-3);
}

#[test]
fn test_scatter_returns_home() {
    let mut scene = small_scene(12);
    let now = Instant::now();
    scene.set_mode(FormationMode::TreeShape);
    let t = run_frames(&mut scene, 0.0, 400, now);
    scene.toggle_mode();
    run_frames(&mut scene, t, 400, now);

    let ornaments = scene.animator(Category::Ornament);
    for (i, record) in ornaments.records().iter().enumerate() {
        assert!(ornaments.buffer().position(i).distance(record.scatter) < 1e-2);
    }
}

#[test]
fn test_explicit_mode_change_beats_auto_assemble() {
    let mut scene = small_scene(13);
    let t0 = Instant::now();
    scene.add_photo(
        process_upload(&png(16, 16, [255, 0, 0, 255])).unwrap(),
        t0,
    );

    scene.set_mode(FormationMode::TreeShape);
    scene.set_mode(FormationMode::Scattered);
    scene.frame(0.0, t0 + Duration::from_secs(2));
    assert_eq!(scene.mode(), FormationMode::Scattered);
}

#[test]
fn test_redundant_set_mode_keeps_auto_assemble() {
    let mut scene = small_scene(13);
    let t0 = Instant::now();
    scene.add_photo(
        process_upload(&png(16, 16, [255, 0, 0, 255])).unwrap(),
        t0,
    );

    scene.set_mode(FormationMode::Scattered);
    scene.frame(0.0, t0 + Duration::from_millis(500));
    assert_eq!(scene.mode(), FormationMode::TreeShape);
}

#[test]
fn test_failed_upload_leaves_scene_untouched() {
    let mut scene = small_scene(14);
    let mut uploads = UploadQueue::new();
    uploads.submit_bytes(b"GIF89a but not really".to_vec());

    let completed = uploads.wait(Duration::from_secs(30)).unwrap();
    assert!(completed.result.is_err());
    assert!(commit(completed, scene.store_mut(), Instant::now()).is_none());
    assert!(scene.photos().is_empty());
    assert!(scene.store().pending().is_none());
}

// ============================================================================
// Photo layout
// ============================================================================

#[test]
fn test_five_photos_hang_apart() {
    let mut scene = small_scene(15);
    let now = Instant::now();
    let uri = process_upload(&png(40, 40, [0, 200, 0, 255])).unwrap();
    for _ in 0..5 {
        scene.add_photo(uri.clone(), now);
    }
    scene.frame(0.0, now + Duration::from_secs(1));
    assert_eq!(scene.mode(), FormationMode::TreeShape);
    run_frames(&mut scene, 0.0, 800, now);

    let targets: Vec<Vec3> = scene.photos().iter().map(|p| p.placement.tree).collect();
    let rendered = scene.photo_animator().buffer().positions();
    assert_eq!(rendered.len(), 5);

    for a in 0..5 {
        for b in (a + 1)..5 {
            assert!(
                targets[a].distance(targets[b]) > 1.0,
                "photos {a} and {b} share a spot"
            );
            assert!(rendered[a].distance(rendered[b]) > 0.5);
        }
    }
}

#[test]
fn test_photo_ids_are_unique() {
    let mut scene = small_scene(16);
    let now = Instant::now();
    for _ in 0..20 {
        scene.add_photo("data:image/jpeg;base64,AAAA".to_string(), now);
    }
    let mut ids: Vec<String> = scene.photos().iter().map(|p| p.id.to_string()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

// ============================================================================
// Polaroid round trip
// ============================================================================

#[test]
fn test_polaroid_round_trip() {
    let uri = process_upload(&png(1000, 400, [200, 30, 30, 255])).unwrap();
    assert!(uri.starts_with(JPEG_DATA_URI_PREFIX));

    let card = load_data_uri(&uri).unwrap();
    assert_eq!(card.dimensions(), (500, 600));

    let border = card.get_pixel(10, 10).0;
    assert!(border[..3].iter().all(|&c| c > 235), "border {border:?}");
    let caption = card.get_pixel(250, 560).0;
    assert!(caption[..3].iter().all(|&c| c > 235), "caption {caption:?}");

    let center = card.get_pixel(250, 262).0;
    assert!(center[0] > 150 && center[1] < 80 && center[2] < 80, "center {center:?}");
}
