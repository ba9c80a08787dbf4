//! Benchmarks for the per-frame CPU update.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Instant;

use tinsel::animator::{CategoryAnimator, InstanceRaw};
use tinsel::decoration::build_dataset_with;
use tinsel::{Category, FormationMode, Scene, SceneConfig, TreeShape};

fn animator(category: Category, count: usize) -> CategoryAnimator {
    let mut rng = SmallRng::seed_from_u64(7);
    let records = build_dataset_with(&mut rng, count, category, &TreeShape::DECORATIONS);
    CategoryAnimator::new(category, records)
}

fn bench_category_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("category_step");

    let config = SceneConfig::default();
    for category in Category::ALL {
        let count = config.count(category);
        for mode in [FormationMode::Scattered, FormationMode::TreeShape] {
            let id = BenchmarkId::new(format!("{category}/{mode}"), count);
            group.bench_with_input(id, &count, |b, &count| {
                let mut animator = animator(category, count);
                let mut t = 0.0f32;
                b.iter(|| {
                    t += 1.0 / 60.0;
                    animator.step(black_box(mode), t);
                })
            });
        }
    }

    group.finish();
}

fn bench_dataset_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_dataset");

    for count in [150usize, 400, 3000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut rng = SmallRng::seed_from_u64(1);
            b.iter(|| {
                black_box(build_dataset_with(
                    &mut rng,
                    count,
                    Category::Needle,
                    &TreeShape::DECORATIONS,
                ))
            })
        });
    }

    group.finish();
}

fn bench_scene_frame(c: &mut Criterion) {
    let mut scene = Scene::new(&SceneConfig::default().with_seed(3));
    let now = Instant::now();
    for _ in 0..12 {
        scene.add_photo("data:image/jpeg;base64,AAAA".to_string(), now);
    }

    let mut staging = vec![InstanceRaw::default(); 3000];
    let mut t = 0.0f32;
    c.bench_function("scene_frame_and_pack", |b| {
        b.iter(|| {
            t += 1.0 / 60.0;
            scene.frame(t, now);
            for animator in scene.decorations() {
                animator.buffer().pack_into(&mut staging);
            }
            black_box(&staging);
        })
    });
}

criterion_group!(benches, bench_category_step, bench_dataset_build, bench_scene_frame);
criterion_main!(benches);
