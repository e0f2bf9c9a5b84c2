use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Quat, Vec3};

use scroll_viewer::animation::{AnimationClip, AnimationDriver, Channel, ChannelOutputs, Interpolation};
use scroll_viewer::loaders::{DecodedAsset, NodeDesc};
use scroll_viewer::scene::{Scene, Transform};
use scroll_viewer::scroll::{progress_fraction, ScrollMapper};
use scroll_viewer::traits::SceneGraph;

/// Chain of `count` nodes, each with a rotation and translation channel
fn animated_chain(count: usize, keys: usize) -> (DecodedAsset, AnimationClip) {
    let nodes = (0..count)
        .map(|i| NodeDesc {
            name: Some(format!("node_{}", i)),
            transform: Transform::IDENTITY,
            mesh: None,
            children: if i + 1 < count { vec![i + 1] } else { vec![] },
        })
        .collect();

    let inputs: Vec<f32> = (0..keys).map(|k| k as f32 / 30.0).collect();
    let channels = (0..count)
        .flat_map(|i| {
            let rotations = (0..keys).map(|k| Quat::from_rotation_y(k as f32 * 0.05)).collect();
            let translations = (0..keys).map(|k| Vec3::new(0.0, k as f32 * 0.01, 0.0)).collect();
            [
                Channel {
                    target_node: i,
                    inputs: inputs.clone(),
                    outputs: ChannelOutputs::Rotations(rotations),
                    interpolation: Interpolation::Linear,
                },
                Channel {
                    target_node: i,
                    inputs: inputs.clone(),
                    outputs: ChannelOutputs::Translations(translations),
                    interpolation: Interpolation::Linear,
                },
            ]
        })
        .collect();

    let asset = DecodedAsset {
        nodes,
        roots: vec![0],
        meshes: vec![],
        clips: vec![],
    };
    (asset, AnimationClip::new("Take 001", channels))
}

fn bench_progress_fraction(c: &mut Criterion) {
    c.bench_function("progress_fraction_sweep", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for i in 0..10_000 {
                sum += progress_fraction(black_box(i as f32), black_box(7_200.0));
            }
            black_box(sum)
        })
    });
}

fn bench_scroll_events(c: &mut Criterion) {
    c.bench_function("mapper_wheel_events", |b| {
        let mut mapper = ScrollMapper::new(720.0, 4.0);
        b.iter(|| {
            for i in 0..1_000 {
                mapper.scroll_by(if i % 2 == 0 { 40.0 } else { -25.0 });
                black_box(mapper.outputs(Some(4.0)));
            }
        })
    });
}

fn bench_clip_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("clip_sampling");

    for keys in [8, 120, 2_000].iter() {
        let (_, clip) = animated_chain(1, *keys);
        let duration = clip.duration;

        group.bench_with_input(BenchmarkId::new("keys", keys), keys, |b, _| {
            b.iter(|| {
                let mut transform = Transform::IDENTITY;
                for i in 0..100 {
                    let t = duration * i as f32 / 100.0;
                    for channel in &clip.channels {
                        channel.apply(black_box(t), &mut transform);
                    }
                }
                black_box(transform)
            })
        });
    }

    group.finish();
}

fn bench_driver_pose(c: &mut Criterion) {
    let mut group = c.benchmark_group("driver_pose");

    for nodes in [10, 100, 500].iter() {
        let (asset, clip) = animated_chain(*nodes, 120);
        let mut scene = Scene::new();
        let attached = scene.attach(&asset, Transform::IDENTITY);
        let mut driver = AnimationDriver::bind(clip, &attached.nodes, &scene);
        let duration = driver.duration();

        group.bench_with_input(BenchmarkId::new("nodes", nodes), nodes, |b, _| {
            let mut step = 0u32;
            b.iter(|| {
                step = (step + 1) % 100;
                driver.set_time(duration * step as f32 / 100.0, &mut scene);
                black_box(driver.time())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_progress_fraction,
    bench_scroll_events,
    bench_clip_sampling,
    bench_driver_pose,
);

criterion_main!(benches);
