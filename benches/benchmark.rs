use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bevy::math::{IVec3, Vec2, Vec3};
use bevy::prelude::{GlobalTransform, PerspectiveProjection, Transform};
use voxelbox::player::camera::PlayerLook;
use voxelbox::player::{AvatarKinematics, KinematicsConfig};
use voxelbox::settings::Settings;
use voxelbox::voxel::{ground_cells, pick, update_visibility, ViewVolume, VoxelColor, VoxelRegistry};

fn ground(size: i32) -> VoxelRegistry {
    let mut registry = VoxelRegistry::new();
    for cell in ground_cells(size) {
        registry.place(cell, VoxelColor::DIRT).expect("ground cells are distinct");
    }
    registry
}

fn spawn_volume() -> ViewVolume {
    let tf = GlobalTransform::from(Transform::from_xyz(5.0, 2.0, 5.0).looking_at(Vec3::new(10.0, 0.0, 20.0), Vec3::Y));
    let projection = PerspectiveProjection {
        fov: 75f32.to_radians(),
        aspect_ratio: 16.0 / 9.0,
        near: 0.1,
        far: 1000.0,
    };
    ViewVolume::from_camera(&tf, &projection)
}

/// Build the ground grid, then remove and re-place one voxel per cell.
fn bench_registry_churn(c: &mut Criterion) {
    c.bench_function("registry_ground_build", |b| {
        b.iter(|| black_box(ground(20)));
    });

    c.bench_function("registry_remove_place", |b| {
        let mut registry = ground(20);
        b.iter(|| {
            for cell in ground_cells(20) {
                if let Some(id) = registry.at(cell) {
                    let v = registry.remove(id).expect("id came from the index");
                    registry.place(v.position + IVec3::Y, v.color).ok();
                    if let Some(top) = registry.at(v.position + IVec3::Y) {
                        registry.remove(top).ok();
                    }
                    registry.place(v.position, v.color).ok();
                }
            }
            black_box(registry.len());
        });
    });
}

/// Visibility pass over the grid, and over a larger 100x100 field.
fn bench_visibility(c: &mut Criterion) {
    let volume = spawn_volume();
    let mut small = ground(20);
    let mut large = ground(100);

    c.bench_function("visibility_20x20", |b| {
        b.iter(|| black_box(update_visibility(&mut small, &volume, 1.0, 1.5)));
    });
    c.bench_function("visibility_100x100", |b| {
        b.iter(|| black_box(update_visibility(&mut large, &volume, 1.0, 1.5)));
    });
}

/// Ray picks from the spawn point in a fan of directions.
fn bench_pick(c: &mut Criterion) {
    let registry = ground(20);
    let origin = Vec3::new(5.0, 2.0, 5.0);
    let dirs: Vec<Vec3> = (0..64)
        .map(|i| {
            let a = i as f32 / 64.0 * std::f32::consts::TAU;
            Vec3::new(a.cos(), -0.4, a.sin()).normalize()
        })
        .collect();

    c.bench_function("pick_fan_64", |b| {
        b.iter(|| {
            let hits = dirs
                .iter()
                .filter(|d| pick(&registry, origin, **d, 1.0, 100.0).is_some())
                .count();
            black_box(hits)
        });
    });
}

/// Jump/float/fall cycles at 60 Hz.
fn bench_kinematics(c: &mut Criterion) {
    let config = KinematicsConfig::default();
    c.bench_function("kinematics_many_steps", |b| {
        b.iter(|| {
            let mut avatar = AvatarKinematics::default();
            let mut y = config.floor;
            let dt = 1.0f32 / 60.0f32;
            for i in 0..5_000u32 {
                match i % 120 {
                    0 | 10 => avatar.press_jump(&config),
                    40 => avatar.release_jump(),
                    _ => {}
                }
                y = avatar.step(y, dt, &config);
            }
            black_box((y, avatar))
        });
    });
}

/// Mouse-look with deterministic pseudo-random deltas.
fn bench_camera_look_random(c: &mut Criterion) {
    let settings = Settings::default();
    c.bench_function("camera_look_random", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            let mut state: u32 = 0x1234_5678;
            for _ in 0..1_000usize {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let dx = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 200.0 - 100.0;
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let dy = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 200.0 - 100.0;
                look.apply_delta(black_box(Vec2::new(dx, dy)), &settings);
            }
            black_box((look.yaw, look.pitch))
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(100);
    targets =
        bench_registry_churn,
        bench_visibility,
        bench_pick,
        bench_kinematics,
        bench_camera_look_random
}
criterion_main!(benches);
