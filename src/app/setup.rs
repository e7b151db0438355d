//! Startup systems: the player camera and the ground grid.
use bevy::prelude::*;
use voxelbox::player::{AvatarKinematics, Player, PlayerLook};
use voxelbox::settings::Settings;
use voxelbox::voxel::{VoxelColor, VoxelScene};

/// Perspective projection for the player camera.
#[must_use]
pub fn player_projection(settings: &Settings) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: settings.graphics.fov_degrees.to_radians(),
        near: 0.1,
        far: settings.graphics.far_plane,
        ..default()
    })
}

/// Spawn point from settings.
#[must_use]
pub fn spawn_translation(settings: &Settings) -> Vec3 {
    Vec3::from_array(settings.player.spawn)
}

/// Spawn the player camera at the configured spawn point, looking down -Z.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_player(mut commands: Commands, settings: Res<Settings>) {
    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_translation(spawn_translation(&settings)),
            projection: player_projection(&settings),
            ..default()
        },
        Player,
        PlayerLook::default(),
        AvatarKinematics::default(),
    ));
}

/// Lay down the ground grid.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_world(mut scene: VoxelScene, settings: Res<Settings>) {
    let world = &settings.world;
    let placed = scene.spawn_ground(world.grid_size, VoxelColor(world.ground_color));
    info!("spawned {placed} ground voxels ({0}x{0})", world.grid_size);
}
