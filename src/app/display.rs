//! Display-related systems: vsync and camera projection follow `Settings`.
use bevy::prelude::*;
use bevy::window::{PresentMode, PrimaryWindow};
use voxelbox::player::Player;
use voxelbox::settings::Settings;

/// Sync `Settings.graphics.vsync` into the present mode of the primary window.
///
/// # Arguments
/// - `settings`: source of the vsync preference.
/// - `windows`: the primary window.
/// - `last`: last applied value, to skip redundant updates.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_vsync_settings(
    settings: Res<Settings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut last: Local<Option<bool>>,
) {
    let desired = settings.graphics.vsync;
    if *last == Some(desired) { return; }

    for mut w in &mut windows {
        w.present_mode = present_mode(desired);
    }
    *last = Some(desired);
}

#[must_use]
pub fn present_mode(vsync: bool) -> PresentMode {
    if vsync { PresentMode::AutoVsync } else { PresentMode::AutoNoVsync }
}

/// Push `fov_degrees` and `far_plane` into the player camera after a reload.
/// Aspect ratio is left to the engine, which follows the window size.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_projection_settings(
    settings: Res<Settings>,
    mut cameras: Query<&mut Projection, With<Player>>,
) {
    if !settings.is_changed() {
        return;
    }
    let fov = settings.graphics.fov_degrees.to_radians();
    let far = settings.graphics.far_plane;
    for mut projection in &mut cameras {
        if let Projection::Perspective(p) = projection.as_mut()
            && (p.fov != fov || p.far != far)
        {
            p.fov = fov;
            p.far = far;
        }
    }
}
