//! Rebuild derived resources when `Settings` reloads.
use bevy::prelude::*;
use voxelbox::input::{KeyBindings, Palette};
use voxelbox::settings::Settings;
use voxelbox::voxel::{CullingState, VoxelRegistry};

/// Key bindings, palette and placement bounds follow the settings file.
/// Cube size and grid size only apply at startup and on Reset.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_world_settings(
    settings: Res<Settings>,
    mut bindings: ResMut<KeyBindings>,
    mut palette: ResMut<Palette>,
    mut registry: ResMut<VoxelRegistry>,
    mut culling: ResMut<CullingState>,
) {
    if !settings.is_changed() || settings.is_added() {
        return;
    }
    *bindings = KeyBindings::from_settings(&settings);

    let colors = Palette::from_settings(&settings);
    if *palette != colors {
        *palette = colors;
    }
    if registry.bounds() != settings.world.bounds {
        registry.set_bounds(settings.world.bounds);
    }
    culling.invalidate();
    debug!("applied reloaded settings");
}
