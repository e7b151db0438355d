//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in the `data/settings` directory. If several
//! files are present the first one (by file name) that parses wins. If none exist
//! or none parse, default settings are used.
use bevy::prelude::*;

use crate::ron_loader::{load_ron_files, setup_ron_watcher, RonWatcher};
use crate::settings::Settings;

/// Directory settings are read from and watched.
pub const SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher(pub RonWatcher);

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher(RonWatcher::stub())
    }
}

/// Load settings from `path` (directory).
///
/// # Example
/// ```
/// use voxelbox::settings::loader::load_settings_from_dir;
///
/// let settings = load_settings_from_dir("no/such/dir");
/// assert_eq!(settings.world.grid_size, 20);
/// ```
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    let items: Vec<Settings> = load_ron_files(path);
    if let Some(first) = items.into_iter().next() {
        info!("loaded settings from {path}");
        first
    } else {
        info!("no settings found in {path}, using defaults");
        Settings::defaults()
    }
}

/// Create a watcher for the settings directory, falling back to a stub that
/// never fires when the OS watcher is unavailable.
#[must_use]
pub fn setup_settings_watcher(path: &str) -> SettingsWatcher {
    match setup_ron_watcher(path) {
        Ok(w) => SettingsWatcher(w),
        Err(e) => {
            warn!("settings hot-reload disabled: {e}");
            SettingsWatcher::stub()
        }
    }
}

/// Reload the `Settings` resource when the watcher saw a change.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.0.take_changed() {
        info!("settings changed, reloading");
        *settings = load_settings_from_dir(SETTINGS_DIR);
    }
}
