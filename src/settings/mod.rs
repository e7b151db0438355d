//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the RON watcher utilities (see `ron_loader::setup_ron_watcher`). Every
//! field has a default so a partial file only overrides what it names.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::voxel::{VoxelColor, WorldBounds};

/// Number of palette slots (keys 1..9, 0).
pub const PALETTE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsSettings {
    #[serde(default = "GraphicsSettings::default_vsync")]
    pub vsync: bool, // Cap FPS to the display refresh rate.
    #[serde(default = "GraphicsSettings::default_fov")]
    pub fov_degrees: f32, // Vertical field of view of the player camera.
    #[serde(default = "GraphicsSettings::default_far")]
    pub far_plane: f32, // Distance past which voxels are culled.
    #[serde(default = "GraphicsSettings::default_frustum_buffer")]
    pub frustum_buffer: f32, // Margin added around each cube before the view test.
    #[serde(default = "GraphicsSettings::default_show_outlines")]
    pub show_outlines: bool, // Draw cube edge outlines.
    #[serde(default = "GraphicsSettings::default_move_threshold")]
    pub culling_move_threshold: f32, // Camera travel that forces a visibility pass.
    #[serde(default = "GraphicsSettings::default_turn_threshold")]
    pub culling_turn_threshold_deg: f32, // Camera rotation that forces a visibility pass.
}

impl GraphicsSettings {
    fn default_vsync() -> bool { true }
    fn default_fov() -> f32 { 75.0 }
    fn default_far() -> f32 { 1000.0 }
    fn default_frustum_buffer() -> f32 { 1.5 }
    fn default_show_outlines() -> bool { true }
    fn default_move_threshold() -> f32 { 0.05 }
    fn default_turn_threshold() -> f32 { 0.5 }
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            vsync: Self::default_vsync(),
            fov_degrees: Self::default_fov(),
            far_plane: Self::default_far(),
            frustum_buffer: Self::default_frustum_buffer(),
            show_outlines: Self::default_show_outlines(),
            culling_move_threshold: Self::default_move_threshold(),
            culling_turn_threshold_deg: Self::default_turn_threshold(),
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert mouse Y axis
    #[serde(default)]
    pub invert_x: bool, // Invert mouse X axis
    #[serde(default = "ControlsSettings::default_sensitivity")]
    pub mouse_sensitivity: f32, // Mouse sensitivity multiplier
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Action name -> key name; missing actions keep their default key.
}

impl ControlsSettings {
    fn default_sensitivity() -> f32 { 20.0 }

    fn default_keybinds() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("forward".to_string(), "W".to_string());
        m.insert("back".to_string(), "S".to_string());
        m.insert("left".to_string(), "A".to_string());
        m.insert("right".to_string(), "D".to_string());
        m.insert("jump".to_string(), "Space".to_string());
        m.insert("pause".to_string(), "Enter".to_string());
        m.insert("toggle_outlines".to_string(), "O".to_string());
        m.insert("dump_debug".to_string(), "F3".to_string());
        m
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            mouse_sensitivity: Self::default_sensitivity(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// World layout. Read once at startup and again on Reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSettings {
    #[serde(default = "WorldSettings::default_grid_size")]
    pub grid_size: i32, // Edge length of the square ground grid, in cubes.
    #[serde(default = "WorldSettings::default_cube_size")]
    pub cube_size: f32, // Edge length of one cube in world units.
    #[serde(default = "WorldSettings::default_ground_color")]
    pub ground_color: u32, // Packed 0xRRGGBB color of the ground grid.
    #[serde(default)]
    pub bounds: Option<WorldBounds>, // Cells placements must stay inside; `None` is unbounded.
    #[serde(default = "WorldSettings::default_reach")]
    pub reach: f32, // Maximum pick distance.
    #[serde(default = "WorldSettings::default_palette")]
    pub palette: Vec<u32>, // Colors of slots 1..9, 0 (packed 0xRRGGBB).
}

impl WorldSettings {
    fn default_grid_size() -> i32 { 20 }
    fn default_cube_size() -> f32 { 1.0 }
    fn default_ground_color() -> u32 { VoxelColor::DIRT.0 }
    fn default_reach() -> f32 { 100.0 }

    fn default_palette() -> Vec<u32> {
        vec![
            0xFF_FF_FF, // white
            0xFF_00_00, // red
            0x00_FF_00, // green
            0x00_00_FF, // blue
            0xFF_FF_00, // yellow
            0xFF_A5_00, // orange
            0x80_00_80, // purple
            0x00_FF_FF, // cyan
            0x00_00_00, // black
            0x8B_45_13, // brown
        ]
    }

    /// The configured palette as exactly `PALETTE_SIZE` colors. Short lists
    /// are padded from the defaults and long ones truncated.
    #[must_use]
    pub fn palette_colors(&self) -> [VoxelColor; PALETTE_SIZE] {
        if self.palette.len() != PALETTE_SIZE {
            warn!(
                "palette has {} colors, expected {PALETTE_SIZE}; using defaults for the rest",
                self.palette.len()
            );
        }
        let defaults = Self::default_palette();
        std::array::from_fn(|i| VoxelColor(self.palette.get(i).copied().unwrap_or(defaults[i])))
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            grid_size: Self::default_grid_size(),
            cube_size: Self::default_cube_size(),
            ground_color: Self::default_ground_color(),
            bounds: None,
            reach: Self::default_reach(),
            palette: Self::default_palette(),
        }
    }
}

/// Avatar motion, in world units and seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default = "PlayerSettings::default_spawn")]
    pub spawn: [f32; 3], // Camera position at startup and after Reset.
    #[serde(default = "PlayerSettings::default_floor")]
    pub floor_height: f32, // Eye height when standing on the ground.
    #[serde(default = "PlayerSettings::default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "PlayerSettings::default_jump_speed")]
    pub jump_speed: f32, // Upward velocity given by a jump.
    #[serde(default = "PlayerSettings::default_gravity")]
    pub gravity: f32,
    #[serde(default = "PlayerSettings::default_float_speed")]
    pub float_speed: f32, // Rise speed while floating.
    #[serde(default = "PlayerSettings::default_paused_descent")]
    pub paused_descent_speed: f32, // Sink speed back to the floor while paused.
}

impl PlayerSettings {
    fn default_spawn() -> [f32; 3] { [5.0, 2.0, 5.0] }
    fn default_floor() -> f32 { 2.0 }
    fn default_move_speed() -> f32 { 6.0 }
    fn default_jump_speed() -> f32 { 12.0 }
    fn default_gravity() -> f32 { 36.0 }
    fn default_float_speed() -> f32 { 6.0 }
    fn default_paused_descent() -> f32 { 0.6 }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            spawn: Self::default_spawn(),
            floor_height: Self::default_floor(),
            move_speed: Self::default_move_speed(),
            jump_speed: Self::default_jump_speed(),
            gravity: Self::default_gravity(),
            float_speed: Self::default_float_speed(),
            paused_descent_speed: Self::default_paused_descent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HudSettings {
    #[serde(default = "HudSettings::default_interval")]
    pub readout_interval_secs: f32, // How often the FPS/memory line refreshes.
}

impl HudSettings {
    fn default_interval() -> f32 { 1.0 }
}

impl Default for HudSettings {
    fn default() -> Self {
        Self { readout_interval_secs: Self::default_interval() }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub graphics: GraphicsSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub world: WorldSettings,
    #[serde(default)]
    pub player: PlayerSettings,
    #[serde(default)]
    pub hud: HudSettings,
}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }
}

pub mod loader;
