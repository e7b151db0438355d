pub mod display;
pub mod reset;
pub mod setup;
pub mod sync;

pub use display::{present_mode, sync_projection_settings, sync_vsync_settings};
pub use reset::reset_world;
pub use setup::{spawn_player, spawn_world};
pub use sync::sync_world_settings;
