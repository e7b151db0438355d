pub mod debug;
pub mod input;
pub mod player;
pub mod ron_loader;
pub mod settings;
pub mod ui;
pub mod voxel;
