//! Player components and systems (camera, movement, kinematics).
//!
//! The player is a single camera entity tagged `Player`, carrying a
//! `PlayerLook` for mouse-look and an `AvatarKinematics` for vertical motion.
//!
//! # Example:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use voxelbox::player::{AvatarKinematics, Player, PlayerLook};
//!
//! fn spawn(mut commands: Commands) {
//!     commands.spawn((
//!         Camera3dBundle::default(),
//!         Player,
//!         PlayerLook::default(),
//!         AvatarKinematics::default(),
//!     ));
//! }
//! ```
pub mod camera;
pub mod kinematics;
pub mod movement;

use bevy::prelude::*;

pub use camera::*;
pub use kinematics::*;
pub use movement::*;

/// Marks the player camera.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Player;
