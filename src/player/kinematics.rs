//! Vertical avatar motion: jump, float and fall back to a fixed floor.
//!
//! There is no collision against voxels; the only surface is the floor height
//! (eye level when standing on the ground grid). The state machine is
//!
//! ```text
//! Grounded --press--> Jumping --press--> Floating
//!    ^                   |  ^                |
//!    +---- reach floor --+  +--- release ----+
//! ```
//!
//! Releasing jump while floating drops back into `Jumping` with zero
//! velocity, so gravity brings the avatar down to the floor where it lands.
//! Velocities and rates are per second; every step takes the frame's `dt`.
use bevy::prelude::*;

use crate::player::Player;
use crate::settings::Settings;

/// Vertical mode of the avatar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalMode {
    #[default]
    Grounded,
    Jumping,
    Floating,
}

/// Tunables, in world units and seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KinematicsConfig {
    pub floor: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub float_speed: f32,
    pub paused_descent_speed: f32,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl KinematicsConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let p = &settings.player;
        Self {
            floor: p.floor_height,
            jump_speed: p.jump_speed,
            gravity: p.gravity,
            float_speed: p.float_speed,
            paused_descent_speed: p.paused_descent_speed,
        }
    }
}

/// Vertical state of the player avatar.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct AvatarKinematics {
    pub mode: VerticalMode,
    /// Vertical velocity in world units per second (only used while jumping).
    pub velocity: f32,
}

impl AvatarKinematics {
    /// Jump key went down.
    pub fn press_jump(&mut self, config: &KinematicsConfig) {
        match self.mode {
            VerticalMode::Grounded => {
                self.mode = VerticalMode::Jumping;
                self.velocity = config.jump_speed;
            }
            VerticalMode::Jumping => {
                self.mode = VerticalMode::Floating;
                self.velocity = 0.0;
            }
            VerticalMode::Floating => {}
        }
    }

    /// Jump key went up. Only cancels floating.
    pub fn release_jump(&mut self) {
        if self.mode == VerticalMode::Floating {
            self.mode = VerticalMode::Jumping;
            self.velocity = 0.0;
        }
    }

    /// Advance one frame and return the new height.
    #[must_use]
    pub fn step(&mut self, y: f32, dt: f32, config: &KinematicsConfig) -> f32 {
        match self.mode {
            VerticalMode::Grounded => y,
            VerticalMode::Jumping => {
                let y = y + self.velocity * dt;
                self.velocity -= config.gravity * dt;
                if y <= config.floor {
                    self.mode = VerticalMode::Grounded;
                    self.velocity = 0.0;
                    config.floor
                } else {
                    y
                }
            }
            VerticalMode::Floating => y + config.float_speed * dt,
        }
    }

    /// Height after one paused frame: sink linearly toward the floor and stop
    /// there. Mode and velocity are left for when play resumes.
    #[must_use]
    pub fn paused_descent(y: f32, dt: f32, config: &KinematicsConfig) -> f32 {
        if y > config.floor {
            (y - config.paused_descent_speed * dt).max(config.floor)
        } else {
            y
        }
    }
}

/// Integrate vertical motion for the player.
#[allow(clippy::needless_pass_by_value)]
pub fn avatar_kinematics(
    time: Res<Time>,
    settings: Res<Settings>,
    mut query: Query<(&mut Transform, &mut AvatarKinematics), With<Player>>,
) {
    let config = KinematicsConfig::from_settings(&settings);
    let dt = time.delta_seconds();
    for (mut tf, mut avatar) in &mut query {
        let y = avatar.step(tf.translation.y, dt, &config);
        if y != tf.translation.y {
            tf.translation.y = y;
        }
    }
}

/// While paused, let the player sink back to the floor.
#[allow(clippy::needless_pass_by_value)]
pub fn paused_descent_system(
    time: Res<Time>,
    settings: Res<Settings>,
    mut query: Query<&mut Transform, (With<Player>, With<AvatarKinematics>)>,
) {
    let config = KinematicsConfig::from_settings(&settings);
    let dt = time.delta_seconds();
    for mut tf in &mut query {
        let y = AvatarKinematics::paused_descent(tf.translation.y, dt, &config);
        if y != tf.translation.y {
            tf.translation.y = y;
        }
    }
}
