//! Horizontal player movement.
//!
//! Held movement keys (from `InputState`) move the player across the ground
//! plane relative to where the camera faces. Height is left to
//! `kinematics`; looking up or down does not change walking speed.

use crate::input::InputState;
use crate::player::Player;
use bevy::prelude::*;

/// Horizontal displacement for one frame.
///
/// # Arguments
/// * `axes` - `(right, forward)` intent from `InputState::movement_axes`
/// * `forward` - camera forward vector (any pitch)
/// * `speed` - world units per second
/// * `dt` - frame time in seconds
///
/// Diagonal input is normalized so it is no faster than straight input.
#[must_use]
pub fn movement_delta(axes: Vec2, forward: Vec3, speed: f32, dt: f32) -> Vec3 {
    let fwd = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let right = Vec3::new(-fwd.z, 0.0, fwd.x);
    let dir = right * axes.x + fwd * axes.y;
    if dir.length_squared() > 0.0001 {
        dir.normalize() * speed * dt
    } else {
        Vec3::ZERO
    }
}

/// Move the player according to held keys.
///
/// # Arguments
/// * `input` - held movement flags
/// * `time` - delta time used to scale movement
/// * `settings` - move speed
/// * `query` - the player's `Transform`
#[allow(clippy::needless_pass_by_value)]
pub fn player_movement(
    input: Res<InputState>,
    time: Res<Time>,
    settings: Res<crate::settings::Settings>,
    mut query: Query<&mut Transform, With<Player>>,
) {
    let axes = input.movement_axes();
    if axes == Vec2::ZERO {
        return;
    }
    let dt = time.delta_seconds();
    for mut tf in &mut query {
        let delta = movement_delta(axes, *tf.forward(), settings.player.move_speed, dt);
        tf.translation += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_follows_camera_yaw() {
        let d = movement_delta(Vec2::new(0.0, 1.0), Vec3::NEG_Z, 6.0, 0.5);
        assert!((d - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-5);

        let d = movement_delta(Vec2::new(1.0, 0.0), Vec3::NEG_Z, 6.0, 0.5);
        assert!((d - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn pitch_does_not_change_ground_speed() {
        let looking_down = Vec3::new(0.0, -0.9, -0.1).normalize();
        let d = movement_delta(Vec2::new(0.0, 1.0), looking_down, 6.0, 1.0);
        assert_eq!(d.y, 0.0);
        assert!((d.length() - 6.0).abs() < 1e-4);
    }

    #[test]
    fn diagonal_is_normalized() {
        let d = movement_delta(Vec2::new(1.0, 1.0), Vec3::NEG_Z, 6.0, 1.0);
        assert!((d.length() - 6.0).abs() < 1e-4);
    }

    #[test]
    fn no_input_no_motion() {
        assert_eq!(movement_delta(Vec2::ZERO, Vec3::NEG_Z, 6.0, 1.0), Vec3::ZERO);
    }
}
