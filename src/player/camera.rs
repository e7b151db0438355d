//! Mouse-look and pointer lock.
//!
//! `camera_look` turns mouse motion into yaw/pitch on the player while the
//! pointer is locked. `cursor_grab` locks the pointer on a click during play
//! and frees it on Escape. Pausing also frees it (see the app's pause
//! handling).

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::input::InputState;
use crate::player::Player;
use crate::settings::Settings;

const CAMERA_MAX_PITCH_DEG: f32 = 89.0;

/// The player's look orientation in radians.
#[derive(Component, Default, Debug, Clone, Copy, PartialEq)]
pub struct PlayerLook {
    /// Rotation around Y.
    pub yaw: f32,
    /// Rotation around X, clamped short of straight up/down.
    pub pitch: f32,
}

impl PlayerLook {
    /// Apply a raw mouse delta (pixels) and clamp pitch.
    pub fn apply_delta(&mut self, delta: Vec2, settings: &Settings) {
        let max_pitch = CAMERA_MAX_PITCH_DEG.to_radians();
        let scale = settings.controls.mouse_sensitivity / 10000.0;

        self.yaw -= delta.x * scale;
        self.pitch = (self.pitch - delta.y * scale).clamp(-max_pitch, max_pitch);
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(bevy::math::EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

/// Apply mouse-look to the player.
///
/// # Arguments
/// * `windows` - primary window (look only applies while the pointer is locked)
/// * `motion` - mouse motion events for this update
/// * `query` - the player's `(Transform, PlayerLook)`
#[allow(clippy::needless_pass_by_value)]
pub fn camera_look(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut motion: EventReader<MouseMotion>,
    mut query: Query<(&mut Transform, &mut PlayerLook), With<Player>>,
    settings: Res<Settings>,
) {
    let mut delta = Vec2::ZERO;
    for ev in motion.read() {
        let mut axis = ev.delta;
        if settings.controls.invert_x { axis.x = -axis.x; }
        if settings.controls.invert_y { axis.y = -axis.y; }
        delta += axis;
    }

    if delta == Vec2::ZERO {
        return;
    }

    let Ok(window) = windows.get_single() else { return };
    if window.cursor.grab_mode != CursorGrabMode::Locked {
        return;
    }

    for (mut transform, mut look) in &mut query {
        look.apply_delta(delta, &settings);
        transform.rotation = look.rotation();
    }
}

/// Lock or release the pointer.
pub fn set_cursor_locked(window: &mut Window, locked: bool) {
    if locked {
        window.cursor.grab_mode = CursorGrabMode::Locked;
        window.cursor.visible = false;
    } else {
        window.cursor.grab_mode = CursorGrabMode::None;
        window.cursor.visible = true;
    }
}

/// Lock the pointer on click while playing; Escape releases it.
///
/// # Arguments
/// * `windows` - primary window
/// * `mouse` - mouse buttons (any press locks)
/// * `keys` - keyboard (Escape unlocks)
/// * `input` - clicks do nothing while paused
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_grab(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    input: Res<InputState>,
) {
    let Ok(mut window) = windows.get_single_mut() else { return };
    if keys.just_pressed(KeyCode::Escape) {
        set_cursor_locked(&mut window, false);
        return;
    }
    if !input.paused
        && window.cursor.grab_mode != CursorGrabMode::Locked
        && mouse.get_just_pressed().next().is_some()
    {
        set_cursor_locked(&mut window, true);
    }
}
