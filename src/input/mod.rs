//! Keyboard state: held movement keys, palette selection and pause.
//!
//! `InputState` is the single source of truth for what the player is asking
//! for. The keyboard system writes it; movement, interaction and the HUD read
//! it. Key names in settings are mapped to `KeyCode`s once, into
//! `KeyBindings`, and rebuilt when settings reload.
//!
//! # Example:
//!
//! ```
//! use bevy::prelude::KeyCode;
//! use voxelbox::input::{slot_for_key, InputState};
//!
//! let mut input = InputState::default();
//! input.select_slot(slot_for_key(KeyCode::Digit3).unwrap());
//! assert_eq!(input.selected_slot, 2);
//! ```
use bevy::prelude::*;
use std::collections::HashMap;

use crate::player::{AvatarKinematics, KinematicsConfig, Player};
use crate::settings::{Settings, PALETTE_SIZE};
use crate::voxel::VoxelColor;

/// Bindable actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Pause,
    ToggleOutlines,
    DumpDebug,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Pause,
        Action::ToggleOutlines,
        Action::DumpDebug,
    ];

    /// Name used in `controls.keybinds`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Action::Forward => "forward",
            Action::Backward => "back",
            Action::Left => "left",
            Action::Right => "right",
            Action::Jump => "jump",
            Action::Pause => "pause",
            Action::ToggleOutlines => "toggle_outlines",
            Action::DumpDebug => "dump_debug",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    #[must_use]
    pub fn default_key(self) -> KeyCode {
        match self {
            Action::Forward => KeyCode::KeyW,
            Action::Backward => KeyCode::KeyS,
            Action::Left => KeyCode::KeyA,
            Action::Right => KeyCode::KeyD,
            Action::Jump => KeyCode::Space,
            Action::Pause => KeyCode::Enter,
            Action::ToggleOutlines => KeyCode::KeyO,
            Action::DumpDebug => KeyCode::F3,
        }
    }
}

/// Resolved action -> key map.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    keys: HashMap<Action, KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            keys: Action::ALL.into_iter().map(|a| (a, a.default_key())).collect(),
        }
    }
}

impl KeyBindings {
    /// Build bindings from `controls.keybinds`. Unknown action names and
    /// unparsable key names are skipped with a warning; those actions keep
    /// their default key.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let mut bindings = Self::default();
        for (action_name, key_name) in &settings.controls.keybinds {
            let Some(action) = Action::from_name(action_name) else {
                warn!("unknown keybind action '{action_name}'");
                continue;
            };
            let Some(key) = keycode_from_str(key_name) else {
                warn!("unknown key '{key_name}' for action '{action_name}'");
                continue;
            };
            bindings.keys.insert(action, key);
        }
        bindings
    }

    #[must_use]
    pub fn key(&self, action: Action) -> KeyCode {
        self.keys.get(&action).copied().unwrap_or_else(|| action.default_key())
    }

    /// Action bound to `key`, if any.
    #[must_use]
    pub fn action_for(&self, key: KeyCode) -> Option<Action> {
        Action::ALL.into_iter().find(|a| self.key(*a) == key)
    }
}

/// Convert a key name from settings (e.g. "W", "Space", "F3") into a `KeyCode`.
/// Case-insensitive.
#[must_use]
pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
        KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
        KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
        KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
        KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
        KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
    ];
    const FUNCTION: [KeyCode; 12] = [
        KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
        KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
    ];

    let s = name.trim().to_ascii_uppercase();
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_uppercase() {
            return Some(LETTERS[(c as u8 - b'A') as usize]);
        }
        if c.is_ascii_digit() {
            return Some(DIGITS[(c as u8 - b'0') as usize]);
        }
    }
    if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<usize>().ok())
        && (1..=FUNCTION.len()).contains(&n)
    {
        return Some(FUNCTION[n - 1]);
    }

    Some(match s.as_str() {
        "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
        "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
        "UP" | "ARROWUP" => KeyCode::ArrowUp,
        "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
        "ESC" | "ESCAPE" => KeyCode::Escape,
        "SPACE" => KeyCode::Space,
        "TAB" => KeyCode::Tab,
        "ENTER" | "RETURN" => KeyCode::Enter,
        "BACKSPACE" => KeyCode::Backspace,
        "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
        "RSHIFT" => KeyCode::ShiftRight,
        "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
        "RCTRL" => KeyCode::ControlRight,
        "LALT" | "ALT" => KeyCode::AltLeft,
        "RALT" => KeyCode::AltRight,
        "PAUSE" | "BREAK" => KeyCode::Pause,
        _ => return None,
    })
}

/// Number row keys in slot order: 1..9 select slots 0..8, 0 selects slot 9.
pub const SLOT_KEYS: [KeyCode; PALETTE_SIZE] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
    KeyCode::Digit0,
];

#[must_use]
pub fn slot_for_key(key: KeyCode) -> Option<usize> {
    SLOT_KEYS.iter().position(|k| *k == key)
}

/// What the player is currently asking for.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Index into the palette, `0..PALETTE_SIZE`.
    pub selected_slot: usize,
    pub paused: bool,
}

impl InputState {
    /// Record a movement key going down or up. Non-movement actions are ignored.
    pub fn set_held(&mut self, action: Action, held: bool) {
        match action {
            Action::Forward => self.forward = held,
            Action::Backward => self.backward = held,
            Action::Left => self.left = held,
            Action::Right => self.right = held,
            _ => {}
        }
    }

    /// `(right, forward)` intent, each in {-1, 0, 1}. Opposing keys cancel.
    #[must_use]
    pub fn movement_axes(&self) -> Vec2 {
        let axis = |pos: bool, neg: bool| f32::from(i8::from(pos) - i8::from(neg));
        Vec2::new(axis(self.right, self.left), axis(self.forward, self.backward))
    }

    /// Select a palette slot. Returns `false` if `slot` is out of range.
    pub fn select_slot(&mut self, slot: usize) -> bool {
        if slot >= PALETTE_SIZE {
            return false;
        }
        self.selected_slot = slot;
        true
    }

    /// Flip the paused flag and return the new value. Held movement keys
    /// are dropped so nothing keeps moving after resuming.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.paused
    }

    /// Back to startup state (nothing held, slot 0, unpaused).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The ten selectable colors.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Palette(pub [VoxelColor; PALETTE_SIZE]);

impl Default for Palette {
    fn default() -> Self {
        Self(crate::settings::WorldSettings::default().palette_colors())
    }
}

impl Palette {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self(settings.world.palette_colors())
    }

    /// Color in `slot`; out-of-range slots wrap.
    #[must_use]
    pub fn color(&self, slot: usize) -> VoxelColor {
        self.0[slot % PALETTE_SIZE]
    }
}

/// The selected palette slot changed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChanged {
    pub slot: usize,
    pub color: VoxelColor,
}

/// The game was paused or resumed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseToggled {
    pub paused: bool,
}

/// Run condition: the game is being played.
#[allow(clippy::needless_pass_by_value)]
#[must_use]
pub fn playing(input: Res<InputState>) -> bool {
    !input.paused
}

/// Run condition: the pause menu is up.
#[allow(clippy::needless_pass_by_value)]
#[must_use]
pub fn paused(input: Res<InputState>) -> bool {
    input.paused
}

/// Translate this frame's key presses into `InputState` changes, selection
/// and pause events, and jump transitions on the avatar.
///
/// Pause, slot keys and jump release are honoured while paused. Movement
/// and jump presses are not.
///
/// # Arguments
/// * `keys` - keyboard state
/// * `bindings` - resolved key bindings
/// * `input` - input state to update
/// * `palette` - colors reported with `SelectionChanged`
/// * `selection` / `pause` - event writers
/// * `avatars` - the player's kinematic state
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
pub fn keyboard_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    settings: Res<Settings>,
    mut input: ResMut<InputState>,
    palette: Res<Palette>,
    mut selection: EventWriter<SelectionChanged>,
    mut pause: EventWriter<PauseToggled>,
    mut avatars: Query<&mut AvatarKinematics, With<Player>>,
) {
    if keys.just_pressed(bindings.key(Action::Pause)) {
        let paused = input.toggle_pause();
        info!("{}", if paused { "paused" } else { "resumed" });
        pause.send(PauseToggled { paused });
    }

    for (slot, key) in SLOT_KEYS.iter().enumerate() {
        if keys.just_pressed(*key) && input.select_slot(slot) {
            selection.send(SelectionChanged { slot, color: palette.color(slot) });
        }
    }

    // Releases count even while paused; floating must not outlive a pause.
    let jump = bindings.key(Action::Jump);
    if keys.just_released(jump) {
        for mut avatar in &mut avatars {
            avatar.release_jump();
        }
    }

    if input.paused {
        return;
    }

    // Level, not edge: keys held through a resume keep moving.
    for action in [Action::Forward, Action::Backward, Action::Left, Action::Right] {
        let held = keys.pressed(bindings.key(action));
        input.set_held(action, held);
    }

    if keys.just_pressed(jump) {
        let config = KinematicsConfig::from_settings(&settings);
        for mut avatar in &mut avatars {
            avatar.press_jump(&config);
        }
    }
}
