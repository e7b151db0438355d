//! Pause overlay with Resume / Reset / Quit.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::input::{InputState, PauseToggled};
use crate::player::set_cursor_locked;

const BUTTON_IDLE: Color = Color::srgb(0.15, 0.15, 0.15);
const BUTTON_HOVER: Color = Color::srgb(0.3, 0.3, 0.3);

/// Root node of the overlay.
#[derive(Component)]
pub struct PauseOverlay;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseButton {
    Resume,
    Reset,
    Quit,
}

impl PauseButton {
    fn label(self) -> &'static str {
        match self {
            PauseButton::Resume => "Resume",
            PauseButton::Reset => "Reset",
            PauseButton::Quit => "Quit",
        }
    }
}

/// Rebuild the world and player from scratch.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ResetWorld;

pub fn spawn_pause_overlay(commands: &mut Commands) {
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(12.0),
                    ..default()
                },
                background_color: Color::srgba(0.0, 0.0, 0.0, 0.6).into(),
                visibility: Visibility::Hidden,
                z_index: ZIndex::Global(10),
                ..default()
            },
            PauseOverlay,
        ))
        .with_children(|root| {
            root.spawn(TextBundle::from_section(
                "Paused",
                TextStyle {
                    font_size: 48.0,
                    color: Color::WHITE,
                    ..default()
                },
            ));
            for button in [PauseButton::Resume, PauseButton::Reset, PauseButton::Quit] {
                root.spawn((
                    ButtonBundle {
                        style: Style {
                            width: Val::Px(200.0),
                            height: Val::Px(48.0),
                            justify_content: JustifyContent::Center,
                            align_items: AlignItems::Center,
                            ..default()
                        },
                        background_color: BUTTON_IDLE.into(),
                        ..default()
                    },
                    button,
                ))
                .with_children(|b| {
                    b.spawn(TextBundle::from_section(
                        button.label(),
                        TextStyle {
                            font_size: 24.0,
                            color: Color::WHITE,
                            ..default()
                        },
                    ));
                });
            }
        });
}

/// Show or hide the overlay and release or take the pointer when the game is
/// paused or resumed.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_pause(
    mut events: EventReader<PauseToggled>,
    mut overlay: Query<&mut Visibility, With<PauseOverlay>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Some(last) = events.read().last() else { return };
    let paused = last.paused;
    for mut vis in &mut overlay {
        *vis = if paused { Visibility::Visible } else { Visibility::Hidden };
    }
    if let Ok(mut window) = windows.get_single_mut() {
        set_cursor_locked(&mut window, !paused);
    }
}

/// Handle clicks on the overlay buttons.
#[allow(clippy::needless_pass_by_value, clippy::type_complexity)]
pub fn pause_menu_buttons(
    mut buttons: Query<(&Interaction, &PauseButton, &mut BackgroundColor), Changed<Interaction>>,
    mut input: ResMut<InputState>,
    mut pause: EventWriter<PauseToggled>,
    mut reset: EventWriter<ResetWorld>,
    mut exit: EventWriter<AppExit>,
) {
    for (interaction, button, mut bg) in &mut buttons {
        match interaction {
            Interaction::Hovered => bg.0 = BUTTON_HOVER,
            Interaction::None => bg.0 = BUTTON_IDLE,
            Interaction::Pressed => match button {
                PauseButton::Resume => {
                    if input.paused {
                        let paused = input.toggle_pause();
                        pause.send(PauseToggled { paused });
                    }
                }
                PauseButton::Reset => {
                    info!("resetting world");
                    reset.send(ResetWorld);
                }
                PauseButton::Quit => {
                    info!("quit requested");
                    exit.send(AppExit::Success);
                }
            },
        }
    }
}
