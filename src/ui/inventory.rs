//! Inventory bar: ten color swatches along the bottom edge with the selected
//! one framed.

use bevy::prelude::*;

use crate::input::{Palette, SelectionChanged, SLOT_KEYS};
use crate::settings::PALETTE_SIZE;

const SLOT_SIZE: f32 = 44.0;
const SELECTED_BORDER: Color = Color::WHITE;
const IDLE_BORDER: Color = Color::srgb(0.2, 0.2, 0.2);

/// A swatch for palette slot `.0`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventorySlot(pub usize);

#[must_use]
pub fn slot_border(slot: usize, selected: usize) -> Color {
    if slot == selected { SELECTED_BORDER } else { IDLE_BORDER }
}

fn key_label(slot: usize) -> String {
    // Slot keys are Digit1..Digit9, Digit0.
    let n = (slot + 1) % SLOT_KEYS.len();
    n.to_string()
}

pub fn spawn_inventory(commands: &mut Commands, palette: &Palette, selected: usize) {
    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                bottom: Val::Px(12.0),
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                column_gap: Val::Px(6.0),
                ..default()
            },
            ..default()
        })
        .with_children(|bar| {
            for slot in 0..PALETTE_SIZE {
                bar.spawn((
                    NodeBundle {
                        style: Style {
                            width: Val::Px(SLOT_SIZE),
                            height: Val::Px(SLOT_SIZE),
                            border: UiRect::all(Val::Px(3.0)),
                            justify_content: JustifyContent::FlexEnd,
                            align_items: AlignItems::FlexEnd,
                            ..default()
                        },
                        background_color: BackgroundColor(palette.color(slot).to_color()),
                        border_color: BorderColor(slot_border(slot, selected)),
                        ..default()
                    },
                    InventorySlot(slot),
                ))
                .with_children(|swatch| {
                    swatch.spawn(TextBundle::from_section(
                        key_label(slot),
                        TextStyle {
                            font_size: 12.0,
                            color: Color::srgb(0.5, 0.5, 0.5),
                            ..default()
                        },
                    ));
                });
            }
        });
}

/// Move the highlight to the newly selected slot.
pub fn highlight_selected_slot(
    mut events: EventReader<SelectionChanged>,
    mut slots: Query<(&InventorySlot, &mut BorderColor)>,
) {
    let Some(last) = events.read().last() else { return };
    for (slot, mut border) in &mut slots {
        border.0 = slot_border(slot.0, last.slot);
    }
}

/// Repaint swatches when the palette changes (settings reload).
#[allow(clippy::needless_pass_by_value)]
pub fn recolor_inventory(palette: Res<Palette>, mut slots: Query<(&InventorySlot, &mut BackgroundColor)>) {
    if !palette.is_changed() {
        return;
    }
    for (slot, mut bg) in &mut slots {
        bg.0 = palette.color(slot.0).to_color();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::VoxelColor;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn labels_follow_number_row() {
        assert_eq!(key_label(0), "1");
        assert_eq!(key_label(8), "9");
        assert_eq!(key_label(9), "0");
    }

    #[test]
    fn selection_event_moves_highlight() {
        let mut app = App::new();
        app.add_event::<SelectionChanged>();
        app.world_mut().run_system_once(|mut commands: Commands| {
            spawn_inventory(&mut commands, &Palette::default(), 0);
        });
        app.world_mut().send_event(SelectionChanged { slot: 2, color: VoxelColor(0x0000FF) });
        app.world_mut().run_system_once(highlight_selected_slot);

        let world = app.world_mut();
        let mut q = world.query::<(&InventorySlot, &BorderColor)>();
        let mut seen = 0;
        for (slot, border) in q.iter(world) {
            seen += 1;
            assert_eq!(border.0, slot_border(slot.0, 2));
        }
        assert_eq!(seen, PALETTE_SIZE);
    }
}
