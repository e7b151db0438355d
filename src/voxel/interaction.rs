//! Pointer interaction with voxels (removing with the primary button,
//! placing with the secondary one).
//!
//! The pointer is locked while playing, so every click aims through the
//! crosshair: one ray from the camera origin along its forward axis. The ray
//! is tested against every voxel's box and the nearest hit wins. Placement
//! goes into the neighbouring cell across the face the ray entered through.
//!
//! # Example
//!
//! ```
//! use bevy::math::{IVec3, Vec3};
//! use voxelbox::voxel::{pick, VoxelColor, VoxelRegistry};
//!
//! let mut registry = VoxelRegistry::new();
//! registry.place(IVec3::new(0, 0, -4), VoxelColor::WHITE).unwrap();
//!
//! let hit = pick(&registry, Vec3::ZERO, Vec3::NEG_Z, 1.0, 100.0).expect("should hit");
//! assert_eq!(hit.cell, IVec3::new(0, 0, -4));
//! assert_eq!(hit.normal, IVec3::Z);
//! assert_eq!(hit.placement_cell(), IVec3::new(0, 0, -3));
//! ```
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use super::{cube_bounds, VoxelId, VoxelRegistry, VoxelScene};
use crate::input::{InputState, Palette};
use crate::player::Player;
use crate::settings::Settings;

/// Result of a ray pick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub id: VoxelId,
    pub cell: IVec3,
    /// Distance from the ray origin to the entry point.
    pub distance: f32,
    /// Outward normal of the face the ray entered through.
    pub normal: IVec3,
}

impl PickHit {
    /// Cell a new voxel goes into when placing against this hit.
    #[must_use]
    pub fn placement_cell(&self) -> IVec3 {
        self.cell + self.normal
    }
}

/// Slab test of a ray against an axis-aligned box.
///
/// # Arguments
/// * `origin` - ray start
/// * `direction` - ray direction (normalized, so the result is a distance)
/// * `min`, `max` - box corners
///
/// # Returns
/// `(t, normal)` for the entry point, or `None` if the ray misses or starts
/// inside the box (faces are only hit from the outside).
#[must_use]
pub fn ray_box(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<(f32, IVec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut axis = None;

    for i in 0..3 {
        let o = origin[i];
        let d = direction[i];
        if d.abs() <= f32::EPSILON {
            if o < min[i] || o > max[i] {
                return None;
            }
            continue;
        }
        let mut t0 = (min[i] - o) / d;
        let mut t1 = (max[i] - o) / d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            axis = Some(i);
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    let axis = axis?;
    if t_enter < 0.0 {
        return None;
    }
    let mut normal = IVec3::ZERO;
    normal[axis] = if direction[axis] > 0.0 { -1 } else { 1 };
    Some((t_enter, normal))
}

/// Nearest voxel hit by the ray, if any lies within `max_distance`.
///
/// Voxels are visited in insertion order and only a strictly closer hit
/// replaces the current best, so equidistant hits resolve to the voxel
/// placed first.
#[must_use]
pub fn pick(
    registry: &VoxelRegistry,
    origin: Vec3,
    direction: Vec3,
    cube_size: f32,
    max_distance: f32,
) -> Option<PickHit> {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }

    let mut best: Option<PickHit> = None;
    for (id, voxel) in registry.all() {
        let (min, max) = cube_bounds(voxel.position, cube_size);
        let Some((distance, normal)) = ray_box(origin, direction, min, max) else { continue };
        if distance > max_distance {
            continue;
        }
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(PickHit { id, cell: voxel.position, distance, normal });
        }
    }
    best
}

/// What a click does to the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickAction {
    Remove,
    Place,
}

impl ClickAction {
    #[must_use]
    pub fn from_button(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(ClickAction::Remove),
            MouseButton::Right => Some(ClickAction::Place),
            _ => None,
        }
    }
}

/// System parameters for `voxel_interaction`.
#[derive(bevy::ecs::system::SystemParam)]
pub struct VoxelInteractionCtx<'w, 's> {
    pub mouse_button: Res<'w, ButtonInput<MouseButton>>,
    pub input: Res<'w, InputState>,
    pub palette: Res<'w, Palette>,
    pub settings: Res<'w, Settings>,
    pub scene: VoxelScene<'w, 's>,
    pub camera_query: Query<'w, 's, &'static GlobalTransform, With<Player>>,
    pub window_query: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
}

/// Apply mouse clicks to the world: primary removes the targeted voxel,
/// secondary places one of the selected color against the targeted face.
///
/// Clicks are ignored while paused or while the cursor is free (the click
/// that grabs the cursor does not also edit the world). Misses and rejected
/// edits are silent.
///
/// # Arguments
/// * `ctx` - mouse input, input state, palette, voxel scene and camera/window queries
pub fn voxel_interaction(mut ctx: VoxelInteractionCtx) {
    if ctx.input.paused {
        return;
    }
    let Ok(window) = ctx.window_query.get_single() else { return };
    if window.cursor.grab_mode != CursorGrabMode::Locked {
        return;
    }

    let Some(action) = ctx
        .mouse_button
        .get_just_pressed()
        .find_map(|b| ClickAction::from_button(*b))
    else {
        return;
    };

    let Ok(camera) = ctx.camera_query.get_single() else { return };
    let origin = camera.translation();
    let direction = camera.forward();
    let cube_size = ctx.scene.cube_size();
    let reach = ctx.settings.world.reach;

    let Some(hit) = pick(ctx.scene.registry(), origin, *direction, cube_size, reach) else {
        return;
    };

    match action {
        ClickAction::Remove => match ctx.scene.remove(hit.id) {
            Ok(voxel) => debug!("removed voxel at {:?}", voxel.position),
            Err(e) => debug!("remove ignored: {e}"),
        },
        ClickAction::Place => {
            let color = ctx.palette.color(ctx.input.selected_slot);
            let cell = hit.placement_cell();
            match ctx.scene.place(cell, color) {
                Ok(id) => debug!("placed voxel {id} at {cell:?} with color {color}"),
                Err(e) => debug!("place ignored: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyBindings, PauseToggled, SelectionChanged};
    use crate::voxel::{ground_cells, OutlineVisibility, VoxelAssets, VoxelBody, VoxelColor};
    use bevy::ecs::system::RunSystemOnce;

    fn ground() -> VoxelRegistry {
        let mut registry = VoxelRegistry::new();
        for cell in ground_cells(20) {
            registry.place(cell, VoxelColor::DIRT).unwrap();
        }
        registry
    }

    #[test]
    fn ray_enters_through_facing_side() {
        let (t, n) = ray_box(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, Vec3::splat(-0.5), Vec3::splat(0.5)).unwrap();
        assert!((t - 4.5).abs() < 1e-5);
        assert_eq!(n, IVec3::NEG_X);

        let (_, n) = ray_box(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, Vec3::splat(-0.5), Vec3::splat(0.5)).unwrap();
        assert_eq!(n, IVec3::Y);
    }

    #[test]
    fn ray_misses_and_inside_start() {
        assert!(ray_box(Vec3::new(-5.0, 2.0, 0.0), Vec3::X, Vec3::splat(-0.5), Vec3::splat(0.5)).is_none());
        assert!(ray_box(Vec3::new(5.0, 0.0, 0.0), Vec3::X, Vec3::splat(-0.5), Vec3::splat(0.5)).is_none());
        assert!(ray_box(Vec3::ZERO, Vec3::X, Vec3::splat(-0.5), Vec3::splat(0.5)).is_none());
    }

    #[test]
    fn pick_returns_nearest() {
        let registry = ground();
        let origin = Vec3::new(5.0, 2.0, 5.0);
        let hit = pick(&registry, origin, Vec3::NEG_Y, 1.0, 100.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(5, 0, 5));
        assert_eq!(hit.normal, IVec3::Y);
        assert!((hit.distance - 1.5).abs() < 1e-5);
        assert_eq!(hit.placement_cell(), IVec3::new(5, 1, 5));
    }

    #[test]
    fn pick_through_a_row_hits_the_first_cube() {
        let registry = ground();
        // Skim along the row z = 3 from outside the grid.
        let hit = pick(&registry, Vec3::new(-4.0, 0.0, 3.0), Vec3::X, 1.0, 100.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(0, 0, 3));
        assert_eq!(hit.placement_cell(), IVec3::new(-1, 0, 3));
    }

    #[test]
    fn pick_respects_reach_and_misses() {
        let registry = ground();
        assert!(pick(&registry, Vec3::new(5.0, 10.0, 5.0), Vec3::NEG_Y, 1.0, 5.0).is_none());
        assert!(pick(&registry, Vec3::new(5.0, 2.0, 5.0), Vec3::Y, 1.0, 100.0).is_none());
        assert!(pick(&registry, Vec3::new(5.0, 2.0, 5.0), Vec3::ZERO, 1.0, 100.0).is_none());
    }

    #[test]
    fn equidistant_hits_prefer_first_placed() {
        // Ray along the shared edge of two cubes.
        let mut registry = VoxelRegistry::new();
        let first = registry.place(IVec3::new(0, 0, 0), VoxelColor::WHITE).unwrap();
        registry.place(IVec3::new(1, 0, 0), VoxelColor::BLACK).unwrap();
        let hit = pick(&registry, Vec3::new(0.5, 5.0, 0.0), Vec3::NEG_Y, 1.0, 100.0).unwrap();
        assert_eq!(hit.id, first);
    }

    #[test]
    fn removing_origin_then_placing_against_neighbour() {
        let mut registry = ground();

        let hit = pick(&registry, Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 1.0, 100.0).unwrap();
        assert_eq!(hit.cell, IVec3::ZERO);
        registry.remove(hit.id).unwrap();
        assert_eq!(registry.len(), 399);

        // Aim at the -x face of (1, 0, 0) from inside the hole left behind.
        let hit = pick(&registry, Vec3::new(0.0, 0.0, 0.0), Vec3::X, 1.0, 100.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(1, 0, 0));
        assert_eq!(hit.normal, IVec3::NEG_X);
        let red = VoxelColor(0xFF0000);
        let id = registry.place(hit.placement_cell(), red).unwrap();
        let placed = registry.get(id).unwrap();
        assert_eq!(placed.position, IVec3::ZERO);
        assert_eq!(placed.color, red);
        assert_eq!(registry.len(), 400);
    }

    fn click_world() -> World {
        let mut world = World::new();
        world.insert_resource(VoxelRegistry::new());
        world.insert_resource(VoxelAssets::new(Handle::default(), Handle::default(), 1.0));
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<OutlineVisibility>();
        world.insert_resource(Settings::default());
        world.insert_resource(InputState::default());
        world.insert_resource(Palette::default());
        world.insert_resource(KeyBindings::default());
        world.insert_resource(ButtonInput::<KeyCode>::default());
        world.insert_resource(ButtonInput::<MouseButton>::default());
        world.init_resource::<Events<SelectionChanged>>();
        world.init_resource::<Events<PauseToggled>>();

        let mut window = Window::default();
        window.cursor.grab_mode = CursorGrabMode::Locked;
        world.spawn((window, PrimaryWindow));
        // Standing at the spawn point, looking straight down.
        let eye = Transform::from_xyz(5.0, 2.0, 5.0).looking_to(Vec3::NEG_Y, Vec3::NEG_Z);
        world.spawn((Player, GlobalTransform::from(eye)));
        world
    }

    fn spawn_grid(mut scene: VoxelScene) -> usize {
        scene.spawn_ground(20, VoxelColor::DIRT)
    }

    fn click(world: &mut World, button: MouseButton) {
        {
            let mut mouse = world.resource_mut::<ButtonInput<MouseButton>>();
            mouse.clear();
            mouse.press(button);
        }
        (&mut *world).run_system_once(voxel_interaction);
        world.resource_mut::<ButtonInput<MouseButton>>().release(button);
    }

    fn color_at(world: &World, cell: IVec3) -> Option<VoxelColor> {
        let registry = world.resource::<VoxelRegistry>();
        registry.at(cell).and_then(|id| registry.get(id)).map(|v| v.color)
    }

    #[test]
    fn placed_voxels_take_the_selected_slot_color() {
        let mut world = click_world();
        world.run_system_once(spawn_grid);

        world.resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::Digit3);
        world.run_system_once(crate::input::keyboard_input_system);

        let green = VoxelColor(0x00FF00);
        click(&mut world, MouseButton::Right);
        assert_eq!(color_at(&world, IVec3::new(5, 1, 5)), Some(green));
        // The eye now sits inside cell (5, 2, 5); the next click fills it.
        click(&mut world, MouseButton::Right);
        assert_eq!(color_at(&world, IVec3::new(5, 2, 5)), Some(green));
        assert_eq!(world.resource::<VoxelRegistry>().len(), 402);
    }

    #[test]
    fn primary_click_removes_the_targeted_voxel() {
        let mut world = click_world();
        world.run_system_once(spawn_grid);

        click(&mut world, MouseButton::Left);
        assert_eq!(color_at(&world, IVec3::new(5, 0, 5)), None);
        assert_eq!(world.resource::<VoxelRegistry>().len(), 399);
        let mut bodies = world.query_filtered::<Entity, With<VoxelBody>>();
        assert_eq!(bodies.iter(&world).count(), 399);
    }

    #[test]
    fn clicks_ignored_while_paused_or_unlocked() {
        let mut world = click_world();
        world.run_system_once(spawn_grid);

        world.resource_mut::<InputState>().paused = true;
        click(&mut world, MouseButton::Left);
        assert_eq!(world.resource::<VoxelRegistry>().len(), 400);

        world.resource_mut::<InputState>().paused = false;
        let mut windows = world.query::<&mut Window>();
        windows.single_mut(&mut world).cursor.grab_mode = CursorGrabMode::None;
        click(&mut world, MouseButton::Left);
        assert_eq!(world.resource::<VoxelRegistry>().len(), 400);
    }

    #[test]
    fn buttons_map_to_actions() {
        assert_eq!(ClickAction::from_button(MouseButton::Left), Some(ClickAction::Remove));
        assert_eq!(ClickAction::from_button(MouseButton::Right), Some(ClickAction::Place));
        assert_eq!(ClickAction::from_button(MouseButton::Middle), None);
    }
}
