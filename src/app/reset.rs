//! The pause menu's Reset: rebuild the ground grid and put the player back
//! at the spawn point, unpaused, with the first palette slot selected.
//! Grid size, cube size and spawn point are re-read from settings here.
use bevy::prelude::*;
use voxelbox::input::{InputState, Palette, PauseToggled, SelectionChanged};
use voxelbox::player::{AvatarKinematics, Player, PlayerLook};
use voxelbox::settings::Settings;
use voxelbox::ui::ResetWorld;
use voxelbox::voxel::{CullingState, VoxelColor, VoxelScene};

use super::setup::spawn_translation;

#[derive(bevy::ecs::system::SystemParam)]
pub struct ResetCtx<'w, 's> {
    pub events: EventReader<'w, 's, ResetWorld>,
    pub scene: VoxelScene<'w, 's>,
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub settings: Res<'w, Settings>,
    pub input: ResMut<'w, InputState>,
    pub palette: Res<'w, Palette>,
    pub culling: ResMut<'w, CullingState>,
    pub player: Query<
        'w,
        's,
        (&'static mut Transform, &'static mut PlayerLook, &'static mut AvatarKinematics),
        With<Player>,
    >,
    pub pause: EventWriter<'w, PauseToggled>,
    pub selection: EventWriter<'w, SelectionChanged>,
}

/// Handle `ResetWorld`.
pub fn reset_world(mut ctx: ResetCtx<'_, '_>) {
    if ctx.events.read().count() == 0 {
        return;
    }

    let removed = ctx.scene.clear();
    let world = &ctx.settings.world;
    ctx.scene.resize(world.cube_size, &mut ctx.meshes);
    let placed = ctx.scene.spawn_ground(world.grid_size, VoxelColor(world.ground_color));
    info!("reset: removed {removed} voxels, placed {placed}");

    let spawn = spawn_translation(&ctx.settings);
    for (mut tf, mut look, mut avatar) in &mut ctx.player {
        *look = PlayerLook::default();
        *avatar = AvatarKinematics::default();
        *tf = Transform::from_translation(spawn).with_rotation(look.rotation());
    }

    let was_paused = ctx.input.paused;
    ctx.input.reset();
    if was_paused {
        ctx.pause.send(PauseToggled { paused: false });
    }
    ctx.selection.send(SelectionChanged { slot: 0, color: ctx.palette.color(0) });
    ctx.culling.invalidate();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use voxelbox::voxel::{OutlineVisibility, VoxelAssets, VoxelBody, VoxelRegistry};

    fn reset_app(settings: Settings) -> App {
        let mut app = App::new();
        app.insert_resource(VoxelRegistry::new());
        app.insert_resource(VoxelAssets::new(Handle::default(), Handle::default(), 1.0));
        app.init_resource::<Assets<StandardMaterial>>();
        app.init_resource::<Assets<Mesh>>();
        app.init_resource::<OutlineVisibility>();
        app.init_resource::<CullingState>();
        app.insert_resource(InputState { paused: true, selected_slot: 4, ..InputState::default() });
        app.insert_resource(Palette::from_settings(&settings));
        app.insert_resource(settings);
        app.add_event::<ResetWorld>();
        app.add_event::<PauseToggled>();
        app.add_event::<SelectionChanged>();
        app.world_mut().spawn((
            Player,
            Transform::from_xyz(0.0, 9.0, 0.0),
            PlayerLook { yaw: 1.0, pitch: 0.5 },
            AvatarKinematics::default(),
        ));
        app
    }

    #[test]
    fn reset_rebuilds_at_the_reloaded_cube_size() {
        let mut settings = Settings::default();
        settings.world.grid_size = 4;
        settings.world.cube_size = 2.0;
        let mut app = reset_app(settings);

        app.world_mut().send_event(ResetWorld);
        app.world_mut().run_system_once(reset_world);

        let world = app.world_mut();
        assert_eq!(world.resource::<VoxelRegistry>().len(), 16);
        assert_eq!(world.resource::<VoxelAssets>().cube_size, 2.0);
        let mut bodies = world.query_filtered::<&Transform, With<VoxelBody>>();
        assert!(bodies.iter(world).any(|tf| tf.translation == Vec3::new(6.0, 0.0, 6.0)));

        let input = world.resource::<InputState>();
        assert!(!input.paused);
        assert_eq!(input.selected_slot, 0);

        let mut player = world.query_filtered::<(&Transform, &PlayerLook), With<Player>>();
        let (tf, look) = player.single(world);
        assert_eq!(tf.translation, Vec3::new(5.0, 2.0, 5.0));
        assert_eq!(look.yaw, 0.0);
    }

    #[test]
    fn reset_without_event_does_nothing() {
        let mut app = reset_app(Settings::default());
        app.world_mut().run_system_once(reset_world);
        assert!(app.world().resource::<VoxelRegistry>().is_empty());
        assert!(app.world().resource::<InputState>().paused);
    }
}
