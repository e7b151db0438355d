use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::window::{Window, WindowPlugin};
use voxelbox::debug::DebugDumpPlugin;
use voxelbox::input::{
    keyboard_input_system, paused, playing, InputState, KeyBindings, Palette, PauseToggled,
    SelectionChanged,
};
use voxelbox::player::{avatar_kinematics, camera_look, cursor_grab, paused_descent_system, player_movement};
use voxelbox::settings::loader::{self as settings_loader, SETTINGS_DIR};
use voxelbox::ui::{
    apply_pause, highlight_selected_slot, pause_menu_buttons, recolor_inventory, spawn_hud,
    sync_readout_interval, update_readout, MemoryProbe, ReadoutTimer, ResetWorld,
};
use voxelbox::voxel::{
    cull_voxels_system, toggle_outlines_system, voxel_interaction, CullingState, OutlineVisibility,
    VoxelAssets, VoxelRegistry,
};

mod app;

const SKY_COLOR: Color = Color::srgb(0x87 as f32 / 255.0, 0xCE as f32 / 255.0, 0xEB as f32 / 255.0);

fn main() {
    let settings = settings_loader::load_settings_from_dir(SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(SETTINGS_DIR);

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "voxelbox".to_string(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: app::present_mode(settings.graphics.vsync),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(DebugDumpPlugin);

    app.insert_resource(ClearColor(SKY_COLOR));

    app.insert_resource(KeyBindings::from_settings(&settings));
    app.insert_resource(Palette::from_settings(&settings));
    app.insert_resource(VoxelRegistry::with_bounds(settings.world.bounds));
    app.insert_resource(OutlineVisibility(settings.graphics.show_outlines));
    app.insert_resource(ReadoutTimer::from_settings(&settings));
    app.insert_resource(InputState::default());
    app.insert_resource(CullingState::default());
    app.insert_resource(MemoryProbe::default());
    app.insert_resource(settings);
    app.insert_resource(settings_watcher);
    // Reads cube size from `Settings`, so it goes after it.
    app.init_resource::<VoxelAssets>();

    app.add_event::<SelectionChanged>();
    app.add_event::<PauseToggled>();
    app.add_event::<ResetWorld>();

    app.add_systems(Startup, (app::spawn_player, app::spawn_world, spawn_hud));

    app.add_systems(
        Update,
        (
            settings_loader::check_settings_changes,
            app::sync_world_settings,
            app::sync_vsync_settings,
            app::sync_projection_settings,
            sync_readout_interval,
        )
            .chain(),
    );

    // Frame loop: input -> movement -> interaction -> visibility -> kinematics.
    app.add_systems(
        Update,
        (
            keyboard_input_system,
            (
                camera_look,
                player_movement,
                voxel_interaction,
                cursor_grab,
                cull_voxels_system,
                avatar_kinematics,
            )
                .chain()
                .run_if(playing),
            paused_descent_system.run_if(paused),
        )
            .chain()
            .after(app::sync_world_settings),
    );

    app.add_systems(
        Update,
        (
            toggle_outlines_system,
            pause_menu_buttons,
            app::reset_world,
            apply_pause,
            highlight_selected_slot,
            recolor_inventory,
            update_readout,
        )
            .chain()
            .after(keyboard_input_system),
    );

    app.run();
}
