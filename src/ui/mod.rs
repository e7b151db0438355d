//! Heads-up display: crosshair, FPS/memory readout, inventory bar and pause
//! overlay.
//!
//! The HUD never owns game state. It reads `InputState`/`Palette` once when
//! spawned and then follows `SelectionChanged` and `PauseToggled` events.

pub mod inventory;
pub mod pause;

pub use inventory::*;
pub use pause::*;

use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use sysinfo::{Pid, ProcessExt, System, SystemExt};

use crate::input::{InputState, Palette};
use crate::settings::Settings;

#[derive(Component)]
pub struct ReadoutText;

/// Refresh cadence of the readout line.
#[derive(Resource)]
pub struct ReadoutTimer(pub Timer);

impl ReadoutTimer {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let secs = settings.hud.readout_interval_secs.max(0.05);
        Self(Timer::from_seconds(secs, TimerMode::Repeating))
    }
}

/// Memory figures in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemorySample {
    pub process_bytes: u64,
    pub total_bytes: u64,
}

/// Samples this process's resident memory and the machine total.
#[derive(Resource)]
pub struct MemoryProbe {
    system: System,
    pid: Option<Pid>,
}

impl Default for MemoryProbe {
    fn default() -> Self {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| warn!("memory readout unavailable: {e}"))
            .ok();
        Self { system: System::new(), pid }
    }
}

impl MemoryProbe {
    pub fn sample(&mut self) -> MemorySample {
        self.system.refresh_memory();
        let process_bytes = self.pid.map_or(0, |pid| {
            if self.system.refresh_process(pid) {
                self.system.process(pid).map_or(0, |p| p.memory())
            } else {
                0
            }
        });
        MemorySample {
            process_bytes,
            total_bytes: self.system.total_memory(),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// `FPS: 60 | Memory: 123.45 MB / 16384.00 MB`
#[must_use]
pub fn format_readout(fps: f64, memory: MemorySample) -> String {
    format!(
        "FPS: {:.0} | Memory: {:.2} MB / {:.2} MB",
        fps,
        bytes_to_mb(memory.process_bytes),
        bytes_to_mb(memory.total_bytes)
    )
}

/// Spawn a crosshair UI element centered on the screen.
pub fn spawn_crosshair(commands: &mut Commands) {
    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            ..default()
        })
        .with_children(|p| {
            for (w, h) in [(20.0, 2.0), (2.0, 20.0)] {
                p.spawn(NodeBundle {
                    style: Style {
                        position_type: PositionType::Absolute,
                        width: Val::Px(w),
                        height: Val::Px(h),
                        ..default()
                    },
                    background_color: Color::WHITE.into(),
                    ..default()
                });
            }
        });
}

fn spawn_readout(commands: &mut Commands) {
    commands.spawn((
        TextBundle::from_section(
            "FPS: -- | Memory: --",
            TextStyle {
                font_size: 18.0,
                color: Color::WHITE,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        }),
        ReadoutText,
    ));
}

/// Build the whole HUD.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_hud(mut commands: Commands, palette: Res<Palette>, input: Res<InputState>) {
    spawn_crosshair(&mut commands);
    spawn_readout(&mut commands);
    spawn_inventory(&mut commands, &palette, input.selected_slot);
    spawn_pause_overlay(&mut commands);
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct ReadoutCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, ReadoutTimer>,
    pub probe: ResMut<'w, MemoryProbe>,
    pub query: Query<'w, 's, &'static mut Text, With<ReadoutText>>,
}

/// Refresh the FPS/memory line once per readout interval.
pub fn update_readout(mut ctx: ReadoutCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() {
        return;
    }
    let Ok(mut text) = ctx.query.get_single_mut() else { return };

    let fps = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let memory = ctx.probe.sample();
    text.sections[0].value = format_readout(fps, memory);
}

/// Follow `hud.readout_interval_secs` when settings reload.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_readout_interval(settings: Res<Settings>, mut timer: ResMut<ReadoutTimer>) {
    if !settings.is_changed() {
        return;
    }
    let wanted = ReadoutTimer::from_settings(&settings).0.duration();
    if timer.0.duration() != wanted {
        timer.0.set_duration(wanted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readout_formats_megabytes() {
        let line = format_readout(
            59.6,
            MemorySample { process_bytes: 3 * 1024 * 1024 / 2, total_bytes: 8 * 1024 * 1024 * 1024 },
        );
        assert_eq!(line, "FPS: 60 | Memory: 1.50 MB / 8192.00 MB");
    }

    #[test]
    fn readout_interval_has_a_floor() {
        let mut settings = Settings::default();
        settings.hud.readout_interval_secs = 0.0;
        let timer = ReadoutTimer::from_settings(&settings);
        assert!(timer.0.duration().as_secs_f32() > 0.0);
    }
}
