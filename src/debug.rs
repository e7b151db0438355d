//! Debug dump (F3 default): writes diagnostics and world state to a
//! timestamped text file in `./debug-dumps/`.
//!
//! Handy for capturing a snapshot of frame rate, voxel counts and the avatar
//! without attaching a debugger.
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::input::{Action, InputState, KeyBindings};
use crate::player::{AvatarKinematics, Player};
use crate::ui::{MemoryProbe, MemorySample};
use crate::voxel::{CullingState, VoxelRegistry};

pub const DUMP_DIR: &str = "debug-dumps";

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_input_system);
    }
}

/// Everything that goes into one dump.
#[derive(Debug, Clone, Default)]
pub struct DebugReport {
    pub epoch_secs: u64,
    pub timestamp: String,
    pub fps: f64,
    pub frame_time_secs: f64,
    pub entities: usize,
    pub voxels: usize,
    pub visible_voxels: usize,
    pub generation: u64,
    pub avatar: Option<(Vec3, AvatarKinematics)>,
    pub selected_slot: usize,
    pub paused: bool,
    pub memory: MemorySample,
    pub cores: usize,
}

#[allow(clippy::cast_precision_loss)]
fn bytes_to_mb(bytes: u64) -> String {
    format!("{:.2} MB", (bytes as f64) / 1024.0 / 1024.0)
}

impl DebugReport {
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        writeln!(out, "Debug dump: {}", self.epoch_secs).ok();
        writeln!(out, "Timestamp: {} (epoch secs: {})", self.timestamp, self.epoch_secs).ok();
        writeln!(out, "FPS: {:.1}, frame_time: {:.4} ms", self.fps, self.frame_time_secs * 1000.0).ok();
        writeln!(out, "Entities: {}", self.entities).ok();
        writeln!(
            out,
            "Voxels: {} (visible {}, generation {})",
            self.voxels, self.visible_voxels, self.generation
        )
        .ok();
        match &self.avatar {
            Some((pos, k)) => {
                writeln!(
                    out,
                    "Avatar: pos=({:.2}, {:.2}, {:.2}) mode={:?} vy={:.3}",
                    pos.x, pos.y, pos.z, k.mode, k.velocity
                )
                .ok();
            }
            None => {
                writeln!(out, "Avatar: (none)").ok();
            }
        }
        writeln!(out, "Input: slot={} paused={}", self.selected_slot, self.paused).ok();
        writeln!(out, "CPU cores (available): {}", self.cores).ok();
        writeln!(
            out,
            "Memory: process={} system total={}",
            bytes_to_mb(self.memory.process_bytes),
            bytes_to_mb(self.memory.total_bytes)
        )
        .ok();
        out
    }
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugDumpCtx<'w, 's> {
    pub keys: Res<'w, ButtonInput<KeyCode>>,
    pub bindings: Res<'w, KeyBindings>,
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub entities: Query<'w, 's, Entity>,
    pub registry: Res<'w, VoxelRegistry>,
    pub culling: Res<'w, CullingState>,
    pub input: Res<'w, InputState>,
    pub avatar: Query<'w, 's, (&'static Transform, &'static AvatarKinematics), With<Player>>,
    pub probe: Option<ResMut<'w, MemoryProbe>>,
}

/// Write a dump when the dump key is pressed.
fn debug_input_system(mut ctx: DebugDumpCtx<'_, '_>) {
    if !ctx.keys.just_pressed(ctx.bindings.key(Action::DumpDebug)) {
        return;
    }

    let now = SystemTime::now();
    let epoch_secs = now.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
    let dt: DateTime<Utc> = DateTime::from(now);

    let fps = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);
    let frame_time_secs = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0)
        / 1000.0;

    let report = DebugReport {
        epoch_secs,
        timestamp: dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        fps,
        frame_time_secs,
        entities: ctx.entities.iter().count(),
        voxels: ctx.registry.len(),
        visible_voxels: ctx.culling.visible,
        generation: ctx.registry.generation(),
        avatar: ctx.avatar.get_single().ok().map(|(tf, k)| (tf.translation, *k)),
        selected_slot: ctx.input.selected_slot,
        paused: ctx.input.paused,
        memory: ctx.probe.as_mut().map(|p| p.sample()).unwrap_or_default(),
        cores: std::thread::available_parallelism().map_or(1, |n| n.get()),
    };

    let fname = format!("{DUMP_DIR}/debug-{epoch_secs}.txt");
    if let Err(e) = fs::create_dir_all(DUMP_DIR) {
        error!("debug dump: failed to create dir '{DUMP_DIR}': {e}");
        return;
    }
    if let Err(e) = fs::write(&fname, report.render()) {
        error!("debug dump: failed to write {fname}: {e}");
    } else {
        info!("wrote debug dump: {fname}");
    }
}
