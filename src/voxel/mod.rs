//! Voxel world model.
//!
//! A voxel is a unit cube sitting on an integer grid cell. The world position
//! of a cell is `cell * cube_size` and the cube is centered on that point, so
//! the ground grid at `y = 0` has its top face at `cube_size / 2`.
//!
//! The submodules split the model the way the frame loop uses it:
//! - `registry`: the authoritative set of placed voxels,
//! - `visibility`: per-frame view-volume flagging,
//! - `interaction`: ray picking and click handling,
//! - `scene`: keeping rendered entities in step with the registry.
//!
//! # Example:
//!
//! ```
//! use bevy::math::IVec3;
//! use voxelbox::voxel::{VoxelColor, VoxelRegistry};
//!
//! let mut registry = VoxelRegistry::new();
//! let id = registry.place(IVec3::new(0, 1, 0), VoxelColor::WHITE).unwrap();
//! assert_eq!(registry.len(), 1);
//! registry.remove(id).unwrap();
//! assert!(registry.is_empty());
//! ```
pub mod interaction;
pub mod registry;
pub mod scene;
pub mod visibility;

pub use interaction::*;
pub use registry::*;
pub use scene::*;
pub use visibility::*;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a placed voxel.
///
/// Ids are handed out in increasing order and never reused, so sorting by id
/// gives insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelId(pub u64);

impl fmt::Display for VoxelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Packed `0xRRGGBB` color of a voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelColor(pub u32);

impl VoxelColor {
    pub const BLACK: VoxelColor = VoxelColor(0x00_00_00);
    pub const WHITE: VoxelColor = VoxelColor(0xFF_FF_FF);
    pub const DIRT: VoxelColor = VoxelColor(0x8B_45_13);

    /// Split into `(r, g, b)` bytes.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        let [_, r, g, b] = self.0.to_be_bytes();
        (r, g, b)
    }

    /// Convert to a Bevy sRGB color.
    #[must_use]
    pub fn to_color(self) -> Color {
        let (r, g, b) = self.rgb();
        Color::srgb_u8(r, g, b)
    }

    /// Color used for the wireframe drawn over a cube of this color.
    ///
    /// Black cubes get a white outline, everything else a black one.
    #[must_use]
    pub fn outline(self) -> VoxelColor {
        if self == VoxelColor::BLACK {
            VoxelColor::WHITE
        } else {
            VoxelColor::BLACK
        }
    }
}

impl fmt::Display for VoxelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// A placed cube.
///
/// `position` and `color` never change after creation. `visible` is derived
/// each frame by the visibility filter and `entity` is the scene handle that
/// renders the cube and owns its outline.
#[derive(Clone, Debug, PartialEq)]
pub struct Voxel {
    pub position: IVec3,
    pub color: VoxelColor,
    pub visible: bool,
    pub entity: Option<Entity>,
}

impl Voxel {
    #[must_use]
    pub fn new(position: IVec3, color: VoxelColor) -> Self {
        Self {
            position,
            color,
            visible: true,
            entity: None,
        }
    }
}

/// Failures of registry mutations.
///
/// None of these are surfaced to the player; interaction code logs them and
/// treats the click as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoxelError {
    /// The id does not name a live voxel (already removed, or never placed).
    NotFound(VoxelId),
    /// Another voxel already occupies the cell.
    Occupied(IVec3),
    /// The cell lies outside the configured world bounds.
    OutOfBounds(IVec3),
}

impl fmt::Display for VoxelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoxelError::NotFound(id) => write!(f, "voxel {id} not found"),
            VoxelError::Occupied(p) => write!(f, "cell ({}, {}, {}) is occupied", p.x, p.y, p.z),
            VoxelError::OutOfBounds(p) => {
                write!(f, "cell ({}, {}, {}) is outside the world bounds", p.x, p.y, p.z)
            }
        }
    }
}

impl std::error::Error for VoxelError {}

/// World-space center of a grid cell.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn cell_center(cell: IVec3, cube_size: f32) -> Vec3 {
    cell.as_vec3() * cube_size
}

/// Axis-aligned bounds `(min, max)` of the cube at `cell`.
#[must_use]
pub fn cube_bounds(cell: IVec3, cube_size: f32) -> (Vec3, Vec3) {
    let center = cell_center(cell, cube_size);
    let half = Vec3::splat(cube_size * 0.5);
    (center - half, center + half)
}

/// Cells of the square ground grid: `size * size` cubes at `y = 0`,
/// ordered x-major like the startup loop that spawns them.
pub fn ground_cells(size: i32) -> impl Iterator<Item = IVec3> {
    (0..size).flat_map(move |x| (0..size).map(move |z| IVec3::new(x, 0, z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_contrasts_with_black() {
        assert_eq!(VoxelColor::BLACK.outline(), VoxelColor::WHITE);
        assert_eq!(VoxelColor(0xFF0000).outline(), VoxelColor::BLACK);
        assert_eq!(VoxelColor::WHITE.outline(), VoxelColor::BLACK);
    }

    #[test]
    fn color_splits_into_bytes() {
        assert_eq!(VoxelColor(0x12_34_56).rgb(), (0x12, 0x34, 0x56));
        assert_eq!(VoxelColor::DIRT.to_string(), "#8b4513");
    }

    #[test]
    fn cube_bounds_are_centered_on_cell() {
        let (min, max) = cube_bounds(IVec3::new(2, 0, -1), 1.0);
        assert_eq!(min, Vec3::new(1.5, -0.5, -1.5));
        assert_eq!(max, Vec3::new(2.5, 0.5, -0.5));
    }

    #[test]
    fn ground_grid_has_size_squared_cells() {
        let cells: Vec<_> = ground_cells(20).collect();
        assert_eq!(cells.len(), 400);
        assert_eq!(cells[0], IVec3::ZERO);
        assert_eq!(cells[1], IVec3::new(0, 0, 1));
        assert!(cells.iter().all(|c| c.y == 0));
    }
}
