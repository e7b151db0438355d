//! Keeps rendered entities in step with the `VoxelRegistry`.
//!
//! Every voxel is rendered by one entity carrying its solid cube mesh and a
//! `VoxelBody` tag. The wireframe outline is the single child of that entity,
//! so spawning and `despawn_recursive` always add or remove the pair
//! together. Outlines inherit visibility from their body, which lets the
//! visibility filter hide both at once while the outline toggle only touches
//! the children.
//!
//! All registry mutations that should show up on screen go through
//! `VoxelScene`, a `SystemParam` bundling the registry with the commands and
//! assets needed to render it.
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use std::collections::HashMap;

use super::{cell_center, ground_cells, Voxel, VoxelColor, VoxelError, VoxelId, VoxelRegistry};
use crate::input::{Action, KeyBindings};
use crate::settings::Settings;

/// Outlines are drawn a hair larger than the cube so they do not z-fight
/// with its faces.
const OUTLINE_SCALE: f32 = 1.002;

/// Tag on the entity rendering a voxel's solid mesh.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelBody(pub VoxelId);

/// Tag on the wireframe child of a `VoxelBody`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct VoxelOutline;

/// Whether outlines are drawn. Applies to all outlines at once.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineVisibility(pub bool);

impl Default for OutlineVisibility {
    fn default() -> Self {
        Self(true)
    }
}

impl OutlineVisibility {
    /// `Visibility` to put on each outline entity.
    #[must_use]
    pub fn visibility(self) -> Visibility {
        if self.0 { Visibility::Inherited } else { Visibility::Hidden }
    }
}

/// Shared meshes and per-color materials for voxel entities.
#[derive(Resource, Debug)]
pub struct VoxelAssets {
    pub cube_mesh: Handle<Mesh>,
    pub outline_mesh: Handle<Mesh>,
    pub cube_size: f32,
    materials: HashMap<VoxelColor, Handle<StandardMaterial>>,
}

impl VoxelAssets {
    #[must_use]
    pub fn new(cube_mesh: Handle<Mesh>, outline_mesh: Handle<Mesh>, cube_size: f32) -> Self {
        Self {
            cube_mesh,
            outline_mesh,
            cube_size,
            materials: HashMap::new(),
        }
    }

    /// Unlit material for `color`, created on first use and reused after.
    pub fn material(
        &mut self,
        color: VoxelColor,
        materials: &mut Assets<StandardMaterial>,
    ) -> Handle<StandardMaterial> {
        self.materials
            .entry(color)
            .or_insert_with(|| {
                materials.add(StandardMaterial {
                    base_color: color.to_color(),
                    unlit: true,
                    ..default()
                })
            })
            .clone()
    }
}

impl VoxelAssets {
    /// Meshes for cubes of edge length `cube_size`.
    #[must_use]
    pub fn build(cube_size: f32, meshes: &mut Assets<Mesh>) -> Self {
        let cube_mesh = meshes.add(Cuboid::from_size(Vec3::splat(cube_size)));
        let outline_mesh = meshes.add(outline_mesh(cube_size * OUTLINE_SCALE));
        Self::new(cube_mesh, outline_mesh, cube_size)
    }
}

impl FromWorld for VoxelAssets {
    fn from_world(world: &mut World) -> Self {
        let cube_size = world
            .get_resource::<Settings>()
            .map_or(1.0, |s| s.world.cube_size);
        Self::build(cube_size, &mut world.resource_mut::<Assets<Mesh>>())
    }
}

/// Line-list mesh of the 12 edges of a cube of edge length `size`, centered
/// on the origin.
#[must_use]
pub fn outline_mesh(size: f32) -> Mesh {
    let h = size * 0.5;
    // Corner `i` takes +h on axis `b` when bit `b` of `i` is set.
    let corner = |i: usize| {
        let pick = |bit: usize| if i & (1 << bit) == 0 { -h } else { h };
        [pick(0), pick(1), pick(2)]
    };

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(24);
    for i in 0..8 {
        for bit in 0..3 {
            if i & (1 << bit) == 0 {
                positions.push(corner(i));
                positions.push(corner(i | (1 << bit)));
            }
        }
    }

    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

/// Registry access that keeps the scene in sync.
#[derive(SystemParam)]
pub struct VoxelScene<'w, 's> {
    commands: Commands<'w, 's>,
    registry: ResMut<'w, VoxelRegistry>,
    assets: ResMut<'w, VoxelAssets>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    outlines: Res<'w, OutlineVisibility>,
}

impl VoxelScene<'_, '_> {
    #[must_use]
    pub fn registry(&self) -> &VoxelRegistry {
        &self.registry
    }

    /// Edge length the cubes are rendered at. Picking and culling use this
    /// rather than the live settings, which may have been reloaded since.
    #[must_use]
    pub fn cube_size(&self) -> f32 {
        self.assets.cube_size
    }

    /// Rebuild the shared meshes for a new cube size. Only call on an empty
    /// scene; voxels already spawned keep their old mesh and translation.
    pub fn resize(&mut self, cube_size: f32, meshes: &mut Assets<Mesh>) {
        if (self.assets.cube_size - cube_size).abs() <= f32::EPSILON {
            return;
        }
        let materials = std::mem::take(&mut self.assets.materials);
        *self.assets = VoxelAssets { materials, ..VoxelAssets::build(cube_size, meshes) };
    }

    /// Place a voxel and spawn its body + outline.
    ///
    /// # Errors
    /// Whatever `VoxelRegistry::place` rejects; nothing is spawned then.
    pub fn place(&mut self, position: IVec3, color: VoxelColor) -> Result<VoxelId, VoxelError> {
        let id = self.registry.place(position, color)?;

        let body_material = self.assets.material(color, &mut self.materials);
        let outline_material = self.assets.material(color.outline(), &mut self.materials);
        let translation = cell_center(position, self.assets.cube_size);
        let outline_visibility = self.outlines.visibility();
        let cube_mesh = self.assets.cube_mesh.clone();
        let outline_mesh = self.assets.outline_mesh.clone();

        let entity = self
            .commands
            .spawn((
                PbrBundle {
                    mesh: cube_mesh,
                    material: body_material,
                    transform: Transform::from_translation(translation),
                    ..default()
                },
                VoxelBody(id),
            ))
            .with_children(|parent| {
                parent.spawn((
                    PbrBundle {
                        mesh: outline_mesh,
                        material: outline_material,
                        visibility: outline_visibility,
                        ..default()
                    },
                    VoxelOutline,
                ));
            })
            .id();

        self.registry.attach_entity(id, entity)?;
        Ok(id)
    }

    /// Remove a voxel and despawn its body together with its outline.
    ///
    /// # Errors
    /// `VoxelError::NotFound` if `id` is not live.
    pub fn remove(&mut self, id: VoxelId) -> Result<Voxel, VoxelError> {
        let voxel = self.registry.remove(id)?;
        if let Some(entity) = voxel.entity {
            self.commands.entity(entity).despawn_recursive();
        }
        Ok(voxel)
    }

    /// Remove every voxel. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let drained = self.registry.clear();
        for entity in drained.iter().filter_map(|v| v.entity) {
            self.commands.entity(entity).despawn_recursive();
        }
        drained.len()
    }

    /// Lay down the `size * size` ground grid. Cells that are already taken
    /// are skipped. Returns how many voxels were placed.
    pub fn spawn_ground(&mut self, size: i32, color: VoxelColor) -> usize {
        ground_cells(size)
            .filter(|cell| self.place(*cell, color).is_ok())
            .count()
    }
}

/// Set every outline to the state in `outlines`.
pub fn apply_outline_visibility(
    outlines: OutlineVisibility,
    query: &mut Query<&mut Visibility, With<VoxelOutline>>,
) {
    let wanted = outlines.visibility();
    for mut vis in query.iter_mut() {
        if *vis != wanted {
            *vis = wanted;
        }
    }
}

/// Flip outline visibility when the mapped key is pressed, and follow
/// `graphics.show_outlines` when settings are reloaded.
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_outlines_system(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    settings: Res<Settings>,
    mut state: ResMut<OutlineVisibility>,
    mut query: Query<&mut Visibility, With<VoxelOutline>>,
) {
    let mut changed = false;
    if settings.is_changed() && state.0 != settings.graphics.show_outlines {
        state.0 = settings.graphics.show_outlines;
        changed = true;
    }
    if keys.just_pressed(bindings.key(Action::ToggleOutlines)) {
        state.0 = !state.0;
        changed = true;
    }
    if changed {
        debug!("outlines {}", if state.0 { "shown" } else { "hidden" });
        apply_outline_visibility(*state, &mut query);
    }
}
