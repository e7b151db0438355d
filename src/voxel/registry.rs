//! The authoritative set of placed voxels.
//!
//! `VoxelRegistry` is an arena keyed by `VoxelId`. Ids grow monotonically, so
//! iterating the `BTreeMap` walks voxels in insertion order, which is the
//! order ray picks use to break distance ties. A position index keeps
//! occupancy checks O(1) and makes the "one voxel per cell" invariant cheap
//! to enforce.
//!
//! The registry holds no rendering state beyond the `Entity` handle of each
//! voxel; keeping meshes and outlines in step is the job of `voxel::scene`.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{Voxel, VoxelColor, VoxelError, VoxelId};

/// Inclusive cell-space box that placements must stay inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

impl WorldBounds {
    #[must_use]
    pub fn contains(&self, cell: IVec3) -> bool {
        let min = IVec3::from_array(self.min);
        let max = IVec3::from_array(self.max);
        cell.cmpge(min).all() && cell.cmple(max).all()
    }
}

#[derive(Resource, Debug, Default)]
pub struct VoxelRegistry {
    voxels: BTreeMap<VoxelId, Voxel>,
    by_position: HashMap<IVec3, VoxelId>,
    next_id: u64,
    generation: u64,
    bounds: Option<WorldBounds>,
}

impl VoxelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that rejects placements outside `bounds`.
    #[must_use]
    pub fn with_bounds(bounds: Option<WorldBounds>) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Replace the placement bounds. Voxels already outside the new bounds
    /// stay where they are.
    pub fn set_bounds(&mut self, bounds: Option<WorldBounds>) {
        self.bounds = bounds;
    }

    #[must_use]
    pub fn bounds(&self) -> Option<WorldBounds> {
        self.bounds
    }

    /// Create a voxel at `position`.
    ///
    /// # Errors
    /// * `VoxelError::Occupied` if a voxel already sits in that cell.
    /// * `VoxelError::OutOfBounds` if bounds are configured and the cell is outside them.
    pub fn place(&mut self, position: IVec3, color: VoxelColor) -> Result<VoxelId, VoxelError> {
        if let Some(bounds) = self.bounds
            && !bounds.contains(position)
        {
            return Err(VoxelError::OutOfBounds(position));
        }
        if self.by_position.contains_key(&position) {
            return Err(VoxelError::Occupied(position));
        }

        let id = VoxelId(self.next_id);
        self.next_id += 1;
        self.voxels.insert(id, Voxel::new(position, color));
        self.by_position.insert(position, id);
        self.generation = self.generation.wrapping_add(1);
        Ok(id)
    }

    /// Delete a voxel and hand back its record so the caller can tear down
    /// whatever entity rendered it.
    ///
    /// # Errors
    /// `VoxelError::NotFound` if `id` is not live.
    pub fn remove(&mut self, id: VoxelId) -> Result<Voxel, VoxelError> {
        let voxel = self.voxels.remove(&id).ok_or(VoxelError::NotFound(id))?;
        self.by_position.remove(&voxel.position);
        self.generation = self.generation.wrapping_add(1);
        Ok(voxel)
    }

    /// Remove every voxel, returning them in insertion order.
    pub fn clear(&mut self) -> Vec<Voxel> {
        self.by_position.clear();
        if !self.voxels.is_empty() {
            self.generation = self.generation.wrapping_add(1);
        }
        std::mem::take(&mut self.voxels).into_values().collect()
    }

    #[must_use]
    pub fn get(&self, id: VoxelId) -> Option<&Voxel> {
        self.voxels.get(&id)
    }

    /// Id of the voxel occupying `position`, if any.
    #[must_use]
    pub fn at(&self, position: IVec3) -> Option<VoxelId> {
        self.by_position.get(&position).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Counter bumped by every place/remove/clear. Visibility flag updates
    /// do not count as mutations.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Iterate live voxels in insertion order.
    ///
    /// The iterator borrows the registry, so calling `all()` again restarts
    /// from the first voxel.
    pub fn all(&self) -> impl Iterator<Item = (VoxelId, &Voxel)> + '_ {
        self.voxels.iter().map(|(id, v)| (*id, v))
    }

    /// Record the scene entity that renders `id`.
    ///
    /// # Errors
    /// `VoxelError::NotFound` if `id` is not live.
    pub fn attach_entity(&mut self, id: VoxelId, entity: Entity) -> Result<(), VoxelError> {
        let voxel = self.voxels.get_mut(&id).ok_or(VoxelError::NotFound(id))?;
        voxel.entity = Some(entity);
        Ok(())
    }

    /// # Errors
    /// `VoxelError::NotFound` if `id` is not live.
    pub fn set_visible(&mut self, id: VoxelId, visible: bool) -> Result<(), VoxelError> {
        let voxel = self.voxels.get_mut(&id).ok_or(VoxelError::NotFound(id))?;
        voxel.visible = visible;
        Ok(())
    }

    /// Recompute every visibility flag with `is_visible` and return how many
    /// voxels ended up visible.
    pub fn refresh_visibility<F>(&mut self, mut is_visible: F) -> usize
    where
        F: FnMut(&Voxel) -> bool,
    {
        let mut count = 0;
        for voxel in self.voxels.values_mut() {
            voxel.visible = is_visible(voxel);
            if voxel.visible {
                count += 1;
            }
        }
        count
    }

    /// Number of voxels currently flagged visible.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.voxels.values().filter(|v| v.visible).count()
    }
}
