//! View-volume culling of individual voxels.
//!
//! Each frame the camera's view-projection matrix is turned into six clip
//! planes and every voxel's box, grown by a buffer margin, is tested against
//! them. The result only flags voxels for rendering; nothing is removed from
//! the registry.
//!
//! The scan is linear in voxel count. `CullingState` keeps it from running on
//! frames where neither the camera nor the registry changed enough to matter.
use bevy::prelude::*;

use super::{cube_bounds, Voxel, VoxelAssets, VoxelBody, VoxelRegistry};
use crate::player::Player;
use crate::settings::Settings;

/// Six inward-facing planes `(normal, d)` packed as `Vec4`; a point `p` is on
/// the inside of a plane when `normal.dot(p) + d >= 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewVolume {
    planes: [Vec4; 6],
}

impl ViewVolume {
    /// Extract the planes from a clip-from-world matrix whose clip depth runs
    /// from 0 (near) to 1 (far), as produced by `Mat4::perspective_rh`.
    #[must_use]
    pub fn from_clip_from_world(m: Mat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);
        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(|p| {
            let len = p.truncate().length();
            if len > f32::EPSILON { p / len } else { p }
        });
        Self { planes }
    }

    /// View volume of a perspective camera at `transform`.
    ///
    /// A finite far plane is used even though Bevy renders with an infinite
    /// reversed-z projection, so voxels past `projection.far` are culled.
    #[must_use]
    pub fn from_camera(transform: &GlobalTransform, projection: &PerspectiveProjection) -> Self {
        let view_from_world = transform.compute_matrix().inverse();
        let clip_from_view = Mat4::perspective_rh(
            projection.fov,
            projection.aspect_ratio.max(f32::EPSILON),
            projection.near,
            projection.far,
        );
        Self::from_clip_from_world(clip_from_view * view_from_world)
    }

    /// Conservative box test: `false` only when the box lies entirely
    /// outside at least one plane.
    #[must_use]
    pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let farthest = Vec3::select(normal.cmpge(Vec3::ZERO), max, min);
            normal.dot(farthest) + plane.w >= 0.0
        })
    }

    #[must_use]
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.intersects_aabb(p, p)
    }
}

/// Whether the cube at `cell`, grown by `buffer` on every side, touches the
/// view volume.
#[must_use]
pub fn voxel_visible(volume: &ViewVolume, cell: IVec3, cube_size: f32, buffer: f32) -> bool {
    let (min, max) = cube_bounds(cell, cube_size);
    let grow = Vec3::splat(buffer.max(0.0));
    volume.intersects_aabb(min - grow, max + grow)
}

/// Flag every voxel in `registry` against `volume`. Returns the visible count.
pub fn update_visibility(
    registry: &mut VoxelRegistry,
    volume: &ViewVolume,
    cube_size: f32,
    buffer: f32,
) -> usize {
    registry.refresh_visibility(|voxel: &Voxel| voxel_visible(volume, voxel.position, cube_size, buffer))
}

/// What the last visibility pass was computed against.
#[derive(Resource, Debug, Default)]
pub struct CullingState {
    last_translation: Option<Vec3>,
    last_rotation: Quat,
    last_generation: u64,
    last_buffer: f32,
    /// Visible voxel count from the most recent pass.
    pub visible: usize,
}

impl CullingState {
    /// Decide whether the flags need recomputing.
    ///
    /// # Arguments
    /// * `translation`, `rotation` - current camera pose
    /// * `generation` - current registry generation
    /// * `buffer` - current buffer margin
    /// * `move_threshold` - camera travel (world units) that forces a pass
    /// * `turn_threshold` - camera rotation (radians) that forces a pass
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn needs_refresh(
        &self,
        translation: Vec3,
        rotation: Quat,
        generation: u64,
        buffer: f32,
        move_threshold: f32,
        turn_threshold: f32,
    ) -> bool {
        let Some(last) = self.last_translation else { return true };
        generation != self.last_generation
            || (buffer - self.last_buffer).abs() > f32::EPSILON
            || last.distance(translation) > move_threshold
            || self.last_rotation.angle_between(rotation) > turn_threshold
    }

    fn record(&mut self, translation: Vec3, rotation: Quat, generation: u64, buffer: f32, visible: usize) {
        self.last_translation = Some(translation);
        self.last_rotation = rotation;
        self.last_generation = generation;
        self.last_buffer = buffer;
        self.visible = visible;
    }

    /// Force the next frame to recompute.
    pub fn invalidate(&mut self) {
        self.last_translation = None;
    }
}

/// Recompute voxel visibility against the player camera and push the flags
/// into each voxel entity's `Visibility`. Hidden voxels take their outline
/// child with them because outlines inherit visibility.
///
/// # Arguments
/// * `camera_query` - the player camera's transform and projection
/// * `registry` - voxels to flag
/// * `voxels` - `Visibility` of every voxel body entity
/// * `state` - last-pass bookkeeping used to skip redundant passes
/// * `assets` - cube size the voxels are rendered at
/// * `settings` - buffer margin and re-query thresholds
#[allow(clippy::needless_pass_by_value)]
pub fn cull_voxels_system(
    camera_query: Query<(&GlobalTransform, &Projection), With<Player>>,
    mut registry: ResMut<VoxelRegistry>,
    mut voxels: Query<&mut Visibility, With<VoxelBody>>,
    mut state: ResMut<CullingState>,
    assets: Res<VoxelAssets>,
    settings: Res<Settings>,
) {
    let Ok((cam_tf, projection)) = camera_query.get_single() else { return };
    let (_, rotation, translation) = cam_tf.to_scale_rotation_translation();
    let graphics = &settings.graphics;
    let buffer = graphics.frustum_buffer;

    if !state.needs_refresh(
        translation,
        rotation,
        registry.generation(),
        buffer,
        graphics.culling_move_threshold,
        graphics.culling_turn_threshold_deg.to_radians(),
    ) {
        return;
    }

    let cube_size = assets.cube_size;
    let visible = match projection {
        Projection::Perspective(p) => {
            let volume = ViewVolume::from_camera(cam_tf, p);
            update_visibility(&mut registry, &volume, cube_size, buffer)
        }
        // Only perspective cameras are spawned; anything else renders everything.
        Projection::Orthographic(_) => registry.refresh_visibility(|_| true),
    };

    for (_, voxel) in registry.all() {
        let Some(entity) = voxel.entity else { continue };
        let Ok(mut vis) = voxels.get_mut(entity) else { continue };
        let wanted = if voxel.visible { Visibility::Visible } else { Visibility::Hidden };
        if *vis != wanted {
            *vis = wanted;
        }
    }

    state.record(translation, rotation, registry.generation(), buffer, visible);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{ground_cells, OutlineVisibility, VoxelColor, VoxelOutline, VoxelScene};
    use bevy::ecs::system::RunSystemOnce;
    use std::f32::consts::FRAC_PI_4;

    fn projection() -> PerspectiveProjection {
        PerspectiveProjection {
            fov: FRAC_PI_4,
            aspect_ratio: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }

    fn looking_down_neg_z() -> ViewVolume {
        let tf = GlobalTransform::from(Transform::from_xyz(0.0, 2.0, 0.0));
        ViewVolume::from_camera(&tf, &projection())
    }

    #[test]
    fn point_in_front_is_inside() {
        let volume = looking_down_neg_z();
        assert!(volume.contains_point(Vec3::new(0.0, 2.0, -10.0)));
        assert!(!volume.contains_point(Vec3::new(0.0, 2.0, 10.0)));
    }

    #[test]
    fn beyond_far_plane_is_outside() {
        let volume = looking_down_neg_z();
        assert!(!volume.contains_point(Vec3::new(0.0, 2.0, -150.0)));
    }

    #[test]
    fn voxel_behind_camera_is_hidden() {
        let volume = looking_down_neg_z();
        assert!(voxel_visible(&volume, IVec3::new(0, 2, -5), 1.0, 0.0));
        assert!(!voxel_visible(&volume, IVec3::new(0, 2, 5), 1.0, 1.5));
    }

    #[test]
    fn buffer_keeps_edge_voxels() {
        let volume = looking_down_neg_z();
        // 45 degree fov: at depth 5.5 the half-width is ~2.28, so a cube
        // spanning x in [3.5, 4.5] is outside without a buffer.
        let cell = IVec3::new(4, 2, -5);
        assert!(!voxel_visible(&volume, cell, 1.0, 0.0));
        assert!(voxel_visible(&volume, cell, 1.0, 1.5));
    }

    #[test]
    fn visible_set_is_independent_of_order() {
        let volume = looking_down_neg_z();
        let cells: Vec<IVec3> = ground_cells(20).map(|c| c - IVec3::new(10, 0, 19)).collect();

        let mut forward = VoxelRegistry::new();
        for c in &cells {
            forward.place(*c, VoxelColor::DIRT).unwrap();
        }
        let mut backward = VoxelRegistry::new();
        for c in cells.iter().rev() {
            backward.place(*c, VoxelColor::DIRT).unwrap();
        }

        let a = update_visibility(&mut forward, &volume, 1.0, 1.5);
        let b = update_visibility(&mut backward, &volume, 1.0, 1.5);
        assert_eq!(a, b);
        assert!(a > 0 && a < cells.len());

        for (_, v) in forward.all() {
            let other = backward.at(v.position).and_then(|id| backward.get(id)).unwrap();
            assert_eq!(v.visible, other.visible);
        }

        // Same inputs again give the same flags.
        assert_eq!(update_visibility(&mut forward, &volume, 1.0, 1.5), a);
    }

    fn cull_world() -> World {
        let mut world = World::new();
        world.insert_resource(VoxelRegistry::new());
        world.insert_resource(VoxelAssets::new(Handle::default(), Handle::default(), 1.0));
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<OutlineVisibility>();
        world.init_resource::<CullingState>();
        world.insert_resource(Settings::default());
        world.spawn((
            Player,
            GlobalTransform::from(Transform::from_xyz(0.0, 2.0, 0.0)),
            Projection::Perspective(projection()),
        ));
        world
    }

    fn place_front_and_back(mut scene: VoxelScene) {
        for cell in [IVec3::new(0, 0, -5), IVec3::new(0, 0, 5)] {
            scene.place(cell, VoxelColor::DIRT).unwrap();
        }
    }

    fn body_visibility(world: &mut World, cell: IVec3) -> Visibility {
        let registry = world.resource::<VoxelRegistry>();
        let entity = registry
            .at(cell)
            .and_then(|id| registry.get(id))
            .and_then(|v| v.entity)
            .unwrap();
        *world.get::<Visibility>(entity).unwrap()
    }

    #[test]
    fn culled_bodies_are_hidden_but_kept() {
        let mut world = cull_world();
        world.run_system_once(place_front_and_back);
        world.run_system_once(cull_voxels_system);

        assert_eq!(body_visibility(&mut world, IVec3::new(0, 0, -5)), Visibility::Visible);
        assert_eq!(body_visibility(&mut world, IVec3::new(0, 0, 5)), Visibility::Hidden);

        let registry = world.resource::<VoxelRegistry>();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.visible_count(), 1);
        assert_eq!(world.resource::<CullingState>().visible, 1);

        // The outline stays attached; it inherits the hidden state.
        let mut outlines = world.query_filtered::<&Parent, With<VoxelOutline>>();
        assert_eq!(outlines.iter(&world).count(), 2);
    }

    #[test]
    fn culling_uses_the_rendered_cube_size() {
        let mut world = cull_world();
        world.run_system_once(place_front_and_back);
        // Settings reloaded to a huge cube size must not change the pass
        // until the scene is rebuilt at that size.
        world.resource_mut::<Settings>().world.cube_size = 50.0;
        world.run_system_once(cull_voxels_system);
        assert_eq!(body_visibility(&mut world, IVec3::new(0, 0, 5)), Visibility::Hidden);
    }

    #[test]
    fn culling_state_skips_small_moves() {
        let mut state = CullingState::default();
        assert!(state.needs_refresh(Vec3::ZERO, Quat::IDENTITY, 0, 1.5, 0.25, 0.05));
        state.record(Vec3::ZERO, Quat::IDENTITY, 0, 1.5, 10);

        assert!(!state.needs_refresh(Vec3::new(0.1, 0.0, 0.0), Quat::IDENTITY, 0, 1.5, 0.25, 0.05));
        assert!(state.needs_refresh(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, 0, 1.5, 0.25, 0.05));
        assert!(state.needs_refresh(Vec3::ZERO, Quat::from_rotation_y(0.5), 0, 1.5, 0.25, 0.05));
        assert!(state.needs_refresh(Vec3::ZERO, Quat::IDENTITY, 1, 1.5, 0.25, 0.05));
        assert!(state.needs_refresh(Vec3::ZERO, Quat::IDENTITY, 0, 2.0, 0.25, 0.05));

        state.invalidate();
        assert!(state.needs_refresh(Vec3::ZERO, Quat::IDENTITY, 0, 1.5, 0.25, 0.05));
    }
}
