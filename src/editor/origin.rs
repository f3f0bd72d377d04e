//! Origin bake.
//!
//! Moves the pivot of a model to its bounds center (or bottom center) without
//! moving anything in the world:
//!
//! 1. measure the world bounds of the scene root
//! 2. express the target point in the scene root's local frame
//! 3. shift the root's children by `-target`, the root by `+target`
//! 4. bake each static mesh's root-relative matrix into its vertices and hang
//!    it directly under the root with an identity transform
//!
//! Skinned meshes keep their transforms: their vertices are bound to joints.

use glam::{Affine3A, Vec3};
use rustc_hash::FxHashSet;

use crate::editor::scene_root_bounds;
use crate::errors::Result;
use crate::registry::{ChangeEvent, ChangeKind, ModelEntry, Registry};
use crate::scene::NodeHandle;

/// Pivot target for [`Registry::bake_origin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginMode {
    /// Center of the bounding box.
    #[default]
    Center,
    /// Center of the bottom face of the bounding box.
    Bottom,
}

impl Registry {
    /// Bakes the active model's pivot. World-space bounds are unchanged and a
    /// second bake is a no-op.
    pub fn bake_origin(&mut self, mode: OriginMode) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        let baked = bake(entry, mode)?;
        entry.refresh_counts();
        entry.scene.update_matrix_world();

        log::info!("{id}: origin baked ({mode:?}), {baked} meshes flattened");
        self.emit(&[
            ChangeEvent::new(id, ChangeKind::TransformChanged),
            ChangeEvent::new(id, ChangeKind::MeshesChanged),
        ]);
        Ok(())
    }
}

fn bake(entry: &mut ModelEntry, mode: OriginMode) -> Result<usize> {
    let bbox = scene_root_bounds(entry)?;
    let root = entry.scene_root();
    let scene = &mut entry.scene;

    let target = match mode {
        OriginMode::Center => bbox.center(),
        OriginMode::Bottom => {
            let center = bbox.center();
            Vec3::new(center.x, bbox.min.y, center.z)
        }
    };
    let root_world = scene.world_matrix(root)?;
    let target_local = root_world.inverse().transform_point3(target);

    // Shift children by -target, root by +target in the parent frame
    let children = scene.node(root)?.children().to_vec();
    for &child in &children {
        scene.node_mut(child)?.transform.position -= target_local;
    }
    let root_t = &mut scene.node_mut(root)?.transform;
    let offset = root_t.rotation * (root_t.scale * target_local);
    root_t.position += offset;

    // Root-relative matrices, all measured before the hierarchy changes
    let mut baked: Vec<(NodeHandle, Affine3A)> = Vec::new();
    for handle in scene.traverse(root) {
        if handle == root {
            continue;
        }
        let node = scene.node(handle)?;
        if node.kind.is_mesh() && !node.kind.is_skinned() {
            baked.push((handle, scene.relative_matrix(handle, root)?));
        }
    }
    let baked_set: FxHashSet<NodeHandle> = baked.iter().map(|&(h, _)| h).collect();

    let mut orphans: Vec<(NodeHandle, Affine3A)> = Vec::new();
    for &(mesh, _) in &baked {
        for &child in scene.node(mesh)?.children() {
            if !baked_set.contains(&child) {
                orphans.push((child, scene.relative_matrix(child, root)?));
            }
        }
    }

    for &(handle, matrix) in &baked {
        if let Some(mesh) = scene.mesh_of_mut(handle) {
            mesh.apply_matrix(&matrix);
        }
        scene.node_mut(handle)?.transform.reset();
        if scene.node(handle)?.parent() != Some(root) {
            scene.attach(handle, root)?;
        }
    }

    for (handle, matrix) in orphans {
        scene.attach(handle, root)?;
        scene.node_mut(handle)?.transform.apply_local_matrix(matrix);
    }

    Ok(baked.len())
}
