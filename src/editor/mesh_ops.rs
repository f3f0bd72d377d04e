//! Mesh edit operations: delete, rename, visibility, LOD simplification and
//! re-parenting to a bone.

use rustc_hash::FxHashSet;

use crate::editor::{invalid_argument, require_mesh, require_node};
use crate::errors::{ForgeError, Result};
use crate::registry::{ChangeEvent, ChangeKind, Registry};
use crate::resources::simplify::simplify;
use crate::scene::NodeHandle;

/// How [`Registry::reparent_to_bone`] treats the object's transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReparentMode {
    /// Reset the local transform so the object sits exactly on the bone.
    #[default]
    Snap,
    /// Keep the object where it is in world space.
    Preserve,
}

/// One row of the mesh list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSummary {
    pub node: NodeHandle,
    pub name: String,
    pub visible: bool,
    pub skinned: bool,
    pub triangles: usize,
    pub vertices: usize,
    /// A pre-simplification original is cached.
    pub simplified: bool,
}

impl Registry {
    /// Mesh nodes of the active model in traversal order.
    pub fn list_meshes(&self) -> Result<Vec<MeshSummary>> {
        let entry = self.require_active_entry()?;
        let scene = entry.scene();

        Ok(scene
            .mesh_nodes(entry.scene_root())
            .into_iter()
            .filter_map(|handle| {
                let node = scene.get_node(handle)?;
                let mesh = scene.mesh_of(handle)?;
                let (triangles, vertices) = mesh.counts();
                Some(MeshSummary {
                    node: handle,
                    name: node.name.clone(),
                    visible: node.visible,
                    skinned: node.kind.is_skinned(),
                    triangles,
                    vertices,
                    simplified: mesh.original_geometry().is_some(),
                })
            })
            .collect())
    }

    /// Removes a mesh node (and anything hanging below it) from the model.
    pub fn delete_mesh(&mut self, node: NodeHandle) -> Result<()> {
        self.delete_meshes(&[node])
    }

    /// Removes several mesh nodes at once. Every handle is validated before
    /// anything is removed.
    pub fn delete_meshes(&mut self, nodes: &[NodeHandle]) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        if nodes.is_empty() {
            return Err(invalid_argument("no meshes selected".to_string()));
        }
        for &node in nodes {
            require_mesh(entry, node)?;
        }

        let unique: FxHashSet<NodeHandle> = nodes.iter().copied().collect();
        let mut released = 0;
        for &node in nodes {
            // Already gone with an ancestor removed earlier in this batch
            if !entry.scene.nodes.contains_key(node) {
                continue;
            }
            let name = entry.scene.nodes[node].name.clone();
            released += entry.scene.remove_node(node).len();
            log::debug!("{id}: deleted mesh '{name}'");
        }

        if let Some(selected) = entry.selected_sub_object
            && !entry.scene.nodes.contains_key(selected)
        {
            entry.selected_sub_object = None;
        }
        entry.refresh_counts();

        log::info!("{id}: deleted {} mesh node(s), released {released} meshes", unique.len());
        self.emit(&[ChangeEvent::new(id, ChangeKind::MeshesChanged)]);
        Ok(())
    }

    /// Renames a mesh node. The name is trimmed and must not be empty.
    pub fn rename_mesh(&mut self, node: NodeHandle, name: &str) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        require_mesh(entry, node)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid_argument("mesh name must not be empty".to_string()));
        }

        entry.scene.node_mut(node)?.name = name.to_string();
        if let Some(mesh) = entry.scene.mesh_of_mut(node) {
            mesh.name = name.to_string();
        }

        self.emit(&[ChangeEvent::new(id, ChangeKind::MeshesChanged)]);
        Ok(())
    }

    /// Flips a mesh node's visibility and returns the new state.
    pub fn toggle_visibility(&mut self, node: NodeHandle) -> Result<bool> {
        let (id, entry) = self.require_active_mut()?;
        require_mesh(entry, node)?;

        let n = entry.scene.node_mut(node)?;
        n.visible = !n.visible;
        let visible = n.visible;
        if let Some(mesh) = entry.scene.mesh_of_mut(node) {
            mesh.visible = visible;
        }

        self.emit(&[ChangeEvent::new(id, ChangeKind::MeshesChanged)]);
        Ok(visible)
    }

    /// Simplifies a mesh to `ratio` of its original triangle count.
    ///
    /// The first call caches the original geometry and every later call
    /// starts from it, so ratios do not compound. Ratios at or above the
    /// restore threshold put the original back. Returns the new triangle
    /// count.
    pub fn simplify_mesh(&mut self, node: NodeHandle, ratio: f32) -> Result<usize> {
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(invalid_argument(format!("ratio must be in [0, 1], got {ratio}")));
        }
        let restore_threshold = self.settings().simplify.restore_threshold;
        let (id, entry) = self.require_active_mut()?;
        require_mesh(entry, node)?;

        let Some(mesh) = entry.scene.mesh_of_mut(node) else {
            return Err(ForgeError::NotAMesh(format!("{node:?}")));
        };
        let source = mesh.original_geometry().unwrap_or(mesh.geometry());
        if !source.is_indexed() {
            let err = ForgeError::UnsupportedGeometry(format!(
                "'{}' is not indexed and cannot be simplified",
                mesh.name
            ));
            log::warn!("{err}");
            return Err(err);
        }

        if ratio >= restore_threshold {
            if mesh.restore_original() {
                log::info!("{id}: restored original geometry of '{}'", mesh.name);
            }
        } else {
            let original_triangles = source.triangle_count();
            let target = (original_triangles as f32 * ratio).round() as usize;
            let simplified = simplify(source, target)?;
            mesh.cache_original();
            mesh.replace_geometry(simplified);
            log::info!(
                "{id}: simplified '{}' {} -> {} triangles",
                mesh.name,
                original_triangles,
                mesh.geometry().triangle_count()
            );
        }

        let triangles = mesh.geometry().triangle_count();
        entry.refresh_counts();
        self.emit(&[ChangeEvent::new(id, ChangeKind::MeshesChanged)]);
        Ok(triangles)
    }

    /// Makes `object` a child of `bone`.
    pub fn reparent_to_bone(
        &mut self,
        object: NodeHandle,
        bone: NodeHandle,
        mode: ReparentMode,
    ) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        require_node(entry, object)?;
        require_node(entry, bone)?;
        if object == entry.scene_root() {
            return Err(invalid_argument("the scene root cannot be re-parented".to_string()));
        }
        let bone_node = entry.scene.node(bone)?;
        if !bone_node.kind.is_bone() {
            let err = ForgeError::NotABone(bone_node.name.clone());
            log::warn!("{err}");
            return Err(err);
        }

        match mode {
            ReparentMode::Snap => {
                entry.scene.attach(object, bone)?;
                entry.scene.node_mut(object)?.transform.reset();
            }
            ReparentMode::Preserve => entry.scene.attach_preserving_world(object, bone)?,
        }

        log::debug!("{id}: attached {object:?} to bone '{}' ({mode:?})", entry.scene.nodes[bone].name);
        self.emit(&[ChangeEvent::new(id, ChangeKind::MeshesChanged)]);
        Ok(())
    }
}
