use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Affine3A, Vec3};
use slotmap::SlotMap;

use crate::errors::{ForgeError, Result};
use crate::resources::BoundingBox;
use crate::resources::mesh::Mesh;
use crate::scene::node::{Node, NodeKind};
use crate::scene::transform_system;
use crate::scene::{MeshKey, NodeHandle};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Scene graph of one model.
///
/// Pure data: a node arena plus the mesh components the nodes point at.
/// Removing a node releases the meshes of its whole subtree.
#[derive(Debug)]
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Component pools ====
    pub meshes: SlotMap<MeshKey, Mesh>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
        }
    }

    /// Starts building a node.
    pub fn build_node(&'_ mut self, name: &str) -> NodeBuilder<'_> {
        NodeBuilder::new(self, name)
    }

    /// Adds a node as a new root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Adds a node under `parent`. Falls back to a root if `parent` is stale.
    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        if !self.nodes.contains_key(parent) {
            log::warn!("Parent node not found, adding '{}' as a root", child.name);
            return self.add_node(child);
        }
        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }
        handle
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> NodeHandle {
        let name = mesh.name.clone();
        let node = Node::with_kind(&name, NodeKind::Mesh(self.meshes.insert(mesh)));
        self.add_node(node)
    }

    pub fn add_mesh_to_parent(&mut self, mesh: Mesh, parent: NodeHandle) -> NodeHandle {
        let name = mesh.name.clone();
        let node = Node::with_kind(&name, NodeKind::Mesh(self.meshes.insert(mesh)));
        self.add_to_parent(node, parent)
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Node lookup that reports stale handles as [`ForgeError::NodeNotFound`].
    pub fn node(&self, handle: NodeHandle) -> Result<&Node> {
        self.nodes
            .get(handle)
            .ok_or_else(|| ForgeError::NodeNotFound(format!("{handle:?}")))
    }

    pub fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut Node> {
        self.nodes
            .get_mut(handle)
            .ok_or_else(|| ForgeError::NodeNotFound(format!("{handle:?}")))
    }

    /// Mesh component of a mesh node.
    #[must_use]
    pub fn mesh_of(&self, handle: NodeHandle) -> Option<&Mesh> {
        let key = self.nodes.get(handle)?.kind.mesh()?;
        self.meshes.get(key)
    }

    pub fn mesh_of_mut(&mut self, handle: NodeHandle) -> Option<&mut Mesh> {
        let key = self.nodes.get(handle)?.kind.mesh()?;
        self.meshes.get_mut(key)
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// `true` if `ancestor` is `node` or one of its parents.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    /// Unlinks `handle` from its parent (or the root list). The node stays in
    /// the arena as a root.
    pub fn detach(&mut self, handle: NodeHandle) {
        let old_parent = self.nodes.get(handle).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == handle)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == handle) {
            self.root_nodes.remove(i);
        }

        if let Some(node) = self.nodes.get_mut(handle) {
            node.parent = None;
            node.transform.mark_dirty();
            self.root_nodes.push(handle);
        }
    }

    /// Makes `child` the last child of `parent`, keeping its local transform.
    ///
    /// Fails without mutation on stale handles or when `parent` lies inside
    /// `child`'s subtree.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        self.node(child)?;
        self.node(parent)?;
        if self.is_ancestor(child, parent) {
            let err = ForgeError::HierarchyCycle(format!(
                "'{}' cannot become a child of its own descendant '{}'",
                self.nodes[child].name, self.nodes[parent].name
            ));
            log::warn!("{err}");
            return Err(err);
        }

        // 1. Detach from old
        let old_parent = self.nodes[child].parent;
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }

        // 2. Attach to new
        self.nodes[parent].children.push(child);

        // 3. Update child
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.transform.mark_dirty();
        Ok(())
    }

    /// Like [`attach`](Self::attach), but solves a new local transform so the
    /// child's world transform does not change.
    pub fn attach_preserving_world(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        let child_world = self.world_matrix(child)?;
        let parent_world = self.world_matrix(parent)?;
        self.attach(child, parent)?;
        let local = parent_world.inverse() * child_world;
        self.nodes[child].transform.apply_local_matrix(local);
        Ok(())
    }

    /// Removes a node and its whole subtree.
    ///
    /// Returns the mesh components that were released, in traversal order.
    pub fn remove_node(&mut self, handle: NodeHandle) -> Vec<Mesh> {
        if !self.nodes.contains_key(handle) {
            return Vec::new();
        }

        // Unlink from parent or root list first
        self.detach(handle);
        if let Some(i) = self.root_nodes.iter().position(|&x| x == handle) {
            self.root_nodes.remove(i);
        }

        let mut released = Vec::new();
        for h in self.traverse(handle) {
            if let Some(node) = self.nodes.remove(h)
                && let Some(key) = node.kind.mesh()
                && let Some(mesh) = self.meshes.remove(key)
            {
                released.push(mesh);
            }
        }
        released
    }

    /// Depth-first pre-order walk of the subtree under `root`, `root` first.
    #[must_use]
    pub fn traverse(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// First node named `name` in the subtree under `root`.
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.traverse(root)
            .into_iter()
            .find(|&h| self.nodes[h].name == name)
    }

    /// Mesh nodes (skinned or not) under `root`, in traversal order.
    #[must_use]
    pub fn mesh_nodes(&self, root: NodeHandle) -> Vec<NodeHandle> {
        self.traverse(root)
            .into_iter()
            .filter(|&h| self.nodes[h].kind.is_mesh())
            .collect()
    }

    // ========================================================================
    // Matrices & bounds
    // ========================================================================

    /// Updates world matrices of every tree in the scene.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);
    }

    /// Updates world matrices of one subtree.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, root);
    }

    /// World matrix computed from the current TRS of the node and its parents.
    pub fn world_matrix(&self, handle: NodeHandle) -> Result<Affine3A> {
        transform_system::compute_world_matrix(&self.nodes, handle)
            .ok_or_else(|| ForgeError::NodeNotFound(format!("{handle:?}")))
    }

    /// Matrix taking `handle`'s local space into `ancestor`'s local space.
    pub fn relative_matrix(&self, handle: NodeHandle, ancestor: NodeHandle) -> Result<Affine3A> {
        let mut matrix = Affine3A::IDENTITY;
        let mut current = handle;
        while current != ancestor {
            let node = self.node(current)?;
            matrix = node.transform.compose() * matrix;
            current = node.parent.ok_or_else(|| {
                ForgeError::InvalidArgument(format!("{handle:?} is not below {ancestor:?}"))
            })?;
        }
        Ok(matrix)
    }

    /// World-space bounds of the geometry in the subtree under `root`.
    ///
    /// Reads TRS directly, so it is valid without a prior matrix update.
    /// `None` when the subtree holds no vertices.
    #[must_use]
    pub fn get_bbox_of_node(&self, root: NodeHandle) -> Option<BoundingBox> {
        let root_world = self.world_matrix(root).ok()?;
        self.bbox_in_frame(root, root_world)
    }

    /// Bounds of the subtree under `root`, in the frame where `root` has the
    /// matrix `root_matrix`.
    fn bbox_in_frame(&self, root: NodeHandle, root_matrix: Affine3A) -> Option<BoundingBox> {
        let mut combined: Option<BoundingBox> = None;
        let mut stack = vec![(root, root_matrix)];

        while let Some((handle, matrix)) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };

            if let Some(key) = node.kind.mesh()
                && let Some(mesh) = self.meshes.get(key)
                && let Some(local) = mesh.geometry().bounding_box()
            {
                let bbox = if matrix == Affine3A::IDENTITY {
                    local
                } else {
                    mesh_points_bbox(mesh, &matrix).unwrap_or_else(|| local.transform(&matrix))
                };
                combined = Some(match combined {
                    Some(existing) => existing.union(&bbox),
                    None => bbox,
                });
            }

            for &child in &node.children {
                if let Some(c) = self.nodes.get(child) {
                    stack.push((child, matrix * c.transform.compose()));
                }
            }
        }

        combined
    }
}

/// Tight bounds of a mesh's vertices under `matrix`.
fn mesh_points_bbox(mesh: &Mesh, matrix: &Affine3A) -> Option<BoundingBox> {
    let positions = mesh.geometry().positions();
    if positions.is_empty() {
        return None;
    }
    let mut bbox = BoundingBox::empty();
    for &p in positions {
        bbox.expand_by_point(matrix.transform_point3(p));
    }
    Some(bbox)
}

pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    node: Node,
    parent: Option<NodeHandle>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene, name: &str) -> Self {
        Self {
            scene,
            node: Node::new(name),
            parent: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.node.transform.position = Vec3::new(x, y, z);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, s: f32) -> Self {
        self.node.transform.scale = Vec3::splat(s);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.node.kind = kind;
        self
    }

    /// Stores `mesh` in the scene and tags the node as a mesh node.
    #[must_use]
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.node.kind = NodeKind::Mesh(self.scene.meshes.insert(mesh));
        self
    }

    /// Inserts the node and returns its handle.
    pub fn build(self) -> NodeHandle {
        match self.parent {
            Some(parent) => self.scene.add_to_parent(self.node, parent),
            None => self.scene.add_node(self.node),
        }
    }
}
