use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle};

/// What a node carries, tagged once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// Plain transform node (scene roots, anchors, glTF groups).
    #[default]
    Group,
    /// Static mesh instance.
    Mesh(MeshKey),
    /// Mesh deformed by a skeleton. Never geometry-baked.
    SkinnedMesh(MeshKey),
    /// Joint of a skeleton.
    Bone,
    /// Editor-only visualization (skeleton helper). Excluded from export.
    Helper,
}

impl NodeKind {
    /// Mesh component carried by the node, skinned or not.
    #[inline]
    #[must_use]
    pub fn mesh(&self) -> Option<MeshKey> {
        match *self {
            NodeKind::Mesh(key) | NodeKind::SkinnedMesh(key) => Some(key),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_mesh(&self) -> bool {
        self.mesh().is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        matches!(self, NodeKind::SkinnedMesh(_))
    }

    #[inline]
    #[must_use]
    pub fn is_bone(&self) -> bool {
        matches!(self, NodeKind::Bone)
    }
}

/// A scene graph node.
///
/// Nodes form a tree through `parent`/`children`. Use [`Scene::attach`](crate::scene::Scene::attach)
/// to change the hierarchy so both sides stay in sync.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Spatial data ===
    pub transform: Transform,

    // === State ===
    pub visible: bool,
    pub kind: NodeKind,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            kind: NodeKind::Group,
        }
    }

    #[must_use]
    pub fn with_kind(name: &str, kind: NodeKind) -> Self {
        Self {
            kind,
            ..Self::new(name)
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World matrix as of the last [`Scene::update_matrix_world`](crate::scene::Scene::update_matrix_world).
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
