use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::animation::{ActionIndex, AnimationAction, AnimationClip, AnimationMixer};
use crate::assets::ParsedAsset;
use crate::errors::{ForgeError, Result};
use crate::scene::{Node, NodeHandle, NodeKind, Scene};

pub const ANCHOR_NAME: &str = "Anchor";
pub const SKELETON_HELPER_NAME: &str = "SkeletonHelper";

/// Identifier of a loaded model, rendered as `model-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelId(u64);

impl ModelId {
    #[must_use]
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model-{}", self.0)
    }
}

impl FromStr for ModelId {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        s.strip_prefix("model-")
            .and_then(|n| n.parse().ok())
            .map(Self)
            .ok_or_else(|| ForgeError::ModelNotFound(s.to_string()))
    }
}

/// Source file facts plus the live polygon/vertex counts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub polygon_count: usize,
    pub vertex_count: usize,
}

impl FileInfo {
    #[must_use]
    pub fn new(name: &str, size_bytes: u64) -> Self {
        Self {
            name: name.to_string(),
            size_bytes,
            polygon_count: 0,
            vertex_count: 0,
        }
    }
}

/// The clip currently bound to a model and its action in the model's mixer.
#[derive(Debug, Clone)]
pub struct ModelAnimation {
    pub clip: Arc<AnimationClip>,
    pub action: ActionIndex,
}

/// One loaded asset.
///
/// The entry owns its scene. The anchor is a root of that scene and carries
/// the world placement; the parsed scene root is its first child and carries
/// the local edit transform.
#[derive(Debug)]
pub struct ModelEntry {
    id: ModelId,

    pub(crate) scene: Scene,
    scene_root: NodeHandle,
    anchor: NodeHandle,

    pub(crate) file_info: FileInfo,
    skeleton_present: bool,

    clips: Vec<Arc<AnimationClip>>,
    pub(crate) mixer: AnimationMixer,
    pub(crate) animation: Option<ModelAnimation>,

    pub(crate) selected_sub_object: Option<NodeHandle>,
    skeleton_helper: Option<NodeHandle>,
}

impl ModelEntry {
    /// Wraps the parsed root in a fresh anchor and scans the node kinds once.
    pub(crate) fn from_parsed(id: ModelId, parsed: ParsedAsset, file_info: FileInfo) -> Result<Self> {
        let ParsedAsset {
            mut scene,
            root: scene_root,
            clips,
        } = parsed;

        scene.node(scene_root)?;
        let anchor = scene.add_node(Node::new(ANCHOR_NAME));
        scene.attach(scene_root, anchor)?;

        let skeleton_present = scene.traverse(scene_root).into_iter().any(|h| {
            matches!(
                scene.nodes[h].kind,
                NodeKind::Bone | NodeKind::SkinnedMesh(_)
            )
        });

        let skeleton_helper = skeleton_present.then(|| {
            let mut helper = Node::with_kind(SKELETON_HELPER_NAME, NodeKind::Helper);
            helper.visible = false;
            scene.add_to_parent(helper, anchor)
        });

        scene.update_matrix_world();

        let mut entry = Self {
            id,
            scene,
            scene_root,
            anchor,
            file_info,
            skeleton_present,
            clips: clips.into_iter().map(Arc::new).collect(),
            mixer: AnimationMixer::new(),
            animation: None,
            selected_sub_object: None,
            skeleton_helper,
        };
        entry.refresh_counts();
        Ok(entry)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ModelId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access for callers that edit nodes themselves (gizmos,
    /// transform panels). Call [`refresh_counts`](Self::refresh_counts) after
    /// changing geometry.
    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[inline]
    #[must_use]
    pub fn scene_root(&self) -> NodeHandle {
        self.scene_root
    }

    #[inline]
    #[must_use]
    pub fn anchor(&self) -> NodeHandle {
        self.anchor
    }

    #[inline]
    #[must_use]
    pub fn file_info(&self) -> &FileInfo {
        &self.file_info
    }

    #[inline]
    #[must_use]
    pub fn has_skeleton(&self) -> bool {
        self.skeleton_present
    }

    /// Clips embedded in the source file.
    #[must_use]
    pub fn clips(&self) -> &[Arc<AnimationClip>] {
        &self.clips
    }

    #[must_use]
    pub fn animation(&self) -> Option<&ModelAnimation> {
        self.animation.as_ref()
    }

    #[must_use]
    pub fn action(&self) -> Option<&AnimationAction> {
        self.animation
            .as_ref()
            .and_then(|a| self.mixer.action(a.action))
    }

    pub(crate) fn action_mut(&mut self) -> Option<&mut AnimationAction> {
        let index = self.animation.as_ref()?.action;
        self.mixer.action_mut(index)
    }

    #[must_use]
    pub fn selected_sub_object(&self) -> Option<NodeHandle> {
        self.selected_sub_object
    }

    #[must_use]
    pub fn skeleton_helper(&self) -> Option<NodeHandle> {
        self.skeleton_helper
    }

    /// Editor-only nodes below the anchor.
    #[must_use]
    pub fn helper_nodes(&self) -> Vec<NodeHandle> {
        self.scene
            .traverse(self.anchor)
            .into_iter()
            .filter(|&h| self.scene.nodes[h].kind == NodeKind::Helper)
            .collect()
    }

    /// `true` if `node` is the scene root or lies below it.
    #[must_use]
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.scene.nodes.contains_key(node) && self.scene.is_ancestor(self.scene_root, node)
    }

    /// Recomputes polygon and vertex counts from the meshes under the scene root.
    pub fn refresh_counts(&mut self) {
        let (polygons, vertices) = self
            .scene
            .mesh_nodes(self.scene_root)
            .into_iter()
            .filter_map(|h| self.scene.mesh_of(h))
            .map(crate::resources::Mesh::counts)
            .fold((0, 0), |(p, v), (mp, mv)| (p + mp, v + mv));
        self.file_info.polygon_count = polygons;
        self.file_info.vertex_count = vertices;
    }

    /// Stops animation and releases every node and mesh of the model.
    pub(crate) fn dispose(mut self) -> usize {
        self.mixer.stop_all_action();
        let roots = self.scene.root_nodes.clone();
        roots
            .into_iter()
            .map(|root| self.scene.remove_node(root).len())
            .sum()
    }
}
