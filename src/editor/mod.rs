//! Edit operations on the active model.
//!
//! Each submodule adds an `impl Registry` block. Operations follow one shape:
//! resolve the active model, validate every input, mutate, refresh counts,
//! notify observers.

pub mod animation;
pub mod materials;
pub mod mesh_ops;
pub mod origin;
pub mod placement;

pub use materials::TransformSnapshot;
pub use mesh_ops::{MeshSummary, ReparentMode};
pub use origin::OriginMode;

use crate::errors::{ForgeError, Result};
use crate::registry::ModelEntry;
use crate::resources::BoundingBox;
use crate::scene::NodeHandle;

/// World bounds of the scene root subtree, rejecting empty and non-finite boxes.
pub(crate) fn scene_root_bounds(entry: &ModelEntry) -> Result<BoundingBox> {
    let bbox = entry.scene().get_bbox_of_node(entry.scene_root());
    match bbox {
        Some(b) if !b.is_empty() && b.is_finite() => Ok(b),
        _ => {
            let err = ForgeError::DegenerateBounds(format!(
                "{} has no finite geometry",
                entry.file_info().name
            ));
            log::warn!("{err}");
            Err(err)
        }
    }
}

/// Checks that `node` lies inside the model's scene root.
pub(crate) fn require_node(entry: &ModelEntry, node: NodeHandle) -> Result<()> {
    if entry.contains(node) {
        Ok(())
    } else {
        let err = ForgeError::NodeNotFound(format!("{node:?} in {}", entry.id()));
        log::warn!("{err}");
        Err(err)
    }
}

/// Checks that `node` is a mesh node inside the model.
pub(crate) fn require_mesh(entry: &ModelEntry, node: NodeHandle) -> Result<()> {
    require_node(entry, node)?;
    let n = &entry.scene().nodes[node];
    if n.kind.is_mesh() {
        Ok(())
    } else {
        let err = ForgeError::NotAMesh(n.name.clone());
        log::warn!("{err}");
        Err(err)
    }
}

pub(crate) fn invalid_argument(message: String) -> ForgeError {
    let err = ForgeError::InvalidArgument(message);
    log::warn!("{err}");
    err
}
