//! Export planning.
//!
//! The core never encodes files itself. [`Registry::export_request`](crate::registry::Registry::export_request)
//! collects what an [`Exporter`] needs into an [`ExportRequest`] and the
//! caller hands that to whatever encoder it uses.

use std::sync::Arc;

use crate::animation::AnimationClip;
use crate::errors::{ForgeError, Result};
use crate::registry::ModelId;
use crate::scene::{NodeHandle, Scene};

pub const GLB_EXTENSION: &str = ".glb";

/// Everything an exporter needs to write one model.
#[derive(Debug)]
pub struct ExportRequest<'a> {
    pub model: ModelId,
    pub scene: &'a Scene,
    /// The anchor, so the placement transform is part of the output.
    pub root: NodeHandle,
    /// The active clip, or every embedded clip when none is active.
    pub clips: Vec<Arc<AnimationClip>>,
    /// Editor-only nodes that must not be written.
    pub skip_nodes: Vec<NodeHandle>,
    /// Normalized, always ends in `.glb`.
    pub filename: String,
    pub binary: bool,
}

impl ExportRequest<'_> {
    /// Nodes of the export subtree, skipping helper subtrees.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(handle) = stack.pop() {
            if self.skip_nodes.contains(&handle) {
                continue;
            }
            let Some(node) = self.scene.get_node(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children().iter().rev().copied());
        }
        out
    }
}

/// Encodes an [`ExportRequest`] into file bytes.
pub trait Exporter {
    fn export(&self, request: &ExportRequest<'_>) -> Result<Vec<u8>>;
}

/// Trims the name and appends `.glb` unless it already ends with it
/// (case-insensitive). Blank names are rejected.
pub fn normalize_filename(filename: &str) -> Result<String> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        let err = ForgeError::Export("Provide a filename.".to_string());
        log::warn!("{err}");
        return Err(err);
    }
    if has_glb_extension(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}{GLB_EXTENSION}"))
    }
}

/// Suggested export name for a source file: `<stem>_edited.glb`.
#[must_use]
pub fn default_export_filename(source_name: &str) -> String {
    let stem = if has_glb_extension(source_name) {
        &source_name[..source_name.len() - GLB_EXTENSION.len()]
    } else {
        source_name
    };
    format!("{stem}_edited{GLB_EXTENSION}")
}

fn has_glb_extension(name: &str) -> bool {
    name.len() >= GLB_EXTENSION.len()
        && name
            .get(name.len() - GLB_EXTENSION.len()..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(GLB_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_gets_extension_once() {
        assert_eq!(normalize_filename("  robot ").unwrap(), "robot.glb");
        assert_eq!(normalize_filename("robot.GLB").unwrap(), "robot.GLB");
        assert!(normalize_filename("   ").is_err());
    }

    #[test]
    fn default_name_strips_glb() {
        assert_eq!(default_export_filename("robot.glb"), "robot_edited.glb");
        assert_eq!(default_export_filename("robot.gltf"), "robot.gltf_edited.glb");
    }
}
