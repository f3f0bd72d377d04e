//! Sub-object selection, texture slots, UV tiling and opacity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::editor::{invalid_argument, require_node};
use crate::errors::{ForgeError, Result};
use crate::registry::{ChangeEvent, ChangeKind, ModelEntry, Registry};
use crate::resources::{Texture, TextureSlot};
use crate::scene::NodeHandle;

/// Anchor placement as shared through the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

/// Mesh nodes under `target`; fails with `NotAMesh` when there are none.
fn target_meshes(entry: &ModelEntry, target: NodeHandle) -> Result<Vec<NodeHandle>> {
    require_node(entry, target)?;
    let meshes = entry.scene().mesh_nodes(target);
    if meshes.is_empty() {
        let err = ForgeError::NotAMesh(format!(
            "'{}' has no meshes",
            entry.scene().nodes[target].name
        ));
        log::warn!("{err}");
        return Err(err);
    }
    Ok(meshes)
}

impl Registry {
    /// Selects a node inside the active model as the edit target, or clears
    /// the selection.
    pub fn select_sub_object(&mut self, node: Option<NodeHandle>) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        if let Some(node) = node {
            require_node(entry, node)?;
        }
        if entry.selected_sub_object == node {
            return Ok(());
        }
        entry.selected_sub_object = node;

        self.emit(&[ChangeEvent::new(id, ChangeKind::SelectionChanged)]);
        Ok(())
    }

    /// Puts `texture` into `slot` of every mesh material under `target`.
    ///
    /// All materials must be standard materials; otherwise nothing changes.
    /// The texture is switched to repeat wrapping.
    pub fn apply_texture(
        &mut self,
        target: NodeHandle,
        slot: TextureSlot,
        mut texture: Texture,
    ) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        let meshes = target_meshes(entry, target)?;

        for &handle in &meshes {
            if let Some(mesh) = entry.scene.mesh_of(handle)
                && !mesh.material.is_standard()
            {
                let err = ForgeError::UnsupportedMaterial(format!(
                    "'{}' uses a {} material, textures need a standard material",
                    mesh.name,
                    mesh.material.data.type_name()
                ));
                log::warn!("{err}");
                return Err(err);
            }
        }

        texture.set_repeat_wrapping();
        for &handle in &meshes {
            if let Some(mesh) = entry.scene.mesh_of_mut(handle) {
                mesh.material.set_texture(slot, texture.clone())?;
            }
        }

        log::info!("{id}: '{}' applied to {slot:?} of {} mesh(es)", texture.name, meshes.len());
        self.emit(&[ChangeEvent::new(id, ChangeKind::MaterialChanged)]);
        Ok(())
    }

    /// Sets the UV repeat of every texture under `target`.
    pub fn set_uv_scale(&mut self, target: NodeHandle, scale: Vec2) -> Result<()> {
        if !scale.is_finite() || scale.cmple(Vec2::ZERO).any() {
            return Err(invalid_argument(format!("UV scale must be positive, got {scale}")));
        }
        let (id, entry) = self.require_active_mut()?;
        let meshes = target_meshes(entry, target)?;

        for handle in meshes {
            if let Some(mesh) = entry.scene.mesh_of_mut(handle) {
                for texture in mesh.material.textures_mut() {
                    texture.set_repeat_wrapping();
                    texture.set_repeat(scale);
                }
                mesh.material.mark_dirty();
            }
        }

        self.emit(&[ChangeEvent::new(id, ChangeKind::MaterialChanged)]);
        Ok(())
    }

    /// Sets the opacity of every material under the selected sub-object, or
    /// under the whole model when nothing is selected. Values are clamped to
    /// `[0, 1]`.
    pub fn set_opacity(&mut self, value: f32) -> Result<()> {
        if value.is_nan() {
            return Err(invalid_argument("opacity is NaN".to_string()));
        }
        let (id, entry) = self.require_active_mut()?;
        let target = entry
            .selected_sub_object
            .filter(|&h| entry.contains(h))
            .unwrap_or(entry.scene_root());

        for handle in entry.scene.mesh_nodes(target) {
            if let Some(mesh) = entry.scene.mesh_of_mut(handle) {
                mesh.material.set_opacity(value);
            }
        }

        self.emit(&[ChangeEvent::new(id, ChangeKind::MaterialChanged)]);
        Ok(())
    }

    /// Anchor position and scale of the active model as pretty JSON.
    pub fn transform_snapshot(&self) -> Result<String> {
        let entry = self.require_active_entry()?;
        let transform = &entry.scene().node(entry.anchor())?.transform;
        let snapshot = TransformSnapshot {
            position: transform.position.to_array(),
            scale: transform.scale.to_array(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}
