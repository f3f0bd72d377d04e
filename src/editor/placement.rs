//! Anchor/Pivot placement.
//!
//! World placement goes through the anchor; the scene root keeps the local
//! edit offset, so snapping the anchor never disturbs a baked or grounded
//! model.

use glam::Vec3;

use crate::editor::{invalid_argument, scene_root_bounds};
use crate::errors::{ForgeError, Result};
use crate::registry::{ChangeEvent, ChangeKind, Registry};

/// Extents below this are treated as zero by [`Registry::fit_to_tiles`].
const MIN_EXTENT: f32 = 1e-6;

impl Registry {
    /// Moves the anchor to `(x, anchor.y, z)`.
    pub fn place_at_world_position(&mut self, x: f32, z: f32) -> Result<()> {
        if !x.is_finite() || !z.is_finite() {
            return Err(invalid_argument(format!("position ({x}, {z}) is not finite")));
        }
        let (id, entry) = self.require_active_mut()?;
        let anchor = entry.anchor();
        let transform = &mut entry.scene.node_mut(anchor)?.transform;
        transform.position.x = x;
        transform.position.z = z;

        self.emit(&[ChangeEvent::new(id, ChangeKind::TransformChanged)]);
        Ok(())
    }

    /// Snaps `cursor` to the grid and places the anchor there.
    pub fn place_at_cursor(&mut self, cursor: Vec3) -> Result<()> {
        let snapped = self.grid().snap_world_point(cursor);
        self.place_at_world_position(snapped.x, snapped.z)
    }

    /// Puts the anchor on the center tile and clears the scene root's x/z
    /// offset. Heights are untouched.
    pub fn snap_to_center_tile_and_zero(&mut self) -> Result<()> {
        let tile = self.grid().tile_size;
        let (id, entry) = self.require_active_mut()?;
        let (anchor, root) = (entry.anchor(), entry.scene_root());

        let anchor_t = &mut entry.scene.node_mut(anchor)?.transform;
        anchor_t.position.x = 0.5 * tile;
        anchor_t.position.z = 0.5 * tile;

        let root_t = &mut entry.scene.node_mut(root)?.transform;
        root_t.position.x = 0.0;
        root_t.position.z = 0.0;

        self.emit(&[ChangeEvent::new(id, ChangeKind::TransformChanged)]);
        Ok(())
    }

    /// Lifts or lowers the scene root so the lowest world point sits at y = 0.
    pub fn stick_to_ground(&mut self) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        let bbox = scene_root_bounds(entry)?;
        let root = entry.scene_root();
        entry.scene.node_mut(root)?.transform.position.y -= bbox.min.y;

        log::debug!("{id}: grounded by {}", -bbox.min.y);
        self.emit(&[ChangeEvent::new(id, ChangeKind::TransformChanged)]);
        Ok(())
    }

    /// Uniformly scales the scene root so its footprint fits
    /// `tiles_x` x `tiles_z` tiles.
    ///
    /// Flat axes are ignored. A model flat on both x and z fails with
    /// [`ForgeError::DegenerateBounds`].
    pub fn fit_to_tiles(&mut self, tiles_x: u32, tiles_z: u32) -> Result<()> {
        if tiles_x == 0 || tiles_z == 0 {
            return Err(invalid_argument(format!(
                "tile counts must be positive, got {tiles_x} x {tiles_z}"
            )));
        }
        let tile = self.grid().tile_size;
        let (id, entry) = self.require_active_mut()?;
        let size = scene_root_bounds(entry)?.size();

        let candidates = [
            (size.x > MIN_EXTENT).then(|| tiles_x as f32 * tile / size.x),
            (size.z > MIN_EXTENT).then(|| tiles_z as f32 * tile / size.z),
        ];
        let Some(k) = candidates.into_iter().flatten().reduce(f32::min) else {
            let err = ForgeError::DegenerateBounds(format!(
                "{} has no horizontal extent",
                entry.file_info().name
            ));
            log::warn!("{err}");
            return Err(err);
        };

        let root = entry.scene_root();
        entry.scene.node_mut(root)?.transform.scale *= k;

        log::debug!("{id}: fit to {tiles_x}x{tiles_z} tiles, scale factor {k}");
        self.emit(&[ChangeEvent::new(id, ChangeKind::TransformChanged)]);
        Ok(())
    }

    /// Clears the scene root's local position.
    pub fn zero_position(&mut self) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        let root = entry.scene_root();
        entry.scene.node_mut(root)?.transform.position = Vec3::ZERO;

        self.emit(&[ChangeEvent::new(id, ChangeKind::TransformChanged)]);
        Ok(())
    }

    /// Sets the anchor's position and scale together.
    pub fn set_anchor_transform(&mut self, position: Vec3, scale: Vec3) -> Result<()> {
        if !position.is_finite() || !scale.is_finite() {
            return Err(invalid_argument("anchor transform is not finite".to_string()));
        }
        let (id, entry) = self.require_active_mut()?;
        let anchor = entry.anchor();
        let transform = &mut entry.scene.node_mut(anchor)?.transform;
        transform.position = position;
        transform.scale = scale;

        self.emit(&[ChangeEvent::new(id, ChangeKind::TransformChanged)]);
        Ok(())
    }
}
