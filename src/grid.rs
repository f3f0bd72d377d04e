//! Grid Placement Engine
//!
//! Pure snapping math for the placement grid. A grid is `chunk_size` tiles per
//! edge, centered on the world origin, each tile `tile_size` world units wide.
//!
//! ```rust,ignore
//! let grid = GridConfig::default(); // 1.0 units, 50 tiles, snap to centers
//! assert_eq!(grid.snap_world_coordinate(0.73), 0.5);
//! assert_eq!(grid.world_to_tile_index(0.5), 25);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::{ForgeError, Result};

/// Where snapped coordinates land inside a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapMode {
    /// Snap to the middle of a tile.
    #[default]
    Centers,
    /// Snap to the tile corners (grid line intersections).
    Corners,
}

/// Placement grid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World units per grid cell. Must be positive.
    pub tile_size: f32,
    /// Tiles per grid edge.
    pub chunk_size: u32,
    pub snap_mode: SnapMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_size: 1.0,
            chunk_size: 50,
            snap_mode: SnapMode::Centers,
        }
    }
}

impl GridConfig {
    #[must_use]
    pub fn new(tile_size: f32, chunk_size: u32, snap_mode: SnapMode) -> Self {
        Self {
            tile_size,
            chunk_size,
            snap_mode,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(ForgeError::InvalidArgument(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if self.chunk_size == 0 {
            return Err(ForgeError::InvalidArgument(
                "chunk_size must be at least one tile".to_string(),
            ));
        }
        Ok(())
    }

    /// Offset of the snap lattice from the world origin.
    #[inline]
    #[must_use]
    pub fn snap_offset(&self) -> f32 {
        match self.snap_mode {
            SnapMode::Centers => 0.5 * self.tile_size,
            SnapMode::Corners => 0.0,
        }
    }

    /// Snaps a single world coordinate onto the lattice.
    #[must_use]
    pub fn snap_world_coordinate(&self, v: f32) -> f32 {
        let offset = self.snap_offset();
        ((v - offset) / self.tile_size).round() * self.tile_size + offset
    }

    /// Maps a world coordinate to a zero-based tile index on a centered grid.
    #[must_use]
    pub fn world_to_tile_index(&self, v: f32) -> i32 {
        (v / self.tile_size + self.chunk_size as f32 / 2.0 - 0.5).round() as i32
    }

    /// Snaps the X and Z components of a world point, keeping Y.
    #[must_use]
    pub fn snap_world_point(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            self.snap_world_coordinate(p.x),
            p.y,
            self.snap_world_coordinate(p.z),
        )
    }

    /// World position of the center of the tile the grid treats as "center".
    #[must_use]
    pub fn center_tile_position(&self, y: f32) -> Vec3 {
        Vec3::new(0.5 * self.tile_size, y, 0.5 * self.tile_size)
    }

    /// Half the world-space width of the whole chunk (floor extent).
    #[must_use]
    pub fn grid_extent(&self) -> f32 {
        0.5 * self.tile_size * self.chunk_size as f32
    }
}
