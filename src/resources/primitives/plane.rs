use glam::{Vec2, Vec3};

use crate::resources::geometry::Geometry;

pub struct PlaneOptions {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            width_segments: 1,
            height_segments: 1,
        }
    }
}

/// Subdivided plane in the XZ plane, facing +Y.
#[must_use]
pub fn create_plane(options: &PlaneOptions) -> Geometry {
    let width_half = options.width / 2.0;
    let depth_half = options.height / 2.0;

    let grid_x = options.width_segments.max(1);
    let grid_z = options.height_segments.max(1);

    let grid_x1 = grid_x + 1;
    let grid_z1 = grid_z + 1;

    let segment_width = options.width / grid_x as f32;
    let segment_depth = options.height / grid_z as f32;

    let mut positions = Vec::with_capacity((grid_x1 * grid_z1) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut uvs = Vec::with_capacity(positions.capacity());
    let mut indices = Vec::with_capacity((grid_x * grid_z * 6) as usize);

    for iz in 0..grid_z1 {
        let z = iz as f32 * segment_depth - depth_half;
        for ix in 0..grid_x1 {
            let x = ix as f32 * segment_width - width_half;

            positions.push(Vec3::new(x, 0.0, z));
            normals.push(Vec3::Y);
            uvs.push(Vec2::new(ix as f32 / grid_x as f32, iz as f32 / grid_z as f32));
        }
    }

    for iz in 0..grid_z {
        for ix in 0..grid_x {
            let a = ix + grid_x1 * iz;
            let b = ix + grid_x1 * (iz + 1);
            let c = (ix + 1) + grid_x1 * (iz + 1);
            let d = (ix + 1) + grid_x1 * iz;

            // CCW seen from +Y
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Geometry::from_parts(positions, normals, uvs, indices)
}
