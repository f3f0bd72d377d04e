use glam::{Affine3A, Mat3, Vec2, Vec3, Vec4};
use uuid::Uuid;

use crate::errors::{ForgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// Inverted box that any point expands.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut bbox = Self::empty();
        for &p in points {
            bbox.expand_by_point(p);
        }
        Some(bbox)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// `true` when no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// `true` for a non-empty box with finite corners.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        !self.is_empty() && self.min.is_finite() && self.max.is_finite()
    }

    pub fn expand_by_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Axis-aligned bounds of the eight transformed corners.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut out = Self::empty();
        for point in corners {
            out.expand_by_point(matrix.transform_point3(point));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Triangle-list geometry kept on the CPU.
///
/// Attributes are stored planar (one `Vec` per attribute). Optional attributes,
/// when present, always have one entry per position.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub uuid: Uuid,
    data_version: u64,

    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    uvs: Option<Vec<Vec2>>,
    joints: Option<Vec<[u16; 4]>>,
    weights: Option<Vec<Vec4>>,

    indices: Option<Vec<u32>>,

    bounding_box: Option<BoundingBox>,
    bounding_sphere: Option<BoundingSphere>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            data_version: 0,
            positions: Vec::new(),
            normals: None,
            uvs: None,
            joints: None,
            weights: None,
            indices: None,
            bounding_box: None,
            bounding_sphere: None,
        }
    }

    /// Non-indexed geometry from a position list.
    #[must_use]
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        let mut geo = Self::new();
        geo.positions = positions;
        geo.compute_bounding_volume();
        geo
    }

    /// Indexed geometry from matching attribute lists. Callers guarantee the
    /// lengths agree and every index is in range.
    pub(crate) fn from_parts(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<Vec2>,
        indices: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(positions.len(), normals.len());
        debug_assert_eq!(positions.len(), uvs.len());
        let mut geo = Self::new();
        geo.positions = positions;
        geo.normals = Some(normals);
        geo.uvs = Some(uvs);
        geo.indices = Some(indices);
        geo.compute_bounding_volume();
        geo
    }

    #[must_use]
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    fn touch(&mut self) {
        self.data_version = self.data_version.wrapping_add(1);
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[must_use]
    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    #[must_use]
    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    #[must_use]
    pub fn joints(&self) -> Option<&[[u16; 4]]> {
        self.joints.as_deref()
    }

    #[must_use]
    pub fn weights(&self) -> Option<&[Vec4]> {
        self.weights.as_deref()
    }

    #[must_use]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Replaces the position list. Drops optional attributes whose length no
    /// longer matches, and the index list if it points past the new end.
    pub fn set_positions(&mut self, positions: Vec<Vec3>) {
        let n = positions.len();
        self.positions = positions;
        if self.normals.as_ref().is_some_and(|v| v.len() != n) {
            self.normals = None;
        }
        if self.uvs.as_ref().is_some_and(|v| v.len() != n) {
            self.uvs = None;
        }
        if self.joints.as_ref().is_some_and(|v| v.len() != n)
            || self.weights.as_ref().is_some_and(|v| v.len() != n)
        {
            self.joints = None;
            self.weights = None;
        }
        if self
            .indices
            .as_ref()
            .is_some_and(|idx| idx.iter().any(|&i| i as usize >= n))
        {
            self.indices = None;
        }
        self.bounding_box = None;
        self.bounding_sphere = None;
        self.touch();
    }

    pub fn set_normals(&mut self, normals: Vec<Vec3>) -> Result<()> {
        self.check_len("normal", normals.len())?;
        self.normals = Some(normals);
        self.touch();
        Ok(())
    }

    pub fn set_uvs(&mut self, uvs: Vec<Vec2>) -> Result<()> {
        self.check_len("uv", uvs.len())?;
        self.uvs = Some(uvs);
        self.touch();
        Ok(())
    }

    /// Sets joint indices and weights together.
    pub fn set_skin(&mut self, joints: Vec<[u16; 4]>, weights: Vec<Vec4>) -> Result<()> {
        self.check_len("joints", joints.len())?;
        self.check_len("weights", weights.len())?;
        self.joints = Some(joints);
        self.weights = Some(weights);
        self.touch();
        Ok(())
    }

    pub fn set_indices(&mut self, indices: Vec<u32>) -> Result<()> {
        let vertex_count = self.positions.len();
        if indices.len() % 3 != 0 {
            return Err(ForgeError::UnsupportedGeometry(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(ForgeError::UnsupportedGeometry(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }
        self.indices = Some(indices);
        self.touch();
        Ok(())
    }

    fn check_len(&self, name: &str, len: usize) -> Result<()> {
        if len == self.positions.len() {
            Ok(())
        } else {
            Err(ForgeError::UnsupportedGeometry(format!(
                "{name} attribute has {len} entries, expected {}",
                self.positions.len()
            )))
        }
    }

    // ========================================================================
    // Counts
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// `index_count / 3` when indexed, else `vertex_count / 3`.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    // ========================================================================
    // Derived data
    // ========================================================================

    pub fn compute_vertex_normals(&mut self) {
        let count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; count];

        let mut accumulate_triangle = |i0: usize, i1: usize, i2: usize| {
            if i0 >= count || i1 >= count || i2 >= count {
                return;
            }
            let v0 = self.positions[i0];
            let v1 = self.positions[i1];
            let v2 = self.positions[i2];
            // Area weighted
            let face_normal = (v1 - v0).cross(v2 - v0);
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        };

        if let Some(indices) = &self.indices {
            for tri in indices.chunks_exact(3) {
                accumulate_triangle(tri[0] as usize, tri[1] as usize, tri[2] as usize);
            }
        } else {
            for i in (0..count.saturating_sub(2)).step_by(3) {
                accumulate_triangle(i, i + 1, i + 2);
            }
        }

        for n in &mut normals {
            *n = n.normalize_or_zero();
        }

        self.normals = Some(normals);
        self.touch();
    }

    pub fn compute_bounding_volume(&mut self) {
        let Some(bbox) = BoundingBox::from_points(&self.positions) else {
            self.bounding_box = None;
            self.bounding_sphere = None;
            return;
        };

        let center = bbox.center();
        let max_dist_sq = self
            .positions
            .iter()
            .map(|p| p.distance_squared(center))
            .fold(0.0_f32, f32::max);

        self.bounding_box = Some(bbox);
        self.bounding_sphere = Some(BoundingSphere {
            center,
            radius: max_dist_sq.sqrt(),
        });
    }

    /// Cached bounds, or bounds computed on the fly when the cache is stale.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
            .or_else(|| BoundingBox::from_points(&self.positions))
    }

    #[must_use]
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.bounding_sphere
    }

    /// Transforms positions by `matrix` and normals by its normal matrix, then
    /// recomputes the bounds.
    pub fn apply_matrix(&mut self, matrix: &Affine3A) {
        for p in &mut self.positions {
            *p = matrix.transform_point3(*p);
        }

        if let Some(normals) = &mut self.normals {
            let linear = Mat3::from(matrix.matrix3);
            let normal_matrix = if linear.determinant().abs() > f32::EPSILON {
                linear.inverse().transpose()
            } else {
                linear
            };
            for n in normals.iter_mut() {
                *n = (normal_matrix * *n).normalize_or_zero();
            }
        }

        self.compute_bounding_volume();
        self.touch();
    }

    /// Builds a new geometry from a subset of vertices.
    ///
    /// `kept[i]` is the source vertex of new vertex `i`; `indices` must already
    /// refer to the new numbering.
    pub(crate) fn remapped(&self, kept: &[u32], indices: Vec<u32>) -> Geometry {
        fn pick<T: Copy>(src: &[T], kept: &[u32]) -> Vec<T> {
            kept.iter().map(|&i| src[i as usize]).collect()
        }

        let mut geo = Geometry::new();
        geo.positions = pick(&self.positions, kept);
        geo.normals = self.normals.as_deref().map(|v| pick(v, kept));
        geo.uvs = self.uvs.as_deref().map(|v| pick(v, kept));
        geo.joints = self.joints.as_deref().map(|v| pick(v, kept));
        geo.weights = self.weights.as_deref().map(|v| pick(v, kept));
        geo.indices = Some(indices);
        geo.compute_bounding_volume();
        geo
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    #[must_use]
    pub fn new_box(width: f32, height: f32, depth: f32) -> Self {
        crate::resources::primitives::create_box(width, height, depth)
    }

    #[must_use]
    pub fn new_sphere(radius: f32) -> Self {
        crate::resources::primitives::create_sphere(&crate::resources::primitives::SphereOptions {
            radius,
            ..Default::default()
        })
    }

    #[must_use]
    pub fn new_plane(width: f32, height: f32) -> Self {
        crate::resources::primitives::create_plane(&crate::resources::primitives::PlaneOptions {
            width,
            height,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_not_finite() {
        assert!(BoundingBox::empty().is_empty());
        assert!(!BoundingBox::empty().is_finite());
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn set_positions_drops_mismatched_attributes() {
        let mut geo = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        geo.set_uvs(vec![Vec2::ZERO; 3]).unwrap();
        geo.set_positions(vec![Vec3::ZERO; 6]);
        assert!(geo.uvs().is_none());
    }

    #[test]
    fn set_indices_validates_range() {
        let mut geo = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert!(geo.set_indices(vec![0, 1, 3]).is_err());
        assert!(geo.set_indices(vec![0, 1]).is_err());
        assert!(!geo.is_indexed());
        geo.set_indices(vec![0, 1, 2]).unwrap();
        assert_eq!(geo.triangle_count(), 1);
    }
}
