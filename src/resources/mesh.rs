use glam::Affine3A;

use crate::resources::geometry::Geometry;
use crate::resources::material::Material;

/// Mesh component: one geometry and one material.
///
/// A mesh owns exactly one live geometry at a time. The optional
/// `original_geometry` is the pre-simplification backup, taken the first time
/// the mesh is simplified.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,

    geometry: Geometry,
    original_geometry: Option<Geometry>,

    pub material: Material,

    pub visible: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            name: "Mesh".to_string(),
            geometry,
            original_geometry: None,
            material,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    #[inline]
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// In-place access for transforms that keep the vertex layout (origin bake).
    #[inline]
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Swaps in a new geometry and returns the previous one.
    ///
    /// The caller decides whether the old geometry is dropped or kept.
    pub fn replace_geometry(&mut self, geometry: Geometry) -> Geometry {
        std::mem::replace(&mut self.geometry, geometry)
    }

    #[must_use]
    pub fn original_geometry(&self) -> Option<&Geometry> {
        self.original_geometry.as_ref()
    }

    /// Caches the current geometry as the original, once.
    ///
    /// Returns the cached original.
    pub fn cache_original(&mut self) -> &Geometry {
        self.original_geometry
            .get_or_insert_with(|| self.geometry.clone())
    }

    /// Puts the cached original back as the live geometry.
    ///
    /// Returns `false` when nothing was cached. The cache itself is kept so
    /// later simplifications still start from the original.
    pub fn restore_original(&mut self) -> bool {
        match &self.original_geometry {
            Some(original) => {
                self.geometry = original.clone();
                true
            }
            None => false,
        }
    }

    /// Bakes `matrix` into the live geometry and the cached original alike.
    pub fn apply_matrix(&mut self, matrix: &Affine3A) {
        self.geometry.apply_matrix(matrix);
        if let Some(original) = &mut self.original_geometry {
            original.apply_matrix(matrix);
        }
    }

    /// `(triangles, vertices)` of the live geometry.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        (self.geometry.triangle_count(), self.geometry.vertex_count())
    }
}
