//! Mesh Simplification
//!
//! Thin layer over `meshopt`. The attribute-aware edge collapse runs first
//! and keeps borders and seams within [`TARGET_ERROR`]; when that cannot
//! reach the requested triangle count the sloppy clusterer takes over.
//!
//! Both passes only rewrite the index buffer. The surviving vertices are then
//! compacted with [`Geometry::remapped`] so every attribute stream shrinks
//! together. The source geometry is never modified.

use meshopt::{SimplifyOptions, VertexDataAdapter};

use crate::errors::{ForgeError, Result};
use crate::resources::geometry::Geometry;

/// Error budget for the precise pass, relative to the mesh extent.
const TARGET_ERROR: f32 = 0.02;

/// Position stream size: three tightly packed `f32`.
const POSITION_STRIDE: usize = 12;

/// Simplifies `geometry` towards `target_triangles`.
///
/// The result has at most the source's triangle count and never fewer than
/// one triangle. Very low targets may not be reached exactly.
pub fn simplify(geometry: &Geometry, target_triangles: usize) -> Result<Geometry> {
    let Some(indices) = geometry.indices() else {
        return Err(ForgeError::UnsupportedGeometry(
            "simplification requires indexed geometry".to_string(),
        ));
    };

    let current = indices.len() / 3;
    if target_triangles >= current || current == 0 {
        return Ok(geometry.clone());
    }

    let bytes: Vec<u8> = geometry
        .positions()
        .iter()
        .flat_map(|p| p.to_array())
        .flat_map(f32::to_ne_bytes)
        .collect();
    let adapter = VertexDataAdapter::new(&bytes, POSITION_STRIDE, 0)
        .map_err(|e| ForgeError::UnsupportedGeometry(format!("position stream rejected: {e:?}")))?;

    let target_indices = target_triangles.max(1) * 3;
    let mut simplified = meshopt::simplify(
        indices,
        &adapter,
        target_indices,
        TARGET_ERROR,
        SimplifyOptions::empty(),
        None,
    );
    if simplified.len() > target_indices {
        let sloppy = meshopt::simplify_sloppy(indices, &adapter, target_indices, f32::MAX, None);
        if !sloppy.is_empty() {
            simplified = sloppy;
        }
    }
    if simplified.is_empty() {
        return Ok(geometry.clone());
    }

    let (kept, remapped) = compact(&simplified, geometry.vertex_count());
    log::debug!(
        "Simplified {} -> {} triangles (target {})",
        current,
        remapped.len() / 3,
        target_triangles
    );
    Ok(geometry.remapped(&kept, remapped))
}

/// Renumbers `indices` densely in first-use order. Returns the source vertex
/// of every new slot and the rewritten indices.
fn compact(indices: &[u32], vertex_count: usize) -> (Vec<u32>, Vec<u32>) {
    let mut slot = vec![u32::MAX; vertex_count];
    let mut kept = Vec::new();
    let remapped = indices
        .iter()
        .map(|&i| {
            let s = &mut slot[i as usize];
            if *s == u32::MAX {
                *s = kept.len() as u32;
                kept.push(i);
            }
            *s
        })
        .collect();
    (kept, remapped)
}
