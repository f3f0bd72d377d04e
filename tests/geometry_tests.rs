//! Geometry & Mesh Tests
//!
//! Tests for:
//! - BoundingBox: center, size, union, transform, finiteness
//! - Geometry: attribute validation, counts, normals, apply_matrix
//! - Primitives: box / sphere / plane
//! - Mesh: geometry swap, original cache and restore
//! - LOD simplification

use std::f32::consts::FRAC_PI_2;

use glam::{Affine3A, Quat, Vec2, Vec3, Vec4};
use forge::errors::ForgeError;
use forge::resources::simplify::simplify;
use forge::resources::{BoundingBox, Geometry, Material, Mesh};
use forge::{PlaneOptions, create_plane};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

fn grid_plane(segments: u32) -> Geometry {
    create_plane(&PlaneOptions {
        width: 4.0,
        height: 4.0,
        width_segments: segments,
        height_segments: segments,
    })
}

// ============================================================================
// BoundingBox
// ============================================================================

#[test]
fn bbox_center_and_size() {
    let bbox = BoundingBox {
        min: Vec3::new(-1.0, 0.0, -3.0),
        max: Vec3::new(3.0, 2.0, 1.0),
    };
    assert_eq!(bbox.center(), Vec3::new(1.0, 1.0, -1.0));
    assert_eq!(bbox.size(), Vec3::new(4.0, 2.0, 4.0));
}

#[test]
fn bbox_union() {
    let a = BoundingBox::from_points(&[Vec3::ZERO, Vec3::ONE]).unwrap();
    let b = BoundingBox::from_points(&[Vec3::splat(-2.0), Vec3::splat(-1.0)]).unwrap();
    let u = a.union(&b);
    assert_eq!(u.min, Vec3::splat(-2.0));
    assert_eq!(u.max, Vec3::ONE);
}

#[test]
fn bbox_transform_rotation() {
    let bbox = BoundingBox::from_points(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0)]).unwrap();
    let m = Affine3A::from_rotation_y(FRAC_PI_2);
    let t = bbox.transform(&m);
    // x extent maps onto -z
    assert!(vec3_approx(t.min, Vec3::new(0.0, 0.0, -2.0)));
    assert!(vec3_approx(t.max, Vec3::new(1.0, 1.0, 0.0)));
}

#[test]
fn bbox_empty_is_not_finite() {
    let empty = BoundingBox::empty();
    assert!(empty.is_empty());
    assert!(!empty.is_finite());
    assert!(BoundingBox::from_points(&[]).is_none());

    let nan = BoundingBox {
        min: Vec3::ZERO,
        max: Vec3::new(f32::NAN, 1.0, 1.0),
    };
    assert!(!nan.is_finite());
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn geometry_box_counts() {
    let geo = Geometry::new_box(1.0, 2.0, 3.0);
    assert!(geo.is_indexed());
    assert_eq!(geo.vertex_count(), 24);
    assert_eq!(geo.triangle_count(), 12);
    assert!(geo.normals().is_some());
    assert!(geo.uvs().is_some());

    let bbox = geo.bounding_box().unwrap();
    assert!(vec3_approx(bbox.size(), Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn geometry_non_indexed_triangle_count() {
    let geo = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE, Vec3::X]);
    assert!(!geo.is_indexed());
    assert_eq!(geo.triangle_count(), 2);
}

#[test]
fn geometry_sphere_bounding_sphere_radius() {
    let geo = Geometry::new_sphere(2.0);
    let sphere = geo.bounding_sphere().unwrap();
    assert!(vec3_approx(sphere.center, Vec3::ZERO));
    assert!(approx(sphere.radius, 2.0));
}

#[test]
fn geometry_plane_is_flat() {
    let geo = grid_plane(2);
    assert_eq!(geo.triangle_count(), 8);
    assert!(approx(geo.bounding_box().unwrap().size().y, 0.0));
}

#[test]
fn geometry_set_indices_validates() {
    let mut geo = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
    assert!(matches!(geo.set_indices(vec![0, 1]), Err(ForgeError::UnsupportedGeometry(_))));
    assert!(matches!(geo.set_indices(vec![0, 1, 3]), Err(ForgeError::UnsupportedGeometry(_))));
    assert!(!geo.is_indexed());

    let version = geo.data_version();
    geo.set_indices(vec![0, 1, 2]).unwrap();
    assert!(geo.is_indexed());
    assert!(geo.data_version() > version);
}

#[test]
fn geometry_attribute_length_must_match() {
    let mut geo = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
    assert!(geo.set_normals(vec![Vec3::Z; 2]).is_err());
    assert!(geo.set_uvs(vec![Vec2::ZERO; 4]).is_err());
    assert!(geo.set_skin(vec![[0; 4]; 3], vec![Vec4::X; 3]).is_ok());
    assert_eq!(geo.joints().map(<[_]>::len), Some(3));
}

#[test]
fn compute_normals_single_triangle_facing_z() {
    let mut geo = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
    geo.compute_vertex_normals();
    for n in geo.normals().unwrap() {
        assert!(vec3_approx(*n, Vec3::Z));
    }
}

#[test]
fn apply_matrix_moves_positions_and_bounds() {
    let mut geo = Geometry::new_box(2.0, 2.0, 2.0);
    let m = Affine3A::from_scale_rotation_translation(
        Vec3::splat(2.0),
        Quat::from_rotation_y(FRAC_PI_2),
        Vec3::new(10.0, 0.0, 0.0),
    );
    geo.apply_matrix(&m);

    let bbox = geo.bounding_box().unwrap();
    assert!(vec3_approx(bbox.center(), Vec3::new(10.0, 0.0, 0.0)));
    assert!(vec3_approx(bbox.size(), Vec3::splat(4.0)));

    // Normals stay unit length
    for n in geo.normals().unwrap() {
        assert!(approx(n.length(), 1.0));
    }
}

// ============================================================================
// Mesh
// ============================================================================

#[test]
fn mesh_replace_geometry_returns_old() {
    let mut mesh = Mesh::new(Geometry::new_box(1.0, 1.0, 1.0), Material::default());
    let old = mesh.replace_geometry(grid_plane(1));
    assert_eq!(old.triangle_count(), 12);
    assert_eq!(mesh.counts(), (2, 4));
}

#[test]
fn mesh_original_is_cached_once() {
    let mut mesh = Mesh::new(Geometry::new_box(1.0, 1.0, 1.0), Material::default());
    assert!(!mesh.restore_original());

    let uuid = mesh.cache_original().uuid;
    mesh.replace_geometry(grid_plane(1));
    assert_eq!(mesh.cache_original().uuid, uuid);

    assert!(mesh.restore_original());
    assert_eq!(mesh.geometry().triangle_count(), 12);
    // Cache survives a restore
    assert!(mesh.original_geometry().is_some());
}

#[test]
fn mesh_apply_matrix_moves_original_too() {
    let mut mesh = Mesh::new(Geometry::new_box(1.0, 1.0, 1.0), Material::default());
    mesh.cache_original();
    mesh.apply_matrix(&Affine3A::from_translation(Vec3::new(0.0, 5.0, 0.0)));

    let live = mesh.geometry().bounding_box().unwrap().center();
    let original = mesh.original_geometry().unwrap().bounding_box().unwrap().center();
    assert!(vec3_approx(live, Vec3::new(0.0, 5.0, 0.0)));
    assert!(vec3_approx(original, live));
}

// ============================================================================
// Simplification
// ============================================================================

#[test]
fn simplify_keeps_attributes_aligned() {
    let simplified = simplify(&grid_plane(6), 20).unwrap();
    let count = simplified.vertex_count();
    assert_eq!(simplified.normals().map(<[_]>::len), Some(count));
    assert_eq!(simplified.uvs().map(<[_]>::len), Some(count));
    let indices = simplified.indices().unwrap();
    assert!(indices.iter().all(|&i| (i as usize) < count));
}

#[test]
fn simplify_zero_target_keeps_one_triangle() {
    let simplified = simplify(&grid_plane(4), 0).unwrap();
    assert!(simplified.triangle_count() >= 1);
}
