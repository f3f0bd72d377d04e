//! Placement Tests
//!
//! Tests for:
//! - GridConfig: center snapping, tile indices, extents
//! - Anchor placement: world position, cursor snap, center tile
//! - Scene root edits: stick to ground, fit to tiles, zero position
//! - Transform snapshot JSON

use glam::Vec3;

use forge::errors::ForgeError;
use forge::resources::{Geometry, Material, Mesh};
use forge::scene::{Node, Scene};
use forge::{FileInfo, ForgeSettings, GridConfig, ModelId, ParsedAsset, Registry, SnapMode, TransformSnapshot};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn asset_with(geometry: Geometry) -> ParsedAsset {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("Scene"));
    scene.add_mesh_to_parent(Mesh::new(geometry, Material::default()).with_name("Body"), root);
    ParsedAsset {
        scene,
        root,
        clips: Vec::new(),
    }
}

fn registry_with(geometry: Geometry) -> (Registry, ModelId) {
    let mut registry = Registry::new();
    let id = registry
        .add_model(asset_with(geometry), FileInfo::new("model.glb", 0))
        .unwrap();
    (registry, id)
}

fn anchor_position(registry: &Registry) -> Vec3 {
    let entry = registry.active().unwrap();
    entry.scene().get_node(entry.anchor()).unwrap().transform.position
}

fn root_position(registry: &Registry) -> Vec3 {
    let entry = registry.active().unwrap();
    entry.scene().get_node(entry.scene_root()).unwrap().transform.position
}

fn world_bounds(registry: &Registry) -> forge::resources::BoundingBox {
    let entry = registry.active().unwrap();
    entry.scene().get_bbox_of_node(entry.scene_root()).unwrap()
}

// ============================================================================
// GridConfig
// ============================================================================

#[test]
fn grid_centers_snap_to_half_tiles() {
    let grid = GridConfig::default();
    assert!(approx(grid.snap_world_coordinate(0.73), 0.5));
    assert!(approx(grid.snap_world_coordinate(1.6), 1.5));
    assert!(approx(grid.snap_world_coordinate(-0.2), -0.5));
    assert!(approx(grid.snap_world_coordinate(0.5), 0.5));
}

#[test]
fn grid_snap_keeps_height() {
    let grid = GridConfig::new(2.0, 10, SnapMode::Centers);
    let snapped = grid.snap_world_point(Vec3::new(2.4, 7.25, -0.3));
    assert!(vec3_approx(snapped, Vec3::new(3.0, 7.25, -1.0)));
}

#[test]
fn grid_tile_indices_are_zero_based_from_corner() {
    let grid = GridConfig::default();
    assert_eq!(grid.world_to_tile_index(0.5), 25);
    assert_eq!(grid.world_to_tile_index(-24.5), 0);
    assert_eq!(grid.world_to_tile_index(24.5), 49);
    assert!(approx(grid.grid_extent(), 25.0));
    assert!(vec3_approx(grid.center_tile_position(1.0), Vec3::new(0.5, 1.0, 0.5)));
}

// ============================================================================
// Anchor placement
// ============================================================================

#[test]
fn place_at_world_position_keeps_height() {
    let (mut registry, _) = registry_with(Geometry::new_box(1.0, 1.0, 1.0));
    registry
        .set_anchor_transform(Vec3::new(0.0, 3.0, 0.0), Vec3::ONE)
        .unwrap();

    registry.place_at_world_position(4.0, -2.0).unwrap();
    assert_eq!(anchor_position(&registry), Vec3::new(4.0, 3.0, -2.0));
}

#[test]
fn place_at_world_position_rejects_non_finite() {
    let (mut registry, _) = registry_with(Geometry::new_box(1.0, 1.0, 1.0));
    assert!(matches!(
        registry.place_at_world_position(f32::NAN, 0.0),
        Err(ForgeError::InvalidArgument(_))
    ));
    assert!(registry.place_at_world_position(0.0, f32::INFINITY).is_err());
    assert_eq!(anchor_position(&registry), Vec3::ZERO);
}

#[test]
fn place_at_cursor_snaps_to_tile_center() {
    let (mut registry, _) = registry_with(Geometry::new_box(1.0, 1.0, 1.0));
    registry.place_at_cursor(Vec3::new(2.3, 9.0, -1.2)).unwrap();
    assert!(vec3_approx(anchor_position(&registry), Vec3::new(2.5, 0.0, -1.5)));
}

#[test]
fn snap_to_center_tile_zeroes_horizontal_offset() {
    let settings = ForgeSettings::from_json_str(r#"{ "grid": { "tile_size": 2.0 } }"#).unwrap();
    let mut registry = Registry::with_settings(settings).unwrap();
    registry
        .add_model(asset_with(Geometry::new_box(1.0, 1.0, 1.0)), FileInfo::new("m.glb", 0))
        .unwrap();
    {
        let entry = registry.active_mut().unwrap();
        let root = entry.scene_root();
        entry.scene_mut().get_node_mut(root).unwrap().transform.position = Vec3::new(5.0, 1.5, -3.0);
    }

    registry.snap_to_center_tile_and_zero().unwrap();
    assert!(vec3_approx(anchor_position(&registry), Vec3::new(1.0, 0.0, 1.0)));
    assert!(vec3_approx(root_position(&registry), Vec3::new(0.0, 1.5, 0.0)));
}

// ============================================================================
// Scene root edits
// ============================================================================

#[test]
fn stick_to_ground_puts_lowest_point_at_zero() {
    let (mut registry, _) = registry_with(Geometry::new_box(1.0, 3.0, 1.0));
    registry.stick_to_ground().unwrap();

    assert!(approx(root_position(&registry).y, 1.5));
    assert!(approx(world_bounds(&registry).min.y, 0.0));
}

#[test]
fn stick_to_ground_accounts_for_root_scale() {
    let (mut registry, _) = registry_with(Geometry::new_box(1.0, 1.0, 1.0));
    {
        let entry = registry.active_mut().unwrap();
        let root = entry.scene_root();
        let t = &mut entry.scene_mut().get_node_mut(root).unwrap().transform;
        t.scale = Vec3::splat(4.0);
        t.position.y = 10.0;
    }
    registry.stick_to_ground().unwrap();
    assert!(approx(world_bounds(&registry).min.y, 0.0));
    assert!(approx(root_position(&registry).y, 2.0));
}

#[test]
fn stick_to_ground_needs_geometry() {
    let mut registry = Registry::new();
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("Empty"));
    registry
        .add_model(
            ParsedAsset {
                scene,
                root,
                clips: Vec::new(),
            },
            FileInfo::new("empty.glb", 0),
        )
        .unwrap();

    assert!(matches!(registry.stick_to_ground(), Err(ForgeError::DegenerateBounds(_))));
    assert!(matches!(registry.fit_to_tiles(1, 1), Err(ForgeError::DegenerateBounds(_))));
}

#[test]
fn fit_to_tiles_uses_tighter_axis() {
    let (mut registry, _) = registry_with(Geometry::new_box(2.0, 1.0, 4.0));
    registry.fit_to_tiles(2, 2).unwrap();

    let size = world_bounds(&registry).size();
    assert!(approx(size.x, 1.0));
    assert!(approx(size.z, 2.0));
    // Uniform scale keeps proportions
    assert!(approx(size.y, 0.5));
}

#[test]
fn fit_to_single_tile_scales_uniformly() {
    let (mut registry, _) = registry_with(Geometry::new_box(4.0, 2.0, 2.0));
    registry.fit_to_tiles(1, 1).unwrap();

    let entry = registry.active().unwrap();
    let scale = entry.scene().get_node(entry.scene_root()).unwrap().transform.scale;
    assert!(vec3_approx(scale, Vec3::splat(0.25)));
}

#[test]
fn fit_to_tiles_compounds_with_existing_scale() {
    let (mut registry, _) = registry_with(Geometry::new_box(1.0, 1.0, 1.0));
    registry.fit_to_tiles(3, 3).unwrap();
    registry.fit_to_tiles(3, 3).unwrap();
    assert!(approx(world_bounds(&registry).size().x, 3.0));
}

#[test]
fn fit_to_tiles_ignores_flat_axis() {
    // Flat in z
    let geometry = Geometry::from_positions(vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
    ]);
    let (mut registry, _) = registry_with(geometry);
    registry.fit_to_tiles(2, 1).unwrap();
    assert!(approx(world_bounds(&registry).size().x, 2.0));
}

#[test]
fn fit_to_tiles_rejects_vertical_line_and_zero_counts() {
    let geometry = Geometry::from_positions(vec![Vec3::ZERO, Vec3::Y, Vec3::Y * 2.0]);
    let (mut registry, _) = registry_with(geometry);

    assert!(matches!(registry.fit_to_tiles(0, 1), Err(ForgeError::InvalidArgument(_))));
    assert!(matches!(registry.fit_to_tiles(1, 1), Err(ForgeError::DegenerateBounds(_))));
}

#[test]
fn zero_position_clears_root_offset() {
    let (mut registry, _) = registry_with(Geometry::new_box(1.0, 1.0, 1.0));
    registry.stick_to_ground().unwrap();
    assert!(root_position(&registry).y > 0.0);

    registry.zero_position().unwrap();
    assert_eq!(root_position(&registry), Vec3::ZERO);
}

// ============================================================================
// Snapshot
// ============================================================================

#[test]
fn transform_snapshot_round_trips_anchor() {
    let (mut registry, _) = registry_with(Geometry::new_box(1.0, 1.0, 1.0));
    registry
        .set_anchor_transform(Vec3::new(1.5, 0.0, -2.5), Vec3::new(2.0, 2.0, 2.0))
        .unwrap();

    let json = registry.transform_snapshot().unwrap();
    let snapshot: TransformSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot.position, [1.5, 0.0, -2.5]);
    assert_eq!(snapshot.scale, [2.0, 2.0, 2.0]);

    assert!(registry
        .set_anchor_transform(Vec3::ZERO, Vec3::new(f32::NAN, 1.0, 1.0))
        .is_err());
}
