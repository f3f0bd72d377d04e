//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: add/remove nodes, attach/detach hierarchy, cycle rejection
//! - Mesh components: released with their nodes
//! - Node query: traversal order, find by name, mesh nodes
//! - Matrices & bounds: world matrix, preserve-world attach, subtree bbox

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use forge::errors::ForgeError;
use forge::resources::{Geometry, Material, Mesh};
use forge::scene::{Node, NodeKind, Scene};

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn cube(name: &str, size: f32) -> Mesh {
    Mesh::new(Geometry::new_box(size, size, size), Material::default()).with_name(name)
}

// ============================================================================
// Node Creation & Removal
// ============================================================================

#[test]
fn scene_add_node_to_root() {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new("Root"));
    assert!(scene.root_nodes.contains(&handle));
    assert_eq!(scene.node(handle).unwrap().name, "Root");
}

#[test]
fn scene_builder_sets_parent_and_mesh() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("Root"));
    let child = scene
        .build_node("Child")
        .with_parent(root)
        .with_position(1.0, 2.0, 3.0)
        .with_mesh(cube("Child", 1.0))
        .build();

    let node = scene.get_node(child).unwrap();
    assert_eq!(node.parent(), Some(root));
    assert!(node.kind.is_mesh());
    assert_eq!(node.transform.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(scene.get_node(root).unwrap().children(), &[child]);
    assert!(scene.mesh_of(child).is_some());
}

#[test]
fn add_mesh_names_node_after_mesh() {
    let mut scene = Scene::new();
    let top = scene.add_mesh(cube("Crate", 1.0));
    let lid = scene.add_mesh_to_parent(cube("Lid", 0.5), top);

    assert!(scene.root_nodes.contains(&top));
    assert_eq!(scene.get_node(top).unwrap().name, "Crate");
    assert_eq!(scene.get_node(lid).unwrap().name, "Lid");
    assert_eq!(scene.get_node(lid).unwrap().parent(), Some(top));
    assert_eq!(scene.mesh_of(lid).unwrap().name, "Lid");
}

#[test]
fn scene_remove_node_releases_subtree_meshes() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("Parent"));
    let a = scene.add_mesh_to_parent(cube("A", 1.0), parent);
    let b = scene.add_mesh_to_parent(cube("B", 1.0), a);

    let released = scene.remove_node(parent);

    assert_eq!(released.len(), 2);
    assert_eq!(released[0].name, "A");
    assert!(scene.get_node(parent).is_none());
    assert!(scene.get_node(a).is_none());
    assert!(scene.get_node(b).is_none());
    assert!(scene.meshes.is_empty());
    assert!(!scene.root_nodes.contains(&parent));
}

#[test]
fn scene_remove_child_unlinks_from_parent() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("Parent"));
    let child = scene.add_to_parent(Node::new("Child"), parent);

    scene.remove_node(child);

    assert!(scene.get_node(parent).unwrap().children().is_empty());
    assert!(!scene.root_nodes.contains(&child));
}

#[test]
fn add_to_stale_parent_falls_back_to_root() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("Parent"));
    scene.remove_node(parent);

    let orphan = scene.add_to_parent(Node::new("Orphan"), parent);
    assert!(scene.root_nodes.contains(&orphan));
    assert_eq!(scene.get_node(orphan).unwrap().parent(), None);
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn attach_moves_between_parents() {
    let mut scene = Scene::new();
    let p1 = scene.add_node(Node::new("P1"));
    let p2 = scene.add_node(Node::new("P2"));
    let child = scene.add_to_parent(Node::new("Child"), p1);

    scene.attach(child, p2).unwrap();

    assert!(scene.get_node(p1).unwrap().children().is_empty());
    assert_eq!(scene.get_node(p2).unwrap().children(), &[child]);
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(p2));
}

#[test]
fn attach_root_removes_it_from_root_list() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("Parent"));
    let child = scene.add_node(Node::new("Child"));

    scene.attach(child, parent).unwrap();
    assert!(!scene.root_nodes.contains(&child));
}

#[test]
fn attach_rejects_cycles() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    let b = scene.add_to_parent(Node::new("B"), a);
    let c = scene.add_to_parent(Node::new("C"), b);

    assert!(matches!(scene.attach(a, c), Err(ForgeError::HierarchyCycle(_))));
    assert!(matches!(scene.attach(a, a), Err(ForgeError::HierarchyCycle(_))));

    // Unchanged
    assert_eq!(scene.get_node(a).unwrap().parent(), None);
    assert_eq!(scene.get_node(c).unwrap().parent(), Some(b));
}

#[test]
fn attach_rejects_stale_handles() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    let gone = scene.add_node(Node::new("Gone"));
    scene.remove_node(gone);

    assert!(matches!(scene.attach(a, gone), Err(ForgeError::NodeNotFound(_))));
    assert!(matches!(scene.attach(gone, a), Err(ForgeError::NodeNotFound(_))));
}

#[test]
fn detach_makes_node_a_root() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("Parent"));
    let child = scene.add_to_parent(Node::new("Child"), parent);

    scene.detach(child);
    assert!(scene.root_nodes.contains(&child));
    assert!(scene.get_node(parent).unwrap().children().is_empty());
}

#[test]
fn is_ancestor_includes_self() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("A"));
    let b = scene.add_to_parent(Node::new("B"), a);

    assert!(scene.is_ancestor(a, b));
    assert!(scene.is_ancestor(b, b));
    assert!(!scene.is_ancestor(b, a));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn traverse_is_preorder() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("Root"));
    let a = scene.add_to_parent(Node::new("A"), root);
    let a1 = scene.add_to_parent(Node::new("A1"), a);
    let b = scene.add_to_parent(Node::new("B"), root);

    assert_eq!(scene.traverse(root), vec![root, a, a1, b]);
}

#[test]
fn find_by_name_searches_subtree_only() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("Root"));
    let hips = scene.add_to_parent(Node::with_kind("Hips", NodeKind::Bone), root);
    let other = scene.add_node(Node::new("Other"));
    scene.add_to_parent(Node::new("Outside"), other);

    assert_eq!(scene.find_by_name(root, "Hips"), Some(hips));
    assert_eq!(scene.find_by_name(root, "Outside"), None);
}

#[test]
fn mesh_nodes_lists_meshes_in_order() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("Root"));
    let a = scene.add_mesh_to_parent(cube("A", 1.0), root);
    scene.add_to_parent(Node::new("Group"), root);
    let b = scene.add_mesh_to_parent(cube("B", 1.0), root);

    assert_eq!(scene.mesh_nodes(root), vec![a, b]);
}

// ============================================================================
// Matrices & Bounds
// ============================================================================

#[test]
fn world_matrix_composes_parents() {
    let mut scene = Scene::new();
    let parent = scene.build_node("Parent").with_position(10.0, 0.0, 0.0).with_scale(2.0).build();
    let child = scene.build_node("Child").with_parent(parent).with_position(1.0, 0.0, 0.0).build();

    let world = scene.world_matrix(child).unwrap();
    assert!(vec3_approx(world.translation.into(), Vec3::new(12.0, 0.0, 0.0)));
}

#[test]
fn update_matrix_world_fills_cache() {
    let mut scene = Scene::new();
    let parent = scene.build_node("Parent").with_position(0.0, 5.0, 0.0).build();
    let child = scene.build_node("Child").with_parent(parent).with_position(0.0, 1.0, 0.0).build();

    scene.update_matrix_world();

    let cached = scene.get_node(child).unwrap().world_matrix().translation;
    assert!(vec3_approx(cached.into(), Vec3::new(0.0, 6.0, 0.0)));
}

#[test]
fn attach_preserving_world_keeps_position() {
    let mut scene = Scene::new();
    let bone = scene.build_node("Bone").with_position(3.0, 1.0, 0.0).build();
    scene.get_node_mut(bone).unwrap().transform.rotation = Quat::from_rotation_y(FRAC_PI_2);
    let object = scene.build_node("Object").with_position(5.0, 2.0, -1.0).build();

    let before = scene.world_matrix(object).unwrap().translation;
    scene.attach_preserving_world(object, bone).unwrap();
    let after = scene.world_matrix(object).unwrap().translation;

    assert_eq!(scene.get_node(object).unwrap().parent(), Some(bone));
    assert!(vec3_approx(before.into(), after.into()));
}

#[test]
fn relative_matrix_stops_at_ancestor() {
    let mut scene = Scene::new();
    let top = scene.build_node("Top").with_position(100.0, 0.0, 0.0).build();
    let mid = scene.build_node("Mid").with_parent(top).with_position(1.0, 0.0, 0.0).build();
    let leaf = scene.build_node("Leaf").with_parent(mid).with_position(0.0, 1.0, 0.0).build();

    let m = scene.relative_matrix(leaf, mid).unwrap();
    assert!(vec3_approx(m.translation.into(), Vec3::new(0.0, 1.0, 0.0)));
    assert!(scene.relative_matrix(top, leaf).is_err());
}

#[test]
fn subtree_bbox_uses_world_transforms() {
    let mut scene = Scene::new();
    let root = scene.build_node("Root").with_position(0.0, 1.0, 0.0).build();
    let mesh = scene.add_mesh_to_parent(cube("Cube", 2.0), root);
    scene.get_node_mut(mesh).unwrap().transform.position = Vec3::new(5.0, 0.0, 0.0);

    let bbox = scene.get_bbox_of_node(root).unwrap();
    assert!(vec3_approx(bbox.min, Vec3::new(4.0, 0.0, -1.0)));
    assert!(vec3_approx(bbox.max, Vec3::new(6.0, 2.0, 1.0)));
}

#[test]
fn subtree_bbox_of_empty_group_is_none() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("Empty"));
    assert!(scene.get_bbox_of_node(root).is_none());
}
