//! Transform System
//!
//! Propagates local matrices down the hierarchy into world matrices. Kept apart
//! from [`Scene`](crate::scene::Scene) so it only borrows the node arena.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Updates world matrices for every tree rooted at `roots`.
///
/// Uses an explicit stack so deep hierarchies cannot overflow.
pub fn update_hierarchy_iterative(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    // (node, parent world matrix, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root_handle in roots.iter().rev() {
        stack.push((root_handle, Affine3A::IDENTITY, false));
    }

    propagate(nodes, stack);
}

/// Updates a subtree, starting from the parent's cached world matrix.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root_handle: NodeHandle) {
    let Some(node) = nodes.get(root_handle) else {
        return;
    };
    let parent_world = node
        .parent
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);

    propagate(nodes, vec![(root_handle, parent_world, true)]);
}

fn propagate(nodes: &mut SlotMap<NodeHandle, Node>, mut stack: Vec<(NodeHandle, Affine3A, bool)>) {
    while let Some((node_handle, parent_world_matrix, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(node_handle) else {
            continue;
        };

        // 1. Local matrix (dirty checked)
        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        // 2. World matrix
        if world_needs_update {
            let new_world = parent_world_matrix * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);
        }

        // 3. Children, pushed in reverse to keep traversal order
        let current_world = node.transform.world_matrix;
        for &child_handle in node.children.iter().rev() {
            stack.push((child_handle, current_world, world_needs_update));
        }
    }
}

/// Computes a node's world matrix by walking up the parent chain.
///
/// Reads TRS directly and ignores the cache, so it is correct even when the
/// hierarchy has not been updated this frame.
#[must_use]
pub fn compute_world_matrix(nodes: &SlotMap<NodeHandle, Node>, handle: NodeHandle) -> Option<Affine3A> {
    let mut node = nodes.get(handle)?;
    let mut world = node.transform.compose();
    while let Some(parent) = node.parent {
        node = nodes.get(parent)?;
        world = node.transform.compose() * world;
    }
    Some(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_hierarchy_update() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();

        let mut parent = Node::new("parent");
        parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
        let parent_handle = nodes.insert(parent);

        let mut child = Node::new("child");
        child.transform.position = Vec3::new(0.0, 1.0, 0.0);
        child.parent = Some(parent_handle);
        let child_handle = nodes.insert(child);

        nodes.get_mut(parent_handle).unwrap().children.push(child_handle);

        update_hierarchy_iterative(&mut nodes, &[parent_handle]);

        let child_world_pos = nodes.get(child_handle).unwrap().transform.world_matrix.translation;
        assert!((child_world_pos.x - 1.0).abs() < 1e-5);
        assert!((child_world_pos.y - 1.0).abs() < 1e-5);

        let walked = compute_world_matrix(&nodes, child_handle).unwrap();
        assert!((walked.translation.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_subtree_uses_parent_world() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let mut parent = Node::new("parent");
        parent.transform.position = Vec3::new(0.0, 0.0, 5.0);
        let parent_handle = nodes.insert(parent);
        let mut child = Node::new("child");
        child.parent = Some(parent_handle);
        let child_handle = nodes.insert(child);
        nodes.get_mut(parent_handle).unwrap().children.push(child_handle);

        update_hierarchy_iterative(&mut nodes, &[parent_handle]);
        nodes.get_mut(child_handle).unwrap().transform.position = Vec3::X;
        update_subtree(&mut nodes, child_handle);

        let t = nodes.get(child_handle).unwrap().transform.world_matrix.translation;
        assert!((t.x - 1.0).abs() < 1e-5);
        assert!((t.z - 5.0).abs() < 1e-5);
    }
}
