//! Scene Graph
//!
//! Manages the node hierarchy of one loaded model:
//! - Node: hierarchy node with a TRS transform and a typed kind
//! - Transform: position, rotation, scale plus cached matrices
//! - Scene: node and mesh arenas
//! - TransformSystem: world-matrix propagation, decoupled from `Scene`

pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use node::{Node, NodeKind};
pub use scene::{NodeBuilder, Scene};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
}
