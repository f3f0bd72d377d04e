//! Core resource definitions
//!
//! CPU-side data owned by scene meshes:
//! - Geometry: planar vertex attributes, indices and bounds
//! - Mesh: one geometry plus one material, with the simplification backup
//! - Material: basic/standard materials and their texture slots
//! - Texture: encoded image payload, sampler and UV transform
//! - simplify: meshopt-backed LOD reduction

pub mod geometry;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod simplify;
pub mod texture;

pub use geometry::{BoundingBox, BoundingSphere, Geometry};
pub use material::{Material, MaterialData, MaterialFeatures, MeshBasicMaterial, MeshStandardMaterial, TextureSlot};
pub use mesh::Mesh;
pub use texture::{Texture, TextureSampler, TextureTransform, WrapMode};
