#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod editor;
pub mod errors;
pub mod grid;
pub mod registry;
pub mod resources;
pub mod scene;
pub mod settings;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
#[cfg(feature = "gltf")]
pub use assets::GltfLoader;
pub use assets::{AssetLoader, ExportRequest, Exporter, LoadQueue, ParsedAsset};
pub use editor::{MeshSummary, OriginMode, ReparentMode, TransformSnapshot};
pub use errors::{ForgeError, Result};
pub use grid::{GridConfig, SnapMode};
pub use registry::{ChangeEvent, ChangeKind, ChangeMask, FileInfo, ModelEntry, ModelId, Registry, SubscriptionId};
pub use resources::primitives::*;
pub use resources::{Geometry, Material, Mesh, Texture, TextureSlot};
pub use scene::{Node, NodeHandle, NodeKind, Scene};
pub use settings::{ForgeSettings, SimplifySettings};
