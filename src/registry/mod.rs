//! Asset Registry
//!
//! Tracks every loaded model, which one is active, and who wants to hear about
//! changes. Edit operations live in [`crate::editor`] as further `impl Registry`
//! blocks and always act on the active model.

pub mod events;
pub mod model;
#[allow(clippy::module_inception)]
pub mod registry;

pub use events::{ChangeEvent, ChangeKind, ChangeMask, SubscriptionId};
pub use model::{FileInfo, ModelAnimation, ModelEntry, ModelId};
pub use registry::Registry;
