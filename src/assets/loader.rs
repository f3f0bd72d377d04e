use crate::animation::AnimationClip;
use crate::errors::Result;
use crate::scene::{NodeHandle, Scene};

/// Output of a successful parse: a scene arena, the root node of the asset
/// inside it and the embedded animation clips.
#[derive(Debug)]
pub struct ParsedAsset {
    pub scene: Scene,
    pub root: NodeHandle,
    pub clips: Vec<AnimationClip>,
}

/// Turns encoded asset bytes into a [`ParsedAsset`].
///
/// Implementations must be shareable across threads so the
/// [`LoadQueue`](crate::assets::LoadQueue) can run them on worker threads.
pub trait AssetLoader: Send + Sync {
    /// `name` is the display name of the source file, used in error messages.
    fn parse(&self, bytes: &[u8], name: &str) -> Result<ParsedAsset>;
}
