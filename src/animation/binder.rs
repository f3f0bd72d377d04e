use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Resolves every track of `clip` to a node under `root` by name.
    ///
    /// Tracks whose node is missing are skipped, so a clip authored for a
    /// compatible rig still plays on the joints both rigs share.
    pub fn bind(scene: &Scene, root: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());
        let mut missing = 0usize;

        for (track_index, track) in clip.tracks.iter().enumerate() {
            match scene.find_by_name(root, &track.meta.node_name) {
                Some(node_handle) => bindings.push(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.meta.target,
                }),
                None => missing += 1,
            }
        }

        if missing > 0 {
            log::debug!(
                "Clip '{}': {} of {} tracks have no matching node",
                clip.name,
                missing,
                clip.tracks.len()
            );
        }
        bindings
    }
}
