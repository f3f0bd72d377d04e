use std::sync::Arc;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binding::TargetPath;
use crate::animation::clip::AnimationClip;
use crate::scene::Scene;

/// Index of an action inside its mixer.
pub type ActionIndex = usize;

/// Drives the actions of one model and writes their poses into its scene.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    pub fn add_action(&mut self, action: AnimationAction) -> ActionIndex {
        self.actions.push(action);
        self.actions.len() - 1
    }

    #[must_use]
    pub fn action(&self, index: ActionIndex) -> Option<&AnimationAction> {
        self.actions.get(index)
    }

    pub fn action_mut(&mut self, index: ActionIndex) -> Option<&mut AnimationAction> {
        self.actions.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn stop_all_action(&mut self) {
        for action in &mut self.actions {
            action.stop();
        }
    }

    /// Drops every action playing `clip`.
    pub fn uncache_clip(&mut self, clip: &Arc<AnimationClip>) {
        self.actions.retain(|a| !Arc::ptr_eq(a.clip(), clip));
    }

    /// Advances running actions by `dt`, then applies all poses.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for action in &mut self.actions {
            action.update(dt);
        }
        self.apply(scene);
    }

    /// Writes the current pose of every enabled action into `scene`.
    ///
    /// Paused actions still apply, so seeking while paused shows the new pose.
    pub fn apply(&mut self, scene: &mut Scene) {
        for action in &mut self.actions {
            if !action.enabled || action.weight <= 0.0 {
                continue;
            }

            for b in 0..action.bindings.len() {
                let binding = action.bindings[b].clone();
                let Some(value) = action.sample_track(binding.track_index) else {
                    continue;
                };
                let Some(node) = scene.get_node_mut(binding.node_handle) else {
                    continue;
                };

                match (value, binding.target) {
                    (TrackValue::Vector3(v), TargetPath::Translation) => node.transform.position = v,
                    (TrackValue::Vector3(v), TargetPath::Scale) => node.transform.scale = v,
                    (TrackValue::Quaternion(q), TargetPath::Rotation) => node.transform.rotation = q,
                    _ => {}
                }
            }
        }
    }
}
