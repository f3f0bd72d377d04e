//! Animation binding and playback control.
//!
//! A model plays at most one clip. Binding a new clip stops and drops the
//! previous one first. New actions start paused at time zero.

use std::sync::Arc;

use crate::animation::{AnimationAction, AnimationClip, Binder};
use crate::editor::invalid_argument;
use crate::errors::{ForgeError, Result};
use crate::registry::{ChangeEvent, ChangeKind, ModelAnimation, ModelEntry, Registry};

fn bind_clip(entry: &mut ModelEntry, clip: Arc<AnimationClip>) {
    if let Some(previous) = entry.animation.take() {
        entry.mixer.stop_all_action();
        entry.mixer.uncache_clip(&previous.clip);
    }

    let bindings = Binder::bind(&entry.scene, entry.scene_root(), &clip);
    log::info!(
        "{}: bound clip '{}' ({:.2}s, {}/{} tracks)",
        entry.id(),
        clip.name,
        clip.duration,
        bindings.len(),
        clip.tracks.len()
    );

    let action = AnimationAction::new(clip.clone()).with_bindings(bindings);
    let index = entry.mixer.add_action(action);
    entry.animation = Some(ModelAnimation {
        clip,
        action: index,
    });
}

fn require_animation(entry: &ModelEntry) -> Result<()> {
    if entry.animation.is_some() {
        Ok(())
    } else {
        Err(invalid_argument(format!("{} has no animation", entry.id())))
    }
}

impl Registry {
    /// Binds the first of `clips` (typically parsed from a separate animation
    /// file) to the active model.
    pub fn load_animation(&mut self, clips: Vec<AnimationClip>) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        if !entry.has_skeleton() {
            let err = ForgeError::NoSkeleton(entry.file_info().name.clone());
            log::warn!("{err}");
            return Err(err);
        }
        let Some(clip) = clips.into_iter().next() else {
            log::warn!("{}", ForgeError::NoAnimations);
            return Err(ForgeError::NoAnimations);
        };

        bind_clip(entry, Arc::new(clip));
        self.emit(&[ChangeEvent::new(id, ChangeKind::AnimationChanged)]);
        Ok(())
    }

    /// Binds one of the clips embedded in the model's own file.
    pub fn use_embedded_clip(&mut self, index: usize) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        let Some(clip) = entry.clips().get(index).cloned() else {
            return Err(invalid_argument(format!(
                "{id} has {} embedded clips, index {index} is out of range",
                entry.clips().len()
            )));
        };

        bind_clip(entry, clip);
        self.emit(&[ChangeEvent::new(id, ChangeKind::AnimationChanged)]);
        Ok(())
    }

    /// Stops and drops the active model's animation. No-op without one.
    pub fn remove_animation(&mut self) -> Result<()> {
        let (id, entry) = self.require_active_mut()?;
        let Some(previous) = entry.animation.take() else {
            return Ok(());
        };
        entry.mixer.stop_all_action();
        entry.mixer.uncache_clip(&previous.clip);

        self.emit(&[ChangeEvent::new(id, ChangeKind::AnimationChanged)]);
        Ok(())
    }

    /// Pauses a running animation or resumes a paused one. Returns `true`
    /// when it is now playing.
    pub fn toggle_playback(&mut self) -> Result<bool> {
        let (id, entry) = self.require_active_mut()?;
        require_animation(entry)?;
        let Some(action) = entry.action_mut() else {
            return Err(invalid_argument(format!("{id} has no animation action")));
        };

        if action.is_running() {
            action.paused = true;
        } else {
            action.play();
        }
        let playing = action.is_running();

        self.emit(&[ChangeEvent::new(id, ChangeKind::AnimationChanged)]);
        Ok(playing)
    }

    /// Moves the playhead by `delta` seconds (clamped at zero) and applies the
    /// pose immediately, even while paused.
    pub fn seek_by(&mut self, delta: f32) -> Result<f32> {
        if !delta.is_finite() {
            return Err(invalid_argument(format!("seek delta {delta} is not finite")));
        }
        let (id, entry) = self.require_active_mut()?;
        require_animation(entry)?;
        let Some(action) = entry.action_mut() else {
            return Err(invalid_argument(format!("{id} has no animation action")));
        };
        action.seek_by(delta);
        let time = action.time;

        entry.mixer.apply(&mut entry.scene);
        entry.scene.update_matrix_world();

        self.emit(&[ChangeEvent::new(id, ChangeKind::AnimationChanged)]);
        Ok(time)
    }

    /// Shows or hides the skeleton helper. Returns the new visibility.
    pub fn toggle_skeleton_helper(&mut self) -> Result<bool> {
        let (id, entry) = self.require_active_mut()?;
        let Some(helper) = entry.skeleton_helper() else {
            let err = ForgeError::NoSkeleton(entry.file_info().name.clone());
            log::warn!("{err}");
            return Err(err);
        };
        let node = entry.scene.node_mut(helper)?;
        node.visible = !node.visible;
        let visible = node.visible;

        self.emit(&[ChangeEvent::new(id, ChangeKind::AnimationChanged)]);
        Ok(visible)
    }
}
