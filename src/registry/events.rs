//! Change notifications.
//!
//! Observers register with a [`ChangeMask`] and receive the batch of
//! [`ChangeEvent`]s produced by one registry operation, filtered to the kinds
//! they asked for. Counts and selection are already up to date when a
//! callback runs.

use std::fmt;

use bitflags::bitflags;

use crate::registry::ModelId;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    ModelAdded,
    ModelRemoved,
    /// The active selection moved. The event's model is the new active one.
    ActiveChanged,
    /// Anchor or scene root transform edited.
    TransformChanged,
    /// Mesh list, names, visibility or geometry changed.
    MeshesChanged,
    MaterialChanged,
    AnimationChanged,
    /// Selected sub-object changed.
    SelectionChanged,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ChangeMask: u32 {
        const MODEL_ADDED   = 1 << 0;
        const MODEL_REMOVED = 1 << 1;
        const ACTIVE        = 1 << 2;
        const TRANSFORM     = 1 << 3;
        const MESHES        = 1 << 4;
        const MATERIAL      = 1 << 5;
        const ANIMATION     = 1 << 6;
        const SELECTION     = 1 << 7;

        /// Model list or active selection: what a model picker needs.
        const MODELS = Self::MODEL_ADDED.bits() | Self::MODEL_REMOVED.bits() | Self::ACTIVE.bits();
    }
}

impl ChangeKind {
    #[must_use]
    pub fn mask(self) -> ChangeMask {
        match self {
            ChangeKind::ModelAdded => ChangeMask::MODEL_ADDED,
            ChangeKind::ModelRemoved => ChangeMask::MODEL_REMOVED,
            ChangeKind::ActiveChanged => ChangeMask::ACTIVE,
            ChangeKind::TransformChanged => ChangeMask::TRANSFORM,
            ChangeKind::MeshesChanged => ChangeMask::MESHES,
            ChangeKind::MaterialChanged => ChangeMask::MATERIAL,
            ChangeKind::AnimationChanged => ChangeMask::ANIMATION,
            ChangeKind::SelectionChanged => ChangeMask::SELECTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// `None` only for an [`ChangeKind::ActiveChanged`] that cleared the selection.
    pub model: Option<ModelId>,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    #[must_use]
    pub fn new(model: ModelId, kind: ChangeKind) -> Self {
        Self {
            model: Some(model),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

pub type ChangeCallback = Box<dyn FnMut(&[ChangeEvent])>;

struct Subscriber {
    id: SubscriptionId,
    mask: ChangeMask,
    callback: ChangeCallback,
}

#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Observers {
    pub(crate) fn subscribe(&mut self, mask: ChangeMask, callback: ChangeCallback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber { id, mask, callback });
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub(crate) fn notify(&mut self, events: &[ChangeEvent]) {
        if events.is_empty() {
            return;
        }
        let mut filtered: Vec<ChangeEvent> = Vec::with_capacity(events.len());
        for subscriber in &mut self.subscribers {
            filtered.clear();
            filtered.extend(
                events
                    .iter()
                    .filter(|e| subscriber.mask.contains(e.kind.mask())),
            );
            if !filtered.is_empty() {
                (subscriber.callback)(&filtered);
            }
        }
    }
}
