use std::collections::BTreeMap;

use crate::assets::{ExportRequest, ParsedAsset, default_export_filename, normalize_filename};
use crate::errors::{ForgeError, Result};
use crate::grid::GridConfig;
use crate::registry::events::{ChangeCallback, ChangeEvent, ChangeKind, ChangeMask, Observers, SubscriptionId};
use crate::registry::model::{FileInfo, ModelEntry, ModelId};
use crate::settings::ForgeSettings;

/// Owns every loaded model and the active selection.
///
/// Single-threaded: all mutation goes through `&mut self`. Every operation
/// validates before it mutates, so an `Err` leaves the registry unchanged.
#[derive(Debug)]
pub struct Registry {
    models: BTreeMap<ModelId, ModelEntry>,
    active: Option<ModelId>,
    next_id: u64,

    settings: ForgeSettings,
    observers: Observers,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: BTreeMap::new(),
            active: None,
            next_id: 1,
            settings: ForgeSettings::default(),
            observers: Observers::default(),
        }
    }

    pub fn with_settings(settings: ForgeSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::new()
        })
    }

    #[must_use]
    pub fn settings(&self) -> &ForgeSettings {
        &self.settings
    }

    #[must_use]
    pub fn grid(&self) -> &GridConfig {
        &self.settings.grid
    }

    // ========================================================================
    // Model lifecycle
    // ========================================================================

    /// Registers a parsed asset and returns its id.
    ///
    /// The first model registered while nothing is active becomes active.
    pub fn add_model(&mut self, parsed: ParsedAsset, file_info: FileInfo) -> Result<ModelId> {
        let id = ModelId::new(self.next_id);
        let entry = ModelEntry::from_parsed(id, parsed, file_info)?;
        self.next_id += 1;

        log::info!(
            "Registered {} '{}' ({} polygons, {} vertices)",
            id,
            entry.file_info.name,
            entry.file_info.polygon_count,
            entry.file_info.vertex_count
        );
        self.models.insert(id, entry);

        let mut events = vec![ChangeEvent::new(id, ChangeKind::ModelAdded)];
        if self.active.is_none() {
            self.active = Some(id);
            events.push(ChangeEvent::new(id, ChangeKind::ActiveChanged));
        }
        self.emit(&events);
        Ok(id)
    }

    /// Drops a model and everything it owns.
    ///
    /// When the active model is removed the smallest remaining id becomes
    /// active.
    pub fn remove_model(&mut self, id: ModelId) -> Result<()> {
        let Some(entry) = self.models.remove(&id) else {
            let err = ForgeError::ModelNotFound(id.to_string());
            log::warn!("{err}");
            return Err(err);
        };
        let released = entry.dispose();
        log::info!("Removed {id}, released {released} meshes");

        let mut events = vec![ChangeEvent::new(id, ChangeKind::ModelRemoved)];
        if self.active == Some(id) {
            self.active = self.models.keys().next().copied();
            events.push(ChangeEvent {
                model: self.active,
                kind: ChangeKind::ActiveChanged,
            });
        }
        self.emit(&events);
        Ok(())
    }

    /// Changes the active model. Unknown ids are ignored.
    pub fn set_active(&mut self, id: Option<ModelId>) {
        if let Some(id) = id
            && !self.models.contains_key(&id)
        {
            log::debug!("set_active: {id} is not registered");
            return;
        }
        if self.active == id {
            return;
        }
        self.active = id;
        self.emit(&[ChangeEvent {
            model: id,
            kind: ChangeKind::ActiveChanged,
        }]);
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[must_use]
    pub fn active_id(&self) -> Option<ModelId> {
        self.active
    }

    #[must_use]
    pub fn active(&self) -> Option<&ModelEntry> {
        self.active.and_then(|id| self.models.get(&id))
    }

    pub fn active_mut(&mut self) -> Option<&mut ModelEntry> {
        self.active.and_then(|id| self.models.get_mut(&id))
    }

    /// The active id, or [`ForgeError::NoActiveModel`].
    pub fn require_active(&self) -> Result<ModelId> {
        self.active.ok_or_else(|| {
            log::warn!("{}", ForgeError::NoActiveModel);
            ForgeError::NoActiveModel
        })
    }

    pub(crate) fn require_active_entry(&self) -> Result<&ModelEntry> {
        let id = self.require_active()?;
        self.get(id)
            .ok_or_else(|| ForgeError::ModelNotFound(id.to_string()))
    }

    pub(crate) fn require_active_mut(&mut self) -> Result<(ModelId, &mut ModelEntry)> {
        let id = self.require_active()?;
        self.models
            .get_mut(&id)
            .map(|entry| (id, entry))
            .ok_or_else(|| ForgeError::ModelNotFound(id.to_string()))
    }

    #[must_use]
    pub fn get(&self, id: ModelId) -> Option<&ModelEntry> {
        self.models.get(&id)
    }

    pub fn get_mut(&mut self, id: ModelId) -> Option<&mut ModelEntry> {
        self.models.get_mut(&id)
    }

    /// Registered ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<ModelId> {
        self.models.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModelId, &ModelEntry)> {
        self.models.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Registers `callback` for every event whose kind is in `mask`.
    pub fn subscribe(
        &mut self,
        mask: ChangeMask,
        callback: impl FnMut(&[ChangeEvent]) + 'static,
    ) -> SubscriptionId {
        let callback: ChangeCallback = Box::new(callback);
        self.observers.subscribe(mask, callback)
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub(crate) fn emit(&mut self, events: &[ChangeEvent]) {
        self.observers.notify(events);
    }

    // ========================================================================
    // Per frame
    // ========================================================================

    /// Advances every model's animation by `dt` seconds and refreshes world
    /// matrices. Never adds or removes models.
    pub fn update(&mut self, dt: f32) {
        for entry in self.models.values_mut() {
            if entry.animation.is_some() {
                entry.mixer.update(dt, &mut entry.scene);
            }
            entry.scene.update_matrix_world();
        }
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Plans the export of model `id`.
    ///
    /// `filename` defaults to `<name without .glb>_edited.glb`. The request
    /// carries the active clip, or all embedded clips when none is bound.
    pub fn export_request(&self, id: ModelId, filename: Option<&str>) -> Result<ExportRequest<'_>> {
        let entry = self.get(id).ok_or_else(|| {
            let err = ForgeError::ModelNotFound(id.to_string());
            log::warn!("{err}");
            err
        })?;

        let filename = match filename {
            Some(name) => normalize_filename(name)?,
            None => default_export_filename(&entry.file_info.name),
        };

        let clips = match entry.animation() {
            Some(animation) => vec![animation.clip.clone()],
            None => entry.clips().to_vec(),
        };

        Ok(ExportRequest {
            model: id,
            scene: entry.scene(),
            root: entry.anchor(),
            clips,
            skip_nodes: entry.helper_nodes(),
            filename,
            binary: true,
        })
    }
}
