//! Application state management
//!
//! Owns the photo collection, the playback preferences and the storage backend,
//! and keeps the persisted snapshot in sync after every mutation.

use crate::app::AppError;
use crate::app::input;
use crate::app::settings::Settings;
use crate::app::storage::{
    StorageBackend, default_storage_backend, load_json_backend, save_json_backend,
};
use photo_route_lib::{
    CollectionSnapshot, PhotoCollection, PhotoRecord, PlaybackConfig, PlaybackPreferences,
};
use std::path::PathBuf;

/// Storage key of the collection snapshot
const COLLECTION_KEY: &str = "collection";

/// Main application state
pub struct AppState {
    /// Every loaded photo
    pub collection: PhotoCollection,

    /// Playback settings, persisted alongside the collection
    pub playback: PlaybackConfig,

    /// Where snapshots are saved
    storage: Box<dyn StorageBackend>,
}

impl AppState {
    /// Open storage from the settings and restore the previous session
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let storage = default_storage_backend(settings.storage.clone())?;
        let mut state = Self::with_storage(storage, settings.ignore_persisted)?;
        state.apply_overrides(settings);
        Ok(state)
    }

    /// Restore from `storage` unless `ignore_persisted` is set
    pub fn with_storage(
        storage: Box<dyn StorageBackend>,
        ignore_persisted: bool,
    ) -> Result<Self, AppError> {
        let mut state = Self {
            collection: PhotoCollection::new(),
            playback: PlaybackConfig::default(),
            storage,
        };
        if ignore_persisted {
            tracing::info!("Ignoring persisted state");
            return Ok(state);
        }

        match load_json_backend::<CollectionSnapshot>(state.storage.as_ref(), COLLECTION_KEY) {
            Ok(Some(snapshot)) => match PhotoCollection::restore(snapshot) {
                Ok((collection, preferences)) => {
                    state.collection = collection;
                    state.playback = preferences.into();
                }
                Err(e) => tracing::warn!("Discarding persisted collection: {}", e),
            },
            Ok(None) => tracing::debug!("No persisted collection"),
            // A broken snapshot must not prevent loading fresh photos
            Err(e) => tracing::warn!("Failed to load persisted collection: {}", e),
        }
        Ok(state)
    }

    fn apply_overrides(&mut self, settings: &Settings) {
        if let Some(tick_ms) = settings.tick_ms {
            self.playback.tick_interval_ms = tick_ms.max(1);
        }
        if settings.no_auto_zoom {
            self.playback.auto_zoom_enabled = false;
        }
    }

    /// Load input files; photos whose id is already present are skipped.
    /// Returns the number of photos added.
    pub fn load_files(&mut self, paths: &[PathBuf]) -> Result<usize, AppError> {
        profiling::scope!("load_files");
        let mut fresh: Vec<PhotoRecord> = Vec::new();
        for path in paths {
            for photo in input::load_photos(path)? {
                let known = self.collection.get(photo.id()).is_some()
                    || fresh.iter().any(|p| p.id() == photo.id());
                if known {
                    tracing::debug!("Skipping already loaded photo {}", photo.id());
                    continue;
                }
                fresh.push(photo);
            }
        }

        let added = fresh.len();
        if added > 0 {
            self.collection.add_many(fresh)?;
            self.persist()?;
        }
        Ok(added)
    }

    /// Drop every photo and forget the persisted session
    pub fn clear(&mut self) -> Result<(), AppError> {
        self.collection.clear();
        self.storage.remove(COLLECTION_KEY)?;
        tracing::debug!("Removed persisted collection");
        Ok(())
    }

    /// Save the collection and preferences
    pub fn persist(&self) -> Result<(), AppError> {
        let snapshot = self
            .collection
            .snapshot(PlaybackPreferences::from(&self.playback));
        save_json_backend(self.storage.as_ref(), COLLECTION_KEY, &snapshot)?;
        tracing::debug!("Persisted {} photos", self.collection.len());
        Ok(())
    }
}
