//! Serializable collection snapshots
//!
//! A snapshot stores the source of truth (tag bags and fallback timestamps) and,
//! for diagnostics only, the coordinates and capture time resolved when it was
//! taken. Restoring always re-derives; a mismatch with the stored values is
//! logged, never trusted.

use crate::collection::PhotoCollection;
use crate::gps::Coordinates;
use crate::photo::{PhotoId, PhotoRecord};
use crate::playback::PlaybackConfig;
use crate::tags::RawTagBag;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Current snapshot layout
pub const SNAPSHOT_VERSION: u32 = 1;

/// User playback choices worth keeping across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackPreferences {
    pub auto_zoom_enabled: bool,
    pub tick_interval_ms: u64,
}

impl Default for PlaybackPreferences {
    fn default() -> Self {
        Self::from(&PlaybackConfig::default())
    }
}

impl From<&PlaybackConfig> for PlaybackPreferences {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            auto_zoom_enabled: config.auto_zoom_enabled,
            tick_interval_ms: config.tick_interval_ms,
        }
    }
}

impl From<PlaybackPreferences> for PlaybackConfig {
    fn from(preferences: PlaybackPreferences) -> Self {
        Self {
            tick_interval_ms: preferences.tick_interval_ms,
            auto_zoom_enabled: preferences.auto_zoom_enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSnapshot {
    pub id: PhotoId,
    pub raw_tags: RawTagBag,
    pub fallback_timestamp: i64,
    /// Resolved position at snapshot time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coordinates>,
    /// Resolved capture time at snapshot time
    pub timestamp: i64,
}

impl From<&PhotoRecord> for PhotoSnapshot {
    fn from(photo: &PhotoRecord) -> Self {
        Self {
            id: photo.id().clone(),
            raw_tags: photo.raw_tags().clone(),
            fallback_timestamp: photo.fallback_timestamp(),
            coords: photo.metadata().coords,
            timestamp: photo.capture_time(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub version: u32,
    pub photos: Vec<PhotoSnapshot>,
    #[serde(default)]
    pub preferences: PlaybackPreferences,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PhotoCollection {
    /// Capture the collection, in capture-time order
    pub fn snapshot(&self, preferences: PlaybackPreferences) -> CollectionSnapshot {
        CollectionSnapshot {
            version: SNAPSHOT_VERSION,
            photos: self.photos().iter().map(PhotoSnapshot::from).collect(),
            preferences,
        }
    }

    /// Rebuild a collection from a snapshot, re-deriving all metadata
    pub fn restore(snapshot: CollectionSnapshot) -> Result<(Self, PlaybackPreferences)> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let mut stored = Vec::with_capacity(snapshot.photos.len());
        let records = snapshot
            .photos
            .into_iter()
            .map(|photo| {
                stored.push((photo.coords, photo.timestamp));
                PhotoRecord::new(photo.id, photo.raw_tags, photo.fallback_timestamp)
            })
            .collect::<Vec<_>>();

        // Pair stored values with ids before the collection reorders them
        let expected: Vec<(PhotoId, Option<Coordinates>, i64)> = records
            .iter()
            .zip(stored)
            .map(|(record, (coords, timestamp))| (record.id().clone(), coords, timestamp))
            .collect();

        let mut collection = PhotoCollection::new();
        collection.add_many(records)?;

        let drifted = count_drift(&collection, &expected);
        if drifted > 0 {
            tracing::warn!(
                "{} of {} restored photos resolve differently than when saved",
                drifted,
                collection.len()
            );
        }

        tracing::info!("Restored {} photos from snapshot", collection.len());
        Ok((collection, snapshot.preferences))
    }
}

/// Degrees two stored positions may differ by and still count as the same
const POSITION_TOLERANCE: f64 = 1e-9;

/// Photos whose re-derived position or capture time differs from the stored one
fn count_drift(
    collection: &PhotoCollection,
    expected: &[(PhotoId, Option<Coordinates>, i64)],
) -> usize {
    let mut drifted = 0;
    for (id, coords, timestamp) in expected {
        let Some(photo) = collection.get(id) else {
            continue;
        };
        let derived = photo.metadata().coords;
        let same_position = match (derived, coords) {
            (Some(a), Some(b)) => {
                (a.lat - b.lat).abs() <= POSITION_TOLERANCE
                    && (a.lon - b.lon).abs() <= POSITION_TOLERANCE
            }
            (None, None) => true,
            _ => false,
        };
        if !same_position || photo.capture_time() != *timestamp {
            drifted += 1;
            tracing::debug!(
                "Photo {} re-derived as {:?} @ {} (stored {:?} @ {})",
                id,
                derived,
                photo.capture_time(),
                coords,
                timestamp
            );
        }
    }
    drifted
}
