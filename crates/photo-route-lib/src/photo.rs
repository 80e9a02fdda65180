//! Photo records owned by a collection

use crate::capture_time;
use crate::metadata::{self, DisplayMetadata};
use crate::tags::RawTagBag;
use once_cell::sync::OnceCell;
use std::fmt;

/// Opaque identifier, unique within a collection and stable across reorderings
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PhotoId(String);

impl PhotoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhotoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PhotoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single ingested photo
///
/// The tag bag and fallback timestamp never change after creation. Display
/// metadata and capture time are derived lazily and cached.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhotoRecord {
    id: PhotoId,
    raw_tags: RawTagBag,
    /// Epoch milliseconds, usually the file modification time
    fallback_timestamp: i64,
    #[cfg_attr(feature = "serde", serde(skip))]
    normalized: OnceCell<DisplayMetadata>,
    #[cfg_attr(feature = "serde", serde(skip))]
    capture_time: OnceCell<i64>,
}

impl PhotoRecord {
    pub fn new(id: impl Into<PhotoId>, raw_tags: RawTagBag, fallback_timestamp: i64) -> Self {
        Self {
            id: id.into(),
            raw_tags,
            fallback_timestamp,
            normalized: OnceCell::new(),
            capture_time: OnceCell::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> &PhotoId {
        &self.id
    }

    #[inline]
    pub fn raw_tags(&self) -> &RawTagBag {
        &self.raw_tags
    }

    #[inline]
    pub fn fallback_timestamp(&self) -> i64 {
        self.fallback_timestamp
    }

    /// Display metadata, normalized on first access
    #[inline]
    pub fn metadata(&self) -> &DisplayMetadata {
        self.normalized
            .get_or_init(|| metadata::normalize(&self.raw_tags))
    }

    /// Capture timestamp in epoch milliseconds, resolved on first access
    #[inline]
    pub fn capture_time(&self) -> i64 {
        *self
            .capture_time
            .get_or_init(|| capture_time::resolve_timestamp(self))
    }

    /// Derive and cache everything up front
    pub(crate) fn prepare(&self) {
        self.metadata();
        self.capture_time();
    }
}

impl PartialEq for PhotoRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.raw_tags == other.raw_tags
            && self.fallback_timestamp == other.fallback_timestamp
    }
}
