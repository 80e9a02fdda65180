//! Photo Route Library - Core Data Structures for Photo Metadata and Routes
//!
//! This library turns raw EXIF tag bags into display-ready metadata, orders photo
//! collections by capture time, reconstructs the route travelled while taking them
//! and drives an animated, resumable playback of that route.
//!
//! # Architecture
//!
//! - **[`RawTagBag`]**: Typed view over the EXIF tags produced by an external decoder
//! - **[`gps`]**: Multi-path GPS coordinate resolution tolerant to firmware quirks
//! - **[`normalize`]**: Flat [`DisplayMetadata`] projection of a tag bag
//! - **[`capture_time`]**: One authoritative timestamp per photo
//! - **[`PhotoCollection`]**: Owner of photo records, kept in capture-time order
//! - **[`Route`]**: Time-ordered waypoints derived from a collection
//! - **[`viewport`]**: Map viewport and distance-adaptive zoom policies
//! - **[`RoutePlayer`]**: Playback state machine with a timer-driven [`drive`] loop
//!
//! Everything except the playback driver is pure and synchronous. Per-photo parsing
//! failures never surface as errors; they degrade to absent fields.

pub mod capture_time;
mod collection;
mod driver;
pub mod geocode;
pub mod gps;
mod metadata;
mod photo;
mod playback;
mod route;
#[cfg(feature = "serde")]
mod snapshot;
mod sort;
mod tags;
pub mod utils;
pub mod viewport;

// Public API exports
pub use capture_time::resolve_timestamp;
pub use collection::{CollectionInfo, PhotoCollection};
pub use driver::{PlaybackEvent, PlayerCommand, drive};
pub use geocode::{Address, CachedGeocoder, GeocoderConfig, ReverseGeocoder};
pub use gps::{Coordinates, resolve};
pub use metadata::{DisplayMetadata, normalize};
pub use photo::{PhotoId, PhotoRecord};
pub use playback::{
    CameraCommand, MarkerAnimation, MarkerSink, PlaybackConfig, PlaybackPhase, PlaybackState,
    RoutePlayer, TickOutcome, TickTicket,
};
pub use route::{DayGroup, Route, RouteRevision, Waypoint, build_route, format_timeline_time};
#[cfg(feature = "serde")]
pub use snapshot::{CollectionSnapshot, PhotoSnapshot, PlaybackPreferences, SNAPSHOT_VERSION};
pub use sort::sort_by_time;
pub use tags::{RawTagBag, TagName, TagRecord, TagValue};
pub use viewport::{MapViewport, compute_viewport, zoom_for_gap};

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No photos with GPS information to play back")]
    EmptyRoute,

    #[error("Unknown photo: {0}")]
    UnknownPhoto(PhotoId),

    #[error("Duplicate photo id: {0}")]
    DuplicatePhoto(PhotoId),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that the main entry points are accessible
        let _: fn(&RawTagBag) -> Option<Coordinates> = resolve;
        let _: fn(&RawTagBag) -> DisplayMetadata = normalize;
        let _: fn(&[Coordinates]) -> Option<MapViewport> = compute_viewport;
        let _: fn() -> PhotoCollection = PhotoCollection::new;
        let _: fn() -> PlaybackConfig = PlaybackConfig::default;
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::EmptyRoute.to_string(),
            "No photos with GPS information to play back"
        );
        let err = Error::SnapshotVersion {
            found: 9,
            expected: 1,
        };
        assert!(err.to_string().contains("9"));
    }
}
