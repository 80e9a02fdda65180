//! Route reconstruction
//!
//! A route is the time-ordered list of geotagged photos of a collection. It is
//! derived data: rebuilt whenever the collection changes, and every build gets a
//! fresh [`RouteRevision`] so consumers can tell a rebuilt route from the one
//! they were working against.

use crate::gps::Coordinates;
use crate::photo::{PhotoId, PhotoRecord};
use crate::sort::sort_by_time;
use crate::viewport::{self, MapViewport};
use chrono::DateTime;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Identity of one route build
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteRevision(u64);

impl RouteRevision {
    fn next() -> Self {
        Self(NEXT_REVISION.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// One geotagged, time-stamped stop along a route
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub photo_id: PhotoId,
    pub coords: Coordinates,
    /// Capture time in epoch milliseconds
    pub timestamp: i64,
}

/// Waypoint indices sharing a calendar day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayGroup {
    /// `YYYY.MM.DD`, or `unknown` for a zero timestamp
    pub key: String,
    /// Indices into the route, in route order
    pub indices: Vec<usize>,
}

/// Time-ordered sequence of waypoints
#[derive(Clone, Debug)]
pub struct Route {
    revision: RouteRevision,
    waypoints: Vec<Waypoint>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Route {
    fn new(waypoints: Vec<Waypoint>) -> Self {
        Self {
            revision: RouteRevision::next(),
            waypoints,
        }
    }

    /// Empty route with its own identity
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[inline]
    pub fn revision(&self) -> RouteRevision {
        self.revision
    }

    #[inline]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Polyline path, in route order
    pub fn coordinates(&self) -> Vec<Coordinates> {
        self.waypoints.iter().map(|w| w.coords).collect()
    }

    /// Initial viewport containing the whole route
    pub fn viewport(&self) -> Option<MapViewport> {
        viewport::compute_viewport(&self.coordinates())
    }

    /// Sum of great-circle hops between consecutive waypoints
    pub fn total_distance_km(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].coords.distance_km(&pair[1].coords))
            .sum()
    }

    /// Position of a photo in the route, for timeline-driven seeking
    pub fn index_of(&self, photo_id: &PhotoId) -> Option<usize> {
        self.waypoints.iter().position(|w| &w.photo_id == photo_id)
    }

    /// Group waypoint indices by calendar day, in order of first appearance
    pub fn day_groups(&self) -> Vec<DayGroup> {
        let mut groups: Vec<DayGroup> = Vec::new();
        for (index, waypoint) in self.waypoints.iter().enumerate() {
            let key = day_key(waypoint.timestamp);
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.indices.push(index),
                None => groups.push(DayGroup {
                    key,
                    indices: vec![index],
                }),
            }
        }
        groups
    }
}

/// Build the route of a photo collection.
///
/// Photos are ordered by capture time, those without resolvable coordinates are
/// dropped, and the resulting waypoints are stably re-sorted by timestamp. Empty
/// input yields an empty route.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn build_route<'a, I>(photos: I) -> Route
where
    I: IntoIterator<Item = &'a PhotoRecord>,
{
    let sorted = sort_by_time(photos);
    let total = sorted.len();

    let mut waypoints: Vec<Waypoint> = sorted
        .into_iter()
        .filter_map(|photo| {
            let coords = photo.metadata().coords?;
            Some(Waypoint {
                photo_id: photo.id().clone(),
                coords,
                timestamp: photo.capture_time(),
            })
        })
        .collect();

    // Second pass on the waypoints themselves, stable like the first
    waypoints.sort_by_key(|w| w.timestamp);

    tracing::debug!(
        "Built route with {} waypoints from {} photos",
        waypoints.len(),
        total
    );
    Route::new(waypoints)
}

/// `YYYY.MM.DD HH:MM` in UTC, empty for a zero timestamp
pub fn format_timeline_time(timestamp: i64) -> String {
    if timestamp == 0 {
        return String::new();
    }
    DateTime::from_timestamp_millis(timestamp)
        .map(|date| date.format("%Y.%m.%d %H:%M").to_string())
        .unwrap_or_default()
}

fn day_key(timestamp: i64) -> String {
    if timestamp == 0 {
        return "unknown".to_string();
    }
    DateTime::from_timestamp_millis(timestamp)
        .map(|date| date.format("%Y.%m.%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{RawTagBag, TagName, TagRecord, TagValue};

    fn geotagged(id: &str, lat: f64, lon: f64, fallback: i64) -> PhotoRecord {
        let tags = RawTagBag::new()
            .with(
                TagName::GpsLatitude,
                TagRecord::from_value(TagValue::Numbers(vec![lat])),
            )
            .with(
                TagName::GpsLongitude,
                TagRecord::from_value(TagValue::Numbers(vec![lon])),
            );
        PhotoRecord::new(id, tags, fallback)
    }

    fn plain(id: &str, fallback: i64) -> PhotoRecord {
        PhotoRecord::new(id, RawTagBag::new(), fallback)
    }

    #[test]
    fn test_empty_input() {
        let route = build_route(&Vec::<PhotoRecord>::new());
        assert!(route.is_empty());
        assert_eq!(route.viewport(), None);
        assert_eq!(route.total_distance_km(), 0.0);
    }

    #[test]
    fn test_excludes_photos_without_gps() {
        let photos = vec![
            geotagged("a", 37.5, 127.0, 300),
            plain("b", 100),
            geotagged("c", 37.6, 127.1, 200),
        ];
        let route = build_route(&photos);
        let ids: Vec<&str> = route
            .waypoints()
            .iter()
            .map(|w| w.photo_id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert_eq!(route.index_of(&PhotoId::from("a")), Some(1));
        assert_eq!(route.index_of(&PhotoId::from("b")), None);
    }

    #[test]
    fn test_timestamps_non_decreasing_with_duplicates() {
        let photos = vec![
            geotagged("a", 1.0, 1.0, 50),
            geotagged("b", 2.0, 2.0, 10),
            geotagged("c", 3.0, 3.0, 50),
            geotagged("d", 4.0, 4.0, 10),
            geotagged("e", 5.0, 5.0, 30),
        ];
        let route = build_route(&photos);
        let stamps: Vec<i64> = route.waypoints().iter().map(|w| w.timestamp).collect();
        assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));
        let ids: Vec<&str> = route
            .waypoints()
            .iter()
            .map(|w| w.photo_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "d", "e", "a", "c"]);
    }

    #[test]
    fn test_each_build_has_new_revision() {
        let photos = vec![geotagged("a", 1.0, 1.0, 1)];
        let first = build_route(&photos);
        let second = build_route(&photos);
        assert_ne!(first.revision(), second.revision());
    }

    #[test]
    fn test_total_distance() {
        let photos = vec![
            geotagged("a", 0.0, 0.0, 1),
            geotagged("b", 1.0, 0.0, 2),
            geotagged("c", 2.0, 0.0, 3),
        ];
        let route = build_route(&photos);
        assert!((route.total_distance_km() - 2.0 * 111.195).abs() < 0.05);
    }

    #[test]
    fn test_day_groups() {
        let day = 86_400_000;
        let photos = vec![
            geotagged("a", 1.0, 1.0, 1_700_000_000_000),
            geotagged("b", 1.0, 1.0, 1_700_000_000_000 + 1000),
            geotagged("c", 1.0, 1.0, 1_700_000_000_000 + day),
        ];
        let groups = build_route(&photos).day_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "2023.11.14");
        assert_eq!(groups[0].indices, vec![0, 1]);
        assert_eq!(groups[1].key, "2023.11.15");
        assert_eq!(groups[1].indices, vec![2]);
    }

    #[test]
    fn test_format_timeline_time() {
        assert_eq!(format_timeline_time(1_700_000_000_000), "2023.11.14 22:13");
        assert_eq!(format_timeline_time(0), "");
        assert_eq!(day_key(0), "unknown");
    }
}
