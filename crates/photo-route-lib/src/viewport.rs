//! Map viewport and zoom policies
//!
//! Two independent step functions: the initial viewport zoom depends on the
//! widest span of the bounding box, the playback follow zoom on the distance to
//! the next waypoint.

use crate::gps::Coordinates;
use geo::Rect;

/// Map camera: center plus discrete zoom level
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapViewport {
    pub center: Coordinates,
    pub zoom: u8,
}

/// Span thresholds in degrees, checked in order (first match wins)
const SPAN_ZOOM_STEPS: &[(f64, u8)] = &[(1.0, 8), (0.5, 9), (0.1, 11), (0.05, 12)];
const SPAN_ZOOM_DEFAULT: u8 = 13;

/// Gap thresholds in kilometers, checked in order (first match wins)
const GAP_ZOOM_STEPS: &[(f64, u8)] = &[(0.1, 18), (0.5, 17), (1.0, 16), (5.0, 15)];
const GAP_ZOOM_DEFAULT: u8 = 14;

/// Viewport containing every coordinate, or `None` for an empty list.
///
/// The center is the middle of the bounding box (not the centroid of the
/// points); the zoom is a step function of its widest span.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compute_viewport(coords: &[Coordinates]) -> Option<MapViewport> {
    let bounds = bounding_rect(coords)?;
    let span = bounds.width().max(bounds.height());
    Some(MapViewport {
        center: bounds.center().into(),
        zoom: zoom_for_span(span),
    })
}

/// Bounding box with x = longitude, y = latitude
pub fn bounding_rect(coords: &[Coordinates]) -> Option<Rect<f64>> {
    let (first, rest) = coords.split_first()?;
    let mut min_lat = first.lat;
    let mut max_lat = first.lat;
    let mut min_lon = first.lon;
    let mut max_lon = first.lon;

    for c in rest {
        min_lat = min_lat.min(c.lat);
        max_lat = max_lat.max(c.lat);
        min_lon = min_lon.min(c.lon);
        max_lon = max_lon.max(c.lon);
    }

    Some(Rect::new(
        geo::Coord {
            x: min_lon,
            y: min_lat,
        },
        geo::Coord {
            x: max_lon,
            y: max_lat,
        },
    ))
}

/// Zoom for the widest span (degrees) of a bounding box
pub fn zoom_for_span(span: f64) -> u8 {
    SPAN_ZOOM_STEPS
        .iter()
        .find(|(threshold, _)| span > *threshold)
        .map_or(SPAN_ZOOM_DEFAULT, |(_, zoom)| *zoom)
}

/// Follow zoom for the distance (km) to the next waypoint: close hops zoom in,
/// long hops zoom out.
pub fn zoom_for_gap(distance_km: f64) -> u8 {
    GAP_ZOOM_STEPS
        .iter()
        .find(|(threshold, _)| distance_km < *threshold)
        .map_or(GAP_ZOOM_DEFAULT, |(_, zoom)| *zoom)
}
