//! Plain-text views over the collection and playback events

use photo_route_lib::{
    CameraCommand, CollectionInfo, MapViewport, PhotoCollection, PlaybackEvent, Route,
    format_timeline_time,
};
use std::fmt::Write;

pub fn info(info: &CollectionInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Photos:        {}", info.photo_count);
    let _ = writeln!(out, "With GPS:      {}", info.geotagged_count);
    let _ = writeln!(out, "Route length:  {:.2} km", info.route_distance_km);
    if let Some((first, last)) = info.time_span {
        let _ = writeln!(
            out,
            "Time span:     {} - {}",
            format_timeline_time(first),
            format_timeline_time(last)
        );
    }
    out
}

pub fn metadata(collection: &PhotoCollection) -> String {
    let mut out = String::new();
    for photo in collection.photos() {
        let meta = photo.metadata();
        let _ = writeln!(out, "{}", photo.id());
        let fields = [
            ("Date", meta.formatted_date.as_deref()),
            ("Camera", meta.camera.as_deref()),
            ("Settings", meta.exif_summary.as_deref()),
            ("GPS", meta.gps_label.as_deref()),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                let _ = writeln!(out, "  {:<9}{}", format!("{}:", label), value);
            }
        }
    }
    out
}

pub fn route(route: &Route) -> String {
    let mut out = String::new();
    for (index, waypoint) in route.waypoints().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<16}  {}  {}",
            index,
            format_timeline_time(waypoint.timestamp),
            waypoint.coords,
            waypoint.photo_id
        );
    }
    let _ = writeln!(
        out,
        "{} waypoints, {:.2} km",
        route.len(),
        route.total_distance_km()
    );
    out
}

pub fn viewport(viewport: Option<&MapViewport>) -> String {
    match viewport {
        Some(viewport) => format!("Center {} zoom {}\n", viewport.center, viewport.zoom),
        None => "No photos with GPS information\n".to_string(),
    }
}

pub fn timeline(route: &Route) -> String {
    let mut out = String::new();
    for group in route.day_groups() {
        let _ = writeln!(out, "{} ({} photos)", group.key, group.indices.len());
        for index in group.indices {
            if let Some(waypoint) = route.get(index) {
                let _ = writeln!(
                    out,
                    "  [{}] {}  {}",
                    index,
                    format_timeline_time(waypoint.timestamp),
                    waypoint.photo_id
                );
            }
        }
    }
    out
}

fn camera(camera: &CameraCommand) -> String {
    match camera.zoom {
        Some(zoom) => format!("camera -> {} @ z{}", camera.center, zoom),
        None => format!("camera -> {}", camera.center),
    }
}

/// One line per event, `None` for events not worth printing
pub fn playback_event(route: &Route, event: &PlaybackEvent) -> Option<String> {
    match event {
        PlaybackEvent::State(state) if state.is_playing || state.cursor > 0 => {
            let photo = route
                .get(state.cursor)
                .map(|w| w.photo_id.to_string())
                .unwrap_or_default();
            Some(format!(
                "[{:>3}%] {}/{} {}",
                state.progress_percent(),
                state.cursor + 1,
                state.route_len,
                photo
            ))
        }
        PlaybackEvent::State(_) => None,
        PlaybackEvent::Camera(command) => Some(format!("        {}", camera(command))),
        PlaybackEvent::Notice(message) => Some(message.clone()),
    }
}
