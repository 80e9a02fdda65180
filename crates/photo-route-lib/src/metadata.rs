//! Display metadata normalization

use crate::capture_time;
use crate::gps::{self, Coordinates};
use crate::tags::{RawTagBag, TagName};

/// Flat, display and route ready projection of a tag bag
///
/// Always recomputable from the tags it came from; never persisted as a source
/// of truth.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayMetadata {
    /// `"{Make} {Model}"`
    pub camera: Option<String>,
    /// `"{FocalLength}, {ExposureTime}, {FNumber}"` without empty members
    pub exif_summary: Option<String>,
    /// `"DD. Month. YYYY"`, or the raw `DateTimeOriginal` if it does not parse
    pub formatted_date: Option<String>,
    pub coords: Option<Coordinates>,
    /// Human readable position, see [`Coordinates`]'s `Display`
    pub gps_label: Option<String>,
}

/// Build the display record for a tag bag. Total: missing or malformed tags only
/// produce missing fields.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn normalize(tags: &RawTagBag) -> DisplayMetadata {
    let coords = gps::resolve(tags).or_else(|| {
        if tags.contains(TagName::GpsLatitude) && tags.contains(TagName::GpsLongitude) {
            let lenient = gps::resolve_from_descriptions(tags);
            if lenient.is_some() {
                tracing::debug!("GPS recovered by lenient description parse");
            }
            lenient
        } else {
            None
        }
    });

    let gps_label = match coords {
        Some(c) => Some(c.to_string()),
        None => gps::raw_gps_label(tags),
    };

    DisplayMetadata {
        camera: camera(tags),
        exif_summary: exif_summary(tags),
        formatted_date: formatted_date(tags),
        coords,
        gps_label,
    }
}

fn camera(tags: &RawTagBag) -> Option<String> {
    if !tags.contains(TagName::Make) && !tags.contains(TagName::Model) {
        return None;
    }
    let make = tags.description(TagName::Make).unwrap_or("");
    let model = tags.description(TagName::Model).unwrap_or("");
    let camera = format!("{} {}", make, model).trim().to_string();
    (!camera.is_empty()).then_some(camera)
}

fn exif_summary(tags: &RawTagBag) -> Option<String> {
    let parts: Vec<&str> = [TagName::FocalLength, TagName::ExposureTime, TagName::FNumber]
        .into_iter()
        .filter_map(|name| tags.description(name))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn formatted_date(tags: &RawTagBag) -> Option<String> {
    let raw = tags.description(TagName::DateTimeOriginal)?;
    Some(match capture_time::parse_exif_datetime(raw) {
        Some(date) => date.format("%d. %B. %Y").to_string(),
        None => raw.to_string(),
    })
}
