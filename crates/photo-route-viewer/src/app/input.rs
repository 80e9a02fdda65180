//! Photo input files
//!
//! Each file holds the decoded EXIF tags of one or more photos:
//!
//! ```json
//! [{"id": "IMG_0001.JPG", "fallback_timestamp": 1682944496000,
//!   "tags": {"GPSLatitude": {"value": [37, 30, 0], "description": "37.5"}}}]
//! ```
//!
//! A missing `fallback_timestamp` defaults to the input file's modification time.

use crate::app::AppError;
use photo_route_lib::{PhotoId, PhotoRecord, RawTagBag};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::UNIX_EPOCH;

#[derive(Deserialize, Debug)]
struct PhotoInput {
    id: PhotoId,
    #[serde(default)]
    fallback_timestamp: Option<i64>,
    #[serde(default)]
    tags: RawTagBag,
}

impl PhotoInput {
    fn into_record(self, default_timestamp: i64) -> PhotoRecord {
        PhotoRecord::new(
            self.id,
            self.tags,
            self.fallback_timestamp.unwrap_or(default_timestamp),
        )
    }
}

/// Parse an input document, stamping photos without a fallback timestamp.
///
/// A list is read entry by entry and entries that are not photos are skipped
/// with a warning. A single object must be a photo.
pub fn parse_photos(json: &str, default_timestamp: i64) -> Result<Vec<PhotoRecord>, AppError> {
    let entries = match serde_json::from_str::<Value>(json)? {
        Value::Array(entries) => entries,
        single => {
            let input = serde_json::from_value::<PhotoInput>(single)?;
            return Ok(vec![input.into_record(default_timestamp)]);
        }
    };

    let total = entries.len();
    let photos: Vec<PhotoRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<PhotoInput>(entry) {
            Ok(input) => Some(input.into_record(default_timestamp)),
            Err(e) => {
                tracing::warn!("Skipping photo entry {}: {}", index, e);
                None
            }
        })
        .collect();
    if photos.len() < total {
        tracing::warn!("Read {} of {} photo entries", photos.len(), total);
    }
    Ok(photos)
}

/// Read every photo of an input file
#[profiling::function]
pub fn load_photos(path: &Path) -> Result<Vec<PhotoRecord>, AppError> {
    let json = std::fs::read_to_string(path).map_err(|source| AppError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    let photos = parse_photos(&json, modified_millis(path))?;
    tracing::debug!("Read {} photos from {}", photos.len(), path.display());
    Ok(photos)
}

/// File modification time in epoch milliseconds, 0 when unavailable
fn modified_millis(path: &Path) -> i64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_route_lib::TagName;

    #[test]
    fn test_parse_list() {
        let json = r#"[
            {"id": "a.jpg", "fallback_timestamp": 5,
             "tags": {"Make": {"description": "Sony"}, "Unknown": {"description": "x"}}},
            {"id": "b.jpg"}
        ]"#;
        let photos = parse_photos(json, 42).unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].id().as_str(), "a.jpg");
        assert_eq!(photos[0].fallback_timestamp(), 5);
        assert_eq!(photos[0].raw_tags().description(TagName::Make), Some("Sony"));
        assert_eq!(photos[0].raw_tags().len(), 1);
        assert_eq!(photos[1].fallback_timestamp(), 42);
        assert!(photos[1].raw_tags().is_empty());
    }

    #[test]
    fn test_parse_single_object() {
        let photos = parse_photos(r#"{"id": "solo.jpg"}"#, 7).unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].capture_time(), 7);
    }

    #[test]
    fn test_bad_entries_do_not_reject_the_file() {
        let json = r#"[
            {"id": "good.jpg", "fallback_timestamp": 1,
             "tags": {"GPSLatitude": {"value": [37.5]}, "GPSLongitude": {"value": [127.0]}}},
            {"id": "rational.jpg", "fallback_timestamp": 2,
             "tags": {"GPSLatitude": {"value": [[37, 1], [30, 1], [0, 1]], "description": 37.5},
                      "GPSLongitude": {"value": [[127, 1], [0, 1], [0, 1]], "description": "127"}}},
            {"id": "odd.jpg", "fallback_timestamp": 3,
             "tags": {"Orientation": {"value": true}, "Make": {"description": 7}}},
            {"fallback_timestamp": 4},
            42
        ]"#;
        let photos = parse_photos(json, 0).unwrap();
        let ids: Vec<&str> = photos.iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, vec!["good.jpg", "rational.jpg", "odd.jpg"]);

        let coords = photos[1].metadata().coords.unwrap();
        assert_eq!((coords.lat, coords.lon), (37.5, 127.0));
        assert_eq!(photos[2].raw_tags().len(), 1);
        assert_eq!(photos[2].raw_tags().description(TagName::Make), Some("7"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_photos("{\"tags\": {}}", 0),
            Err(AppError::Json(_))
        ));
        assert!(matches!(parse_photos("[1, 2", 0), Err(AppError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_photos(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, AppError::Input { .. }));
    }
}
