//! Capture time resolution
//!
//! Every photo gets exactly one authoritative timestamp (epoch milliseconds):
//! `DateTimeOriginal`, else `DateTime`, else the fallback captured at ingestion
//! (usually the file modification time). The first present date string is the
//! only candidate; if it does not parse, the fallback is used directly.
//!
//! EXIF date-times carry no zone and are interpreted as UTC.

use crate::photo::PhotoRecord;
use crate::tags::{RawTagBag, TagName};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// `YYYY:MM:DD` as written by cameras
static EXIF_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4}):([0-9]{2}):([0-9]{2})").expect("EXIF date pattern is valid"));

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Resolve the capture timestamp of a photo in epoch milliseconds. Total.
#[inline]
pub fn resolve_timestamp(photo: &PhotoRecord) -> i64 {
    timestamp_from_tags(photo.raw_tags(), photo.fallback_timestamp())
}

/// Tag-level variant of [`resolve_timestamp`]
pub fn timestamp_from_tags(tags: &RawTagBag, fallback_timestamp: i64) -> i64 {
    let Some(date_str) = tags
        .description(TagName::DateTimeOriginal)
        .or_else(|| tags.description(TagName::DateTime))
    else {
        return fallback_timestamp;
    };

    match parse_exif_datetime(date_str) {
        Some(date) => date.and_utc().timestamp_millis(),
        None => {
            tracing::debug!(
                "Unparseable capture date {:?}, using fallback timestamp",
                date_str
            );
            fallback_timestamp
        }
    }
}

/// Parse an EXIF style date-time (`2023:05:01 12:34:56`) or any ISO-like
/// rendering of it. Zoned inputs are converted to UTC.
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let cleaned = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    let normalized = EXIF_DATE.replacen(cleaned, 1, "$1-$2-$3");
    let text = normalized.as_ref();

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.naive_utc());
    }
    for format in ZONED_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(text, format) {
            return Some(date.naive_utc());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(text, format) {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
