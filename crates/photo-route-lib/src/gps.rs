//! GPS coordinate resolution
//!
//! EXIF GPS encodings vary by camera and firmware: some store clean
//! degree/minute/second arrays, some only a human readable description, and some
//! mix hemisphere words into the text. [`resolve`] tries, per axis and in order:
//!
//! 1. the structured value (DMS triple, single decimal, or scalar),
//! 2. the first numeric token of that axis' description,
//! 3. the n-th numeric token of both descriptions concatenated (lat first).
//!
//! A result is only returned when both axes resolve to finite numbers.

use crate::tags::{RawTagBag, TagName, TagValue};
use crate::utils;
use std::fmt;

/// Signed decimal degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Check `-90 <= lat <= 90` and `-180 <= lon <= 180`
    #[inline]
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance in kilometers
    #[inline]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        utils::haversine_km(self.lat, self.lon, other.lat, other.lon)
    }

    /// Linear interpolation towards `other`
    #[inline]
    pub fn lerp(&self, other: &Coordinates, t: f64) -> Coordinates {
        Coordinates {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

impl From<Coordinates> for geo::Coord<f64> {
    fn from(c: Coordinates) -> Self {
        geo::Coord { x: c.lon, y: c.lat }
    }
}

impl From<geo::Coord<f64>> for Coordinates {
    fn from(c: geo::Coord<f64>) -> Self {
        Coordinates { lat: c.y, lon: c.x }
    }
}

impl fmt::Display for Coordinates {
    /// `37.500000°N, 127.000000°E`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat < 0.0 { 'S' } else { 'N' };
        let ew = if self.lon < 0.0 { 'W' } else { 'E' };
        write!(
            f,
            "{:.6}°{}, {:.6}°{}",
            self.lat.abs(),
            ns,
            self.lon.abs(),
            ew
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn value_tag(self) -> TagName {
        match self {
            Axis::Latitude => TagName::GpsLatitude,
            Axis::Longitude => TagName::GpsLongitude,
        }
    }

    fn ref_tag(self) -> TagName {
        match self {
            Axis::Latitude => TagName::GpsLatitudeRef,
            Axis::Longitude => TagName::GpsLongitudeRef,
        }
    }

    /// Reference code that flips the sign
    fn negative_ref(self) -> &'static str {
        match self {
            Axis::Latitude => "S",
            Axis::Longitude => "W",
        }
    }

    fn default_ref(self) -> &'static str {
        match self {
            Axis::Latitude => "N",
            Axis::Longitude => "E",
        }
    }

    fn hemisphere_word(self) -> &'static str {
        match self {
            Axis::Latitude => "south",
            Axis::Longitude => "west",
        }
    }

    fn negative_letter(self) -> char {
        match self {
            Axis::Latitude => 's',
            Axis::Longitude => 'w',
        }
    }
}

/// Resolve the photo position from its GPS tags, or `None` when not recoverable.
///
/// Never panics on malformed input. The returned value is finite but not range
/// checked; callers needing a strict contract use [`Coordinates::is_in_range`].
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve(tags: &RawTagBag) -> Option<Coordinates> {
    let mut lat = structured(tags, Axis::Latitude);
    let mut lon = structured(tags, Axis::Longitude);

    if lat.is_none() {
        lat = from_description(tags, Axis::Latitude);
        if lat.is_some() {
            tracing::debug!("Latitude resolved from its description");
        }
    }
    if lon.is_none() {
        lon = from_description(tags, Axis::Longitude);
        if lon.is_some() {
            tracing::debug!("Longitude resolved from its description");
        }
    }

    if (lat.is_none() || lon.is_none())
        && tags.contains(TagName::GpsLatitude)
        && tags.contains(TagName::GpsLongitude)
    {
        let (combined_lat, combined_lon) = from_combined_description(tags);
        if lat.is_none() {
            lat = combined_lat;
        }
        if lon.is_none() {
            lon = combined_lon;
        }
        tracing::debug!("GPS resolved from combined descriptions: {:?}, {:?}", lat, lon);
    }

    let coords = Coordinates::new(lat?, lon?);
    coords.is_finite().then_some(coords)
}

/// Lenient per-axis description parse used when [`resolve`] gives up but both GPS
/// tags are present.
///
/// Differs from step 2 of [`resolve`] in that a trailing-space hemisphere letter
/// (`"s "`, `"w "`) also flips the sign, and both axes must land in range.
pub fn resolve_from_descriptions(tags: &RawTagBag) -> Option<Coordinates> {
    let lat_record = tags.get(TagName::GpsLatitude)?;
    let lon_record = tags.get(TagName::GpsLongitude)?;

    let lat_desc = lat_record.text();
    let lon_desc = lon_record.text();

    let mut lat = utils::first_number(lat_desc)?;
    let mut lon = utils::first_number(lon_desc)?;

    if lenient_is_negative(tags, Axis::Latitude, lat_desc) {
        lat = -lat;
    }
    if lenient_is_negative(tags, Axis::Longitude, lon_desc) {
        lon = -lon;
    }

    let coords = Coordinates::new(lat, lon);
    (coords.is_finite() && coords.is_in_range()).then_some(coords)
}

/// Raw passthrough label for tags that carry GPS descriptions that could not be
/// turned into coordinates: `"{latDesc}{latRef}, {lonDesc}{lonRef}"`.
pub fn raw_gps_label(tags: &RawTagBag) -> Option<String> {
    let lat = tags.description(TagName::GpsLatitude)?;
    let lon = tags.description(TagName::GpsLongitude)?;
    Some(format!(
        "{}{}, {}{}",
        lat,
        label_ref(tags, Axis::Latitude),
        lon,
        label_ref(tags, Axis::Longitude)
    ))
}

fn label_ref(tags: &RawTagBag, axis: Axis) -> &str {
    tags.description(axis.ref_tag())
        .or_else(|| tags.value(axis.ref_tag()).and_then(TagValue::ref_code))
        .unwrap_or(axis.default_ref())
}

/// Step 1: structured value with strict reference handling
fn structured(tags: &RawTagBag, axis: Axis) -> Option<f64> {
    let magnitude = match tags.value(axis.value_tag())? {
        TagValue::Numbers(parts) if parts.len() >= 3 => {
            parts[0] + parts[1] / 60.0 + parts[2] / 3600.0
        }
        TagValue::Numbers(parts) if parts.len() == 1 => parts[0],
        TagValue::Numbers(_) => return None,
        TagValue::Number(n) => *n,
        TagValue::Text(s) => utils::parse_leading_float(s)?,
        TagValue::Texts(parts) => utils::parse_leading_float(parts.first()?)?,
    };

    let reference = tags
        .value(axis.ref_tag())
        .and_then(TagValue::ref_code)
        .unwrap_or(axis.default_ref());

    let value = if reference == axis.negative_ref() {
        -magnitude
    } else {
        magnitude
    };
    value.is_finite().then_some(value)
}

/// Step 2: first numeric token of the axis description
fn from_description(tags: &RawTagBag, axis: Axis) -> Option<f64> {
    let description = tags.description(axis.value_tag())?;
    let magnitude = utils::first_number(description)?;
    let negative = description
        .to_lowercase()
        .contains(axis.hemisphere_word())
        || ref_letter_is_negative(tags, axis);
    Some(if negative { -magnitude } else { magnitude })
}

/// Step 3: tokens of both descriptions, latitude first
fn from_combined_description(tags: &RawTagBag) -> (Option<f64>, Option<f64>) {
    let lat_desc = tags.get(TagName::GpsLatitude).map_or("", |r| r.text());
    let lon_desc = tags.get(TagName::GpsLongitude).map_or("", |r| r.text());
    let combined = format!("{} {}", lat_desc, lon_desc);

    let numbers = utils::all_numbers(&combined);
    if numbers.len() < 2 {
        return (None, None);
    }

    let lower = combined.to_lowercase();
    let signed = |axis: Axis, magnitude: f64| {
        if lower.contains(axis.hemisphere_word()) || ref_letter_is_negative(tags, axis) {
            -magnitude
        } else {
            magnitude
        }
    };

    (
        Some(signed(Axis::Latitude, numbers[0])),
        Some(signed(Axis::Longitude, numbers[1])),
    )
}

/// Case-insensitive check of the first character of the ref description or value
fn ref_letter_is_negative(tags: &RawTagBag, axis: Axis) -> bool {
    let starts_negative = |s: &str| {
        s.chars()
            .next()
            .is_some_and(|c| c.to_ascii_lowercase() == axis.negative_letter())
    };

    tags.description(axis.ref_tag()).is_some_and(starts_negative)
        || tags
            .value(axis.ref_tag())
            .and_then(TagValue::ref_code)
            .is_some_and(starts_negative)
}

fn lenient_is_negative(tags: &RawTagBag, axis: Axis, description: &str) -> bool {
    let lower = description.to_lowercase();
    let spaced_letter = format!("{} ", axis.negative_letter());
    lower.contains(axis.hemisphere_word())
        || lower.contains(&spaced_letter)
        || ref_letter_is_negative(tags, axis)
}
