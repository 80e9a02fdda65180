//! Typed EXIF tag bag
//!
//! The EXIF decoder runs outside this crate and hands over a loosely typed map of
//! tag name to `{ value, description }`. This module narrows it to the closed set
//! of tags the rest of the library reads, keeping the shape of each raw value
//! (scalar, array or text) so that resolvers can match on it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The EXIF tags this library understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagName {
    Make,
    Model,
    FocalLength,
    ExposureTime,
    FNumber,
    DateTimeOriginal,
    DateTime,
    GpsLatitude,
    GpsLatitudeRef,
    GpsLongitude,
    GpsLongitudeRef,
}

impl TagName {
    pub fn all() -> &'static [Self] {
        &[
            Self::Make,
            Self::Model,
            Self::FocalLength,
            Self::ExposureTime,
            Self::FNumber,
            Self::DateTimeOriginal,
            Self::DateTime,
            Self::GpsLatitude,
            Self::GpsLatitudeRef,
            Self::GpsLongitude,
            Self::GpsLongitudeRef,
        ]
    }

    /// EXIF key as emitted by the decoder
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Make => "Make",
            Self::Model => "Model",
            Self::FocalLength => "FocalLength",
            Self::ExposureTime => "ExposureTime",
            Self::FNumber => "FNumber",
            Self::DateTimeOriginal => "DateTimeOriginal",
            Self::DateTime => "DateTime",
            Self::GpsLatitude => "GPSLatitude",
            Self::GpsLatitudeRef => "GPSLatitudeRef",
            Self::GpsLongitude => "GPSLongitude",
            Self::GpsLongitudeRef => "GPSLongitudeRef",
        }
    }
}

impl FromStr for TagName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw encoded value of a tag, in whichever shape the decoder produced
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum TagValue {
    Number(f64),
    Text(String),
    Numbers(Vec<f64>),
    Texts(Vec<String>),
}

impl TagValue {
    /// Reference code of a `*Ref` tag: the first element of an array, or the first
    /// character of a plain string (`"South"` -> `"S"`).
    pub fn ref_code(&self) -> Option<&str> {
        match self {
            Self::Text(s) => s.chars().next().map(|c| &s[..c.len_utf8()]),
            Self::Texts(v) => v.first().map(String::as_str),
            Self::Number(_) | Self::Numbers(_) => None,
        }
    }
}

/// A single tag: raw value plus the decoder's human readable rendering
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagRecord {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub value: Option<TagValue>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub description: Option<String>,
}

impl TagRecord {
    pub fn new(value: TagValue, description: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            description: Some(description.into()),
        }
    }

    pub fn from_value(value: TagValue) -> Self {
        Self {
            value: Some(value),
            description: None,
        }
    }

    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            value: None,
            description: Some(description.into()),
        }
    }

    /// Description text, `""` when missing
    #[inline]
    pub fn text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Immutable mapping from known tag names to their records
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        from = "BTreeMap<String, serde_json::Value>",
        into = "BTreeMap<String, TagRecord>"
    )
)]
pub struct RawTagBag {
    tags: BTreeMap<TagName, TagRecord>,
}

impl RawTagBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: TagName, record: TagRecord) -> Self {
        self.tags.insert(name, record);
        self
    }

    pub fn insert(&mut self, name: TagName, record: TagRecord) {
        self.tags.insert(name, record);
    }

    #[inline]
    pub fn get(&self, name: TagName) -> Option<&TagRecord> {
        self.tags.get(&name)
    }

    #[inline]
    pub fn contains(&self, name: TagName) -> bool {
        self.tags.contains_key(&name)
    }

    /// Non-empty description of a tag
    #[inline]
    pub fn description(&self, name: TagName) -> Option<&str> {
        self.get(name)
            .and_then(|record| record.description.as_deref())
            .filter(|s| !s.is_empty())
    }

    #[inline]
    pub fn value(&self, name: TagName) -> Option<&TagValue> {
        self.get(name).and_then(|record| record.value.as_ref())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagName, &TagRecord)> {
        self.tags.iter().map(|(name, record)| (*name, record))
    }
}

impl From<BTreeMap<String, TagRecord>> for RawTagBag {
    fn from(raw: BTreeMap<String, TagRecord>) -> Self {
        let tags = raw
            .into_iter()
            .filter_map(|(key, record)| match key.parse::<TagName>() {
                Ok(name) => Some((name, record)),
                Err(()) => {
                    tracing::trace!("Ignoring unsupported tag {}", key);
                    None
                }
            })
            .collect();
        Self { tags }
    }
}

/// Decoder output as parsed JSON. Shapes that do not fit a [`TagValue`] are
/// dropped and scalar descriptions are stringified, so one odd tag never rejects
/// the whole bag.
#[cfg(feature = "serde")]
impl From<BTreeMap<String, serde_json::Value>> for RawTagBag {
    fn from(raw: BTreeMap<String, serde_json::Value>) -> Self {
        let records = raw
            .into_iter()
            .map(|(key, value)| {
                let record = TagRecord::from_json(&value);
                (key, record)
            })
            .collect::<BTreeMap<_, _>>();
        Self::from(records)
    }
}

#[cfg(feature = "serde")]
impl TagRecord {
    fn from_json(json: &serde_json::Value) -> Self {
        use serde_json::Value;

        let Value::Object(fields) = json else {
            tracing::trace!("Tag is not an object: {}", json);
            return Self::default();
        };
        let value = fields.get("value").and_then(TagValue::from_json);
        let description = match fields.get("description") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        };
        Self { value, description }
    }
}

#[cfg(feature = "serde")]
impl TagValue {
    fn from_json(json: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match json {
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(items) if items.iter().all(Value::is_number) => items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<_>>>()
                .map(Self::Numbers),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Self::Texts),
            _ => None,
        }
    }
}

impl From<RawTagBag> for BTreeMap<String, TagRecord> {
    fn from(bag: RawTagBag) -> Self {
        bag.tags
            .into_iter()
            .map(|(name, record)| (name.as_str().to_string(), record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_parse() {
        assert_eq!("GPSLatitude".parse::<TagName>(), Ok(TagName::GpsLatitude));
        assert_eq!("Make".parse::<TagName>(), Ok(TagName::Make));
        assert!("Orientation".parse::<TagName>().is_err());
        for name in TagName::all() {
            assert_eq!(name.as_str().parse::<TagName>(), Ok(*name));
        }
    }

    #[test]
    fn test_ref_code() {
        assert_eq!(TagValue::Texts(vec!["S".into()]).ref_code(), Some("S"));
        assert_eq!(TagValue::Text("South".into()).ref_code(), Some("S"));
        assert_eq!(TagValue::Text("W".into()).ref_code(), Some("W"));
        assert_eq!(TagValue::Text(String::new()).ref_code(), None);
        assert_eq!(TagValue::Number(1.0).ref_code(), None);
    }

    #[test]
    fn test_empty_description_is_absent() {
        let bag = RawTagBag::new()
            .with(TagName::Make, TagRecord::from_description(""))
            .with(TagName::Model, TagRecord::from_description("X100V"));
        assert_eq!(bag.description(TagName::Make), None);
        assert_eq!(bag.description(TagName::Model), Some("X100V"));
        assert!(bag.contains(TagName::Make));
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let mut raw = BTreeMap::new();
        raw.insert("Orientation".to_string(), TagRecord::default());
        raw.insert("FNumber".to_string(), TagRecord::from_description("f/2.8"));
        let bag = RawTagBag::from(raw);
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.description(TagName::FNumber), Some("f/2.8"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_decoder_output() {
        let json = r#"{
            "GPSLatitude": {"value": [37, 30, 0], "description": "37.5"},
            "GPSLatitudeRef": {"value": ["N"], "description": "North latitude"},
            "ExposureTime": {"value": 0.01, "description": "1/100"},
            "Orientation": {"value": 1, "description": "top-left"}
        }"#;
        let bag: RawTagBag = serde_json::from_str(json).unwrap();
        assert_eq!(bag.len(), 3);
        assert_eq!(
            bag.value(TagName::GpsLatitude),
            Some(&TagValue::Numbers(vec![37.0, 30.0, 0.0]))
        );
        assert_eq!(
            bag.value(TagName::GpsLatitudeRef),
            Some(&TagValue::Texts(vec!["N".into()]))
        );
        assert_eq!(bag.value(TagName::ExposureTime), Some(&TagValue::Number(0.01)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_odd_shapes() {
        let json = r#"{
            "GPSLatitude": {"value": [[37, 1], [30, 1], [0, 1]], "description": 37.5},
            "GPSLongitudeRef": {"value": ["E", 1]},
            "Make": {"value": null, "description": true},
            "Model": "not a record",
            "Orientation": {"value": true, "description": {"nested": 1}}
        }"#;
        let bag: RawTagBag = serde_json::from_str(json).unwrap();
        assert_eq!(bag.len(), 4);
        assert_eq!(bag.value(TagName::GpsLatitude), None);
        assert_eq!(bag.description(TagName::GpsLatitude), Some("37.5"));
        assert_eq!(bag.value(TagName::GpsLongitudeRef), None);
        assert_eq!(bag.description(TagName::Make), Some("true"));
        assert!(bag.contains(TagName::Model));
        assert_eq!(bag.get(TagName::Model), Some(&TagRecord::default()));

        // The stringified description still resolves
        let coords = crate::gps::resolve(
            &bag.with(TagName::GpsLongitude, TagRecord::from_description("127.25")),
        )
        .unwrap();
        assert_eq!(coords.lat, 37.5);
        assert_eq!(coords.lon, 127.25);
    }
}
