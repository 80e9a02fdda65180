//! Reverse geocoding
//!
//! The lookup itself is an external service behind [`ReverseGeocoder`]. This
//! module only formats its answers and memoizes them; route building and
//! playback never depend on it.

use crate::gps::Coordinates;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Structured address as returned by a reverse lookup
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Address {
    pub road: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    /// Full one-line description from the service
    pub display_name: Option<String>,
}

impl Address {
    fn is_korean(&self) -> bool {
        matches!(self.country.as_deref(), Some("대한민국" | "South Korea"))
    }

    /// Human-readable single line.
    ///
    /// Korean addresses run from province down to road, others from road up to
    /// country. Falls back to the display name when no component is present.
    pub fn format(&self) -> String {
        fn first<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
            candidates
                .iter()
                .find_map(|c| c.as_deref().filter(|s| !s.is_empty()))
        }

        let parts: Vec<&str> = if self.is_korean() {
            [
                first(&[&self.province, &self.state]),
                first(&[&self.city]),
                first(&[&self.county]),
                first(&[&self.suburb, &self.town, &self.village]),
                first(&[&self.neighbourhood]),
                first(&[&self.road]),
            ]
            .into_iter()
            .flatten()
            .collect()
        } else {
            [
                first(&[&self.road]),
                first(&[&self.suburb, &self.neighbourhood]),
                first(&[&self.city, &self.town, &self.village]),
                first(&[&self.state, &self.province]),
                first(&[&self.country]),
            ]
            .into_iter()
            .flatten()
            .collect()
        };

        if parts.is_empty() {
            self.display_name.clone().unwrap_or_default()
        } else {
            parts.join(" ")
        }
    }
}

/// External coordinate-to-address lookup
pub trait ReverseGeocoder {
    /// `None` when the lookup failed; failures are not cached
    fn lookup(&mut self, coords: Coordinates) -> Option<Address>;
}

impl<F> ReverseGeocoder for F
where
    F: FnMut(Coordinates) -> Option<Address>,
{
    fn lookup(&mut self, coords: Coordinates) -> Option<Address> {
        self(coords)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeocoderConfig {
    /// Maximum number of cached addresses
    pub capacity: usize,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Memoizing wrapper around a [`ReverseGeocoder`]
pub struct CachedGeocoder<G> {
    inner: G,
    cache: LruCache<String, String>,
}

impl<G: ReverseGeocoder> CachedGeocoder<G> {
    pub fn new(inner: G, config: GeocoderConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: LruCache::new(capacity),
        }
    }

    /// Positions equal to six decimals share an entry
    pub fn cache_key(coords: &Coordinates) -> String {
        format!("{:.6},{:.6}", coords.lat, coords.lon)
    }

    /// Formatted address for `coords`, or `None` when the lookup failed
    pub fn address(&mut self, coords: Coordinates) -> Option<String> {
        let key = Self::cache_key(&coords);
        if let Some(hit) = self.cache.get(&key) {
            return Some(hit.clone());
        }

        match self.inner.lookup(coords) {
            Some(address) => {
                let formatted = address.format();
                self.cache.put(key, formatted.clone());
                Some(formatted)
            }
            None => {
                tracing::debug!("Reverse geocoding failed for {}", coords);
                None
            }
        }
    }

    #[inline]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
