//! Utility functions for distances, numeric token extraction and interpolation

use once_cell::sync::Lazy;
use regex::Regex;

/// Earth's mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// First decimal-or-integer token, as camera firmware writes them in descriptions.
/// ASCII digits only.
static NUMERIC_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+\.[0-9]+|[0-9]+)").expect("numeric token pattern is valid")
});

/// Leading float of a string, with optional sign and exponent
static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("leading float pattern is valid")
});

/// Calculate the Haversine distance between two (lat, lon) pairs in kilometers
#[inline]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// First unsigned numeric token in `text`
pub fn first_number(text: &str) -> Option<f64> {
    NUMERIC_TOKEN
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// All unsigned numeric tokens in `text`, in order
pub fn all_numbers(text: &str) -> Vec<f64> {
    NUMERIC_TOKEN
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Parse the leading float of `text`, ignoring any trailing garbage
pub fn parse_leading_float(text: &str) -> Option<f64> {
    LEADING_FLOAT
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Quadratic ease-in-out on `[0, 1]`
#[inline]
pub fn ease_in_out(progress: f64) -> f64 {
    let t = progress.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero() {
        assert!(haversine_km(51.5, -0.12, 51.5, -0.12).abs() < 1e-12);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        // One degree of latitude is ~111.19 km on a 6371 km sphere
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01);
    }

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("37.5 North"), Some(37.5));
        assert_eq!(first_number("deg 127"), Some(127.0));
        assert_eq!(first_number("-12.25"), Some(12.25));
        assert_eq!(first_number("no digits"), None);
        // Other scripts' digits are not numeric tokens
        assert_eq!(first_number("\u{663} 37.5"), Some(37.5));
        assert_eq!(all_numbers("\u{663}\u{664} 37 \u{665}"), vec![37.0]);
        assert_eq!(parse_leading_float("\u{663}"), None);
    }

    #[test]
    fn test_all_numbers() {
        assert_eq!(all_numbers("37.5 N 127.0 E"), vec![37.5, 127.0]);
        assert!(all_numbers("").is_empty());
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("-12.5abc"), Some(-12.5));
        assert_eq!(parse_leading_float("  3"), Some(3.0));
        assert_eq!(parse_leading_float("1e2"), Some(100.0));
        assert_eq!(parse_leading_float("abc"), None);
    }

    #[test]
    fn test_ease_in_out() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!(ease_in_out(0.25) < 0.25);
        assert!(ease_in_out(0.75) > 0.75);
        assert_eq!(ease_in_out(2.0), 1.0);
    }
}
