//! Conversions from Rust values to the string forms the web services expect.
//!
//! ```
//! use mapcall::convert::{LatLng, Location, location_list};
//!
//! let sydney = LatLng::new(-33.8674869, 151.2069902);
//! assert_eq!(sydney.to_string(), "-33.867487,151.206990");
//!
//! let stops = [Location::from(sydney), Location::from("Melbourne")];
//! assert_eq!(location_list(&stops), "-33.867487,151.206990|Melbourne");
//! ```

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Formats as `lat,lng` with six decimal places.
impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// A place given either as coordinates or as free text (an address, a place
/// name, or an already formatted `lat,lng` string).
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Coordinates(LatLng),
    Text(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Coordinates(latlng) => latlng.fmt(f),
            Location::Text(text) => f.write_str(text),
        }
    }
}

impl From<LatLng> for Location {
    fn from(latlng: LatLng) -> Self {
        Location::Coordinates(latlng)
    }
}

impl From<(f64, f64)> for Location {
    fn from(pair: (f64, f64)) -> Self {
        Location::Coordinates(pair.into())
    }
}

impl From<&str> for Location {
    fn from(text: &str) -> Self {
        Location::Text(text.to_string())
    }
}

impl From<String> for Location {
    fn from(text: String) -> Self {
        Location::Text(text)
    }
}

/// A rectangle given by its south-west and north-east corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// South-west corner.
    pub southwest: LatLng,
    /// North-east corner.
    pub northeast: LatLng,
}

impl Bounds {
    /// Bounds from two corners.
    pub fn new(southwest: impl Into<LatLng>, northeast: impl Into<LatLng>) -> Self {
        Self {
            southwest: southwest.into(),
            northeast: northeast.into(),
        }
    }
}

/// Formats as `southwest|northeast`.
impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.southwest, self.northeast)
    }
}

/// Joins the items with `sep`.
pub fn join_list<I, T>(sep: &str, items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: fmt::Display,
{
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Formats a component filter as `key:value|key:value`, keeping the given order.
///
/// ```
/// let filter = mapcall::convert::components([("country", "US"), ("postal_code", "94043")]);
/// assert_eq!(filter, "country:US|postal_code:94043");
/// ```
pub fn components<I, K, V>(components: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: fmt::Display,
    V: fmt::Display,
{
    join_list(
        "|",
        components.into_iter().map(|(k, v)| format!("{k}:{v}")),
    )
}

/// Formats bounds as `southwest|northeast`.
pub fn bounds(southwest: LatLng, northeast: LatLng) -> String {
    Bounds::new(southwest, northeast).to_string()
}

/// Formats a list of locations, separated by `|`.
pub fn location_list(locations: &[Location]) -> String {
    join_list("|", locations)
}

/// Formats an image size as `WIDTHxHEIGHT`.
pub fn size(width: u32, height: u32) -> String {
    format!("{width}x{height}")
}

/// Formats a point in time as whole seconds since the Unix epoch.
pub fn unix_time(time: SystemTime) -> String {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_secs().to_string(),
        Err(before) => format!("-{}", before.duration().as_secs()),
    }
}
