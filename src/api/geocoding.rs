//! Geocoding and reverse geocoding.

use super::take_list;
use crate::convert::{self, Bounds, LatLng};
use crate::metadata::RequestMetadata;
use crate::{Client, Result};
use serde_json::Value;

const GEOCODE_PATH: &str = "/maps/api/geocode/json";

/// A forward geocoding request: address or place id to coordinates.
///
/// # Examples
///
/// ```
/// use mapcall::api::geocoding::GeocodeRequest;
///
/// let request = GeocodeRequest::address("Sydney")
///     .component("country", "AU")
///     .language("en")
///     .build();
///
/// assert_eq!(request.path, "/maps/api/geocode/json");
/// assert_eq!(request.query_params().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeocodeRequest {
    /// Street address to geocode.
    pub address: Option<String>,
    /// Place id to look up instead of an address.
    pub place_id: Option<String>,
    /// Component filters, as `(component, value)` pairs.
    pub components: Vec<(String, String)>,
    /// Viewport to bias results towards.
    pub bounds: Option<Bounds>,
    /// Region bias, as a ccTLD.
    pub region: Option<String>,
    /// Language of the returned addresses.
    pub language: Option<String>,
}

impl GeocodeRequest {
    /// Geocodes a street address.
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Looks up the address of a place id.
    pub fn place_id(place_id: impl Into<String>) -> Self {
        Self {
            place_id: Some(place_id.into()),
            ..Self::default()
        }
    }

    /// Adds a component filter such as `country:AU`.
    pub fn component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.push((key.into(), value.into()));
        self
    }

    /// Biases results towards a viewport.
    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Biases results towards a region (a ccTLD such as `au`).
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the language of the returned addresses.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builds the request.
    pub fn build(&self) -> RequestMetadata {
        let components = (!self.components.is_empty())
            .then(|| convert::components(self.components.iter().map(|(k, v)| (k, v))));

        RequestMetadata::new(GEOCODE_PATH)
            .with_optional_param("address", self.address.as_ref())
            .with_optional_param("place_id", self.place_id.as_ref())
            .with_optional_param("components", components)
            .with_optional_param("bounds", self.bounds)
            .with_optional_param("region", self.region.as_ref())
            .with_optional_param("language", self.language.as_ref())
    }
}

/// What to reverse geocode.
#[derive(Debug, Clone, PartialEq)]
pub enum ReverseTarget {
    Coordinates(LatLng),
    PlaceId(String),
}

impl From<LatLng> for ReverseTarget {
    fn from(latlng: LatLng) -> Self {
        ReverseTarget::Coordinates(latlng)
    }
}

impl From<(f64, f64)> for ReverseTarget {
    fn from(pair: (f64, f64)) -> Self {
        ReverseTarget::Coordinates(pair.into())
    }
}

/// Text containing a comma is sent as coordinates, anything else as a place id.
impl From<&str> for ReverseTarget {
    fn from(text: &str) -> Self {
        if text.contains(',') {
            match text.split_once(',').and_then(|(lat, lng)| {
                Some(LatLng::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?))
            }) {
                Some(latlng) => ReverseTarget::Coordinates(latlng),
                None => ReverseTarget::PlaceId(text.to_string()),
            }
        } else {
            ReverseTarget::PlaceId(text.to_string())
        }
    }
}

/// A reverse geocoding request: coordinates or a place id to addresses.
#[derive(Debug, Clone)]
pub struct ReverseGeocodeRequest {
    /// The coordinates or place id to look up.
    pub target: ReverseTarget,
    /// Address types to keep, such as `street_address`.
    pub result_type: Vec<String>,
    /// Location types to keep, such as `ROOFTOP`.
    pub location_type: Vec<String>,
    /// Language of the returned addresses.
    pub language: Option<String>,
}

impl ReverseGeocodeRequest {
    /// Reverse geocodes `target`.
    pub fn new(target: impl Into<ReverseTarget>) -> Self {
        Self {
            target: target.into(),
            result_type: Vec::new(),
            location_type: Vec::new(),
            language: None,
        }
    }

    /// Restricts results to an address type such as `street_address`.
    pub fn result_type(mut self, result_type: impl Into<String>) -> Self {
        self.result_type.push(result_type.into());
        self
    }

    /// Restricts results to a location type such as `ROOFTOP`.
    pub fn location_type(mut self, location_type: impl Into<String>) -> Self {
        self.location_type.push(location_type.into());
        self
    }

    /// Sets the language of the returned addresses.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builds the request.
    pub fn build(&self) -> RequestMetadata {
        let request = match &self.target {
            ReverseTarget::Coordinates(latlng) => {
                RequestMetadata::new(GEOCODE_PATH).with_param("latlng", latlng)
            }
            ReverseTarget::PlaceId(place_id) => {
                RequestMetadata::new(GEOCODE_PATH).with_param("place_id", place_id)
            }
        };

        let result_type = (!self.result_type.is_empty())
            .then(|| convert::join_list("|", &self.result_type));
        let location_type = (!self.location_type.is_empty())
            .then(|| convert::join_list("|", &self.location_type));

        request
            .with_optional_param("result_type", result_type)
            .with_optional_param("location_type", location_type)
            .with_optional_param("language", self.language.as_ref())
    }
}

impl Client {
    /// Runs a geocoding request, returning the `results` list.
    pub async fn geocode(&self, request: &GeocodeRequest) -> Result<Vec<Value>> {
        let response = self.execute(request.build()).await?;
        Ok(take_list(response.into_data(), "results"))
    }

    /// Geocodes a single address.
    pub async fn geocode_address(&self, address: impl Into<String>) -> Result<Vec<Value>> {
        self.geocode(&GeocodeRequest::address(address)).await
    }

    /// Runs a reverse geocoding request, returning the `results` list.
    pub async fn reverse_geocode(&self, request: &ReverseGeocodeRequest) -> Result<Vec<Value>> {
        let response = self.execute(request.build()).await?;
        Ok(take_list(response.into_data(), "results"))
    }
}
