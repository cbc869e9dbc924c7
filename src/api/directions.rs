//! Routing between two locations.

use super::{take_list, DepartureTime, TravelMode, Units};
use crate::convert::{self, Location};
use crate::metadata::RequestMetadata;
use crate::{Client, Error, Result};
use serde_json::Value;
use std::time::SystemTime;

/// A directions request.
///
/// # Examples
///
/// ```
/// use mapcall::api::{directions::DirectionsRequest, TravelMode};
///
/// let request = DirectionsRequest::new("Sydney", "Melbourne")
///     .mode(TravelMode::Bicycling)
///     .waypoint("Canberra")
///     .build()?;
///
/// assert_eq!(request.path, "/maps/api/directions/json");
/// # Ok::<(), mapcall::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirectionsRequest {
    /// Where the route starts.
    pub origin: Location,
    /// Where the route ends.
    pub destination: Location,
    /// Travel mode; the service defaults to driving.
    pub mode: Option<TravelMode>,
    /// Intermediate stops, in order.
    pub waypoints: Vec<Location>,
    /// Whether the service may reorder the waypoints.
    pub optimize_waypoints: bool,
    /// Whether to ask for alternative routes.
    pub alternatives: bool,
    /// Features to avoid.
    pub avoid: Vec<String>,
    /// Language of the returned text.
    pub language: Option<String>,
    /// Unit system of the returned text.
    pub units: Option<Units>,
    /// Region bias, as a ccTLD.
    pub region: Option<String>,
    /// Desired departure time.
    pub departure_time: Option<DepartureTime>,
    /// Desired arrival time. Exclusive with `departure_time`.
    pub arrival_time: Option<SystemTime>,
}

impl DirectionsRequest {
    /// Routes from `origin` to `destination`.
    pub fn new(origin: impl Into<Location>, destination: impl Into<Location>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            mode: None,
            waypoints: Vec::new(),
            optimize_waypoints: false,
            alternatives: false,
            avoid: Vec::new(),
            language: None,
            units: None,
            region: None,
            departure_time: None,
            arrival_time: None,
        }
    }

    /// Sets the travel mode.
    pub fn mode(mut self, mode: TravelMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Adds an intermediate stop.
    pub fn waypoint(mut self, waypoint: impl Into<Location>) -> Self {
        self.waypoints.push(waypoint.into());
        self
    }

    /// Lets the service reorder the waypoints.
    pub fn optimize_waypoints(mut self, optimize: bool) -> Self {
        self.optimize_waypoints = optimize;
        self
    }

    /// Asks for more than one route where available.
    pub fn alternatives(mut self, alternatives: bool) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Adds a feature to avoid: `tolls`, `highways`, `ferries` or `indoor`.
    pub fn avoid(mut self, feature: impl Into<String>) -> Self {
        self.avoid.push(feature.into());
        self
    }

    /// Sets the language of the returned text.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the unit system.
    pub fn units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    /// Biases results towards a region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Departs at the given time (or now).
    pub fn departure_time(mut self, departure_time: DepartureTime) -> Self {
        self.departure_time = Some(departure_time);
        self
    }

    /// Arrives by the given time.
    pub fn arrival_time(mut self, arrival_time: SystemTime) -> Self {
        self.arrival_time = Some(arrival_time);
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when both a departure and an arrival
    /// time are set.
    pub fn build(&self) -> Result<RequestMetadata> {
        if self.departure_time.is_some() && self.arrival_time.is_some() {
            return Err(Error::InvalidArgument(
                "Should not specify both departure_time and arrival_time".to_string(),
            ));
        }

        let waypoints = (!self.waypoints.is_empty()).then(|| {
            let list = convert::location_list(&self.waypoints);
            if self.optimize_waypoints {
                format!("optimize:true|{list}")
            } else {
                list
            }
        });
        let avoid = (!self.avoid.is_empty()).then(|| convert::join_list("|", &self.avoid));

        Ok(RequestMetadata::new("/maps/api/directions/json")
            .with_param("origin", &self.origin)
            .with_param("destination", &self.destination)
            .with_optional_param("mode", self.mode)
            .with_optional_param("waypoints", waypoints)
            .with_optional_param("alternatives", self.alternatives.then_some("true"))
            .with_optional_param("avoid", avoid)
            .with_optional_param("language", self.language.as_ref())
            .with_optional_param("units", self.units)
            .with_optional_param("region", self.region.as_ref())
            .with_optional_param("departure_time", self.departure_time)
            .with_optional_param("arrival_time", self.arrival_time.map(convert::unix_time)))
    }
}

impl Client {
    /// Runs a directions request, returning the `routes` list.
    pub async fn directions(&self, request: &DirectionsRequest) -> Result<Vec<Value>> {
        let response = self.execute(request.build()?).await?;
        Ok(take_list(response.into_data(), "routes"))
    }
}
