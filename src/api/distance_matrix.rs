//! Travel distance and time between many origins and destinations.

use super::{DepartureTime, TravelMode, Units};
use crate::convert::{self, Location};
use crate::metadata::RequestMetadata;
use crate::{Client, Error, Result};
use serde_json::Value;
use std::time::SystemTime;

/// A distance matrix request.
#[derive(Debug, Clone)]
pub struct DistanceMatrixRequest {
    /// Where each route starts.
    pub origins: Vec<Location>,
    /// Where each route ends.
    pub destinations: Vec<Location>,
    /// Travel mode; the service defaults to driving.
    pub mode: Option<TravelMode>,
    /// Language of the returned text.
    pub language: Option<String>,
    /// Feature to avoid, such as `tolls`.
    pub avoid: Option<String>,
    /// Unit system of the returned text.
    pub units: Option<Units>,
    /// Desired departure time.
    pub departure_time: Option<DepartureTime>,
    /// Desired arrival time. Exclusive with `departure_time`.
    pub arrival_time: Option<SystemTime>,
    /// Region bias, as a ccTLD.
    pub region: Option<String>,
}

impl DistanceMatrixRequest {
    /// Computes every origin to every destination.
    pub fn new<O, D>(origins: O, destinations: D) -> Self
    where
        O: IntoIterator,
        O::Item: Into<Location>,
        D: IntoIterator,
        D::Item: Into<Location>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
            destinations: destinations.into_iter().map(Into::into).collect(),
            mode: None,
            language: None,
            avoid: None,
            units: None,
            departure_time: None,
            arrival_time: None,
            region: None,
        }
    }

    /// Sets the travel mode.
    pub fn mode(mut self, mode: TravelMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the language of the returned text.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Feature to avoid: `tolls`, `highways`, `ferries` or `indoor`.
    pub fn avoid(mut self, feature: impl Into<String>) -> Self {
        self.avoid = Some(feature.into());
        self
    }

    /// Sets the unit system.
    pub fn units(mut self, units: Units) -> Self {
        self.units = Some(units);
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

    /// Biases results towards a region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for empty origins or destinations,
    /// or when both a departure and an arrival time are set.
    pub fn build(&self) -> Result<RequestMetadata> {
        if self.origins.is_empty() || self.destinations.is_empty() {
            return Err(Error::InvalidArgument(
                "At least one origin and one destination are required".to_string(),
            ));
        }
        if self.departure_time.is_some() && self.arrival_time.is_some() {
            return Err(Error::InvalidArgument(
                "Should not specify both departure_time and arrival_time".to_string(),
            ));
        }

        Ok(RequestMetadata::new("/maps/api/distancematrix/json")
            .with_param("origins", convert::location_list(&self.origins))
            .with_param("destinations", convert::location_list(&self.destinations))
            .with_optional_param("mode", self.mode)
            .with_optional_param("language", self.language.as_ref())
            .with_optional_param("avoid", self.avoid.as_ref())
            .with_optional_param("units", self.units)
            .with_optional_param("departure_time", self.departure_time)
            .with_optional_param("arrival_time", self.arrival_time.map(convert::unix_time))
            .with_optional_param("region", self.region.as_ref()))
    }
}

impl Client {
    /// Runs a distance matrix request, returning the whole body.
    pub async fn distance_matrix(&self, request: &DistanceMatrixRequest) -> Result<Value> {
        Ok(self.execute(request.build()?).await?.into_data())
    }
}
