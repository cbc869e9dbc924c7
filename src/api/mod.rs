//! Typed request builders for the individual web services.
//!
//! Every builder produces a [`RequestMetadata`](crate::metadata::RequestMetadata)
//! without touching the network, so the exact request can be inspected or
//! extended (for example with
//! [`with_extra_params`](crate::metadata::RequestMetadata::with_extra_params))
//! before handing it to [`Client::execute`](crate::Client::execute). Each
//! module also adds a convenience method on [`Client`](crate::Client) that runs
//! the request and picks the conventional field out of the response body.

pub mod addressvalidation;
pub mod directions;
pub mod distance_matrix;
pub mod elevation;
pub mod geocoding;
pub mod geolocation;
pub mod maps;
pub mod places;
pub mod roads;
pub mod timezone;

use crate::convert::unix_time;
use serde_json::Value;
use std::fmt;
use std::time::SystemTime;

/// Host of the Roads service.
pub const ROADS_BASE_URL: &str = "https://roads.googleapis.com";
/// Host of the Geolocation service.
pub const GEOLOCATION_BASE_URL: &str = "https://www.googleapis.com";
/// Host of the Address Validation service.
pub const ADDRESS_VALIDATION_BASE_URL: &str = "https://addressvalidation.googleapis.com";

/// Mode of transport for routing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        })
    }
}

/// Unit system for displayed distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Metric,
    Imperial,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        })
    }
}

/// A departure time: either "now" or a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureTime {
    Now,
    At(SystemTime),
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartureTime::Now => f.write_str("now"),
            DepartureTime::At(time) => f.write_str(&unix_time(*time)),
        }
    }
}

/// Takes an array field out of a response body; missing or non-array fields yield an empty list.
pub(crate) fn take_list(mut body: Value, field: &str) -> Vec<Value> {
    match body.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Takes a field out of a response body, `Null` if it is missing.
pub(crate) fn take_field(mut body: Value, field: &str) -> Value {
    body.get_mut(field).map(Value::take).unwrap_or(Value::Null)
}
