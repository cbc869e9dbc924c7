//! Time zone of a location at a point in time.

use crate::convert::{self, LatLng};
use crate::metadata::RequestMetadata;
use crate::{Client, Result};
use serde_json::Value;
use std::time::SystemTime;

/// A time zone request. The timestamp defaults to the time the request is built.
#[derive(Debug, Clone)]
pub struct TimezoneRequest {
    /// The location to look up.
    pub location: LatLng,
    /// When to evaluate daylight saving; defaults to now.
    pub timestamp: Option<SystemTime>,
    /// Language of the returned names.
    pub language: Option<String>,
}

impl TimezoneRequest {
    /// Looks up the time zone at `location`.
    pub fn new(location: impl Into<LatLng>) -> Self {
        Self {
            location: location.into(),
            timestamp: None,
            language: None,
        }
    }

    /// Evaluates at the given time.
    pub fn timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the language of the returned names.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builds the request.
    pub fn build(&self) -> RequestMetadata {
        let timestamp = self.timestamp.unwrap_or_else(SystemTime::now);
        RequestMetadata::new("/maps/api/timezone/json")
            .with_param("location", self.location)
            .with_param("timestamp", convert::unix_time(timestamp))
            .with_optional_param("language", self.language.as_ref())
    }
}

impl Client {
    /// Runs a time zone request, returning the whole body.
    pub async fn timezone(&self, request: &TimezoneRequest) -> Result<Value> {
        Ok(self.execute(request.build()).await?.into_data())
    }
}
