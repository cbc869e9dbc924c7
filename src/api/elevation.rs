//! Elevation of points and of samples along a path.

use super::take_list;
use crate::convert::{self, Location};
use crate::metadata::RequestMetadata;
use crate::{Client, Error, Result};
use serde_json::Value;

const ELEVATION_PATH: &str = "/maps/api/elevation/json";

/// A path to sample elevations along.
#[derive(Debug, Clone, PartialEq)]
pub enum ElevationPath {
    Points(Vec<Location>),
    /// An encoded polyline, sent with the `enc:` prefix.
    Encoded(String),
}

impl ElevationPath {
    fn param(&self) -> String {
        match self {
            ElevationPath::Points(points) => convert::location_list(points),
            ElevationPath::Encoded(polyline) => format!("enc:{polyline}"),
        }
    }
}

/// Elevation at each of `locations`.
///
/// ```
/// let request = mapcall::api::elevation::elevation([(39.7391536, -104.9847034)])?;
/// assert_eq!(
///     request.query_params(),
///     vec![("locations".to_string(), "39.739154,-104.984703".to_string())]
/// );
/// # Ok::<(), mapcall::Error>(())
/// ```
pub fn elevation<I>(locations: I) -> Result<RequestMetadata>
where
    I: IntoIterator,
    I::Item: Into<Location>,
{
    let locations: Vec<Location> = locations.into_iter().map(Into::into).collect();
    if locations.is_empty() {
        return Err(Error::InvalidArgument(
            "At least one location is required".to_string(),
        ));
    }
    Ok(RequestMetadata::new(ELEVATION_PATH)
        .with_param("locations", convert::location_list(&locations)))
}

/// Elevation at `samples` evenly spaced points along `path`.
pub fn elevation_along_path(path: &ElevationPath, samples: u32) -> Result<RequestMetadata> {
    if samples == 0 {
        return Err(Error::InvalidArgument(
            "samples must be greater than zero".to_string(),
        ));
    }
    Ok(RequestMetadata::new(ELEVATION_PATH)
        .with_param("path", path.param())
        .with_param("samples", samples))
}

impl Client {
    /// Looks up elevations, returning the `results` list.
    pub async fn elevation<I>(&self, locations: I) -> Result<Vec<Value>>
    where
        I: IntoIterator,
        I::Item: Into<Location>,
    {
        let response = self.execute(elevation(locations)?).await?;
        Ok(take_list(response.into_data(), "results"))
    }

    /// Samples elevations along a path, returning the `results` list.
    pub async fn elevation_along_path(
        &self,
        path: &ElevationPath,
        samples: u32,
    ) -> Result<Vec<Value>> {
        let response = self.execute(elevation_along_path(path, samples)?).await?;
        Ok(take_list(response.into_data(), "results"))
    }
}
