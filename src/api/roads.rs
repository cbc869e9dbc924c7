//! The Roads service: snapping, nearest roads and speed limits.
//!
//! Roads lives on its own host, only accepts API keys and wraps errors in an
//! `{"error": {...}}` envelope, so every request here is built with
//! [`Extract::Roads`] and [`key_only`](RequestMetadata::key_only).

use super::{take_list, ROADS_BASE_URL};
use crate::convert::{self, Location};
use crate::metadata::RequestMetadata;
use crate::{Client, Error, Extract, Result};
use serde_json::Value;

/// The service accepts at most this many points or place ids per request.
pub const MAX_POINTS: usize = 100;

fn roads_request(path: &str) -> RequestMetadata {
    RequestMetadata::new(path)
        .with_base_url(ROADS_BASE_URL)
        .key_only()
        .with_extract(Extract::Roads)
}

fn check_len(len: usize, what: &str) -> Result<()> {
    if len == 0 || len > MAX_POINTS {
        return Err(Error::InvalidArgument(format!(
            "Between 1 and {MAX_POINTS} {what} are required, got {len}"
        )));
    }
    Ok(())
}

/// Snaps a GPS path to the roads most likely travelled.
pub fn snap_to_roads(path: &[Location], interpolate: bool) -> Result<RequestMetadata> {
    check_len(path.len(), "points")?;
    Ok(roads_request("/v1/snapToRoads")
        .with_param("path", convert::location_list(path))
        .with_optional_param("interpolate", interpolate.then_some("true")))
}

/// Finds the nearest road segment for each independent point.
pub fn nearest_roads(points: &[Location]) -> Result<RequestMetadata> {
    check_len(points.len(), "points")?;
    Ok(roads_request("/v1/nearestRoads").with_param("points", convert::location_list(points)))
}

/// Posted speed limits for road segments, one `placeId` parameter per segment.
///
/// ```
/// let request = mapcall::api::roads::speed_limits(&["id1", "id2"])?;
/// assert_eq!(
///     request.query_params(),
///     vec![
///         ("placeId".to_string(), "id1".to_string()),
///         ("placeId".to_string(), "id2".to_string()),
///     ]
/// );
/// # Ok::<(), mapcall::Error>(())
/// ```
pub fn speed_limits<S: AsRef<str>>(place_ids: &[S]) -> Result<RequestMetadata> {
    check_len(place_ids.len(), "place ids")?;
    Ok(place_ids
        .iter()
        .fold(roads_request("/v1/speedLimits"), |request, id| {
            request.with_param("placeId", id.as_ref())
        }))
}

/// Snaps a path and returns the speed limits along it.
pub fn snapped_speed_limits(path: &[Location]) -> Result<RequestMetadata> {
    check_len(path.len(), "points")?;
    Ok(roads_request("/v1/speedLimits").with_param("path", convert::location_list(path)))
}

impl Client {
    /// Returns the `snappedPoints` list.
    pub async fn snap_to_roads(&self, path: &[Location], interpolate: bool) -> Result<Vec<Value>> {
        let response = self.execute(snap_to_roads(path, interpolate)?).await?;
        Ok(take_list(response.into_data(), "snappedPoints"))
    }

    /// Returns the `snappedPoints` list.
    pub async fn nearest_roads(&self, points: &[Location]) -> Result<Vec<Value>> {
        let response = self.execute(nearest_roads(points)?).await?;
        Ok(take_list(response.into_data(), "snappedPoints"))
    }

    /// Returns the `speedLimits` list.
    pub async fn speed_limits<S: AsRef<str>>(&self, place_ids: &[S]) -> Result<Vec<Value>> {
        let response = self.execute(speed_limits(place_ids)?).await?;
        Ok(take_list(response.into_data(), "speedLimits"))
    }

    /// Returns the whole body, with both `speedLimits` and `snappedPoints`.
    pub async fn snapped_speed_limits(&self, path: &[Location]) -> Result<Value> {
        Ok(self.execute(snapped_speed_limits(path)?).await?.into_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_roads() {
        let path = [Location::from((-33.86, 151.20)), Location::from((-33.87, 151.21))];
        let request = snap_to_roads(&path, true).unwrap();

        assert_eq!(request.base_url.as_deref(), Some(ROADS_BASE_URL));
        assert!(!request.accepts_client_id);
        assert_eq!(request.extract, Extract::Roads);
        assert_eq!(
            request.query_params(),
            vec![
                ("interpolate".to_string(), "true".to_string()),
                (
                    "path".to_string(),
                    "-33.860000,151.200000|-33.870000,151.210000".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_point_limits() {
        assert!(matches!(nearest_roads(&[]), Err(Error::InvalidArgument(_))));

        let too_many = vec![Location::from((0.0, 0.0)); MAX_POINTS + 1];
        assert!(matches!(
            snapped_speed_limits(&too_many),
            Err(Error::InvalidArgument(_))
        ));

        let ids: Vec<String> = (0..=MAX_POINTS).map(|i| i.to_string()).collect();
        assert!(speed_limits(&ids).is_err());
    }
}
