//! Device location from cell towers and WiFi access points.

use super::GEOLOCATION_BASE_URL;
use crate::metadata::RequestMetadata;
use crate::{Client, Error, Extract, Result};
use serde::Serialize;
use serde_json::Value;

/// A cell tower observation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellTower {
    /// Cell id.
    pub cell_id: u32,
    /// Location area code (LAC).
    pub location_area_code: u32,
    /// Mobile country code (MCC).
    pub mobile_country_code: u32,
    /// Mobile network code (MNC).
    pub mobile_network_code: u32,
    /// Milliseconds since the cell was primary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Signal strength in dBm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<i32>,
    /// Timing advance value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_advance: Option<u32>,
}

/// A WiFi access point observation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiAccessPoint {
    /// MAC address of the access point.
    pub mac_address: String,
    /// Signal strength in dBm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<i32>,
    /// Milliseconds since the access point was seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Channel the client talks on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u32>,
    /// Signal to noise ratio in dB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_to_noise_ratio: Option<i32>,
}

/// A geolocation request body. Unset fields are left out of the JSON.
///
/// # Examples
///
/// ```
/// use mapcall::api::geolocation::GeolocationRequest;
///
/// let request = GeolocationRequest {
///     consider_ip: Some(false),
///     radio_type: Some("lte".to_string()),
///     ..Default::default()
/// }
/// .build()?;
///
/// let body = request.post_json.unwrap();
/// assert_eq!(body["considerIp"], false);
/// assert_eq!(body["radioType"], "lte");
/// assert!(body.get("carrier").is_none());
/// # Ok::<(), mapcall::Error>(())
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationRequest {
    /// Mobile country code of the device's home network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_mobile_country_code: Option<u32>,
    /// Mobile network code of the device's home network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_mobile_network_code: Option<u32>,
    /// Radio type: `lte`, `gsm`, `cdma`, `wcdma` or `nr`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio_type: Option<String>,
    /// Carrier name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    /// Whether to fall back to IP geolocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consider_ip: Option<bool>,
    /// Observed cell towers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_towers: Option<Vec<CellTower>>,
    /// Observed WiFi access points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wifi_access_points: Option<Vec<WifiAccessPoint>>,
}

impl GeolocationRequest {
    /// Builds the POST request.
    pub fn build(&self) -> Result<RequestMetadata> {
        let body =
            serde_json::to_value(self).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        Ok(RequestMetadata::new("/geolocation/v1/geolocate")
            .with_base_url(GEOLOCATION_BASE_URL)
            .key_only()
            .with_extract(Extract::Geolocation)
            .with_json(body))
    }
}

impl Client {
    /// Runs a geolocation request, returning the whole body.
    ///
    /// A 404 (no location could be determined) is returned as a body, not an error.
    pub async fn geolocate(&self, request: &GeolocationRequest) -> Result<Value> {
        Ok(self.execute(request.build()?).await?.into_data())
    }
}
