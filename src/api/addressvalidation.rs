//! Address validation.

use super::ADDRESS_VALIDATION_BASE_URL;
use crate::metadata::RequestMetadata;
use crate::{Client, Error, Extract, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostalAddress<'a> {
    address_lines: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    region_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locality: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateAddressBody<'a> {
    address: PostalAddress<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_usps_cass: Option<bool>,
}

/// An address validation request.
///
/// The service's answer, whatever its HTTP status, is handed back as JSON.
#[derive(Debug, Clone, Default)]
pub struct AddressValidationRequest {
    /// The address, one line per entry.
    pub address_lines: Vec<String>,
    /// CLDR region code of the address.
    pub region_code: Option<String>,
    /// City or town, when it is not part of the lines.
    pub locality: Option<String>,
    /// Whether to run USPS CASS processing.
    pub enable_usps_cass: Option<bool>,
}

impl AddressValidationRequest {
    /// Validates the given address lines.
    pub fn new<I, S>(address_lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            address_lines: address_lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// CLDR region code, such as `US`.
    pub fn region_code(mut self, region_code: impl Into<String>) -> Self {
        self.region_code = Some(region_code.into());
        self
    }

    /// City or town of the address.
    pub fn locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = Some(locality.into());
        self
    }

    /// Enables USPS CASS processing (US addresses only).
    pub fn enable_usps_cass(mut self, enable: bool) -> Self {
        self.enable_usps_cass = Some(enable);
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when there are no address lines.
    pub fn build(&self) -> Result<RequestMetadata> {
        if self.address_lines.is_empty() {
            return Err(Error::InvalidArgument(
                "At least one address line is required".to_string(),
            ));
        }
        let body = ValidateAddressBody {
            address: PostalAddress {
                address_lines: &self.address_lines,
                region_code: self.region_code.as_deref(),
                locality: self.locality.as_deref(),
            },
            enable_usps_cass: self.enable_usps_cass,
        };
        let body =
            serde_json::to_value(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;

        Ok(RequestMetadata::new("/v1:validateAddress")
            .with_base_url(ADDRESS_VALIDATION_BASE_URL)
            .key_only()
            .with_extract(Extract::Passthrough)
            .with_json(body))
    }
}

impl Client {
    /// Validates an address, returning the whole body.
    pub async fn validate_address(&self, request: &AddressValidationRequest) -> Result<Value> {
        Ok(self.execute(request.build()?).await?.into_data())
    }
}
