//! Credentials and URL signing.
//!
//! A client authenticates either with an API key (`key=` query parameter) or
//! with enterprise credentials: a client id plus a base64 encoded secret used
//! to sign every request with HMAC-SHA1. Both may be configured at once, in
//! which case endpoints that accept enterprise credentials are signed and the
//! rest fall back to the key.

use crate::{Error, Result};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::fmt;

type HmacSha1 = Hmac<Sha1>;

/// Prefix every valid API key starts with.
const API_KEY_PREFIX: &str = "AIza";

/// Secrets are handed out URL-safe encoded, with or without padding.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Validated credentials for a client.
#[derive(Clone)]
pub(crate) struct Credentials {
    key: Option<String>,
    enterprise: Option<Enterprise>,
    channel: Option<String>,
}

#[derive(Clone)]
struct Enterprise {
    client_id: String,
    mac: HmacSha1,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field(
                "client_id",
                &self.enterprise.as_ref().map(|e| e.client_id.as_str()),
            )
            .field("channel", &self.channel)
            .finish()
    }
}

impl Credentials {
    /// Validates and stores the configured credentials.
    ///
    /// Fails when neither a key nor a complete client id/secret pair is given,
    /// when the key has the wrong prefix, when the secret is not valid base64,
    /// or when the channel contains characters outside `[A-Za-z0-9._-]`.
    pub(crate) fn new(
        key: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
        channel: Option<String>,
    ) -> Result<Self> {
        let key = key.filter(|k| !k.is_empty());
        let client_id = client_id.filter(|c| !c.is_empty());
        let client_secret = client_secret.filter(|s| !s.is_empty());
        let channel = channel.filter(|c| !c.is_empty());

        let enterprise = match (client_id, client_secret) {
            (Some(client_id), Some(secret)) => Some(Enterprise {
                client_id,
                mac: keyed_mac(&secret)?,
            }),
            _ => None,
        };

        if key.is_none() && enterprise.is_none() {
            return Err(Error::ConfigurationError(
                "Must provide API key or enterprise credentials when creating client".to_string(),
            ));
        }

        if let Some(key) = &key {
            if !key.starts_with(API_KEY_PREFIX) {
                return Err(Error::ConfigurationError(
                    "Invalid API key provided".to_string(),
                ));
            }
        }

        if let Some(channel) = &channel {
            let valid = channel
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
            if !valid {
                return Err(Error::ConfigurationError(format!(
                    "Invalid channel {channel:?}: only ASCII letters, digits, '.', '_' and '-' are allowed"
                )));
            }
        }

        Ok(Self {
            key,
            enterprise,
            channel,
        })
    }

    /// Returns `true` if requests to enterprise-capable endpoints will be signed.
    pub(crate) fn is_enterprise(&self) -> bool {
        self.enterprise.is_some()
    }

    /// Builds the path and query string to send, adding credentials.
    ///
    /// `params` must already be in their final order. In enterprise mode the
    /// channel and client id are appended, the whole path and query is signed
    /// and `&signature=` is added last.
    pub(crate) fn authorize(
        &self,
        path: &str,
        mut params: Vec<(String, String)>,
        accepts_client_id: bool,
    ) -> Result<String> {
        if accepts_client_id {
            if let Some(enterprise) = &self.enterprise {
                if let Some(channel) = &self.channel {
                    params.push(("channel".to_string(), channel.clone()));
                }
                params.push(("client".to_string(), enterprise.client_id.clone()));

                let unsigned = format!("{path}?{}", urlencode_params(&params));
                let signature = sign(enterprise.mac.clone(), &unsigned);
                return Ok(format!("{unsigned}&signature={signature}"));
            }
        }

        if let Some(key) = &self.key {
            params.push(("key".to_string(), key.clone()));
            return Ok(format!("{path}?{}", urlencode_params(&params)));
        }

        Err(Error::ConfigurationError(
            "Must provide API key for this API. It does not accept enterprise credentials"
                .to_string(),
        ))
    }
}

fn keyed_mac(secret: &str) -> Result<HmacSha1> {
    let key = SECRET_ENGINE
        .decode(secret.as_bytes())
        .map_err(|e| Error::ConfigurationError(format!("Invalid client secret: {e}")))?;
    HmacSha1::new_from_slice(&key)
        .map_err(|e| Error::ConfigurationError(format!("Invalid client secret: {e}")))
}

fn sign(mut mac: HmacSha1, payload: &str) -> String {
    mac.update(payload.as_bytes());
    URL_SAFE.encode(mac.finalize().into_bytes())
}

/// Returns the URL-safe base64 HMAC-SHA1 signature of `payload`.
///
/// `secret` is the base64 (URL-safe alphabet) encoded signing key.
///
/// # Examples
///
/// ```
/// let signature = mapcall::auth::sign_hmac(
///     "a2V5",
///     "The quick brown fox jumps over the lazy dog",
/// )?;
/// assert_eq!(signature, "3nybhbi3iqa8ino29wqQcBydtNk=");
/// # Ok::<(), mapcall::Error>(())
/// ```
pub fn sign_hmac(secret: &str, payload: &str) -> Result<String> {
    Ok(sign(keyed_mac(secret)?, payload))
}

/// Form-encodes an ordered list of query parameters.
///
/// Spaces become `+`; only `A-Z a-z 0-9 - . _ ~` are left unescaped, so the
/// string the server sees is byte-for-byte the string that was signed.
///
/// # Examples
///
/// ```
/// let encoded = mapcall::auth::urlencode_params(&[
///     ("address".to_string(), "=Sydney ~".to_string()),
/// ]);
/// assert_eq!(encoded, "address=%3DSydney+~");
/// ```
pub fn urlencode_params(params: &[(String, String)]) -> String {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    // form_urlencoded escapes '~' and leaves '*' bare; the signed form is the other way round.
    encoded.replace('*', "%2A").replace("%7E", "~")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_hmac_known_vector() {
        let signature =
            sign_hmac("a2V5", "The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(signature, "3nybhbi3iqa8ino29wqQcBydtNk=");
    }

    #[test]
    fn test_urlencode_unreserved() {
        assert_eq!(
            urlencode_params(&params(&[("address", "=Sydney ~")])),
            "address=%3DSydney+~"
        );
        assert_eq!(
            urlencode_params(&params(&[("q", "a*b|c,d")])),
            "q=a%2Ab%7Cc%2Cd"
        );
        assert_eq!(urlencode_params(&[]), "");
    }

    #[test]
    fn test_key_appended_last() {
        let creds = Credentials::new(Some("AIzaasdf".into()), None, None, None).unwrap();
        let url = creds
            .authorize("/maps/api/geocode/json", params(&[("address", "Sesame St.")]), true)
            .unwrap();
        assert_eq!(url, "/maps/api/geocode/json?address=Sesame+St.&key=AIzaasdf");
    }

    #[test]
    fn test_signed_url() {
        let creds =
            Credentials::new(None, Some("foo".into()), Some("a2V5".into()), None).unwrap();
        let url = creds
            .authorize("/maps/api/geocode/json", params(&[("address", "Sesame St.")]), true)
            .unwrap();
        assert_eq!(
            url,
            "/maps/api/geocode/json?address=Sesame+St.&client=foo&signature=fxbWUIcNPZSekVOhp2ul9LW5TpY="
        );
    }

    #[test]
    fn test_signed_url_with_channel_and_key_fallback() {
        let creds = Credentials::new(
            Some("AIzaasdf".into()),
            Some("foo".into()),
            Some("a2V5".into()),
            Some("MyChannel_1".into()),
        )
        .unwrap();

        let signed = creds
            .authorize("/test", params(&[("param", "param")]), true)
            .unwrap();
        assert_eq!(
            signed,
            "/test?param=param&channel=MyChannel_1&client=foo&signature=OH18GuQto_mEpxj99UimKskvo4k="
        );

        let keyed = creds
            .authorize("/test", params(&[("param", "param")]), false)
            .unwrap();
        assert_eq!(keyed, "/test?param=param&key=AIzaasdf");
    }

    #[test]
    fn test_signature_is_deterministic() {
        let creds =
            Credentials::new(None, Some("foo".into()), Some("a2V5".into()), None).unwrap();
        let p = params(&[("address", "Sydney"), ("language", "en")]);
        let first = creds.authorize("/x", p.clone(), true).unwrap();
        let second = creds.authorize("/x", p, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_enterprise_only_rejects_key_only_endpoint() {
        let creds =
            Credentials::new(None, Some("foo".into()), Some("a2V5".into()), None).unwrap();
        let err = creds.authorize("/v1/snapToRoads", vec![], false).unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_missing_credentials() {
        let err = Credentials::new(None, None, None, None).unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));

        // A client id without a secret is not a credential.
        let err = Credentials::new(None, Some("foo".into()), None, None).unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_invalid_key_prefix() {
        let err = Credentials::new(Some("Invalid key.".into()), None, None, None).unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_invalid_channel() {
        let err = Credentials::new(
            None,
            Some("foo".into()),
            Some("a2V5".into()),
            Some("auieauie$? ".into()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_malformed_secret() {
        let err =
            Credentials::new(None, Some("foo".into()), Some("not base64!".into()), None)
                .unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let creds = Credentials::new(Some("AIzasecret".into()), None, None, None).unwrap();
        let debug = format!("{creds:?}");
        assert!(!debug.contains("AIzasecret"));
        assert!(!creds.is_enterprise());
    }
}
