//! Response classification.
//!
//! Every response that reaches extraction is turned into an [`Outcome`]: a
//! decoded success, a quota signal (retried unless disabled), or a fatal
//! error. The executor treats every strategy the same way, so endpoints with
//! unusual error envelopes still retry and fail uniformly.

use crate::response::ByteStream;
use crate::Error;
use http::StatusCode;
use serde_json::Value;
use std::future::Future;

/// How a JSON response body is classified.
///
/// The default, [`Extract::Status`], reads the `status` field most web
/// services put in their envelope. The others cover services with a
/// different envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extract {
    /// `{"status": "OK" | "ZERO_RESULTS" | ...}` envelopes. Non-200 is an HTTP error.
    #[default]
    Status,
    /// `{"error": {"status", "message"}}` envelopes, where `RESOURCE_EXHAUSTED`
    /// is the quota signal and the envelope wins over the HTTP status.
    Roads,
    /// 200 and 404 are both answers; 403 is the quota signal and other codes
    /// carry their reason in `error.errors[0].reason`.
    Geolocation,
    /// Any JSON body is the answer, whatever the status.
    Passthrough,
}

/// The classification of one attempt.
#[derive(Debug)]
pub(crate) enum Outcome<T> {
    Success(T),
    /// Transient failure: a retriable status or a transport timeout.
    Retriable(Error),
    /// The service asked us to slow down.
    OverQueryLimit(Error),
    Fatal(Error),
}

impl<T> Outcome<T> {
    /// Classifies a transport failure; only timeouts are worth another attempt.
    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Outcome::Retriable(Error::Timeout)
        } else {
            Outcome::Fatal(Error::Transport(error))
        }
    }
}

/// Turns a received response into an [`Outcome`].
pub(crate) trait Extractor: Sync {
    type Output: Send;

    fn extract(
        &self,
        response: reqwest::Response,
    ) -> impl Future<Output = Outcome<Self::Output>> + Send;
}

impl Extractor for Extract {
    type Output = Value;

    fn extract(
        &self,
        response: reqwest::Response,
    ) -> impl Future<Output = Outcome<Value>> + Send {
        let strategy = *self;
        async move {
            let status = response.status();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => return Outcome::from_transport(e),
            };
            strategy.classify(status, body)
        }
    }
}

impl Extract {
    /// Classifies a fully read body.
    pub(crate) fn classify(self, status: StatusCode, body: String) -> Outcome<Value> {
        match self {
            Extract::Status => classify_status(status, body),
            Extract::Roads => classify_roads(status, body),
            Extract::Geolocation => classify_geolocation(status, body),
            Extract::Passthrough => match parse(status, body) {
                Ok(json) => Outcome::Success(json),
                Err(e) => Outcome::Fatal(e),
            },
        }
    }
}

/// Hands back the body unread, for images and other binary payloads.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawBytes;

impl Extractor for RawBytes {
    type Output = ByteStream;

    fn extract(
        &self,
        response: reqwest::Response,
    ) -> impl Future<Output = Outcome<ByteStream>> + Send {
        async move {
            let status = response.status();
            if status.is_success() {
                return Outcome::Success(ByteStream::new(response));
            }
            let raw_response = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Binary endpoint returned an error");
            Outcome::Fatal(Error::Http {
                status,
                raw_response,
            })
        }
    }
}

fn parse(status: StatusCode, body: String) -> Result<Value, Error> {
    serde_json::from_str(&body).map_err(|e| deserialization_failed(status, body, e.to_string()))
}

/// The one error kind for bodies that cannot be understood, whatever the strategy.
fn deserialization_failed(status: StatusCode, raw_response: String, serde_error: String) -> Error {
    tracing::error!(error = %serde_error, raw_response = %raw_response, "Failed to deserialize response");
    Error::DeserializationFailed {
        serde_error,
        raw_response,
        status,
    }
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

fn classify_status(status: StatusCode, body: String) -> Outcome<Value> {
    if status != StatusCode::OK {
        return Outcome::Fatal(Error::Http {
            status,
            raw_response: body,
        });
    }

    let json = match parse(status, body) {
        Ok(json) => json,
        Err(e) => return Outcome::Fatal(e),
    };

    let message = string_field(&json, "error_message");
    match json.get("status").and_then(Value::as_str) {
        Some("OK") | Some("ZERO_RESULTS") => Outcome::Success(json),
        Some(api_status @ "OVER_QUERY_LIMIT") => Outcome::OverQueryLimit(Error::OverQueryLimit {
            status: api_status.to_string(),
            message,
        }),
        Some(api_status) => Outcome::Fatal(Error::Api {
            status: api_status.to_string(),
            message,
        }),
        None => Outcome::Fatal(deserialization_failed(
            status,
            json.to_string(),
            "missing field `status`".to_string(),
        )),
    }
}

fn classify_roads(status: StatusCode, body: String) -> Outcome<Value> {
    let json: Value = match serde_json::from_str(&body) {
        Ok(json) => json,
        Err(_) if status != StatusCode::OK => {
            return Outcome::Fatal(Error::Http {
                status,
                raw_response: body,
            })
        }
        Err(e) => return Outcome::Fatal(deserialization_failed(status, body, e.to_string())),
    };

    if let Some(error) = json.get("error") {
        let api_status =
            string_field(error, "status").unwrap_or_else(|| status.as_u16().to_string());
        let message = string_field(error, "message");
        if api_status == "RESOURCE_EXHAUSTED" {
            return Outcome::OverQueryLimit(Error::OverQueryLimit {
                status: api_status,
                message,
            });
        }
        return Outcome::Fatal(Error::Api {
            status: api_status,
            message,
        });
    }

    if status != StatusCode::OK {
        return Outcome::Fatal(Error::Http {
            status,
            raw_response: body,
        });
    }

    Outcome::Success(json)
}

fn classify_geolocation(status: StatusCode, body: String) -> Outcome<Value> {
    let json = match parse(status, body) {
        Ok(json) => json,
        Err(e) => return Outcome::Fatal(e),
    };

    if matches!(status.as_u16(), 200 | 404) {
        return Outcome::Success(json);
    }

    let reason = json
        .pointer("/error/errors/0/reason")
        .and_then(Value::as_str)
        .map(str::to_string);
    let code = status.as_u16().to_string();

    if status == StatusCode::FORBIDDEN {
        Outcome::OverQueryLimit(Error::OverQueryLimit {
            status: code,
            message: reason,
        })
    } else {
        Outcome::Fatal(Error::Api {
            status: code,
            message: reason,
        })
    }
}
