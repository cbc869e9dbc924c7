//! Error types for Maps web service calls.
//!
//! Every call either yields a decoded result or exactly one [`Error`]. Retries are
//! invisible to the caller apart from elapsed time, so a transient failure only
//! ever surfaces once the overall retry deadline has passed.

use http::StatusCode;
use std::time::Duration;

/// The main error type for Maps web service calls.
///
/// # Examples
///
/// ```no_run
/// use mapcall::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().key("AIza-your-key").build()?;
///
/// match client.geocode_address("1600 Amphitheatre Parkway").await {
///     Ok(results) => println!("{} results", results.len()),
///     Err(Error::Api { status, message }) => {
///         eprintln!("service rejected the request: {status} {message:?}");
///     }
///     Err(Error::TimeoutExceeded { attempts, .. }) => {
///         eprintln!("gave up after {attempts} attempts");
///     }
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The client or a request was configured incorrectly.
    ///
    /// Raised for missing or malformed credentials, conflicting timeout options,
    /// an invalid channel, or an enterprise-only client calling an endpoint that
    /// only accepts API keys. Never retried.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An endpoint builder rejected its arguments before anything was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A connection-level failure (DNS lookup, connect, TLS, broken socket).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The transport timed out waiting for the server.
    ///
    /// Treated as transient and retried until the overall retry deadline.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-200 status and no recognized error envelope.
    #[error("HTTP error {status}: {raw_response}")]
    Http {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
    },

    /// The service reported a fatal status in its response envelope.
    ///
    /// `status` is the service status string (for example `INVALID_REQUEST`,
    /// `NOT_FOUND` or `REQUEST_DENIED`), or the HTTP code for envelopes that
    /// only carry a reason.
    #[error("API error {status}{}", detail(.message))]
    Api {
        /// The service status string
        status: String,
        /// Optional human readable message from the service
        message: Option<String>,
    },

    /// The service signalled that the query quota was exceeded.
    ///
    /// Only surfaces when quota retries have been disabled with
    /// [`ClientBuilder::retry_over_query_limit`](crate::ClientBuilder::retry_over_query_limit).
    #[error("Over query limit {status}{}", detail(.message))]
    OverQueryLimit {
        /// The service status string
        status: String,
        /// Optional human readable message from the service
        message: Option<String>,
    },

    /// The body could not be decoded as the expected JSON.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The overall retry deadline passed while the call was still failing transiently.
    #[error("Retry timeout exceeded after {attempts} attempts in {elapsed:?}{}", cause(.last_error))]
    TimeoutExceeded {
        /// The number of attempts that were performed
        attempts: usize,
        /// Time elapsed since the first attempt
        elapsed: Duration,
        /// The last transient error seen, if any attempt ran
        last_error: Option<Box<Error>>,
    },

    /// Failed to serialize a JSON request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this error is transient and the call may be retried.
    ///
    /// Transport timeouts, the 500/503/504 statuses and quota signals are
    /// retryable. Everything else is the server or the client saying no.
    ///
    /// # Examples
    ///
    /// ```
    /// use mapcall::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::Http {
    ///     status: StatusCode::SERVICE_UNAVAILABLE,
    ///     raw_response: String::new(),
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::Http {
    ///     status: StatusCode::NOT_FOUND,
    ///     raw_response: String::new(),
    /// };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout => true,
            Error::Http { status, .. } => is_retriable_status(*status),
            Error::OverQueryLimit { .. } => true,
            Error::ConfigurationError(_)
            | Error::InvalidArgument(_)
            | Error::Transport(_)
            | Error::Api { .. }
            | Error::DeserializationFailed { .. }
            | Error::TimeoutExceeded { .. }
            | Error::SerializationFailed(_)
            | Error::InvalidUrl(_) => false,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Http { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the service status string for envelope errors.
    pub fn api_status(&self) -> Option<&str> {
        match self {
            Error::Api { status, .. } | Error::OverQueryLimit { status, .. } => Some(status),
            _ => None,
        }
    }
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({m})"))
        .unwrap_or_default()
}

fn cause(last_error: &Option<Box<Error>>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(": {e}"))
        .unwrap_or_default()
}

/// Statuses the service uses for transient failures.
pub(crate) fn is_retriable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 503 | 504)
}

/// A specialized `Result` type for Maps web service calls.
pub type Result<T> = std::result::Result<T, Error>;
