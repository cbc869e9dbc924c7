//! Response wrapper that keeps call metadata next to the extracted value.
//!
//! The [`Response`] type carries the decoded body along with the final HTTP
//! status, headers, total latency and the number of attempts the call took.
//! Binary endpoints hand back a [`ByteStream`] instead of decoded JSON.

use crate::Result;
use bytes::Bytes;
use futures::Stream;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful call.
///
/// # Examples
///
/// ```no_run
/// use mapcall::{Client, metadata::RequestMetadata};
///
/// # async fn example() -> Result<(), mapcall::Error> {
/// let client = Client::builder().key("AIza-your-key").build()?;
///
/// let response = client
///     .execute(RequestMetadata::new("/maps/api/geocode/json").with_param("address", "Sydney"))
///     .await?;
///
/// println!("status field: {}", response.data["status"]);
/// println!("took {:?} over {} attempts", response.latency, response.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The extracted response data.
    pub data: T,

    /// The HTTP status code of the final response.
    pub status: StatusCode,

    /// The headers of the final response.
    pub headers: HeaderMap,

    /// Time from the first attempt until the final response was extracted,
    /// including backoff and pacing sleeps.
    pub latency: Duration,

    /// The number of attempts made. `1` when the first attempt succeeded.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Maps the response data, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mapcall::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     42,
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    ///     1,
    /// );
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Returns `true` if the call needed more than one attempt.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Consumes the response, returning the data.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// A lazily read binary body, such as a place photo or a static map image.
///
/// Nothing past the headers has been downloaded when this is handed out.
/// Read it chunk by chunk, as a [`Stream`], or all at once.
///
/// # Examples
///
/// ```no_run
/// use mapcall::{Client, api::places::PhotoRequest};
///
/// # async fn example() -> Result<(), mapcall::Error> {
/// let client = Client::builder().key("AIza-your-key").build()?;
/// let mut photo = client
///     .places_photo(&PhotoRequest::new("photo-reference").max_width(400))
///     .await?;
///
/// let mut size = 0;
/// while let Some(chunk) = photo.chunk().await? {
///     size += chunk.len();
/// }
/// println!("downloaded {size} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ByteStream {
    response: reqwest::Response,
}

impl ByteStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// The `Content-Type` of the body, if the server sent one.
    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(http::header::CONTENT_TYPE)?
            .to_str()
            .ok()
    }

    /// Reads the next chunk, or `None` once the body is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.response.chunk().await?)
    }

    /// Reads the rest of the body into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.response.bytes().await?)
    }

    /// Turns the body into a stream of chunks. The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send {
        futures::stream::unfold(Some(self), |state| async move {
            let mut body = state?;
            match body.chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), Some(body))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
