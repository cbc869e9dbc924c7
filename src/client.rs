//! The request executor.
//!
//! The [`Client`] type turns a [`RequestMetadata`] into an authenticated URL,
//! sends it, paces completed calls to the configured queries-per-second
//! ceiling, retries transient failures until the retry timeout, and classifies
//! the final response. Use [`ClientBuilder`] to configure and create clients.

use crate::{
    auth::Credentials,
    error::is_retriable_status,
    extract::{Extractor, Outcome, RawBytes},
    metadata::RequestMetadata,
    rate_limit::RateLimiter,
    response::ByteStream,
    retry::{Backoff, RetryState},
    Error, Response, Result,
};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use url::Url;

/// The host most web services are served from.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

const EXPERIENCE_ID_HEADER: &str = "x-goog-maps-experience-id";
const USER_AGENT: &str = concat!("mapcall/", env!("CARGO_PKG_VERSION"));

/// A client for the Maps web services.
///
/// Cloning is cheap and clones share the rate-limit window, so one client
/// (or its clones) should be used per quota.
///
/// # Examples
///
/// ```no_run
/// use mapcall::Client;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), mapcall::Error> {
/// let client = Client::builder()
///     .key("AIza-your-key")
///     .queries_per_second(10)
///     .retry_timeout(Duration::from_secs(30))
///     .build()?;
///
/// let results = client.geocode_address("1600 Amphitheatre Parkway, Mountain View").await?;
/// println!("{}", results[0]["formatted_address"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    default_headers: HeaderMap,
    experience_id: RwLock<Option<HeaderValue>>,
    retry_timeout: Duration,
    retry_over_query_limit: bool,
    backoff: Backoff,
    rate_limiter: RateLimiter,
}

/// Result of a single attempt.
enum Step<T> {
    Done(Result<Response<T>>),
    Retry(Error),
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Runs a JSON request, classifying the body with its [`Extract`](crate::Extract) strategy.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mapcall::{Client, metadata::RequestMetadata};
    ///
    /// # async fn example() -> Result<(), mapcall::Error> {
    /// let client = Client::builder().key("AIza-your-key").build()?;
    ///
    /// let request = RequestMetadata::new("/maps/api/geocode/json")
    ///     .with_param("address", "Sesame St.")
    ///     .with_extra_params([("region", "us")]);
    ///
    /// let response = client.execute(request).await?;
    /// println!("{} attempts", response.attempts);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute(&self, metadata: RequestMetadata) -> Result<Response<Value>> {
        let extract = metadata.extract;
        self.run(&metadata, &extract).await
    }

    /// Runs a request whose body is binary, returning it unread.
    ///
    /// The status-field classification is skipped entirely; any 2xx response
    /// is a success.
    pub async fn execute_raw(&self, metadata: RequestMetadata) -> Result<Response<ByteStream>> {
        self.run(&metadata, &RawBytes).await
    }

    /// Returns the experience id header value sent with every request, if set.
    pub fn experience_id(&self) -> Option<String> {
        self.read_experience_id()
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Sets the experience id(s) sent with subsequent requests.
    ///
    /// Several ids are sent comma separated. An empty list clears the header.
    ///
    /// # Errors
    ///
    /// Returns an error if the ids are not valid header characters.
    pub fn set_experience_id<I, S>(&self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let value = experience_header(ids)?;
        *self.write_experience_id() = value;
        Ok(())
    }

    /// Stops sending the experience id header.
    pub fn clear_experience_id(&self) {
        *self.write_experience_id() = None;
    }

    fn read_experience_id(&self) -> std::sync::RwLockReadGuard<'_, Option<HeaderValue>> {
        self.inner
            .experience_id
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_experience_id(&self) -> std::sync::RwLockWriteGuard<'_, Option<HeaderValue>> {
        self.inner
            .experience_id
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drives one logical call through as many attempts as it takes.
    async fn run<E>(&self, metadata: &RequestMetadata, extractor: &E) -> Result<Response<E::Output>>
    where
        E: Extractor,
    {
        let base_url = metadata
            .base_url
            .as_deref()
            .unwrap_or(&self.inner.base_url)
            .trim_end_matches('/');
        let authed = self.inner.credentials.authorize(
            &metadata.path,
            metadata.query_params(),
            metadata.accepts_client_id,
        )?;
        let url = Url::parse(&format!("{base_url}{authed}"))?;
        let headers = self.request_headers();

        let mut retry = RetryState::new(self.inner.retry_timeout);
        loop {
            let delay = retry.begin_attempt(&self.inner.backoff)?;
            if !delay.is_zero() {
                tracing::info!(
                    delay_ms = delay.as_millis(),
                    attempt = retry.attempts(),
                    "Retrying request after delay"
                );
                tokio::time::sleep(delay).await;
            }

            match self
                .attempt(&url, &headers, metadata, extractor, &retry)
                .await
            {
                Step::Done(result) => return result,
                Step::Retry(error) => {
                    tracing::warn!(
                        error = %error,
                        attempt = retry.attempts(),
                        path = %metadata.path,
                        "Request failed"
                    );
                    retry.retry(error);
                }
            }
        }
    }

    /// Sends once and decides whether the call is finished.
    async fn attempt<E>(
        &self,
        url: &Url,
        headers: &HeaderMap,
        metadata: &RequestMetadata,
        extractor: &E,
        retry: &RetryState,
    ) -> Step<E::Output>
    where
        E: Extractor,
    {
        let attempt = retry.attempts();
        let method = if metadata.post_json.is_some() {
            "POST"
        } else {
            "GET"
        };
        tracing::debug!(
            method = method,
            host = url.host_str().unwrap_or_default(),
            path = %metadata.path,
            attempt = attempt,
            "Executing HTTP request"
        );

        let response = match self.send(url, headers, metadata.post_json.as_ref()).await {
            Ok(response) => response,
            Err(e) => match Outcome::<Infallible>::from_transport(e) {
                Outcome::Success(never) => match never {},
                Outcome::Retriable(error) => return Step::Retry(error),
                Outcome::OverQueryLimit(error) | Outcome::Fatal(error) => {
                    tracing::error!(error = %error, path = %metadata.path, "Transport error");
                    return Step::Done(Err(error));
                }
            },
        };

        let status = response.status();
        if is_retriable_status(status) {
            let raw_response = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), attempt = attempt, "Server error (5xx)");
            return Step::Retry(Error::Http {
                status,
                raw_response,
            });
        }

        // Only responses that can end the call are paced.
        let slot = self.inner.rate_limiter.acquire().await;

        let response_headers = response.headers().clone();
        tracing::info!(
            status = status.as_u16(),
            latency_ms = retry.elapsed().as_millis(),
            attempt = attempt,
            "Received HTTP response"
        );

        match extractor.extract(response).await {
            Outcome::Success(data) => {
                slot.commit();
                Step::Done(Ok(Response::new(
                    data,
                    status,
                    response_headers,
                    retry.elapsed(),
                    attempt,
                )))
            }
            Outcome::OverQueryLimit(e) if self.inner.retry_over_query_limit => Step::Retry(e),
            Outcome::Retriable(e) => Step::Retry(e),
            Outcome::OverQueryLimit(e) => {
                slot.commit();
                tracing::error!(error = %e, status = status.as_u16(), "Quota exceeded");
                Step::Done(Err(e))
            }
            Outcome::Fatal(e) => {
                tracing::error!(error = %e, status = status.as_u16(), "Request rejected");
                Step::Done(Err(e))
            }
        }
    }

    async fn send(
        &self,
        url: &Url,
        headers: &HeaderMap,
        body: Option<&Value>,
    ) -> reqwest::Result<reqwest::Response> {
        let request = match body {
            Some(json) => self.inner.http_client.post(url.clone()).json(json),
            None => self.inner.http_client.get(url.clone()),
        };
        request.headers(headers.clone()).send().await
    }

    fn request_headers(&self) -> HeaderMap {
        let mut headers = self.inner.default_headers.clone();
        if let Some(experience_id) = self.read_experience_id().clone() {
            headers.insert(EXPERIENCE_ID_HEADER, experience_id);
        }
        headers
    }
}

fn experience_header<I, S>(ids: I) -> Result<Option<HeaderValue>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = ids
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",");
    if joined.is_empty() {
        return Ok(None);
    }
    HeaderValue::from_str(&joined)
        .map(Some)
        .map_err(|e| Error::ConfigurationError(format!("Invalid experience id: {e}")))
}

/// Builder for configuring and creating a [`Client`].
///
/// Exactly one of [`key`](ClientBuilder::key) or
/// [`client_id`](ClientBuilder::client_id) is normally set. Setting both is
/// allowed: endpoints that accept enterprise credentials are signed, the rest
/// use the key.
///
/// # Examples
///
/// ```no_run
/// use mapcall::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), mapcall::Error> {
/// let client = ClientBuilder::new()
///     .client_id("gme-example", "dGhpcyBpcyBub3QgYSByZWFsIHNlY3JldA==")
///     .channel("checkout")
///     .connect_timeout(Duration::from_secs(5))
///     .read_timeout(Duration::from_secs(20))
///     .retry_over_query_limit(false)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    key: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    channel: Option<String>,
    base_url: String,
    default_headers: HeaderMap,
    experience_id: Vec<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    retry_timeout: Duration,
    queries_per_second: usize,
    retry_over_query_limit: bool,
    backoff: Backoff,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            key: None,
            client_id: None,
            client_secret: None,
            channel: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_headers: HeaderMap::new(),
            experience_id: Vec::new(),
            timeout: None,
            connect_timeout: None,
            read_timeout: None,
            retry_timeout: Duration::from_secs(60),
            queries_per_second: 50,
            retry_over_query_limit: true,
            backoff: Backoff::default(),
        }
    }

    /// Sets the API key. It must start with `AIza`.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets enterprise credentials: a client id and its base64 encoded signing secret.
    pub fn client_id(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets a channel, sent with signed requests for usage reporting.
    ///
    /// Only ASCII letters, digits, `.`, `_` and `-` are allowed.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Sets the base URL for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(url.as_ref())?;
        self.base_url = url.as_str().trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the experience id(s) sent in the `X-Goog-Maps-Experience-ID` header.
    pub fn experience_id<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.experience_id = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a combined connect and read timeout for each HTTP request.
    ///
    /// Cannot be combined with [`connect_timeout`](Self::connect_timeout) or
    /// [`read_timeout`](Self::read_timeout).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout for each HTTP request.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the read timeout for each HTTP request.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Sets how long a call may keep retrying transient failures. Defaults to 60 seconds.
    pub fn retry_timeout(mut self, timeout: Duration) -> Self {
        self.retry_timeout = timeout;
        self
    }

    /// Sets the queries-per-second ceiling. Defaults to 50; `0` disables pacing.
    pub fn queries_per_second(mut self, queries_per_second: usize) -> Self {
        self.queries_per_second = queries_per_second;
        self
    }

    /// Sets whether quota responses are retried. Defaults to `true`.
    ///
    /// When disabled, the first quota response fails the call with
    /// [`Error::OverQueryLimit`].
    pub fn retry_over_query_limit(mut self, retry: bool) -> Self {
        self.retry_over_query_limit = retry;
        self
    }

    /// Sets the delay schedule between retries.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] for missing or invalid
    /// credentials, an invalid channel, conflicting timeouts or an invalid
    /// experience id.
    pub fn build(self) -> Result<Client> {
        let credentials =
            Credentials::new(self.key, self.client_id, self.client_secret, self.channel)?;

        if self.timeout.is_some() && (self.connect_timeout.is_some() || self.read_timeout.is_some())
        {
            return Err(Error::ConfigurationError(
                "Specify either timeout, or connect_timeout and read_timeout".to_string(),
            ));
        }

        let mut http_client = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            http_client = http_client.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            http_client = http_client.connect_timeout(timeout);
        }
        if let Some(timeout) = self.read_timeout {
            http_client = http_client.read_timeout(timeout);
        }
        let http_client = http_client.build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        let experience_id = experience_header(&self.experience_id)?;

        tracing::debug!(
            base_url = %self.base_url,
            enterprise = credentials.is_enterprise(),
            queries_per_second = self.queries_per_second,
            retry_timeout_ms = self.retry_timeout.as_millis(),
            "Built client"
        );

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: self.base_url,
                credentials,
                default_headers: self.default_headers,
                experience_id: RwLock::new(experience_id),
                retry_timeout: self.retry_timeout,
                retry_over_query_limit: self.retry_over_query_limit,
                backoff: self.backoff,
                rate_limiter: RateLimiter::new(self.queries_per_second),
            }),
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("client_id", &self.client_id)
            .field("channel", &self.channel)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("retry_timeout", &self.retry_timeout)
            .field("queries_per_second", &self.queries_per_second)
            .field("retry_over_query_limit", &self.retry_over_query_limit)
            .finish_non_exhaustive()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
