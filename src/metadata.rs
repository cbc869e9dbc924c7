//! Per-call request description.

use crate::extract::Extract;
use serde_json::Value;

/// Everything the executor needs to know about one logical call.
///
/// Endpoint builders produce one of these; [`Client::execute`](crate::Client::execute)
/// and [`Client::execute_raw`](crate::Client::execute_raw) run it. Nothing on it
/// outlives the call, including [`extra_params`](RequestMetadata::with_extra_params).
///
/// # Examples
///
/// ```
/// use mapcall::metadata::RequestMetadata;
///
/// let request = RequestMetadata::new("/maps/api/geocode/json")
///     .with_param("address", "Sesame St.")
///     .with_extra_params([("foo", "bar")]);
///
/// assert_eq!(
///     request.query_params(),
///     vec![
///         ("address".to_string(), "Sesame St.".to_string()),
///         ("foo".to_string(), "bar".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The request path, starting with a slash.
    pub path: String,

    /// Query parameters in insertion order. Keys may repeat.
    pub params: Vec<(String, String)>,

    /// Overrides the client's base URL for this call.
    pub base_url: Option<String>,

    /// Whether the endpoint accepts enterprise (client id + signature) credentials.
    pub accepts_client_id: bool,

    /// How a successful response body is classified.
    pub extract: Extract,

    /// JSON body; when present the call is a POST.
    pub post_json: Option<Value>,

    /// Caller supplied parameters merged in for this call only.
    pub extra_params: Vec<(String, String)>,
}

impl RequestMetadata {
    /// Creates a GET request for `path` with the default extraction strategy.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            base_url: None,
            accepts_client_id: true,
            extract: Extract::Status,
            post_json: None,
            extra_params: Vec::new(),
        }
    }

    /// Adds a query parameter. Repeating a key sends it several times.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Adds a query parameter if `value` is `Some`.
    pub fn with_optional_param<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_param(key, value),
            None => self,
        }
    }

    /// Sends this request to a different host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Marks the endpoint as accepting API keys only.
    pub fn key_only(mut self) -> Self {
        self.accepts_client_id = false;
        self
    }

    /// Sets the extraction strategy.
    pub fn with_extract(mut self, extract: Extract) -> Self {
        self.extract = extract;
        self
    }

    /// Turns the request into a POST with a JSON body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.post_json = Some(body);
        self
    }

    /// Adds parameters for this call only.
    ///
    /// They are merged with the endpoint's own parameters; on a key clash the
    /// endpoint's value wins.
    pub fn with_extra_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.extra_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The final, deterministic parameter list.
    ///
    /// Extra params whose key the endpoint also sets are dropped, then the
    /// whole list is stably sorted by key so repeated keys keep their order.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = self
            .extra_params
            .iter()
            .filter(|(key, _)| !self.params.iter().any(|(k, _)| k == key))
            .cloned()
            .collect();
        merged.extend(self.params.iter().cloned());
        merged.sort_by(|a, b| a.0.cmp(&b.0));
        merged
    }
}
