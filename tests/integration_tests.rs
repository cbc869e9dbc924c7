//! Integration tests using wiremock to simulate the web services.

use mapcall::api::addressvalidation::AddressValidationRequest;
use mapcall::api::geocoding::GeocodeRequest;
use mapcall::api::geolocation::GeolocationRequest;
use mapcall::api::places::{AutocompleteRequest, PhotoRequest};
use mapcall::api::roads;
use mapcall::convert::Location;
use mapcall::metadata::RequestMetadata;
use mapcall::{Backoff, Client, ClientBuilder, Error, Extract};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEOCODE_PATH: &str = "/maps/api/geocode/json";

fn fast_backoff() -> Backoff {
    Backoff {
        initial_delay: Duration::from_millis(10),
        multiplier: 1.5,
        jitter: false,
    }
}

fn builder(server: &MockServer) -> ClientBuilder {
    Client::builder()
        .base_url(server.uri())
        .unwrap()
        .key("AIzaasdf")
        .backoff(fast_backoff())
}

fn ok_body() -> serde_json::Value {
    json!({"status": "OK", "results": [{"formatted_address": "Sydney NSW, Australia"}]})
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_key_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .and(query_param("key", "AIzaasdf"))
        .and(query_param("address", "Sydney"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let results = client.geocode_address("Sydney").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["formatted_address"], "Sydney NSW, Australia");
}

#[tokio::test]
async fn test_zero_results_is_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ZERO_RESULTS", "results": []})),
        )
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let results = client.geocode_address("nowhere").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_signed_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .client_id("foo", "a2V5")
        .build()
        .unwrap();

    client.geocode_address("Sesame St.").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("address=Sesame+St.&client=foo&signature=fxbWUIcNPZSekVOhp2ul9LW5TpY=")
    );
}

#[tokio::test]
async fn test_key_used_where_enterprise_is_not_accepted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/nearestRoads"))
        .and(query_param("key", "AIzaasdf"))
        .and(query_param_is_missing("client"))
        .and(query_param_is_missing("signature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"snappedPoints": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server)
        .client_id("foo", "a2V5")
        .build()
        .unwrap();

    let request = roads::nearest_roads(&[Location::from((60.17, 24.94))])
        .unwrap()
        .with_base_url(mock_server.uri());
    client.execute(request).await.unwrap();
}

#[tokio::test]
async fn test_enterprise_only_on_key_only_endpoint() {
    let mock_server = MockServer::start().await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .client_id("foo", "a2V5")
        .build()
        .unwrap();

    let request = roads::speed_limits(&["id"])
        .unwrap()
        .with_base_url(mock_server.uri());
    let err = client.execute(request).await.unwrap_err();

    assert!(matches!(err, Error::ConfigurationError(_)));
    assert_eq!(request_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_extra_params_are_call_scoped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();

    let request = GeocodeRequest::address("Sydney")
        .build()
        .with_extra_params([("foo", "bar")]);
    client.execute(request).await.unwrap();
    client.geocode_address("Sydney").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("address=Sydney&foo=bar&key=AIzaasdf")
    );
    assert_eq!(requests[1].url.query(), Some("address=Sydney&key=AIzaasdf"));
}

#[tokio::test]
async fn test_retry_on_5xx() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    // First two requests fail with 500, third succeeds
    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(move |_req: &wiremock::Request| {
            let count = attempt_count_clone.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                ResponseTemplate::new(500).set_body_string("Server error")
            } else {
                ResponseTemplate::new(200).set_body_json(ok_body())
            }
        })
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let start = Instant::now();
    let response = client
        .execute(GeocodeRequest::address("Sydney").build())
        .await
        .unwrap();

    assert_eq!(response.attempts, 3);
    assert!(response.was_retried());
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);

    // Two backoff sleeps of 10ms and 15ms.
    assert!(start.elapsed() >= Duration::from_millis(25));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|request| request.url == requests[0].url));
    assert_eq!(
        requests[0].url.query(),
        Some("address=Sydney&key=AIzaasdf")
    );
}

#[tokio::test]
async fn test_non_retriable_status_fails_fast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let result = client.geocode_address("Sydney").await;

    match result {
        Err(Error::Http {
            status,
            raw_response,
        }) => {
            assert_eq!(status.as_u16(), 502);
            assert_eq!(raw_response, "Bad gateway");
        }
        _ => panic!("Expected Http error, got {:?}", result),
    }
}

#[tokio::test]
async fn test_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let err = client.geocode_address("Sydney").await.unwrap_err();

    assert_eq!(err.api_status(), Some("REQUEST_DENIED"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let result = client.geocode_address("Sydney").await;

    match result {
        Err(Error::DeserializationFailed {
            raw_response,
            status,
            ..
        }) => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(raw_response, "invalid json");
        }
        _ => panic!("Expected DeserializationFailed, got {:?}", result),
    }
}

#[tokio::test]
async fn test_over_query_limit_retried() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(200).set_body_json(json!({"status": "OVER_QUERY_LIMIT"}))
            } else {
                ResponseTemplate::new(200).set_body_json(ok_body())
            }
        })
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let response = client
        .execute(GeocodeRequest::address("Sydney").build())
        .await
        .unwrap();

    assert_eq!(response.attempts, 2);
}

#[tokio::test]
async fn test_over_query_limit_not_retried_when_disabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OVER_QUERY_LIMIT",
            "error_message": "You have exceeded your rate-limit for this API."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server)
        .retry_over_query_limit(false)
        .build()
        .unwrap();
    let err = client.geocode_address("Sydney").await.unwrap_err();

    match err {
        Error::OverQueryLimit { status, message } => {
            assert_eq!(status, "OVER_QUERY_LIMIT");
            assert!(message.unwrap().contains("rate-limit"));
        }
        other => panic!("Expected OverQueryLimit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_timeout_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("Unavailable"))
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server)
        .retry_timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let start = Instant::now();
    let err = client.geocode_address("Sydney").await.unwrap_err();

    let attempts = match err {
        Error::TimeoutExceeded {
            attempts,
            elapsed,
            last_error,
        } => {
            assert!(elapsed > Duration::from_millis(200));
            assert_eq!(
                last_error.and_then(|e| e.status()).map(|s| s.as_u16()),
                Some(503)
            );
            attempts
        }
        other => panic!("Expected TimeoutExceeded, got {other:?}"),
    };
    assert!(attempts >= 2, "only {attempts} attempts");
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(request_count(&mock_server).await, attempts);
}

#[tokio::test]
async fn test_transport_timeout_retried() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(move |_req: &wiremock::Request| {
            let template = ResponseTemplate::new(200).set_body_json(ok_body());
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                template.set_delay(Duration::from_secs(2))
            } else {
                template
            }
        })
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server)
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let response = client
        .execute(GeocodeRequest::address("Sydney").build())
        .await
        .unwrap();

    assert_eq!(response.attempts, 2);
}

#[tokio::test]
async fn test_connection_failure_is_not_retried() {
    // Nothing listens on a port once its listener is dropped.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = Client::builder()
        .base_url(uri)
        .unwrap()
        .key("AIzaasdf")
        .backoff(fast_backoff())
        .retry_timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let start = Instant::now();
    let err = client.geocode_address("Sydney").await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    assert!(!err.is_retryable());
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_queries_per_second_pacing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).queries_per_second(3).build().unwrap();

    let start = Instant::now();
    for _ in 0..6 {
        client.geocode_address("Sesame St.").await.unwrap();
    }
    let elapsed = start.elapsed();

    assert!(elapsed > Duration::from_secs(1), "too fast: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "too slow: {elapsed:?}");
}

#[tokio::test]
async fn test_clones_share_the_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).queries_per_second(2).build().unwrap();
    let clone = client.clone();

    let start = Instant::now();
    for i in 0..4 {
        let caller = if i % 2 == 0 { &client } else { &clone };
        caller.geocode_address("Sydney").await.unwrap();
    }

    assert!(start.elapsed() > Duration::from_millis(900));
}

#[tokio::test]
async fn test_concurrent_callers_share_the_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(6)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).queries_per_second(2).build().unwrap();

    let start = Instant::now();
    let handles: Vec<_> = (0..6)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client.geocode_address("Sydney").await.unwrap();
                start.elapsed()
            })
        })
        .collect();

    let mut finished = Vec::new();
    for handle in handles {
        finished.push(handle.await.unwrap());
    }
    finished.sort();

    // Six calls at two per second need at least two full seconds.
    assert!(
        finished[5] >= Duration::from_millis(1900),
        "too fast: {finished:?}"
    );
    // No rolling second holds more than two completions.
    for pair in finished.windows(3) {
        assert!(
            pair[2] - pair[0] >= Duration::from_millis(900),
            "window overshot: {finished:?}"
        );
    }
}

#[tokio::test]
async fn test_rejected_call_does_not_count_towards_rate_limit() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(200).set_body_json(json!({"status": "INVALID_REQUEST"}))
            } else {
                ResponseTemplate::new(200).set_body_json(ok_body())
            }
        })
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).queries_per_second(1).build().unwrap();

    let err = client.geocode_address("").await.unwrap_err();
    assert_eq!(err.api_status(), Some("INVALID_REQUEST"));

    let start = Instant::now();
    client.geocode_address("Sydney").await.unwrap();
    assert!(
        start.elapsed() < Duration::from_millis(500),
        "paced after a rejected call: {:?}",
        start.elapsed()
    );

    // The successful call does count.
    let start = Instant::now();
    client.geocode_address("Sydney").await.unwrap();
    assert!(start.elapsed() > Duration::from_millis(500));
}

#[tokio::test]
async fn test_roads_quota_retried_then_error() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/v1/snapToRoads"))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(429).set_body_json(json!({
                    "error": {"code": 429, "status": "RESOURCE_EXHAUSTED", "message": "quota"}
                }))
            } else {
                ResponseTemplate::new(400).set_body_json(json!({
                    "error": {"code": 400, "status": "INVALID_ARGUMENT", "message": "bad path"}
                }))
            }
        })
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let path_points = [Location::from((-35.27801, 149.12958))];
    let request = roads::snap_to_roads(&path_points, false)
        .unwrap()
        .with_base_url(mock_server.uri());
    let err = client.execute(request).await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, "INVALID_ARGUMENT");
            assert_eq!(message.as_deref(), Some("bad path"));
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
    assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_geolocation_post_and_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/geolocation/v1/geolocate"))
        .and(query_param("key", "AIzaasdf"))
        .and(body_json(json!({"considerIp": false})))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Not Found", "errors": [{"reason": "notFound"}]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let request = GeolocationRequest {
        consider_ip: Some(false),
        ..Default::default()
    }
    .build()
    .unwrap()
    .with_base_url(mock_server.uri());

    let response = client.execute(request).await.unwrap();
    assert_eq!(response.status.as_u16(), 404);
    assert_eq!(response.data["error"]["errors"][0]["reason"], "notFound");
}

#[tokio::test]
async fn test_geolocation_forbidden_is_quota() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/geolocation/v1/geolocate"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"errors": [{"reason": "dailyLimitExceeded"}]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server)
        .retry_over_query_limit(false)
        .build()
        .unwrap();
    let request = GeolocationRequest::default()
        .build()
        .unwrap()
        .with_base_url(mock_server.uri());

    let err = client.execute(request).await.unwrap_err();
    assert!(matches!(err, Error::OverQueryLimit { .. }));
}

#[tokio::test]
async fn test_address_validation_passthrough() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1:validateAddress"))
        .and(body_json(json!({
            "address": {"addressLines": ["1600 Amphitheatre Pk"], "regionCode": "US"}
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "status": "INVALID_ARGUMENT"}
        })))
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let request = AddressValidationRequest::new(["1600 Amphitheatre Pk"])
        .region_code("US")
        .build()
        .unwrap()
        .with_base_url(mock_server.uri());

    let response = client.execute(request).await.unwrap();
    assert_eq!(response.data["error"]["status"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_places_autocomplete_predictions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/autocomplete/json"))
        .and(query_param("input", "Google"))
        .and(query_param("components", "country:AU"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "predictions": [{"description": "Google Sydney"}, {"description": "Google Melbourne"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let predictions = client
        .places_autocomplete(&AutocompleteRequest::new("Google").country("AU"))
        .await
        .unwrap();

    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0]["description"], "Google Sydney");
}

#[tokio::test]
async fn test_places_photo_stream() {
    let mock_server = MockServer::start().await;
    let image = vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4];

    Mock::given(method("GET"))
        .and(path("/maps/api/place/photo"))
        .and(query_param("photoreference", "ref"))
        .and(query_param("maxwidth", "400"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(image.clone(), "image/jpeg"))
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let mut photo = client
        .places_photo(&PhotoRequest::new("ref").max_width(400))
        .await
        .unwrap();

    assert_eq!(photo.content_type(), Some("image/jpeg"));
    let mut downloaded = Vec::new();
    while let Some(chunk) = photo.chunk().await.unwrap() {
        downloaded.extend_from_slice(&chunk);
    }
    assert_eq!(downloaded, image);
}

#[tokio::test]
async fn test_raw_endpoint_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/photo"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let err = client
        .places_photo(&PhotoRequest::new("ref").max_height(100))
        .await
        .unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
    assert_eq!(err.raw_response(), Some("denied"));
}

#[tokio::test]
async fn test_raw_endpoint_retries_5xx() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/maps/api/staticmap"))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(504)
            } else {
                ResponseTemplate::new(200).set_body_raw(b"PNG".to_vec(), "image/png")
            }
        })
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server).build().unwrap();
    let request = mapcall::api::maps::StaticMapRequest::new(100, 100)
        .center("Sydney")
        .zoom(10);
    let response = client.execute_raw(request.build().unwrap()).await.unwrap();

    assert_eq!(response.attempts, 2);
    let body = response.into_data().bytes().await.unwrap();
    assert_eq!(&body[..], b"PNG");
}

#[tokio::test]
async fn test_experience_id_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .and(header("x-goog-maps-experience-id", "exp1,exp2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server)
        .experience_id(["exp1", "exp2"])
        .build()
        .unwrap();
    client.geocode_address("Sydney").await.unwrap();

    // Without the header nothing matches and the server answers 404.
    client.clear_experience_id();
    client.geocode_address("Sydney").await.unwrap_err();
}

#[tokio::test]
async fn test_user_agent_and_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GEOCODE_PATH))
        .and(header("x-custom-header", "custom-value"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server)
        .default_header("X-Custom-Header", "custom-value")
        .unwrap()
        .build()
        .unwrap();
    client.geocode_address("Sydney").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let user_agent = requests[0]
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(user_agent.starts_with("mapcall/"), "{user_agent}");
}

#[tokio::test]
async fn test_custom_request_through_executor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/custom/endpoint"))
        .and(query_param("a", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"anything": true})))
        .mount(&mock_server)
        .await;

    let client = builder(&mock_server)
        .retry_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let request = RequestMetadata::new("/custom/endpoint")
        .with_param("a", 1)
        .with_extract(Extract::Passthrough);

    // 500 is retried before any extraction strategy sees the body.
    let err = client.execute(request).await.unwrap_err();
    assert!(matches!(err, Error::TimeoutExceeded { .. }));
}

#[test]
fn test_configuration_errors() {
    assert!(matches!(
        Client::builder().build().unwrap_err(),
        Error::ConfigurationError(_)
    ));
    assert!(matches!(
        Client::builder().key("Invalid key.").build().unwrap_err(),
        Error::ConfigurationError(_)
    ));
    assert!(matches!(
        Client::builder()
            .client_id("foo", "a2V5")
            .channel("auieauie$? ")
            .build()
            .unwrap_err(),
        Error::ConfigurationError(_)
    ));
    assert!(Client::builder().base_url("not a url").is_err());
}
