//! Geocoding, reverse geocoding and per-call extra parameters.
//!
//! This example shows how to:
//! - Create a client with an API key and a pacing ceiling
//! - Geocode an address and reverse geocode the result
//! - Add parameters to a single call without touching the client
//! - Tell quota, service and transport failures apart
//!
//! Run with: `MAPS_API_KEY=AIza... cargo run --example geocode`

use mapcall::api::geocoding::{GeocodeRequest, ReverseGeocodeRequest};
use mapcall::convert::LatLng;
use mapcall::{Client, Error};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("mapcall=debug,geocode=info")
        .init();

    let client = Client::builder()
        .key(std::env::var("MAPS_API_KEY")?)
        .queries_per_second(10)
        .retry_timeout(Duration::from_secs(20))
        .build()?;

    println!("=== Geocode ===");
    let results = client
        .geocode(
            &GeocodeRequest::address("1600 Amphitheatre Parkway, Mountain View, CA")
                .component("country", "US"),
        )
        .await?;

    let Some(first) = results.first() else {
        println!("No results");
        return Ok(());
    };
    println!("Address: {}", first["formatted_address"]);
    let location = &first["geometry"]["location"];
    let latlng = LatLng::new(
        location["lat"].as_f64().unwrap_or_default(),
        location["lng"].as_f64().unwrap_or_default(),
    );
    println!("Location: {latlng}");
    println!();

    println!("=== Reverse geocode with extra params ===");
    let request = ReverseGeocodeRequest::new(latlng)
        .result_type("street_address")
        .build()
        .with_extra_params([("language", "de")]);

    match client.execute(request).await {
        Ok(response) => {
            println!("Status: {}", response.data["status"]);
            println!("Attempts: {}", response.attempts);
            println!("Latency: {:?}", response.latency);
            if let Some(address) = response.data["results"][0]["formatted_address"].as_str() {
                println!("Address (de): {address}");
            }
        }
        Err(Error::Api { status, message }) => {
            eprintln!("Service rejected the request: {status} {message:?}");
        }
        Err(Error::TimeoutExceeded { attempts, last_error, .. }) => {
            eprintln!("Gave up after {attempts} attempts, last error: {last_error:?}");
        }
        Err(e) => eprintln!("Other error: {e}"),
    }

    Ok(())
}
