//! Enterprise credentials: URL signing and channels.
//!
//! This example shows how to:
//! - Sign a URL by hand to check a signature
//! - Configure a client with a client id, secret and channel
//! - Mix enterprise signing with an API key for key-only services
//!
//! Run with: `MAPS_CLIENT_ID=gme-... MAPS_CLIENT_SECRET=... cargo run --example enterprise_signing`

use mapcall::api::directions::DirectionsRequest;
use mapcall::api::TravelMode;
use mapcall::auth::{sign_hmac, urlencode_params};
use mapcall::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("mapcall=debug,enterprise_signing=info")
        .init();

    println!("=== Signing by hand ===");
    let query = urlencode_params(&[
        ("address".to_string(), "Sesame St.".to_string()),
        ("client".to_string(), "foo".to_string()),
    ]);
    let unsigned = format!("/maps/api/geocode/json?{query}");
    println!("{unsigned}&signature={}", sign_hmac("a2V5", &unsigned)?);
    println!();

    let (Ok(client_id), Ok(secret)) = (
        std::env::var("MAPS_CLIENT_ID"),
        std::env::var("MAPS_CLIENT_SECRET"),
    ) else {
        println!("Set MAPS_CLIENT_ID and MAPS_CLIENT_SECRET to make a signed call");
        return Ok(());
    };

    let mut builder = Client::builder()
        .client_id(client_id, secret)
        .channel("demo-channel");
    // Roads and the POST services only take keys.
    if let Ok(key) = std::env::var("MAPS_API_KEY") {
        builder = builder.key(key);
    }
    let client = builder.build()?;

    println!("=== Signed directions request ===");
    let routes = client
        .directions(&DirectionsRequest::new("Sydney", "Parramatta").mode(TravelMode::Transit))
        .await?;
    for route in &routes {
        println!("Summary: {}", route["summary"]);
    }

    Ok(())
}
