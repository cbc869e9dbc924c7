//! Downloading binary responses: a static map and a place photo.
//!
//! This example shows how to:
//! - Build a static map request with markers
//! - Stream the image body chunk by chunk to a file
//! - Handle binary endpoints that answer with an error status
//!
//! Run with: `MAPS_API_KEY=AIza... cargo run --example static_map`

use futures::StreamExt;
use mapcall::api::maps::{ImageFormat, MapType, StaticMapRequest};
use mapcall::{Client, Error};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("mapcall=debug,static_map=info")
        .init();

    let client = Client::builder()
        .key(std::env::var("MAPS_API_KEY")?)
        .experience_id(["static-map-demo"])
        .build()?;

    let request = StaticMapRequest::new(640, 400)
        .maptype(MapType::Roadmap)
        .format(ImageFormat::Png)
        .marker("color:blue|label:S|40.702147,-74.015794")
        .marker("color:red|label:C|40.718217,-73.998284");

    match client.static_map(&request).await {
        Ok(image) => {
            println!("Content-Type: {:?}", image.content_type());
            let mut file = std::fs::File::create("static_map.png")?;
            let mut stream = Box::pin(image.into_stream());
            let mut size = 0;
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                size += chunk.len();
                file.write_all(&chunk)?;
            }
            println!("Wrote {size} bytes to static_map.png");
        }
        Err(Error::Http { status, raw_response }) => {
            eprintln!("Static map request failed with {status}: {raw_response}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
