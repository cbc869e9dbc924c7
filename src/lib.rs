//! # mapcall - a client core for the Maps web services
//!
//! mapcall is the shared request machinery behind the Maps web service
//! endpoints: credential handling and URL signing, client-side rate limiting,
//! retries with exponential backoff under an overall deadline, and uniform
//! classification of the services' response envelopes. It is built on
//! `reqwest` and `tokio`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mapcall::Client;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mapcall::Error> {
//!     let client = Client::builder()
//!         .key("AIza-your-key")
//!         .queries_per_second(10)
//!         .retry_timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     let results = client.geocode_address("1600 Amphitheatre Parkway, Mountain View").await?;
//!     println!("{}", results[0]["geometry"]["location"]);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **API key and enterprise credentials** - HMAC-SHA1 URL signing with client id and channel support
//! - **Client-side rate limiting** - A sliding one-second window shared by all clones of a client
//! - **Deadline-bounded retries** - 500/503/504, transport timeouts and quota signals are retried with jittered backoff
//! - **Uniform error classification** - Status-field, Roads, Geolocation and pass-through envelopes map onto one [`Error`] type
//! - **Binary endpoints** - Photos and static maps come back as a lazily read [`ByteStream`]
//! - **Structured logging** - Attempts, retries and failures are traced with `tracing`
//!
//! ## Enterprise Signing
//!
//! Clients configured with a client id sign every URL for endpoints that accept
//! it. The signature can be checked independently:
//!
//! ```
//! use mapcall::auth::sign_hmac;
//!
//! let signature = sign_hmac("a2V5", "The quick brown fox jumps over the lazy dog")?;
//! assert_eq!(signature, "3nybhbi3iqa8ino29wqQcBydtNk=");
//! # Ok::<(), mapcall::Error>(())
//! ```
//!
//! ## Custom Requests
//!
//! Endpoints without a typed builder can still go through the executor:
//!
//! ```no_run
//! use mapcall::{Client, Extract, metadata::RequestMetadata};
//!
//! # async fn example() -> Result<(), mapcall::Error> {
//! # let client = Client::builder().key("AIza-your-key").build()?;
//! let request = RequestMetadata::new("/v1/nearestRoads")
//!     .with_base_url("https://roads.googleapis.com")
//!     .with_param("points", "60.170880,24.942795")
//!     .with_extract(Extract::Roads)
//!     .key_only();
//!
//! let response = client.execute(request).await?;
//! println!("{}", response.data);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
mod client;
pub mod convert;
mod error;
mod extract;
pub mod metadata;
mod rate_limit;
mod response;
mod retry;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use extract::Extract;
pub use response::{ByteStream, Response};
pub use retry::Backoff;
