//! Minimal demonstration of the raw message logger.
//!
//! Sends a request through a canned transport and prints the raw request and
//! response messages via a fmt subscriber:
//!
//! ```text
//! cargo run --example demo
//! ```

use http::header::{HeaderValue, AUTHORIZATION};
use http::{Request, Response, StatusCode};
use tower::{service_fn, BoxError};
use wiretap::{Body, ClientBuilder, RawLoggerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Stands in for a real HTTP client service.
    let transport = service_fn(|_request: Request<Body>| async {
        Ok::<_, BoxError>(
            Response::builder()
                .status(StatusCode::OK)
                .body(Body::from_bytes(
                    HeaderValue::from_static("application/json"),
                    &br#"{"coord":{"lon":-0.13,"lat":51.51},"name":"London"}"#[..],
                ))
                .unwrap(),
        )
    });

    let mut client = ClientBuilder::new("openweathermap")
        .raw_logging(
            RawLoggerConfig::new()
                .ignore_request_content(false)
                .ignore_response_content(false),
        )
        .build(transport);

    let request = Request::builder()
        .uri("http://samples.openweathermap.org/data/2.5/weather?q=London,uk")
        .header(AUTHORIZATION, "Bearer not-a-real-token")
        .body(Body::empty())?;
    let response = client.send(request).await?;
    println!("status: {}", response.status());

    Ok(())
}
