//! # Wiretap
//!
//! A [`tower`] middleware that logs the raw HTTP request and response
//! messages flowing through a client transport — start line, headers and
//! (optionally) body, rendered the way they look on the wire — via
//! [`tracing`] structured events.
//!
//! ## Features
//!
//! - **Raw message rendering**: requests and responses are serialized to a
//!   near-wire textual form, including multipart form-data bodies
//! - **Replay-safe body capture**: one-shot body streams are buffered and
//!   replaced in place, so logging never consumes a body the transport or
//!   caller still needs
//! - **Redaction**: sensitive headers can be dropped entirely or logged as
//!   `{name}: ***` (the `Authorization` request header is redacted by
//!   default)
//! - **Zero overhead when disabled**: when the configured level is not
//!   enabled on the current subscriber, requests pass straight through
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use http::{Request, Response, StatusCode};
//! use tower::service_fn;
//! use wiretap::{Body, ClientBuilder, RawLoggerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tracing_subscriber::fmt().init();
//!
//!     // The inner transport is any tower service; a real application would
//!     // plug in its HTTP client here.
//!     let transport = service_fn(|_request: Request<Body>| async {
//!         Ok::<_, std::convert::Infallible>(
//!             Response::builder()
//!                 .status(StatusCode::OK)
//!                 .body(Body::text("hello"))
//!                 .unwrap(),
//!         )
//!     });
//!
//!     let mut client = ClientBuilder::new("demo")
//!         .raw_logging(
//!             RawLoggerConfig::new()
//!                 .ignore_request_content(false)
//!                 .ignore_response_content(false),
//!         )
//!         .build(transport);
//!
//!     let request = Request::builder()
//!         .uri("http://example.com/hello")
//!         .body(Body::empty())?;
//!     let response = client.send(request).await?;
//!     println!("{}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! The layer can also be applied directly to any service stack with
//! [`RawLoggerLayer`] and `tower::ServiceBuilder`.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use http::{Request, Response};
use tower::{BoxError, Layer, Service};
use tracing::Level;

pub mod body;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod mime;
pub mod render;

pub use body::{Body, BodyError, Multipart, Part};
pub use client::{Client, ClientBuilder};
pub use config::RawLoggerConfig;
pub use error::{Error, Result};

use render::RenderOptions;

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Blank line between the tag line and the rendered message in log output.
const MESSAGE_SEPARATOR: &str = "\n\n";

/// Emits a tracing event at a level chosen at runtime.
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {{
        let level: ::tracing::Level = $level;
        if level == ::tracing::Level::ERROR {
            ::tracing::error!($($arg)+)
        } else if level == ::tracing::Level::WARN {
            ::tracing::warn!($($arg)+)
        } else if level == ::tracing::Level::INFO {
            ::tracing::info!($($arg)+)
        } else if level == ::tracing::Level::DEBUG {
            ::tracing::debug!($($arg)+)
        } else {
            ::tracing::trace!($($arg)+)
        }
    }};
}

fn level_enabled(level: Level) -> bool {
    if level == Level::ERROR {
        tracing::event_enabled!(Level::ERROR)
    } else if level == Level::WARN {
        tracing::event_enabled!(Level::WARN)
    } else if level == Level::INFO {
        tracing::event_enabled!(Level::INFO)
    } else if level == Level::DEBUG {
        tracing::event_enabled!(Level::DEBUG)
    } else {
        tracing::event_enabled!(Level::TRACE)
    }
}

/// Tower layer that installs the raw message logger.
///
/// One layer corresponds to one logical client and owns that client's
/// active-request counter; every service produced by [`Layer::layer`] shares
/// it, so the logged queue depth reflects all in-flight requests of the
/// client.
///
/// # Examples
///
/// ```rust,no_run
/// use http::{Request, Response};
/// use tower::{service_fn, ServiceBuilder};
/// use wiretap::{Body, RawLoggerConfig, RawLoggerLayer};
///
/// let transport = service_fn(|_request: Request<Body>| async {
///     Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
/// });
///
/// let service = ServiceBuilder::new()
///     .layer(RawLoggerLayer::new(RawLoggerConfig::default()))
///     .service(transport);
/// ```
#[derive(Clone)]
pub struct RawLoggerLayer {
    config: Arc<RawLoggerConfig>,
    category: Arc<str>,
    active: Arc<AtomicUsize>,
}

impl RawLoggerLayer {
    /// Creates a layer with the given configuration.
    ///
    /// When the configuration carries no category, events are recorded under
    /// the crate name.
    pub fn new(config: RawLoggerConfig) -> Self {
        let category = config
            .category
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
        Self {
            config: Arc::new(config),
            category: category.into(),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<S> Layer<S> for RawLoggerLayer {
    type Service = RawLoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RawLoggerService {
            inner,
            config: self.config.clone(),
            category: self.category.clone(),
            active: self.active.clone(),
        }
    }
}

/// Tower service that wraps an inner transport and logs each exchange.
///
/// Created by [`RawLoggerLayer`]; users typically don't construct this type
/// directly.
#[derive(Clone)]
pub struct RawLoggerService<S> {
    inner: S,
    config: Arc<RawLoggerConfig>,
    category: Arc<str>,
    active: Arc<AtomicUsize>,
}

impl<S> Service<Request<Body>> for RawLoggerService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    type Response = Response<Body>;
    type Error = Error;
    type Future = BoxFuture<Result<Response<Body>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner
            .poll_ready(cx)
            .map_err(|error| Error::Transport(error.into()))
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        // Readiness was established on `self.inner`; hand that instance to
        // the future and keep the fresh clone for the next call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if !level_enabled(self.config.level) {
            return Box::pin(async move {
                inner
                    .call(request)
                    .await
                    .map_err(|error| Error::Transport(error.into()))
            });
        }

        let config = self.config.clone();
        let category = self.category.clone();
        let active = self.active.clone();

        Box::pin(async move {
            eprintln!("DBG: entering async block");
            let mut guard = ActiveGuard::enter(active);
            eprintln!("DBG: guard entered depth={}", guard.depth());
            log_at!(
                config.level,
                category = %category,
                "Request-Queue: {}",
                guard.depth()
            );
            eprintln!("DBG: logged queue");

            let request_options = RenderOptions {
                ignore_content: config.ignore_request_content,
                ignore_headers: &config.ignore_request_headers,
                redact_headers: &config.redact_request_headers,
            };
            let raw_request = render::render_request(&mut request, &request_options).await?;
            eprintln!("DBG: rendered request");
            log_at!(
                config.level,
                category = %category,
                "Request-Message: {}{}",
                MESSAGE_SEPARATOR,
                raw_request
            );
            eprintln!("DBG: logged message, about to call inner");

            let start = Instant::now();
            match inner.call(request).await {
                Ok(mut response) => {
                    let elapsed_ms = start.elapsed().as_millis();
                    guard.exit();
                    let response_options = RenderOptions {
                        ignore_content: config.ignore_response_content,
                        ignore_headers: &config.ignore_response_headers,
                        redact_headers: &config.redact_response_headers,
                    };
                    let raw_response =
                        render::render_response(&mut response, &response_options).await?;
                    log_at!(
                        config.level,
                        category = %category,
                        "Response-Message: {}ms{}{}",
                        elapsed_ms,
                        MESSAGE_SEPARATOR,
                        raw_response
                    );
                    Ok(response)
                }
                Err(error) => {
                    let elapsed_ms = start.elapsed().as_millis();
                    let error: BoxError = error.into();
                    tracing::error!(
                        category = %category,
                        "Request-Error: {}, elapsed: {}ms{}{}",
                        error,
                        elapsed_ms,
                        MESSAGE_SEPARATOR,
                        raw_request
                    );
                    guard.exit();
                    Err(Error::Transport(error))
                }
            }
        })
    }
}

/// Pairs the queue-depth increment with exactly one decrement, including
/// when the call future is dropped mid-flight.
struct ActiveGuard {
    active: Arc<AtomicUsize>,
    depth: usize,
    armed: bool,
}

impl ActiveGuard {
    fn enter(active: Arc<AtomicUsize>) -> Self {
        let depth = active.fetch_add(1, Ordering::SeqCst) + 1;
        Self {
            active,
            depth,
            armed: true,
        }
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn exit(&mut self) {
        if self.armed {
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.armed = false;
        }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.exit();
    }
}
