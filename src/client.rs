//! Per-client registration of the raw message logger.
//!
//! A [`ClientBuilder`] assembles the middleware pipeline for one logical
//! client. Registration is idempotent: installing raw logging twice keeps a
//! single logger in the pipeline, and removal takes out exactly that one.
//! Builders are independent of each other, so one client's registration
//! never affects another client.

use std::task::{Context, Poll};

use http::{Request, Response};
use tower::{BoxError, Layer, Service, ServiceExt};

use crate::body::Body;
use crate::config::RawLoggerConfig;
use crate::error::Error;
use crate::{BoxFuture, RawLoggerLayer, RawLoggerService};

/// Builder for one logical client's middleware pipeline.
///
/// # Examples
///
/// ```rust,no_run
/// use http::{Request, Response};
/// use tower::service_fn;
/// use wiretap::{Body, ClientBuilder, RawLoggerConfig};
///
/// # async fn example() -> Result<(), wiretap::Error> {
/// let transport = service_fn(|_request: Request<Body>| async {
///     Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
/// });
///
/// let mut client = ClientBuilder::new("weather")
///     .raw_logging(RawLoggerConfig::new().ignore_response_content(false))
///     .build(transport);
///
/// let request = Request::builder()
///     .uri("http://example.com/forecast")
///     .body(Body::empty())
///     .expect("valid request");
/// let response = client.send(request).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    name: String,
    logging: Option<RawLoggerConfig>,
}

impl ClientBuilder {
    /// Starts a pipeline for the client with the given logical name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logging: None,
        }
    }

    /// Installs raw message logging.
    ///
    /// Registering again replaces the previous configuration; the pipeline
    /// never contains two loggers. When the configuration has no category,
    /// one is derived from the client name at build time.
    pub fn raw_logging(mut self, config: RawLoggerConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Removes a previous raw logging registration, leaving the rest of the
    /// pipeline as it was.
    pub fn without_raw_logging(mut self) -> Self {
        self.logging = None;
        self
    }

    /// Wraps the transport with the configured pipeline.
    pub fn build<S>(self, transport: S) -> Client<S> {
        let inner = match self.logging {
            Some(mut config) => {
                if config.category.is_none() {
                    config.category = Some(format!("wiretap::{}", self.name));
                }
                ClientInner::Logged(RawLoggerLayer::new(config).layer(transport))
            }
            None => ClientInner::Plain(transport),
        };
        Client { inner }
    }
}

/// A transport wrapped in the pipeline assembled by [`ClientBuilder`].
#[derive(Clone)]
pub struct Client<S> {
    inner: ClientInner<S>,
}

#[derive(Clone)]
enum ClientInner<S> {
    Logged(RawLoggerService<S>),
    Plain(S),
}

impl<S> Client<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    /// Sends one request through the pipeline.
    pub async fn send(&mut self, request: Request<Body>) -> Result<Response<Body>, Error> {
        self.ready().await?.call(request).await
    }
}

impl<S> Service<Request<Body>> for Client<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    type Response = Response<Body>;
    type Error = Error;
    type Future = BoxFuture<Result<Response<Body>, Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        match &mut self.inner {
            ClientInner::Logged(service) => service.poll_ready(cx),
            ClientInner::Plain(service) => service
                .poll_ready(cx)
                .map_err(|error| Error::Transport(error.into())),
        }
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        match &mut self.inner {
            ClientInner::Logged(service) => service.call(request),
            ClientInner::Plain(service) => {
                let future = service.call(request);
                Box::pin(async move { future.await.map_err(|error| Error::Transport(error.into())) })
            }
        }
    }
}
