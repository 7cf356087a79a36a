//! Error types for the wiretap middleware.

use thiserror::Error;
use tower::BoxError;

use crate::body::BodyError;

/// Result alias for middleware operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the logging service.
#[derive(Debug, Error)]
pub enum Error {
    /// The inner transport failed at the request level. The original
    /// failure is preserved as the source.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
    /// Reading a message body failed while rendering it.
    #[error(transparent)]
    Body(#[from] BodyError),
}
