//! Configuration for the raw message logger.

use std::collections::HashSet;

use http::header::{HeaderName, AUTHORIZATION};
use tracing::Level;

/// Controls what the raw message logger emits and at which level.
///
/// Content is ignored by default in both directions; the `Authorization`
/// request header is redacted by default. Header matching is
/// case-insensitive because the sets hold typed [`HeaderName`]s.
///
/// # Examples
///
/// ```rust
/// use http::header::HeaderName;
/// use tracing::Level;
/// use wiretap::RawLoggerConfig;
///
/// let config = RawLoggerConfig::new()
///     .level(Level::DEBUG)
///     .ignore_request_content(false)
///     .ignore_request_header(HeaderName::from_static("user-agent"))
///     .redact_request_header(HeaderName::from_static("x-api-key"));
///
/// assert!(!config.ignore_request_content);
/// assert!(config.ignore_response_content);
/// ```
#[derive(Debug, Clone)]
pub struct RawLoggerConfig {
    /// Level the request/response messages are emitted at.
    pub level: Level,
    /// Category recorded on every event. Derived from the client name at
    /// registration time when not set explicitly.
    pub category: Option<String>,
    /// Whether to skip the request body in logs.
    pub ignore_request_content: bool,
    /// Whether to skip the response body in logs.
    pub ignore_response_content: bool,
    /// Request headers omitted from logs entirely.
    pub ignore_request_headers: HashSet<HeaderName>,
    /// Response headers omitted from logs entirely.
    pub ignore_response_headers: HashSet<HeaderName>,
    /// Request headers logged with `***` in place of their value.
    pub redact_request_headers: HashSet<HeaderName>,
    /// Response headers logged with `***` in place of their value.
    pub redact_response_headers: HashSet<HeaderName>,
}

impl Default for RawLoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            category: None,
            ignore_request_content: true,
            ignore_response_content: true,
            ignore_request_headers: HashSet::new(),
            ignore_response_headers: HashSet::new(),
            redact_request_headers: HashSet::from([AUTHORIZATION]),
            redact_response_headers: HashSet::new(),
        }
    }
}

impl RawLoggerConfig {
    /// Default configuration; see the type docs for the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level the messages are emitted at.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Overrides the category recorded on every event.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets whether the request body is skipped in logs.
    pub fn ignore_request_content(mut self, ignore: bool) -> Self {
        self.ignore_request_content = ignore;
        self
    }

    /// Sets whether the response body is skipped in logs.
    pub fn ignore_response_content(mut self, ignore: bool) -> Self {
        self.ignore_response_content = ignore;
        self
    }

    /// Omits the given request header from logs.
    pub fn ignore_request_header(mut self, name: HeaderName) -> Self {
        self.ignore_request_headers.insert(name);
        self
    }

    /// Omits the given response header from logs.
    pub fn ignore_response_header(mut self, name: HeaderName) -> Self {
        self.ignore_response_headers.insert(name);
        self
    }

    /// Logs the given request header as `{name}: ***`.
    pub fn redact_request_header(mut self, name: HeaderName) -> Self {
        self.redact_request_headers.insert(name);
        self
    }

    /// Logs the given response header as `{name}: ***`.
    pub fn redact_response_header(mut self, name: HeaderName) -> Self {
        self.redact_response_headers.insert(name);
        self
    }
}
