//! HTTP message bodies with replay support.
//!
//! A [`Body`] owns its content headers together with the content itself,
//! which is either buffered bytes, a one-shot byte stream, or an ordered
//! collection of multipart parts. Reading a one-shot stream through
//! [`Body::bytes`] buffers it in place, so the body stays readable for the
//! next consumer.

use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, Stream, StreamExt};
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use thiserror::Error;
use tower::BoxError;
use uuid::Uuid;

/// Error type for body read operations.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The underlying byte stream yielded an error.
    #[error("body stream error: {0}")]
    Stream(#[source] BoxError),
}

/// An HTTP message body together with its content headers.
pub struct Body {
    headers: HeaderMap,
    inner: Inner,
}

pub(crate) enum Inner {
    Empty,
    Buffered(Bytes),
    Streaming(BoxStream<'static, Result<Bytes, BoxError>>),
    Multipart(Multipart),
}

impl Body {
    /// A body with no content and no content headers.
    pub fn empty() -> Self {
        Self {
            headers: HeaderMap::new(),
            inner: Inner::Empty,
        }
    }

    /// A buffered `text/plain; charset=utf-8` body.
    pub fn text(value: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            headers,
            inner: Inner::Buffered(Bytes::from(value.into())),
        }
    }

    /// A buffered body with the given content type.
    pub fn from_bytes(content_type: HeaderValue, bytes: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type);
        Self {
            headers,
            inner: Inner::Buffered(bytes.into()),
        }
    }

    /// A one-shot streaming body with the given content type.
    ///
    /// The stream can be read only once; [`Body::bytes`] buffers it in place
    /// on first read so later consumers see the same content.
    pub fn from_stream<S>(content_type: HeaderValue, stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, BoxError>> + Send + 'static,
    {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type);
        Self {
            headers,
            inner: Inner::Streaming(stream.boxed()),
        }
    }

    /// A `multipart/form-data` body built from the given parts.
    pub fn multipart(multipart: Multipart) -> Self {
        let mut headers = HeaderMap::new();
        let content_type = format!("multipart/form-data; boundary={}", multipart.boundary());
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::try_from(content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("multipart/form-data")),
        );
        Self {
            headers,
            inner: Inner::Multipart(multipart),
        }
    }

    /// The content headers of this body.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the content headers of this body.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The `content-type` header value, when present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// True when the body has no content.
    pub fn is_empty(&self) -> bool {
        matches!(self.inner, Inner::Empty)
    }

    /// True when the content is buffered and can be read any number of times.
    pub fn is_buffered(&self) -> bool {
        matches!(self.inner, Inner::Buffered(_))
    }

    /// True when the content is a one-shot stream that has not been buffered.
    pub fn is_streaming(&self) -> bool {
        matches!(self.inner, Inner::Streaming(_))
    }

    /// True when the body is a multipart collection.
    pub fn is_multipart(&self) -> bool {
        matches!(self.inner, Inner::Multipart(_))
    }

    /// The multipart parts, when this is a multipart body.
    pub fn as_multipart(&self) -> Option<&Multipart> {
        match &self.inner {
            Inner::Multipart(multipart) => Some(multipart),
            _ => None,
        }
    }

    pub(crate) fn inner_mut(&mut self) -> &mut Inner {
        &mut self.inner
    }

    /// Reads the full content of this body.
    ///
    /// A one-shot stream is collected into memory and the body switches to
    /// buffered content over those bytes, so the body remains readable.
    /// Multipart bodies are encoded to their wire form, buffering each
    /// streaming part the same way.
    pub async fn bytes(&mut self) -> Result<Bytes, BodyError> {
        match &mut self.inner {
            Inner::Empty => Ok(Bytes::new()),
            Inner::Buffered(bytes) => Ok(bytes.clone()),
            Inner::Streaming(stream) => {
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(BodyError::Stream)?;
                    buffer.extend_from_slice(&chunk);
                }
                let buffered = buffer.freeze();
                self.inner = Inner::Buffered(buffered.clone());
                Ok(buffered)
            }
            Inner::Multipart(multipart) => multipart.encode().await,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Body");
        dbg.field("headers", &self.headers);
        match &self.inner {
            Inner::Empty => dbg.field("content", &"empty"),
            Inner::Buffered(bytes) => dbg.field("content", &format_args!("{} bytes", bytes.len())),
            Inner::Streaming(_) => dbg.field("content", &"stream"),
            Inner::Multipart(multipart) => {
                dbg.field("content", &format_args!("{} parts", multipart.parts().len()))
            }
        };
        dbg.finish()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

/// An ordered collection of multipart parts with a boundary.
#[derive(Debug)]
pub struct Multipart {
    boundary: String,
    parts: Vec<Part>,
}

impl Multipart {
    /// A form-data collection with a random boundary.
    pub fn form_data() -> Self {
        Self::with_boundary(Uuid::new_v4().to_string())
    }

    /// A collection with an explicit boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Appends a part. Returns self for builder chaining.
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// The boundary separating the parts on the wire.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The parts in insertion order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub(crate) fn parts_mut(&mut self) -> &mut [Part] {
        &mut self.parts
    }

    /// RFC 2046 wire encoding of the parts.
    pub(crate) async fn encode(&mut self) -> Result<Bytes, BodyError> {
        let mut buffer = BytesMut::new();
        for part in &mut self.parts {
            buffer.extend_from_slice(b"--");
            buffer.extend_from_slice(self.boundary.as_bytes());
            buffer.extend_from_slice(b"\r\n");
            for (name, value) in part.headers.iter().chain(part.body.headers().iter()) {
                buffer.extend_from_slice(name.as_str().as_bytes());
                buffer.extend_from_slice(b": ");
                buffer.extend_from_slice(value.as_bytes());
                buffer.extend_from_slice(b"\r\n");
            }
            buffer.extend_from_slice(b"\r\n");
            let content = Box::pin(part.body.bytes()).await?;
            buffer.extend_from_slice(&content);
            buffer.extend_from_slice(b"\r\n");
        }
        buffer.extend_from_slice(b"--");
        buffer.extend_from_slice(self.boundary.as_bytes());
        buffer.extend_from_slice(b"--\r\n");
        Ok(buffer.freeze())
    }
}

/// One part of a multipart body: its own headers plus its own body.
#[derive(Debug)]
pub struct Part {
    headers: HeaderMap,
    body: Body,
}

impl Part {
    /// A part with explicit headers and body.
    pub fn new(headers: HeaderMap, body: Body) -> Self {
        Self { headers, body }
    }

    /// A form-data text field.
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_DISPOSITION,
            disposition(name, None),
        );
        Self {
            headers,
            body: Body::text(value),
        }
    }

    /// A form-data file field with the given content type.
    pub fn file(
        name: &str,
        filename: &str,
        content_type: HeaderValue,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_DISPOSITION,
            disposition(name, Some(filename)),
        );
        Self {
            headers,
            body: Body::from_bytes(content_type, bytes),
        }
    }

    /// The part's own headers (content-disposition and any extras).
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The part's body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Mutable access to the part's body.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

fn disposition(name: &str, filename: Option<&str>) -> HeaderValue {
    fn quote(input: &str) -> String {
        let mut quoted = String::with_capacity(input.len());
        for c in input.chars() {
            match c {
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                c if c.is_control() => {}
                c => quoted.push(c),
            }
        }
        quoted
    }

    let value = match filename {
        Some(filename) => format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            quote(name),
            quote(filename)
        ),
        None => format!("form-data; name=\"{}\"", quote(name)),
    };
    HeaderValue::from_bytes(value.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("form-data"))
}
