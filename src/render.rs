//! Raw-message rendering of requests and responses.
//!
//! Produces the near-wire textual form used for logging: start line, headers,
//! blank line, body. Rendering is non-destructive — buffered bodies are read
//! without being consumed, and one-shot streaming bodies are buffered in
//! place (see [`Body::bytes`]) so the message stays sendable afterwards.

use std::collections::HashSet;

use http::header::{HeaderMap, HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{Request, Response, Version};

use crate::body::{Body, BodyError, Inner};
use crate::mime;

const LINE_BREAK: &str = "\r\n";
const REDACTED: &str = "***";

/// Header and content handling for one direction of the exchange.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    /// Skip the body (and its content headers) entirely.
    pub ignore_content: bool,
    /// Headers omitted from the rendered output.
    pub ignore_headers: &'a HashSet<HeaderName>,
    /// Headers rendered with `***` in place of their value.
    pub redact_headers: &'a HashSet<HeaderName>,
}

/// Renders a request as `"{METHOD} {uri} HTTP/{version}"` plus headers and
/// optional body.
///
/// A one-shot streaming body that gets rendered is buffered and replaced in
/// place, leaving the request sendable. Non-text bodies render as a
/// `[media-type]` placeholder without being read at all.
pub async fn render_request(
    request: &mut Request<Body>,
    options: &RenderOptions<'_>,
) -> Result<String, BodyError> {
    let mut out = String::with_capacity(128);
    out.push_str(&format!(
        "{} {} HTTP/{}",
        request.method(),
        request.uri(),
        version_str(request.version())
    ));
    out.push_str(LINE_BREAK);
    write_headers(&mut out, request.headers(), options);
    render_content(&mut out, request.body_mut(), options).await?;
    Ok(out)
}

/// Renders a response as `"HTTP/{version} {status} {reason}"` plus headers
/// and optional body. Body handling matches [`render_request`].
pub async fn render_response(
    response: &mut Response<Body>,
    options: &RenderOptions<'_>,
) -> Result<String, BodyError> {
    let status = response.status();
    let mut out = String::with_capacity(128);
    out.push_str(&format!(
        "HTTP/{} {} {}",
        version_str(response.version()),
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    ));
    out.push_str(LINE_BREAK);
    write_headers(&mut out, response.headers(), options);
    render_content(&mut out, response.body_mut(), options).await?;
    Ok(out)
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_11 => "1.1",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn write_headers(out: &mut String, headers: &HeaderMap, options: &RenderOptions<'_>) {
    write_headers_except(out, headers, &[], options);
}

fn write_headers_except(
    out: &mut String,
    headers: &HeaderMap,
    skip: &[HeaderName],
    options: &RenderOptions<'_>,
) {
    for name in headers.keys() {
        if skip.iter().any(|skipped| skipped == name) {
            continue;
        }
        write_header(out, name, headers, options);
    }
}

fn write_header(
    out: &mut String,
    name: &HeaderName,
    headers: &HeaderMap,
    options: &RenderOptions<'_>,
) {
    if !headers.contains_key(name) || options.ignore_headers.contains(name) {
        return;
    }
    if options.redact_headers.contains(name) {
        out.push_str(&format!("{name}: {REDACTED}"));
    } else {
        let values = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!("{name}: {values}"));
    }
    out.push_str(LINE_BREAK);
}

async fn render_content(
    out: &mut String,
    body: &mut Body,
    options: &RenderOptions<'_>,
) -> Result<(), BodyError> {
    if options.ignore_content || body.is_empty() {
        return Ok(());
    }

    write_headers(out, body.headers(), options);
    out.push_str(LINE_BREAK);

    if body.is_multipart() {
        render_multipart_body(out, body, options).await
    } else {
        render_data_body(out, body).await
    }
}

/// Steps shared by plain bodies and individual multipart parts: placeholder
/// for non-text media types (stream untouched), text rendered via
/// [`Body::bytes`] (buffering one-shot streams in place).
async fn render_data_body(out: &mut String, body: &mut Body) -> Result<(), BodyError> {
    if !mime::is_text_based(body.content_type()) {
        let media_type = body.content_type().unwrap_or("unknown");
        out.push_str(&format!("[{media_type}]"));
        return Ok(());
    }
    let bytes = body.bytes().await?;
    out.push_str(&String::from_utf8_lossy(&bytes));
    Ok(())
}

async fn render_multipart_body(
    out: &mut String,
    body: &mut Body,
    options: &RenderOptions<'_>,
) -> Result<(), BodyError> {
    let Inner::Multipart(multipart) = body.inner_mut() else {
        return Ok(());
    };
    let boundary = multipart.boundary().to_owned();
    for part in multipart.parts_mut() {
        out.push_str(&format!("--{boundary}"));
        out.push_str(LINE_BREAK);
        write_header(out, &CONTENT_DISPOSITION, part.headers(), options);
        write_header(out, &CONTENT_TYPE, part.body().headers(), options);
        write_headers_except(out, part.headers(), &[CONTENT_DISPOSITION], options);
        write_headers_except(out, part.body().headers(), &[CONTENT_TYPE], options);
        out.push_str(LINE_BREAK);
        render_data_body(out, part.body_mut()).await?;
        out.push_str(LINE_BREAK);
    }
    out.push_str(&format!("--{boundary}--"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Multipart, Part};
    use bytes::Bytes;
    use futures::stream;
    use http::header::{HeaderValue, ACCEPT, AUTHORIZATION};
    use http::{Method, StatusCode};
    use tower::BoxError;

    fn no_rules() -> (HashSet<HeaderName>, HashSet<HeaderName>) {
        (HashSet::new(), HashSet::new())
    }

    fn request(body: Body) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri("http://example.com/api?q=1")
            .body(body)
            .unwrap()
    }

    #[tokio::test]
    async fn request_without_body_renders_start_line_and_headers() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: true,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let mut request = Request::builder()
            .method(Method::GET)
            .uri("http://example.com/api?q=1")
            .header(ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();

        let raw = render_request(&mut request, &options).await.unwrap();

        assert_eq!(
            raw,
            "GET http://example.com/api?q=1 HTTP/1.1\r\naccept: application/json\r\n"
        );
    }

    #[tokio::test]
    async fn response_start_line_uses_canonical_reason() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: true,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let mut response = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty())
            .unwrap();

        let raw = render_response(&mut response, &options).await.unwrap();

        assert_eq!(raw, "HTTP/1.1 404 Not Found\r\n");
    }

    #[tokio::test]
    async fn repeated_header_values_are_comma_joined() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: true,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let mut request = Request::builder()
            .uri("http://example.com/")
            .header(ACCEPT, "application/json")
            .header(ACCEPT, "text/html")
            .body(Body::empty())
            .unwrap();

        let raw = render_request(&mut request, &options).await.unwrap();

        assert!(raw.contains("accept: application/json,text/html\r\n"));
    }

    #[tokio::test]
    async fn ignored_header_is_omitted_even_when_redacted() {
        let ignore = HashSet::from([AUTHORIZATION]);
        let redact = HashSet::from([AUTHORIZATION]);
        let options = RenderOptions {
            ignore_content: true,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let mut request = Request::builder()
            .uri("http://example.com/")
            .header(AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();

        let raw = render_request(&mut request, &options).await.unwrap();

        assert!(!raw.contains("authorization"));
        assert!(!raw.contains("secret"));
    }

    #[tokio::test]
    async fn redacted_header_keeps_name_and_hides_value() {
        let ignore = HashSet::new();
        let redact = HashSet::from([AUTHORIZATION]);
        let options = RenderOptions {
            ignore_content: true,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let mut request = Request::builder()
            .uri("http://example.com/")
            .header(AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();

        let raw = render_request(&mut request, &options).await.unwrap();

        assert!(raw.contains("authorization: ***\r\n"));
        assert!(!raw.contains("secret"));
    }

    #[tokio::test]
    async fn buffered_text_body_renders_and_survives() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: false,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let mut request = request(Body::from_bytes(
            HeaderValue::from_static("application/json"),
            Bytes::from_static(b"{\"key\":\"value\"}"),
        ));

        let first = render_request(&mut request, &options).await.unwrap();
        let second = render_request(&mut request, &options).await.unwrap();

        assert!(first.contains("content-type: application/json\r\n\r\n{\"key\":\"value\"}"));
        assert_eq!(first, second);
        assert_eq!(request.body_mut().bytes().await.unwrap(), "{\"key\":\"value\"}");
    }

    #[tokio::test]
    async fn streaming_text_body_is_buffered_and_replaced() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: false,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let chunks = stream::iter(vec![
            Ok::<_, BoxError>(Bytes::from("hello ")),
            Ok(Bytes::from("world")),
        ]);
        let mut body = Body::from_stream(HeaderValue::from_static("text/plain"), chunks);
        body.headers_mut()
            .insert("content-length", HeaderValue::from_static("11"));
        let mut request = request(body);

        let raw = render_request(&mut request, &options).await.unwrap();

        assert!(raw.ends_with("\r\n\r\nhello world"));
        let body = request.body_mut();
        assert!(body.is_buffered());
        assert_eq!(body.content_type(), Some("text/plain"));
        assert_eq!(
            body.headers().get("content-length").unwrap(),
            &HeaderValue::from_static("11")
        );
        assert_eq!(body.bytes().await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn non_text_body_renders_placeholder_without_reading() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: false,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let chunks = stream::iter(vec![Ok::<_, BoxError>(Bytes::from_static(&[
            0x89, 0x50, 0x4E, 0x47,
        ]))]);
        let mut request = request(Body::from_stream(
            HeaderValue::from_static("image/png"),
            chunks,
        ));

        let raw = render_request(&mut request, &options).await.unwrap();

        assert!(raw.ends_with("\r\n\r\n[image/png]"));
        let body = request.body_mut();
        assert!(body.is_streaming());
        assert_eq!(body.bytes().await.unwrap(), &[0x89, 0x50, 0x4E, 0x47][..]);
    }

    #[tokio::test]
    async fn missing_content_type_renders_unknown_placeholder() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: false,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let mut body = Body::from_bytes(
            HeaderValue::from_static("application/json"),
            Bytes::from_static(b"{}"),
        );
        body.headers_mut().remove(http::header::CONTENT_TYPE);
        let mut request = request(body);

        let raw = render_request(&mut request, &options).await.unwrap();

        assert!(raw.ends_with("\r\n[unknown]"));
    }

    #[tokio::test]
    async fn ignored_content_stops_after_message_headers() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: true,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let mut request = request(Body::from_bytes(
            HeaderValue::from_static("application/json"),
            Bytes::from_static(b"{\"key\":\"value\"}"),
        ));

        let raw = render_request(&mut request, &options).await.unwrap();

        assert_eq!(raw, "GET http://example.com/api?q=1 HTTP/1.1\r\n");
        assert!(!raw.contains("content-type"));
    }

    #[tokio::test]
    async fn multipart_renders_boundaries_parts_and_placeholders() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: false,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let multipart = Multipart::with_boundary("boundary42")
            .part(Part::text("field1", "value1"))
            .part(Part::file(
                "file1",
                "a.png",
                HeaderValue::from_static("image/png"),
                Bytes::from_static(&[0x89, 0x50]),
            ));
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("http://example.com/upload")
            .body(Body::multipart(multipart))
            .unwrap();

        let raw = render_request(&mut request, &options).await.unwrap();

        assert_eq!(
            raw,
            "POST http://example.com/upload HTTP/1.1\r\n\
             content-type: multipart/form-data; boundary=boundary42\r\n\
             \r\n\
             --boundary42\r\n\
             content-disposition: form-data; name=\"field1\"\r\n\
             content-type: text/plain; charset=utf-8\r\n\
             \r\n\
             value1\r\n\
             --boundary42\r\n\
             content-disposition: form-data; name=\"file1\"; filename=\"a.png\"\r\n\
             content-type: image/png\r\n\
             \r\n\
             [image/png]\r\n\
             --boundary42--"
        );
    }

    #[tokio::test]
    async fn multipart_streaming_part_is_replaced_in_place() {
        let (ignore, redact) = no_rules();
        let options = RenderOptions {
            ignore_content: false,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let chunks = stream::iter(vec![Ok::<_, BoxError>(Bytes::from("streamed text"))]);
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("form-data; name=\"notes\""),
        );
        let part = Part::new(
            headers,
            Body::from_stream(HeaderValue::from_static("text/plain"), chunks),
        );
        let multipart = Multipart::with_boundary("b").part(part);
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("http://example.com/upload")
            .body(Body::multipart(multipart))
            .unwrap();

        let raw = render_request(&mut request, &options).await.unwrap();

        assert!(raw.contains("streamed text"));
        let part = &request.body().as_multipart().unwrap().parts()[0];
        assert!(part.body().is_buffered());
    }

    #[tokio::test]
    async fn multipart_part_headers_honor_redaction() {
        let ignore = HashSet::new();
        let redact = HashSet::from([HeaderName::from_static("x-part-token")]);
        let options = RenderOptions {
            ignore_content: false,
            ignore_headers: &ignore,
            redact_headers: &redact,
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("form-data; name=\"f\""),
        );
        headers.insert("x-part-token", HeaderValue::from_static("secret"));
        let part = Part::new(headers, Body::text("v"));
        let multipart = Multipart::with_boundary("b").part(part);
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("http://example.com/upload")
            .body(Body::multipart(multipart))
            .unwrap();

        let raw = render_request(&mut request, &options).await.unwrap();

        assert!(raw.contains("x-part-token: ***"));
        assert!(!raw.contains("secret"));
    }
}
