//! Media type classification for body rendering.
//!
//! Decides whether a body is rendered as text in the raw message or replaced
//! by a `[media-type]` placeholder. The allow-list below is a best-effort
//! compatibility table; membership only changes how a body is displayed.

/// Media types rendered as text in addition to everything matched by the
/// `text/` prefix and the `+json`/`+xml`/`+yaml` suffixes.
const TEXT_MEDIA_TYPES: &[&str] = &[
    // Generic plaintext
    "text/plain",
    "text/csv",
    "text/tab-separated-values",
    "text/markdown",
    "text/rtf",
    // Web content and scripting
    "text/html",
    "text/css",
    "text/javascript",
    "text/ecmascript",
    "text/jscript",
    "text/livescript",
    "application/javascript",
    // Structured data formats
    "application/json",
    "application/xml",
    "application/yaml",
    "application/ld+json",
    "application/vnd.api+json",
    "application/manifest+json",
    "image/svg+xml",
    "application/atom+xml",
    "application/rss+xml",
    "application/xhtml+xml",
    "application/app+yaml",
    "application/kubernetes+yaml",
    "application/ansible+yaml",
    // Calendar and contact formats
    "text/calendar",
    "text/vcard",
    "text/x-vcard",
    // Form-encoded data
    "application/x-www-form-urlencoded",
    // Other text-based formats
    "text/enriched",
    "text/h323",
    "text/prs.lines.tag",
    "text/richtext",
    "text/sgml",
    "text/uri-list",
    "text/vnd.abc",
    "text/vnd.curl",
    "text/vnd.curl.dcurl",
    "text/vnd.curl.mcurl",
    "text/vnd.curl.scurl",
    "text/vnd.fly",
    "text/vnd.fmi.flexstor",
    "text/vnd.graphviz",
    "text/vnd.in3d.3dml",
    "text/vnd.in3d.spot",
    "text/vnd.sun.j2me.app-descriptor",
    "text/vnd.wap.wml",
    "text/vnd.wap.wmlscript",
    "text/x-asm",
    "text/x-c",
    "text/x-component",
    "text/x-fortran",
    "text/x-java-source",
    "text/x-pascal",
    "text/x-script",
    "text/x-script.csh",
    "text/x-script.elisp",
    "text/x-script.ksh",
    "text/x-script.lisp",
    "text/x-script.perl",
    "text/x-script.perl-module",
    "text/x-script.phyton",
    "text/x-script.rexx",
    "text/x-script.scheme",
    "text/x-script.sh",
    "text/x-script.tcl",
    "text/x-script.tcsh",
    "text/x-script.zsh",
    "text/x-server-parsed-html",
    "text/x-setext",
    "text/x-speech",
    "text/x-uuencode",
    "text/x-vcalendar",
];

/// Returns true when the given media type represents a text-based format.
///
/// Parameters after the first `;` are ignored, as is surrounding whitespace;
/// matching is case-insensitive. `None`, empty and all-whitespace inputs are
/// not text-based.
///
/// # Examples
///
/// ```rust
/// use wiretap::mime::is_text_based;
///
/// assert!(is_text_based(Some("application/json; charset=utf-8")));
/// assert!(is_text_based(Some("application/problem+json")));
/// assert!(!is_text_based(Some("image/png")));
/// assert!(!is_text_based(None));
/// ```
pub fn is_text_based(media_type: Option<&str>) -> bool {
    let Some(media_type) = media_type else {
        return false;
    };

    let normalized = media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if normalized.is_empty() {
        return false;
    }

    normalized.starts_with("text/")
        || normalized.ends_with("+json")
        || normalized.ends_with("+xml")
        || normalized.ends_with("+yaml")
        || TEXT_MEDIA_TYPES.contains(&normalized.as_str())
}
