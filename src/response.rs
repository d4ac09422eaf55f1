//! Outgoing HTTP response.
//!
//! Every [`Context`](crate::Context) owns one [`Response`] that handlers write
//! into. When the chain finishes, the server sends whatever it holds.

use std::path::Path;

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;

use crate::error::Error;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Css,          // text/css
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    FormData,     // application/x-www-form-urlencoded
    Gif,          // image/gif
    Html,         // text/html; charset=utf-8
    Javascript,   // text/javascript; charset=utf-8
    Jpeg,         // image/jpeg
    Json,         // application/json
    OctetStream,  // application/octet-stream  (binary / file download)
    Pdf,          // application/pdf
    Png,          // image/png
    Svg,          // image/svg+xml
    Text,         // text/plain; charset=utf-8
    Wasm,         // application/wasm
    Xml,          // text/xml; charset=utf-8
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Css         => "text/css",
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Gif         => "image/gif",
            Self::Html        => "text/html; charset=utf-8",
            Self::Javascript  => "text/javascript; charset=utf-8",
            Self::Jpeg        => "image/jpeg",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Png         => "image/png",
            Self::Svg         => "image/svg+xml",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Wasm        => "application/wasm",
            Self::Xml         => "text/xml; charset=utf-8",
        }
    }

    /// Guesses from the file extension; `OctetStream` when unknown.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("css")                 => Self::Css,
            Some("csv")                 => Self::Csv,
            Some("gif")                 => Self::Gif,
            Some("htm" | "html")        => Self::Html,
            Some("js" | "mjs")          => Self::Javascript,
            Some("jpg" | "jpeg")        => Self::Jpeg,
            Some("json")                => Self::Json,
            Some("pdf")                 => Self::Pdf,
            Some("png")                 => Self::Png,
            Some("svg")                 => Self::Svg,
            Some("txt" | "md")          => Self::Text,
            Some("wasm")                => Self::Wasm,
            Some("xml")                 => Self::Xml,
            _                           => Self::OctetStream,
        }
    }

    fn header_value(&self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response, `200 OK` with no body until a handler says
/// otherwise.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    pub fn new() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// Response with no body.
    pub fn with_status(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Vec::new() }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Sets `name` to `value`, replacing any previous values.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Adds a `Set-Cookie` header. `cookie` is the full attribute string,
    /// e.g. `"session=abc; Path=/; HttpOnly"`.
    pub fn set_cookie(&mut self, cookie: &str) -> Result<(), Error> {
        let value = HeaderValue::from_str(cookie)
            .map_err(|e| Error::InvalidHeader(format!("set-cookie: {e}")))?;
        self.headers.append(header::SET_COOKIE, value);
        Ok(())
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.headers.insert(header::CONTENT_TYPE, content_type.header_value());
    }

    /// Appends to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Replaces status, content type and body in one go.
    pub fn send(&mut self, status: StatusCode, content_type: ContentType, body: impl Into<Vec<u8>>) {
        self.status = status;
        self.set_content_type(content_type);
        self.body = body.into();
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), Error> {
    let parsed_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
    let parsed_value = HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
    Ok((parsed_name, parsed_value))
}
