//! Incoming HTTP request type.

use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderValue, IntoHeaderName};

use crate::method::Method;
use crate::value::{Query, Value};

/// An incoming HTTP request with its body fully read.
#[derive(Debug, Clone)]
pub struct Request {
    method: http::Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
}

impl Request {
    /// A request for `target`, which may carry a query string
    /// (`/search?q=rust`).
    ///
    /// `method` is a [`Method`] or any `http::Method`, including extension
    /// methods no route can match.
    pub fn new(method: impl Into<http::Method>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };
        Self {
            method: method.into(),
            path: path.to_owned(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    pub(crate) fn from_parts(
        method: http::Method,
        uri: &http::Uri,
        headers: HeaderMap,
        body: Bytes,
        remote_addr: SocketAddr,
    ) -> Self {
        Self {
            method,
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            headers,
            body,
            remote_addr: Some(remote_addr),
        }
    }

    pub fn with_header(mut self, name: impl IntoHeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// The method as received.
    pub fn method(&self) -> &http::Method { &self.method }

    /// The method as a routable [`Method`]; `None` for extension methods
    /// such as `PURGE`.
    pub fn route_method(&self) -> Option<Method> {
        Method::try_from(&self.method).ok()
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn raw_query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Header lookup; `None` if absent or not valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The decoded query string.
    pub fn query(&self) -> Query {
        self.query
            .as_deref()
            .map(|q| Query::parse(q.as_bytes()))
            .unwrap_or_default()
    }

    /// The decoded body of an `application/x-www-form-urlencoded` request.
    /// Empty for any other content type.
    pub fn form(&self) -> Query {
        let is_form = self
            .header(header::CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        if is_form { Query::parse(&self.body) } else { Query::default() }
    }

    /// A cookie sent in the `Cookie` header(s).
    pub fn cookie(&self, name: &str) -> Value {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| Value::new(v))
            .unwrap_or_else(Value::missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_target() {
        let req = Request::new(Method::Get, "/search?q=rust+lang&page=2");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.raw_query(), Some("q=rust+lang&page=2"));
        assert_eq!(req.query().get("q").as_str(), "rust lang");
        assert_eq!(req.query().get("page").int(), Ok(2));

        let req = Request::new(Method::Get, "/plain");
        assert!(req.query().is_empty());
    }

    #[test]
    fn extension_methods_are_kept_but_not_routable() {
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        let req = Request::new(purge.clone(), "/cache");
        assert_eq!(req.method(), &purge);
        assert_eq!(req.route_method(), None);

        let req = Request::new(Method::Patch, "/cache");
        assert_eq!(req.method(), &http::Method::PATCH);
        assert_eq!(req.route_method(), Some(Method::Patch));
    }

    #[test]
    fn form_requires_content_type() {
        let body = "name=ann&tags=a&tags=b";
        let plain = Request::new(Method::Post, "/f").with_body(body);
        assert!(plain.form().is_empty());

        let form = plain.with_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        assert_eq!(form.form().get("name").as_str(), "ann");
        assert_eq!(form.form().get_all("tags").len(), 2);
    }

    #[test]
    fn cookies() {
        let req = Request::new(Method::Get, "/")
            .with_header(header::COOKIE, HeaderValue::from_static("a=1; session=xyz"))
            .with_header(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(req.cookie("session").as_str(), "xyz");
        assert_eq!(req.cookie("theme").as_str(), "dark");
        assert!(!req.cookie("nope").is_valid());
    }
}
