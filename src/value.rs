//! Request values: path parameters, query strings and url-encoded forms.
//!
//! Every lookup returns a [`Value`], never an `Option`. A missing key yields a
//! value carrying [`ValueError::Missing`], so conversions can fall back to a
//! default in one call:
//!
//! ```rust
//! use wicket::Value;
//!
//! assert_eq!(Value::default().int_or(7), 7);
//! assert_eq!(Value::new("42").int(), Ok(42));
//! assert_eq!(Value::new("forty-two").int_or(7), 7);
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Why a [`Value`] could not produce the requested data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("no such value")]
    Missing,

    #[error("empty value")]
    Empty,

    #[error("cannot convert `{data}`: {reason}")]
    Invalid { data: String, reason: String },
}

/// A single textual request value plus its validity marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value {
    data: String,
    err: Option<ValueError>,
}

/// All values for a repeated key, in request order.
pub type Values = Vec<Value>;

impl Value {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into(), err: None }
    }

    /// The value returned for an absent key.
    pub fn missing() -> Self {
        Self { data: String::new(), err: Some(ValueError::Missing) }
    }

    /// The raw text together with the marker, if any.
    pub fn raw(&self) -> (&str, Option<&ValueError>) {
        (&self.data, self.err.as_ref())
    }

    pub fn err(&self) -> Option<&ValueError> {
        self.err.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.err.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The text, or `""` when the value is missing.
    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn string_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.present() {
            Ok(data) => data,
            Err(_) => default,
        }
    }

    /// Parses the text as `T`, surfacing the marker or the conversion fault.
    pub fn parse<T>(&self) -> Result<T, ValueError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let data = self.present()?;
        data.parse().map_err(|e: T::Err| ValueError::Invalid {
            data: data.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Parses the text as `T`, returning `default` on any failure.
    pub fn parse_or<T>(&self, default: T) -> T
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.parse().unwrap_or(default)
    }

    pub fn int(&self) -> Result<i64, ValueError> {
        self.parse()
    }

    pub fn int_or(&self, default: i64) -> i64 {
        self.parse_or(default)
    }

    pub fn float(&self) -> Result<f64, ValueError> {
        self.parse()
    }

    pub fn float_or(&self, default: f64) -> f64 {
        self.parse_or(default)
    }

    pub fn bool(&self) -> Result<bool, ValueError> {
        self.parse()
    }

    /// Interprets the text as a unix timestamp in seconds.
    pub fn time(&self) -> Result<DateTime<Utc>, ValueError> {
        let secs = self.int()?;
        DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| ValueError::Invalid {
            data: self.data.clone(),
            reason: "timestamp out of range".to_owned(),
        })
    }

    /// Parses the text with a `chrono` format string, e.g. `"%Y-%m-%d %H:%M:%S"`.
    pub fn parse_time(&self, format: &str) -> Result<NaiveDateTime, ValueError> {
        let data = self.present()?;
        NaiveDateTime::parse_from_str(data, format).map_err(|e| ValueError::Invalid {
            data: data.to_owned(),
            reason: e.to_string(),
        })
    }

    fn present(&self) -> Result<&str, ValueError> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if self.data.is_empty() {
            return Err(ValueError::Empty);
        }
        Ok(&self.data)
    }
}

impl From<&str> for Value {
    fn from(data: &str) -> Self {
        Self::new(data)
    }
}

impl From<String> for Value {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

// ── Params ────────────────────────────────────────────────────────────────────

/// Path parameters bound by the router, in pattern order.
///
/// For `/users/:id` matched against `/users/42`, `params.get("id")` is `"42"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, name: &str) -> Value {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| Value::new(v.as_str()))
            .unwrap_or_else(Value::missing)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ── Query ─────────────────────────────────────────────────────────────────────

/// Decoded `application/x-www-form-urlencoded` pairs: a query string or a
/// form body. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn parse(input: &[u8]) -> Self {
        Self(url::form_urlencoded::parse(input).into_owned().collect())
    }

    /// The first value for `key`.
    pub fn get(&self, key: &str) -> Value {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| Value::new(v.as_str()))
            .unwrap_or_else(Value::missing)
    }

    pub fn get_all(&self, key: &str) -> Values {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| Value::new(v.as_str()))
            .collect()
    }

    /// The first value for `key`, or `default` when the key is absent.
    pub fn get_or(&self, key: &str, default: &str) -> Value {
        match self.0.iter().find(|(k, _)| k == key) {
            Some((_, v)) => Value::new(v.as_str()),
            None => Value::new(default),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_value_falls_back_to_default() {
        assert_eq!(Value::default().int_or(7), 7);
        assert_eq!(Value::missing().int_or(7), 7);
        assert_eq!(Value::missing().float_or(1.5), 1.5);
        assert_eq!(Value::missing().string_or("anon"), "anon");
    }

    #[test]
    fn set_value_converts() {
        assert_eq!(Value::new("42").int(), Ok(42));
        assert_eq!(Value::new("2.5").float(), Ok(2.5));
        assert_eq!(Value::new("true").bool(), Ok(true));
        assert_eq!(Value::new("bob").string_or("anon"), "bob");
    }

    #[test]
    fn conversion_fault_surfaces_without_default() {
        assert_eq!(Value::missing().int(), Err(ValueError::Missing));
        assert_eq!(Value::default().int(), Err(ValueError::Empty));
        assert!(matches!(Value::new("abc").int(), Err(ValueError::Invalid { .. })));
        assert_eq!(Value::new("abc").int_or(3), 3);
    }

    #[test]
    fn time_values() {
        let t = Value::new("86400").time().unwrap();
        assert_eq!(t.timestamp(), 86_400);

        let t = Value::new("2024-03-01 12:30:00")
            .parse_time("%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(t.to_string(), "2024-03-01 12:30:00");
        assert!(Value::missing().parse_time("%Y").is_err());
    }

    #[test]
    fn params_lookup() {
        let params: Params = [("id", "42"), ("name", "ann")].into_iter().collect();
        assert_eq!(params.get("id").int(), Ok(42));
        assert_eq!(params.get("name").as_str(), "ann");
        assert_eq!(params.get("nope").err(), Some(&ValueError::Missing));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn query_decoding() {
        let q = Query::parse(b"tag=a&tag=b%20c&page=2&q=x+y");
        assert_eq!(q.get("page").int(), Ok(2));
        assert_eq!(q.get("q").as_str(), "x y");
        assert_eq!(
            q.get_all("tag").iter().map(Value::as_str).collect::<Vec<_>>(),
            vec!["a", "b c"]
        );
        assert!(!q.get("missing").is_valid());
        assert_eq!(q.get_or("limit", "10").int(), Ok(10));
        assert_eq!(q.get_or("page", "10").int(), Ok(2));
    }
}
