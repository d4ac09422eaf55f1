//! Route pattern parsing.
//!
//! A pattern is a `/`-separated list of segments:
//!
//! ```text
//! /users          static
//! /users/:id      `:id` binds exactly one non-empty segment
//! /files/*path    `*path` binds the rest of the path, `/` included
//! ```

use crate::error::RouteError;

/// One segment of a registered pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'p> {
    Static(&'p str),
    Param(&'p str),
    Wildcard(&'p str),
}

/// Splits a path into its first segment and the remainder after the next `/`.
///
/// `None` for the remainder means the path is exhausted. `Some("")` means the
/// path ended with a separator, which is one more (empty) segment.
pub(crate) fn split_first(rest: &str) -> (&str, Option<&str>) {
    match rest.split_once('/') {
        Some((head, tail)) => (head, Some(tail)),
        None => (rest, None),
    }
}

/// The segments of a request path, leading `/` stripped. The root `/` (or an
/// empty path) has no segments at all.
pub(crate) fn segments_of(path: &str) -> Option<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() { None } else { Some(rest) }
}

/// Parses and validates a pattern.
pub(crate) fn parse(pattern: &str) -> Result<Vec<Segment<'_>>, RouteError> {
    let body = pattern.strip_prefix('/').ok_or(RouteError::MissingLeadingSlash)?;
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    let mut names: Vec<&str> = Vec::new();

    for raw in body.split('/') {
        if let Some(Segment::Wildcard(name)) = segments.last() {
            return Err(RouteError::WildcardNotLast((*name).to_owned()));
        }

        let segment = if let Some(name) = raw.strip_prefix(':') {
            Segment::Param(name)
        } else if let Some(name) = raw.strip_prefix('*') {
            Segment::Wildcard(name)
        } else {
            Segment::Static(raw)
        };

        if let Segment::Param(name) | Segment::Wildcard(name) = segment {
            if name.is_empty() {
                return Err(RouteError::EmptyName(raw.to_owned()));
            }
            if names.contains(&name) {
                return Err(RouteError::DuplicateName(name.to_owned()));
            }
            names.push(name);
        }

        segments.push(segment);
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_segments() {
        let segments = parse("/users/:id/files/*path").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Static("users"),
                Segment::Param("id"),
                Segment::Static("files"),
                Segment::Wildcard("path"),
            ]
        );
    }

    #[test]
    fn root_has_no_segments() {
        assert!(parse("/").unwrap().is_empty());
        assert_eq!(segments_of("/"), None);
        assert_eq!(segments_of(""), None);
    }

    #[test]
    fn trailing_slash_is_an_empty_segment() {
        assert_eq!(parse("/users/").unwrap(), vec![Segment::Static("users"), Segment::Static("")]);
        assert_eq!(split_first("users/"), ("users", Some("")));
        assert_eq!(split_first(""), ("", None));
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert_eq!(parse("users"), Err(RouteError::MissingLeadingSlash));
        assert_eq!(parse("/users/:"), Err(RouteError::EmptyName(":".into())));
        assert_eq!(parse("/files/*"), Err(RouteError::EmptyName("*".into())));
        assert_eq!(
            parse("/files/*path/meta"),
            Err(RouteError::WildcardNotLast("path".into()))
        );
        assert_eq!(
            parse("/a/:id/b/:id"),
            Err(RouteError::DuplicateName("id".into()))
        );
    }
}
