//! Unified error types.

use thiserror::Error;

/// A boxed, thread-safe error. Handler faults travel as this type so the
/// original error can be recovered with `downcast_ref`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by wicket's fallible operations.
///
/// Routing misses are not errors (they reach the not-found handler) and
/// aborts are not errors either (see [`Interrupt`](crate::Interrupt)). This
/// type covers the collaborators a handler calls into.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no {0} serializer configured")]
    NoSerializer(&'static str),

    #[error("template `{0}` not found")]
    TemplateNotFound(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unknown method `{0}`")]
    UnknownMethod(String),
}

/// A construction fault raised while inserting a pattern into a path tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("pattern must start with `/`")]
    MissingLeadingSlash,

    #[error("empty parameter name in segment `{0}`")]
    EmptyName(String),

    #[error("wildcard `*{0}` must be the final segment")]
    WildcardNotLast(String),

    #[error("parameter name `{0}` used twice")]
    DuplicateName(String),

    #[error("`:{new}` conflicts with existing `:{existing}` at the same position")]
    ParamConflict { existing: String, new: String },

    #[error("`*{new}` conflicts with existing `*{existing}` at the same position")]
    WildcardConflict { existing: String, new: String },
}
