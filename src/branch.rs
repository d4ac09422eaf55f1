//! Route registration.
//!
//! Registrations are only recorded here. Nothing touches a path tree until
//! [`Engine::build`](crate::Engine::build) inserts every record at once, which
//! is what lets branches be composed freely with [`Routes::include`].

use std::collections::HashMap;

use crate::handler::{Chain, IntoChain};
use crate::method::Method;

/// One recorded registration: the full pattern and its complete chain.
#[derive(Clone, Debug)]
pub(crate) struct Record {
    pub(crate) pattern: String,
    pub(crate) chain: Chain,
}

/// A group of routes sharing a path prefix and middleware.
///
/// ```rust
/// use wicket::{Branch, Context, Flow, Routes};
///
/// fn auth(ctx: &mut Context) -> Flow { ctx.next() }
/// fn list(ctx: &mut Context) { ctx.text("[]") }
/// fn show(ctx: &mut Context) { ctx.text(ctx.param("id").to_string()) }
///
/// let users = Branch::new()
///     .wrap(auth)
///     .get("/users", list)
///     .get("/users/:id", show);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Branch {
    routes: HashMap<Method, Vec<Record>>,
    middleware: Chain,
    prefix: String,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepended to every pattern registered afterwards.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Adds middleware that runs before the handlers of every route
    /// registered afterwards. Earlier routes are not affected.
    pub fn wrap(mut self, middleware: impl IntoChain) -> Self {
        self.middleware.extend(&middleware.into_chain());
        self
    }

    /// Number of recorded registrations, across all methods.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn push(&mut self, method: Method, path: &str, chain: Chain) {
        let record = Record {
            pattern: format!("{}{}", self.prefix, path),
            chain: self.middleware.join(&chain),
        };
        self.routes.entry(method).or_default().push(record);
    }

    /// Records per method, each list in registration order.
    pub(crate) fn into_records(self) -> impl Iterator<Item = (Method, Record)> {
        self.routes
            .into_iter()
            .flat_map(|(method, records)| records.into_iter().map(move |r| (method, r)))
    }

    #[cfg(test)]
    pub(crate) fn patterns(&self, method: Method) -> Vec<&str> {
        self.routes
            .get(&method)
            .map(|rs| rs.iter().map(|r| r.pattern.as_str()).collect())
            .unwrap_or_default()
    }
}

/// The registration surface shared by [`Branch`] and [`Engine`](crate::Engine).
///
/// Every method records a route and returns `self`, so registrations chain.
/// A route's chain is a single handler, a tuple of handlers, or a [`Chain`].
pub trait Routes: Sized {
    #[doc(hidden)]
    fn branch_mut(&mut self) -> &mut Branch;

    fn handle(mut self, method: Method, path: &str, chain: impl IntoChain) -> Self {
        self.branch_mut().push(method, path, chain.into_chain());
        self
    }

    fn get(self, path: &str, chain: impl IntoChain) -> Self {
        self.handle(Method::Get, path, chain)
    }

    fn post(self, path: &str, chain: impl IntoChain) -> Self {
        self.handle(Method::Post, path, chain)
    }

    fn put(self, path: &str, chain: impl IntoChain) -> Self {
        self.handle(Method::Put, path, chain)
    }

    fn patch(self, path: &str, chain: impl IntoChain) -> Self {
        self.handle(Method::Patch, path, chain)
    }

    fn delete(self, path: &str, chain: impl IntoChain) -> Self {
        self.handle(Method::Delete, path, chain)
    }

    fn head(self, path: &str, chain: impl IntoChain) -> Self {
        self.handle(Method::Head, path, chain)
    }

    fn options(self, path: &str, chain: impl IntoChain) -> Self {
        self.handle(Method::Options, path, chain)
    }

    /// Registers the same chain for every method in [`Method::ANY`].
    fn any(mut self, path: &str, chain: impl IntoChain) -> Self {
        let chain = chain.into_chain();
        for method in Method::ANY {
            self.branch_mut().push(method, path, chain.clone());
        }
        self
    }

    /// Re-registers every route of `branch` here under `prefix`.
    ///
    /// Each route keeps its own chain, including the middleware `branch` had
    /// wrapped it in; this side's prefix and middleware are applied on top.
    fn include(mut self, prefix: &str, branch: Branch) -> Self {
        for (method, record) in branch.into_records() {
            let path = format!("{prefix}{}", record.pattern);
            self.branch_mut().push(method, &path, record.chain);
        }
        self
    }
}

impl Routes for Branch {
    fn branch_mut(&mut self) -> &mut Branch {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn noop(_: &mut Context) {}

    #[test]
    fn prefix_applies_to_later_routes() {
        let b = Branch::new().get("/a", noop).prefix("/v1").get("/b", noop);
        assert_eq!(b.patterns(Method::Get), ["/a", "/v1/b"]);
    }

    #[test]
    fn middleware_is_prepended_at_registration() {
        let b = Branch::new()
            .get("/open", noop)
            .wrap(noop)
            .get("/guarded", (noop, noop));

        let records: HashMap<String, usize> = b
            .into_records()
            .map(|(_, r)| (r.pattern, r.chain.len()))
            .collect();
        assert_eq!(records["/open"], 1);
        assert_eq!(records["/guarded"], 3);
    }

    #[test]
    fn any_covers_every_routable_method() {
        let b = Branch::new().any("/ping", noop);
        assert_eq!(b.len(), Method::ANY.len());
        for m in Method::ANY {
            assert_eq!(b.patterns(m), ["/ping"]);
        }
        assert!(b.patterns(Method::Connect).is_empty());
    }

    #[test]
    fn include_prefixes_and_keeps_chains() {
        let users = Branch::new()
            .wrap(noop)
            .get("/users", noop)
            .post("/users", (noop, noop));
        let api = Branch::new().prefix("/api").wrap(noop).include("/v1", users);

        assert_eq!(api.patterns(Method::Get), ["/api/v1/users"]);
        assert_eq!(api.patterns(Method::Post), ["/api/v1/users"]);

        let chains: Vec<usize> = api.into_records().map(|(_, r)| r.chain.len()).collect();
        let mut chains = chains;
        chains.sort();
        // outer middleware + inner middleware + handlers
        assert_eq!(chains, [3, 4]);
    }
}
