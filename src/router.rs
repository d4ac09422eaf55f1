//! Per-method request router.
//!
//! One [`Tree`] per HTTP method. Patterns go in at start-up, chains come out
//! at request time. Route faults are programming errors and abort start-up.

use std::collections::HashMap;

use crate::handler::Chain;
use crate::method::Method;
use crate::tree::Tree;
use crate::value::Params;

/// The routing table: one path tree per method.
///
/// Usually built for you by [`Engine::build`](crate::Engine::build); using it
/// directly is handy for tests and custom front-ends.
#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<Method, Tree<Chain>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Registers `chain` for `method` + `pattern`. A repeated pattern replaces
    /// the earlier chain.
    ///
    /// # Panics
    ///
    /// Panics on a malformed pattern or one that conflicts with an existing
    /// route (for example `/users/:id` next to `/users/:name`).
    pub fn insert(&mut self, method: Method, pattern: &str, chain: Chain) {
        self.routes
            .entry(method)
            .or_default()
            .insert(pattern, chain)
            .unwrap_or_else(|e| panic!("invalid route `{method} {pattern}`: {e}"));
    }

    /// The chain registered for the most specific pattern matching `path`,
    /// with the parameters it bound.
    pub fn lookup(&self, method: Method, path: &str) -> Option<(&Chain, Params)> {
        self.routes.get(&method)?.lookup(path)
    }

    /// Number of registered (method, pattern) pairs.
    pub fn len(&self) -> usize {
        self.routes.values().map(Tree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn noop(_: &mut Context) {}

    fn chain() -> Chain {
        Chain::new().then(noop)
    }

    #[test]
    fn methods_are_independent() {
        let get = chain();
        let post = chain();
        let mut router = Router::new();
        router.insert(Method::Get, "/users/:id", get.clone());
        router.insert(Method::Post, "/users/:id", post.clone());

        let (found, params) = router.lookup(Method::Get, "/users/3").unwrap();
        assert!(found.ptr_eq(&get));
        assert_eq!(params.get("id").int(), Ok(3));

        let (found, _) = router.lookup(Method::Post, "/users/3").unwrap();
        assert!(found.ptr_eq(&post));

        assert!(router.lookup(Method::Delete, "/users/3").is_none());
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn last_registration_wins() {
        let first = chain();
        let second = chain();
        let mut router = Router::new();
        router.insert(Method::Get, "/", first);
        router.insert(Method::Get, "/", second.clone());

        let (found, _) = router.lookup(Method::Get, "/").unwrap();
        assert!(found.ptr_eq(&second));
        assert_eq!(router.len(), 1);
    }

    #[test]
    #[should_panic(expected = "invalid route `GET /users/:name`")]
    fn conflicting_param_panics() {
        let mut router = Router::new();
        router.insert(Method::Get, "/users/:id", chain());
        router.insert(Method::Get, "/users/:name", chain());
    }

    #[test]
    #[should_panic(expected = "must be the final segment")]
    fn inner_wildcard_panics() {
        Router::new().insert(Method::Get, "/files/*path/meta", chain());
    }
}
