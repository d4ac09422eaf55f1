//! Segment tree with static, param and wildcard edges.
//!
//! Every node owns three kinds of children:
//!
//! ```text
//! statics   exact segment text, one child per distinct text
//! param     at most one `:name` child, binds a single non-empty segment
//! wildcard  at most one `*name` child, binds the rest of the path
//! ```
//!
//! Lookup tries them in that order at every node and backtracks when a branch
//! dead-ends, so `/users/active` beats `/users/:id` for the literal path while
//! `/users/active/posts` can still fall through to `/users/:id/posts`.
//!
//! Static siblings are kept sorted by priority (the number of values stored
//! beneath them) so busy branches are scanned first. Ties keep insertion order.

use crate::error::RouteError;
use crate::pattern::{self, Segment};
use crate::value::Params;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Root,
    Static(Box<str>),
    Param(Box<str>),
    Wildcard(Box<str>),
}

impl Kind {
    fn label(&self) -> &str {
        match self {
            Self::Root => "",
            Self::Static(s) | Self::Param(s) | Self::Wildcard(s) => s,
        }
    }
}

#[derive(Debug)]
struct Node<T> {
    kind: Kind,
    priority: u32,
    value: Option<T>,
    statics: Vec<Node<T>>,
    param: Option<Box<Node<T>>>,
    wildcard: Option<Box<Node<T>>>,
}

/// A path tree mapping patterns to values of type `T`.
///
/// Build it completely, then share it read-only. Inserting while other
/// threads look up is not supported; the router freezes its trees by moving
/// them into the immutable [`App`](crate::App).
#[derive(Debug)]
pub struct Tree<T> {
    root: Node<T>,
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self { root: Node::new(Kind::Root) }
    }

    /// Stores `value` under `pattern`. Inserting an existing pattern again
    /// replaces its value.
    pub fn insert(&mut self, pattern: &str, value: T) -> Result<(), RouteError> {
        let segments = pattern::parse(pattern)?;
        self.root.insert(&segments, value)?;
        Ok(())
    }

    /// Resolves `path` to the most specific stored value and the parameters
    /// bound on the way.
    pub fn lookup(&self, path: &str) -> Option<(&T, Params)> {
        let mut bound = Vec::new();
        let rest = pattern::segments_of(path);
        let value = match self.root.lookup(rest, &mut bound) {
            Some(value) => value,
            // `/` has no segments, but a root wildcard still matches it with
            // an empty remainder, like `/files/` does for `/files/*p`.
            None if rest.is_none() => self.root.wildcard_tail("", &mut bound)?,
            None => return None,
        };
        Some((value, bound.into_iter().collect()))
    }

    /// Number of stored patterns.
    pub fn len(&self) -> usize {
        self.root.priority as usize
    }

    pub fn is_empty(&self) -> bool {
        self.root.priority == 0
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Node<T> {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            priority: 0,
            value: None,
            statics: Vec::new(),
            param: None,
            wildcard: None,
        }
    }

    /// Returns `true` when a new value slot was filled, `false` on overwrite.
    ///
    /// Conflicts can only be detected on nodes that already exist, and those
    /// are checked before anything is created below them, so a failed insert
    /// leaves the tree unchanged.
    fn insert(&mut self, segments: &[Segment<'_>], value: T) -> Result<bool, RouteError> {
        let Some((first, rest)) = segments.split_first() else {
            let fresh = self.value.replace(value).is_none();
            if fresh {
                self.priority += 1;
            }
            return Ok(fresh);
        };

        let fresh = match *first {
            Segment::Static(text) => {
                let idx = match self.statics.iter().position(|c| c.kind.label() == text) {
                    Some(idx) => idx,
                    None => {
                        self.statics.push(Node::new(Kind::Static(text.into())));
                        self.statics.len() - 1
                    }
                };
                let fresh = self.statics[idx].insert(rest, value)?;
                if fresh {
                    self.promote(idx);
                }
                fresh
            }
            Segment::Param(name) => {
                let child = self
                    .param
                    .get_or_insert_with(|| Box::new(Node::new(Kind::Param(name.into()))));
                if child.kind.label() != name {
                    return Err(RouteError::ParamConflict {
                        existing: child.kind.label().to_owned(),
                        new: name.to_owned(),
                    });
                }
                child.insert(rest, value)?
            }
            Segment::Wildcard(name) => {
                let child = self
                    .wildcard
                    .get_or_insert_with(|| Box::new(Node::new(Kind::Wildcard(name.into()))));
                if child.kind.label() != name {
                    return Err(RouteError::WildcardConflict {
                        existing: child.kind.label().to_owned(),
                        new: name.to_owned(),
                    });
                }
                // `pattern::parse` guarantees the wildcard is last.
                child.insert(rest, value)?
            }
        };

        if fresh {
            self.priority += 1;
        }
        Ok(fresh)
    }

    /// Moves a static child left past every sibling with a lower priority.
    fn promote(&mut self, mut idx: usize) {
        while idx > 0 && self.statics[idx - 1].priority < self.statics[idx].priority {
            self.statics.swap(idx - 1, idx);
            idx -= 1;
        }
    }

    fn lookup<'t, 'p>(
        &'t self,
        rest: Option<&'p str>,
        bound: &mut Vec<(&'t str, &'p str)>,
    ) -> Option<&'t T> {
        let Some(rest) = rest else {
            return self.value.as_ref();
        };
        let (head, tail) = pattern::split_first(rest);

        if let Some(child) = self.statics.iter().find(|c| c.kind.label() == head) {
            if let Some(found) = child.lookup(tail, bound) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param {
            if !head.is_empty() {
                let mark = bound.len();
                bound.push((child.kind.label(), head));
                if let Some(found) = child.lookup(tail, bound) {
                    return Some(found);
                }
                bound.truncate(mark);
            }
        }

        self.wildcard_tail(rest, bound)
    }

    /// Binds `rest` to the wildcard child, if it holds a value.
    fn wildcard_tail<'t, 'p>(
        &'t self,
        rest: &'p str,
        bound: &mut Vec<(&'t str, &'p str)>,
    ) -> Option<&'t T> {
        let child = self.wildcard.as_deref()?;
        let value = child.value.as_ref()?;
        bound.push((child.kind.label(), rest));
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(patterns: &[&'static str]) -> Tree<&'static str> {
        let mut tree = Tree::new();
        for p in patterns {
            tree.insert(p, *p).unwrap();
        }
        tree
    }

    fn hit(tree: &Tree<&'static str>, path: &str) -> Option<(&'static str, Vec<(String, String)>)> {
        tree.lookup(path).map(|(v, params)| {
            let params = params.iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect();
            (*v, params)
        })
    }

    fn bag(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn static_patterns_match_literally() {
        let patterns = ["/", "/users", "/users/new", "/about/team", "/a/b/c/d"];
        let t = tree(&patterns);
        for p in patterns {
            assert_eq!(hit(&t, p), Some((p, vec![])));
        }
        assert_eq!(hit(&t, "/users/old"), None);
        assert_eq!(hit(&t, "/about"), None);
    }

    #[test]
    fn static_beats_param() {
        let t = tree(&["/users/active", "/users/:id"]);
        assert_eq!(hit(&t, "/users/active"), Some(("/users/active", vec![])));
        assert_eq!(hit(&t, "/users/42"), Some(("/users/:id", bag(&[("id", "42")]))));
    }

    #[test]
    fn wildcard_captures_remainder() {
        let t = tree(&["/files/*path"]);
        assert_eq!(
            hit(&t, "/files/a/b/c"),
            Some(("/files/*path", bag(&[("path", "a/b/c")])))
        );
        assert_eq!(hit(&t, "/files/"), Some(("/files/*path", bag(&[("path", "")]))));
        assert_eq!(hit(&t, "/files"), None);
    }

    #[test]
    fn root_wildcard_matches_root() {
        let t = tree(&["/files/*p", "/*rest"]);
        assert_eq!(hit(&t, "/"), Some(("/*rest", bag(&[("rest", "")]))));
        assert_eq!(hit(&t, "/index.html"), Some(("/*rest", bag(&[("rest", "index.html")]))));
        assert_eq!(hit(&t, "/files/"), Some(("/files/*p", bag(&[("p", "")]))));

        let rooted = tree(&["/", "/*rest"]);
        assert_eq!(hit(&rooted, "/"), Some(("/", vec![])));

        assert_eq!(hit(&tree(&["/files/*p"]), "/"), None);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let forward = tree(&["/a/:x", "/a/b"]);
        let reverse = tree(&["/a/b", "/a/:x"]);
        for path in ["/a/b", "/a/z"] {
            assert_eq!(hit(&forward, path), hit(&reverse, path));
        }
        assert_eq!(hit(&forward, "/a/b"), Some(("/a/b", vec![])));
        assert_eq!(hit(&forward, "/a/z"), Some(("/a/:x", bag(&[("x", "z")]))));
    }

    #[test]
    fn backtracks_from_static_dead_end() {
        let t = tree(&["/users/active", "/users/:id/posts"]);
        assert_eq!(
            hit(&t, "/users/active/posts"),
            Some(("/users/:id/posts", bag(&[("id", "active")])))
        );
    }

    #[test]
    fn backtracks_to_wildcard_and_drops_stale_bindings() {
        let t = tree(&["/static/css/site.css", "/static/:dir/index", "/static/*file"]);
        assert_eq!(hit(&t, "/static/css/site.css"), Some(("/static/css/site.css", vec![])));
        assert_eq!(
            hit(&t, "/static/css/other.css"),
            Some(("/static/*file", bag(&[("file", "css/other.css")])))
        );
        assert_eq!(
            hit(&t, "/static/js/index"),
            Some(("/static/:dir/index", bag(&[("dir", "js")])))
        );
    }

    #[test]
    fn params_bind_in_order() {
        let t = tree(&["/orgs/:org/repos/:repo/*rest"]);
        assert_eq!(
            hit(&t, "/orgs/rust/repos/cargo/tree/main/src"),
            Some((
                "/orgs/:org/repos/:repo/*rest",
                bag(&[("org", "rust"), ("repo", "cargo"), ("rest", "tree/main/src")])
            ))
        );
    }

    #[test]
    fn param_needs_a_non_empty_segment() {
        let t = tree(&["/users/:id"]);
        assert_eq!(hit(&t, "/users/"), None);
        assert_eq!(hit(&t, "/users"), None);
        assert_eq!(hit(&t, "/users/7/"), None);
    }

    #[test]
    fn trailing_slash_is_distinct() {
        let t = tree(&["/docs", "/docs/"]);
        assert_eq!(hit(&t, "/docs"), Some(("/docs", vec![])));
        assert_eq!(hit(&t, "/docs/"), Some(("/docs/", vec![])));
    }

    #[test]
    fn reinsert_overwrites() {
        let mut t = Tree::new();
        t.insert("/x/:id", 1).unwrap();
        t.insert("/x/:id", 2).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.lookup("/x/9").map(|(v, _)| *v), Some(2));
    }

    #[test]
    fn conflicting_names_are_rejected() {
        let mut t = Tree::new();
        t.insert("/users/:id", 1).unwrap();
        assert_eq!(
            t.insert("/users/:name/posts", 2),
            Err(RouteError::ParamConflict { existing: "id".into(), new: "name".into() })
        );

        t.insert("/files/*path", 3).unwrap();
        assert_eq!(
            t.insert("/files/*rest", 4),
            Err(RouteError::WildcardConflict { existing: "path".into(), new: "rest".into() })
        );
        assert_eq!(t.len(), 2);
        assert_eq!(t.lookup("/users/5/posts"), None);
    }

    #[test]
    fn param_and_wildcard_share_a_parent() {
        let t = tree(&["/f/:name", "/f/*rest"]);
        assert_eq!(hit(&t, "/f/x"), Some(("/f/:name", bag(&[("name", "x")]))));
        assert_eq!(hit(&t, "/f/x/y"), Some(("/f/*rest", bag(&[("rest", "x/y")]))));
    }

    #[test]
    fn misses_are_repeatable_and_side_effect_free() {
        let t = tree(&["/a", "/b/:id"]);
        for _ in 0..3 {
            assert_eq!(hit(&t, "/c"), None);
            assert_eq!(hit(&t, "/b"), None);
        }
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn busier_static_branches_come_first() {
        let t = tree(&["/a/x", "/b/1", "/b/2"]);
        let order: Vec<_> = t.root.statics.iter().map(|c| c.kind.label()).collect();
        assert_eq!(order, vec!["b", "a"]);
        assert_eq!(t.root.priority, 3);
    }
}
