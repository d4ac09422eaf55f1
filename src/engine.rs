//! The dispatch facade.
//!
//! An [`Engine`] collects routes, interceptors and pluggable services. Calling
//! [`Engine::build`] freezes it into an [`App`], which is what the
//! [`Server`](crate::Server) shares across connections. Nothing can be
//! registered on an `App`, so the routing table is never mutated while
//! requests are in flight.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::branch::{Branch, Routes};
use crate::codec::{JsonSerializer, Serializer};
use crate::context::{Context, Exit, NoopExit};
use crate::data::Data;
use crate::error::BoxError;
use crate::fs::{self, FILEPATH_PARAM};
use crate::handler::{Chain, IntoChain};
use crate::method::Method;
use crate::middleware;
use crate::render::{HtmlRender, Templates};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::starter::{RouteTable, Starter};
use crate::storage::{FileStorage, FileSystemStorage};

/// Services every request of one engine shares.
pub(crate) struct Shared {
    pub(crate) abort: Arc<dyn Exit>,
    pub(crate) json: Arc<dyn Serializer>,
    pub(crate) xml: Option<Arc<dyn Serializer>>,
    pub(crate) render: Arc<dyn HtmlRender>,
    pub(crate) storage: Arc<dyn FileStorage>,
    pub(crate) warehouse: Arc<Data>,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            abort: Arc::new(NoopExit),
            json: Arc::new(JsonSerializer),
            xml: None,
            render: Arc::new(Templates::new()),
            storage: Arc::new(FileSystemStorage),
            warehouse: Arc::new(Data::new()),
        }
    }
}

/// The default not-found handler: a plain-text `404`.
pub fn not_found(ctx: &mut Context) {
    fs::write_not_found(ctx.response_mut());
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Builder for an [`App`].
///
/// ```rust
/// use wicket::{Context, Engine, Routes};
///
/// fn hello(ctx: &mut Context) {
///     let name = ctx.param("name");
///     ctx.text(format!("hello {}", name.string_or("world")));
/// }
///
/// let app = Engine::new().get("/hello/:name", hello).build();
/// assert_eq!(app.router().len(), 1);
/// ```
pub struct Engine {
    branch: Branch,
    interceptors: Chain,
    not_found: Chain,
    starters: Vec<Box<dyn Starter>>,
    shared: Shared,
}

impl Engine {
    /// A bare engine: no interceptors, no starters.
    pub fn new() -> Self {
        Self {
            branch: Branch::new(),
            interceptors: Chain::new(),
            not_found: Chain::new().then(not_found),
            starters: Vec::new(),
            shared: Shared::default(),
        }
    }

    /// An engine that traces every request and logs its route table on build.
    pub fn standard() -> Self {
        Self::new().interceptor(middleware::trace).starter(RouteTable)
    }

    /// Adds handlers that run before every request, matched or not.
    pub fn interceptor(mut self, chain: impl IntoChain) -> Self {
        self.interceptors.extend(&chain.into_chain());
        self
    }

    /// Replaces the chain run when no route matches.
    pub fn not_found(mut self, chain: impl IntoChain) -> Self {
        self.not_found = chain.into_chain();
        self
    }

    /// The exit used by [`Context::abort`].
    pub fn abort_exit(mut self, exit: impl Exit + 'static) -> Self {
        self.shared.abort = Arc::new(exit);
        self
    }

    pub fn json_serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.shared.json = Arc::new(serializer);
        self
    }

    pub fn xml_serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.shared.xml = Some(Arc::new(serializer));
        self
    }

    pub fn html_render(mut self, render: impl HtmlRender + 'static) -> Self {
        self.shared.render = Arc::new(render);
        self
    }

    pub fn file_storage(mut self, storage: impl FileStorage + 'static) -> Self {
        self.shared.storage = Arc::new(storage);
        self
    }

    /// Engine-wide storage, visible to handlers through
    /// [`Context::warehouse`].
    pub fn warehouse(&self) -> &Arc<Data> {
        &self.shared.warehouse
    }

    pub fn starter(mut self, starter: impl Starter + 'static) -> Self {
        self.starters.push(Box::new(starter));
        self
    }

    /// Serves the files below `dir` at `url`, for `GET` and `HEAD`.
    ///
    /// `chain` runs before the file is served, so it can guard the
    /// directory.
    ///
    /// # Panics
    ///
    /// Panics if `url` contains a wildcard segment.
    pub fn static_files(self, url: &str, dir: impl Into<PathBuf>, chain: impl IntoChain) -> Self {
        if url.contains('*') {
            panic!("static files url `{url}` must not contain a wildcard");
        }
        let pattern = format!("{}/*{FILEPATH_PARAM}", url.trim_end_matches('/'));
        let chain = chain.into_chain().then(fs::serve_dir(dir.into()));
        self.get(&pattern, chain.clone()).head(&pattern, chain)
    }

    /// Freezes the engine: inserts every route into a [`Router`] and runs the
    /// starters.
    ///
    /// # Panics
    ///
    /// Panics if a route is malformed or conflicts with another one.
    pub fn build(self) -> App {
        let Engine { branch, interceptors, not_found, starters, shared } = self;

        let mut router = Router::new();
        let mut routes = Vec::new();
        for (method, record) in branch.into_records() {
            router.insert(method, &record.pattern, record.chain);
            routes.push((method, record.pattern));
        }
        routes.sort();
        routes.dedup();

        let app = App { router, routes, interceptors, not_found, shared: Arc::new(shared) };
        for starter in &starters {
            starter.start(&app);
        }
        app
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Routes for Engine {
    fn branch_mut(&mut self) -> &mut Branch {
        &mut self.branch
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// A built engine, ready to handle requests.
pub struct App {
    router: Router,
    routes: Vec<(Method, String)>,
    interceptors: Chain,
    not_found: Chain,
    shared: Arc<Shared>,
}

impl App {
    /// Runs one request through the interceptors and the matched chain, or
    /// the not-found chain when nothing matches.
    ///
    /// An aborted request is not an error: its exit has already shaped the
    /// response. A fault raised by any handler is returned as is.
    pub fn handle(&self, request: Request) -> Result<Response, BoxError> {
        let mut ctx = Context::new(request, Arc::clone(&self.shared));

        let matched = ctx
            .request()
            .route_method()
            .and_then(|method| self.router.lookup(method, ctx.request().path()));
        let chain = match matched {
            Some((chain, params)) => {
                ctx.set_params(params);
                self.interceptors.join(chain)
            }
            None => {
                debug!(method = %ctx.request().method(), path = ctx.request().path(), "no route");
                self.interceptors.join(&self.not_found)
            }
        };
        ctx.set_chain(chain);

        ctx.start()?;
        Ok(ctx.into_response())
    }

    /// Registered routes, sorted by method and pattern.
    pub fn routes(&self) -> impl Iterator<Item = (Method, &str)> {
        self.routes.iter().map(|(m, p)| (*m, p.as_str()))
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Engine-wide storage.
    pub fn warehouse(&self) -> &Arc<Data> {
        &self.shared.warehouse
    }
}
