//! Per-request execution context.
//!
//! # Running a chain
//!
//! A [`Context`] walks its chain with a cursor. [`Context::next`] runs every
//! handler from the cursor onward. A handler may call `next` itself to run the
//! rest of the chain first and do more work afterwards:
//!
//! ```text
//! logger ── enter ─┐                          ┌─ exit ── done
//!                  auth ── enter ─┐    ┌─ exit
//!                                 show
//! ```
//!
//! # Aborting
//!
//! [`Context::abort`] returns `Err(Interrupt::Abort)`. Propagated with `?`, it
//! unwinds every handler between the abort point and the top of the chain
//! without running their post-processing. The top of the chain catches it
//! once and runs the pending [`Exit`]. Faults (`Interrupt::Fault`) are not
//! caught; they reach whoever started the chain untouched.

use std::path::Path;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::codec::{self, Serializer};
use crate::data::Data;
use crate::engine::Shared;
use crate::error::{BoxError, Error};
use crate::fs;
use crate::handler::{Chain, Flow, Interrupt};
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::storage::UploadFile;
use crate::value::{Params, Value};

// ── Exit ──────────────────────────────────────────────────────────────────────

/// Finalizes the response of an aborted request.
///
/// Runs exactly once, after the chain has unwound. Closures work too:
///
/// ```rust
/// use wicket::{Context, Flow};
///
/// fn guard(ctx: &mut Context) -> Flow {
///     if ctx.request().header("authorization").is_none() {
///         return ctx.abort_with(|ctx: &mut Context| {
///             ctx.response_mut().set_status(http::StatusCode::UNAUTHORIZED);
///         });
///     }
///     ctx.next()
/// }
/// ```
pub trait Exit: Send + Sync {
    fn exit(&self, ctx: &mut Context);
}

/// The default exit: leaves the response as the handlers left it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExit;

impl Exit for NoopExit {
    fn exit(&self, _ctx: &mut Context) {}
}

/// Replies with this status and an empty body.
impl Exit for StatusCode {
    fn exit(&self, ctx: &mut Context) {
        let res = ctx.response_mut();
        res.set_status(*self);
        res.set_body(Vec::new());
    }
}

impl<F> Exit for F
where
    F: Fn(&mut Context) + Send + Sync,
{
    fn exit(&self, ctx: &mut Context) {
        self(ctx)
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

/// Where a context is in its lifecycle. Every state after `Running` is final.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Fresh,
    Running,
    Completed,
    Aborted,
    Faulted,
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Everything one request needs while its chain runs.
pub struct Context {
    request: Request,
    params: Params,
    response: Response,
    data: Arc<Data>,
    chain: Chain,
    index: usize,
    state: State,
    exit: Option<Arc<dyn Exit>>,
    shared: Arc<Shared>,
}

impl Context {
    pub(crate) fn new(request: Request, shared: Arc<Shared>) -> Self {
        Self {
            request,
            params: Params::new(),
            response: Response::new(),
            data: Arc::new(Data::new()),
            chain: Chain::new(),
            index: 0,
            state: State::Fresh,
            exit: None,
            shared,
        }
    }

    pub(crate) fn set_chain(&mut self, chain: Chain) {
        self.chain = chain;
    }

    pub(crate) fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }

    /// Runs the chain from the start and resolves an abort, if any.
    ///
    /// Returns the first fault a handler raised. Panics are not caught.
    pub(crate) fn start(&mut self) -> Result<(), BoxError> {
        match self.next() {
            Err(Interrupt::Fault(e)) => Err(e),
            Ok(()) | Err(Interrupt::Abort) => {
                if self.state == State::Aborted {
                    let exit = self.exit.take().unwrap_or_else(|| Arc::clone(&self.shared.abort));
                    exit.exit(self);
                }
                Ok(())
            }
        }
    }

    // ── Pipeline ──────────────────────────────────────────────────────────────

    /// Runs the remaining handlers in order.
    ///
    /// Call it from a handler to run everything downstream before your own
    /// post-processing, and propagate its result with `?`. Once the chain has
    /// completed, calling it again does nothing; once aborted, it keeps
    /// returning the abort signal.
    pub fn next(&mut self) -> Flow {
        match self.state {
            State::Aborted => return Err(Interrupt::Abort),
            State::Completed | State::Faulted => return Ok(()),
            State::Fresh | State::Running => self.state = State::Running,
        }

        self.index += 1;
        while self.index <= self.chain.len() {
            let Some(handler) = self.chain.get(self.index - 1).cloned() else {
                break;
            };

            match handler.call(self) {
                Ok(()) => {}
                Err(Interrupt::Abort) => {
                    self.state = State::Aborted;
                    return Err(Interrupt::Abort);
                }
                // Aborted is final: a fault raised while unwinding an abort
                // is logged and the pending exit still runs.
                Err(Interrupt::Fault(e)) if self.state == State::Aborted => {
                    warn!(error = %e, "fault after abort ignored");
                    return Err(Interrupt::Abort);
                }
                Err(fault) => {
                    self.state = State::Faulted;
                    return Err(fault);
                }
            }

            // A handler that swallowed an abort from its own `next` still
            // must not let the rest of the chain run.
            match self.state {
                State::Aborted => return Err(Interrupt::Abort),
                State::Running => self.index += 1,
                State::Fresh | State::Completed | State::Faulted => return Ok(()),
            }
        }

        self.state = State::Completed;
        Ok(())
    }

    /// Stops the chain and finalizes with the engine's default exit.
    ///
    /// ```rust
    /// # use wicket::{Context, Flow};
    /// fn only_admins(ctx: &mut Context) -> Flow {
    ///     if ctx.request().header("x-role") != Some("admin") {
    ///         return ctx.abort();
    ///     }
    ///     ctx.next()
    /// }
    /// ```
    pub fn abort(&mut self) -> Flow {
        let exit = Arc::clone(&self.shared.abort);
        self.raise(exit)
    }

    /// Stops the chain and finalizes with `exit`.
    pub fn abort_with(&mut self, exit: impl Exit + 'static) -> Flow {
        self.raise(Arc::new(exit))
    }

    fn raise(&mut self, exit: Arc<dyn Exit>) -> Flow {
        if self.state != State::Aborted {
            self.exit = Some(exit);
            self.state = State::Aborted;
        }
        Err(Interrupt::Abort)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_aborted(&self) -> bool {
        self.state == State::Aborted
    }

    // ── Request side ──────────────────────────────────────────────────────────

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A path parameter; a missing-marked [`Value`] if the route has none.
    pub fn param(&self, name: &str) -> Value {
        self.params.get(name)
    }

    /// Per-request scratch storage. Clone the `Arc` to share it with other
    /// threads.
    pub fn data(&self) -> &Arc<Data> {
        &self.data
    }

    /// Engine-wide storage shared by every request.
    pub fn warehouse(&self) -> &Arc<Data> {
        &self.shared.warehouse
    }

    /// Decodes the body with the engine's JSON serializer.
    pub fn scan_json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        codec::decode(self.shared.json.as_ref(), self.request.body())
    }

    /// Decodes the body with the engine's XML serializer, if one is set.
    pub fn scan_xml<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let xml = self.shared.xml.as_deref().ok_or(Error::NoSerializer("xml"))?;
        codec::decode(xml, self.request.body())
    }

    /// Decodes the body with any serializer.
    pub fn scan_with<T: DeserializeOwned>(&self, serializer: &dyn Serializer) -> Result<T, Error> {
        codec::decode(serializer, self.request.body())
    }

    pub fn save_upload_file(&self, file: &UploadFile, path: impl AsRef<Path>) -> Result<(), Error> {
        self.shared.storage.save(file, path.as_ref())
    }

    // ── Response side ─────────────────────────────────────────────────────────

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn text(&mut self, body: impl Into<String>) {
        self.response.set_content_type(ContentType::Text);
        self.response.set_body(body.into());
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let json = self.shared.json.as_ref();
        let body = codec::encode(json, value)?;
        self.response.set_content_type(json.content_type());
        self.response.set_body(body);
        Ok(())
    }

    pub fn xml<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let xml = self.shared.xml.as_deref().ok_or(Error::NoSerializer("xml"))?;
        let body = codec::encode(xml, value)?;
        self.response.set_content_type(xml.content_type());
        self.response.set_body(body);
        Ok(())
    }

    /// Renders the named page with the engine's [`HtmlRender`](crate::HtmlRender).
    pub fn html<T: Serialize + ?Sized>(&mut self, name: &str, data: &T) -> Result<(), Error> {
        let data = serde_json::to_value(data)?;
        let page = self.shared.render.render(name, &data)?;
        self.response.set_content_type(ContentType::Html);
        self.response.set_body(page);
        Ok(())
    }

    pub fn redirect(&mut self, status: StatusCode, location: &str) -> Result<(), Error> {
        self.response.set_header("location", location)?;
        self.response.set_status(status);
        Ok(())
    }

    /// Sends a file from disk, or a `404` if there is none.
    pub fn serve_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        fs::serve_file(&mut self.response, path.as_ref())
    }
}
