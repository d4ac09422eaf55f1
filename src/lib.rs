//! # wicket
//!
//! A small HTTP request dispatcher: a path tree, a middleware chain and a
//! facade that ties them together.
//!
//! ## The pieces
//!
//! - **Routing**: one path tree per method. Patterns are made of static
//!   segments, `:name` parameters and a trailing `*name` wildcard. Static
//!   segments beat parameters and parameters beat wildcards, whatever the
//!   order routes were registered in. When a branch dead-ends the lookup
//!   backtracks and tries the next candidate.
//! - **Chains**: a route maps to an ordered list of handlers sharing one
//!   [`Context`]. A handler calls [`Context::next`] to run the rest of the
//!   chain and then continues, or [`Context::abort`] to stop everything and
//!   let an [`Exit`] finalize the response.
//! - **Facade**: an [`Engine`] collects routes, [`Branch`]es, interceptors
//!   and collaborators, then [`Engine::build`] freezes it into an [`App`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use wicket::{Branch, Context, Engine, Flow, Routes, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let users = Branch::new()
//!         .wrap(require_token)
//!         .get("/users/:id", get_user)
//!         .post("/users", create_user);
//!
//!     let app = Engine::standard()
//!         .abort_exit(StatusCode::UNAUTHORIZED)
//!         .include("/api", users)
//!         .build();
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! fn require_token(ctx: &mut Context) -> Flow {
//!     if ctx.request().header("authorization").is_none() {
//!         return ctx.abort();
//!     }
//!     ctx.next()
//! }
//!
//! fn get_user(ctx: &mut Context) -> Flow {
//!     let id = ctx.param("id").int()?;
//!     ctx.json(&serde_json::json!({ "id": id }))?;
//!     Ok(())
//! }
//!
//! fn create_user(ctx: &mut Context) -> Flow {
//!     let user: serde_json::Value = ctx.scan_json()?;
//!     ctx.response_mut().set_status(StatusCode::CREATED);
//!     ctx.json(&user)?;
//!     Ok(())
//! }
//! ```

mod branch;
mod codec;
mod context;
mod data;
mod engine;
mod error;
mod fs;
mod handler;
mod method;
mod pattern;
mod render;
mod request;
mod response;
mod router;
mod server;
mod starter;
mod storage;
mod tree;
mod value;

pub mod middleware;

pub use branch::{Branch, Routes};
pub use codec::{JsonSerializer, Serializer};
pub use context::{Context, Exit, NoopExit, State};
pub use data::Data;
pub use engine::{App, Engine, not_found};
pub use error::{BoxError, Error, RouteError};
pub use fs::{FILEPATH_PARAM, write_not_found};
pub use handler::{Chain, Flow, Handler, IntoChain, IntoFlow, Interrupt};
pub use method::Method;
pub use render::{HtmlRender, Templates};
pub use request::Request;
pub use response::{ContentType, Response};
pub use router::Router;
pub use server::Server;
pub use starter::{RouteTable, Starter};
pub use storage::{FileStorage, FileSystemStorage, UploadFile};
pub use tree::Tree;
pub use value::{Params, Query, Value, ValueError, Values};
