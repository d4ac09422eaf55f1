//! Minimal wicket example: JSON endpoints behind a token check, a rendered
//! page and a static directory.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl -H 'authorization: t0ken' http://localhost:3000/api/users/42
//!   curl -X POST http://localhost:3000/api/users \
//!        -H 'authorization: t0ken' \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl http://localhost:3000/api/users/42          # 401
//!   curl http://localhost:3000/static/Cargo.toml

use std::sync::atomic::{AtomicI64, Ordering};

use http::StatusCode;
use serde::{Deserialize, Serialize};
use wicket::{Branch, Context, Engine, Flow, Routes, Server, Templates, middleware};

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let templates = Templates::new().add("home", |data: &serde_json::Value| {
        let name = data["name"].as_str().unwrap_or("stranger");
        format!("<h1>hello, {name}</h1>")
    });

    let users = Branch::new()
        .wrap(require_token)
        .get("/users/:id", get_user)
        .post("/users", create_user)
        .delete("/users/:id", |ctx: &mut Context| {
            ctx.response_mut().set_status(StatusCode::NO_CONTENT);
        });

    let engine = Engine::standard()
        .abort_exit(StatusCode::UNAUTHORIZED)
        .html_render(templates)
        .get("/", home)
        .include("/api", users)
        .static_files("/static", ".", middleware::with_value("cache", "public"));
    engine.warehouse().set("next_id", AtomicI64::new(100));

    Server::bind("0.0.0.0:3000")
        .serve(engine.build())
        .await
        .expect("server error");
}

fn require_token(ctx: &mut Context) -> Flow {
    if ctx.request().header("authorization") != Some("t0ken") {
        return ctx.abort();
    }
    ctx.next()
}

fn home(ctx: &mut Context) -> Flow {
    let name = ctx.request().query().get_or("name", "stranger");
    ctx.html("home", &serde_json::json!({ "name": name.as_str() }))?;
    Ok(())
}

// GET /api/users/:id
fn get_user(ctx: &mut Context) -> Flow {
    let id = ctx.param("id").int()?;
    ctx.json(&User { id, name: "alice".into() })?;
    Ok(())
}

// POST /api/users
fn create_user(ctx: &mut Context) -> Flow {
    let input: NewUser = ctx.scan_json()?;
    let id = ctx
        .warehouse()
        .get::<AtomicI64>("next_id")
        .map_or(1, |next| next.fetch_add(1, Ordering::Relaxed));

    let res = ctx.response_mut();
    res.set_status(StatusCode::CREATED);
    res.set_header("location", &format!("/api/users/{id}"))?;
    ctx.json(&User { id, name: input.name })?;
    Ok(())
}
