use std::time::Instant;

use tracing::{info, warn};

use crate::context::Context;
use crate::handler::Flow;

/// Logs one line per request: method, path, status and latency.
///
/// Aborted requests are logged at `warn` once the chain has unwound; their
/// final status is set by the exit afterwards, so it is not known yet.
pub fn trace(ctx: &mut Context) -> Flow {
    let start = Instant::now();
    let result = ctx.next();

    let req = ctx.request();
    if ctx.is_aborted() {
        warn!(
            method = %req.method(),
            path = req.path(),
            elapsed = ?start.elapsed(),
            "request aborted"
        );
    } else if result.is_ok() {
        info!(
            method = %req.method(),
            path = req.path(),
            status = ctx.response().status().as_u16(),
            elapsed = ?start.elapsed(),
            "request"
        );
    }
    result
}
