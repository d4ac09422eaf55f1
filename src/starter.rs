//! Start-up hooks.

use tracing::info;

use crate::engine::App;

/// Runs once, right after [`Engine::build`](crate::Engine::build) has frozen
/// the routes.
pub trait Starter {
    fn start(&self, app: &App);
}

impl<F: Fn(&App)> Starter for F {
    fn start(&self, app: &App) {
        self(app)
    }
}

/// Logs every registered route at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTable;

impl Starter for RouteTable {
    fn start(&self, app: &App) {
        for (method, pattern) in app.routes() {
            info!(%method, pattern, "route");
        }
        info!(routes = app.router().len(), "routes registered");
    }
}
