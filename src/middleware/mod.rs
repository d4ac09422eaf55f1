//! Built-in middleware.
//!
//! Middleware are ordinary handlers that call [`Context::next`] themselves, so
//! they can act both before and after everything downstream. Install them
//! engine-wide with [`Engine::interceptor`](crate::Engine::interceptor) or per
//! branch with [`Branch::wrap`](crate::Branch::wrap).

mod trace;

pub use trace::trace;

use std::any::Any;

use crate::context::Context;
use crate::handler::{Flow, Handler};

/// Stores a clone of `value` under `key` in the request's scratch data, then
/// continues the chain.
///
/// ```rust
/// use wicket::{Branch, Context, Routes, middleware};
///
/// let admin = Branch::new()
///     .wrap(middleware::with_value("role", "admin"))
///     .get("/panel", |ctx: &mut Context| {
///         let role = ctx.data().value::<&str>("role").unwrap_or("guest");
///         ctx.text(role);
///     });
/// ```
pub fn with_value<T>(key: &'static str, value: T) -> impl Handler
where
    T: Any + Clone + Send + Sync,
{
    move |ctx: &mut Context| -> Flow {
        ctx.data().set(key, value.clone());
        ctx.next()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::Shared;
    use crate::handler::Chain;
    use crate::method::Method;
    use crate::request::Request;

    #[test]
    fn with_value_is_visible_downstream() {
        let chain = Chain::new()
            .then(with_value("answer", 42u32))
            .then(|ctx: &mut Context| {
                let n = ctx.data().value::<u32>("answer").unwrap_or_default();
                ctx.text(n.to_string());
            });
        let mut ctx = Context::new(Request::new(Method::Get, "/"), Arc::new(Shared::default()));
        ctx.set_chain(chain);

        ctx.start().unwrap();
        assert_eq!(ctx.response().body(), b"42");
    }
}
