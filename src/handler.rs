//! Handler trait, type erasure and chains.
//!
//! # How handlers are stored
//!
//! The router holds handlers of *different* types in one tree per method, so
//! every handler is erased behind `dyn ErasedHandler` and reference counted:
//!
//! ```text
//! fn auth(ctx: &mut Context) -> Flow { … }     ← user writes this
//!        ↓ .get("/me", (auth, me))
//! (auth, me).into_chain()                      ← IntoChain for tuples
//!        ↓
//! Arc::new(FnHandler(auth)), Arc::new(FnHandler(me))
//!        ↓ stored as Chain(Vec<BoxedHandler>)
//! handler.call(&mut ctx) at request time       ← one vtable dispatch
//! ```
//!
//! Building the per-request chain clones `Arc`s only; handlers themselves are
//! never copied.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::BoxError;

// ── Control flow ──────────────────────────────────────────────────────────────

/// Why a chain stopped before running to completion.
pub enum Interrupt {
    /// Raised by [`Context::abort`]. Not an error: the context's exit runs and
    /// the request finishes normally.
    Abort,
    /// A genuine failure inside a handler. Propagated unchanged to whoever
    /// started the chain.
    Fault(BoxError),
}

/// What every handler returns. Use `?` on [`Context::next`] so aborts and
/// faults unwind past your post-processing.
pub type Flow = Result<(), Interrupt>;

/// Any error type becomes a fault, so handlers can use `?` freely.
impl<E> From<E> for Interrupt
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: E) -> Self {
        Self::Fault(Box::new(e))
    }
}

impl Interrupt {
    /// Wraps an already boxed error.
    pub fn fault(e: impl Into<BoxError>) -> Self {
        Self::Fault(e.into())
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort)
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => f.write_str("Abort"),
            Self::Fault(e) => f.debug_tuple("Fault").field(e).finish(),
        }
    }
}

/// Return types a handler may use: `()` or [`Flow`].
pub trait IntoFlow {
    fn into_flow(self) -> Flow;
}

impl IntoFlow for () {
    fn into_flow(self) -> Flow {
        Ok(())
    }
}

impl IntoFlow for Flow {
    fn into_flow(self) -> Flow {
        self
    }
}

// ── Internal types ────────────────────────────────────────────────────────────

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, ctx: &mut Context) -> Flow;
}

/// A type-erased handler shared by every request that runs it.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid handler.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the signature:
///
/// ```text
/// fn name(ctx: &mut Context) -> ()      // cannot abort
/// fn name(ctx: &mut Context) -> Flow    // may call ctx.next()? / ctx.abort()
/// ```
///
/// Closures need the argument type spelled out (`|ctx: &mut Context| …`) so
/// they are generic over the borrow.
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, R> private::Sealed for F
where
    F: Fn(&mut Context) -> R + Send + Sync + 'static,
    R: IntoFlow,
{
}

impl<F, R> Handler for F
where
    F: Fn(&mut Context) -> R + Send + Sync + 'static,
    R: IntoFlow,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, R> ErasedHandler for FnHandler<F>
where
    F: Fn(&mut Context) -> R + Send + Sync,
    R: IntoFlow,
{
    fn call(&self, ctx: &mut Context) -> Flow {
        (self.0)(ctx).into_flow()
    }
}

// ── Chain ─────────────────────────────────────────────────────────────────────

/// An ordered list of handlers sharing one [`Context`].
#[derive(Clone, Default)]
pub struct Chain(Vec<BoxedHandler>);

impl Chain {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a handler. Returns `self` for chaining.
    pub fn then(mut self, handler: impl Handler) -> Self {
        self.0.push(handler.into_boxed_handler());
        self
    }

    /// Appends every handler of `other`, keeping their order.
    pub fn extend(&mut self, other: &Chain) {
        self.0.extend(other.0.iter().cloned());
    }

    /// `self` followed by `other`, as a new chain.
    pub fn join(&self, other: &Chain) -> Chain {
        let mut joined = Vec::with_capacity(self.0.len() + other.0.len());
        joined.extend(self.0.iter().cloned());
        joined.extend(other.0.iter().cloned());
        Chain(joined)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&BoxedHandler> {
        self.0.get(idx)
    }

    /// `true` when both chains hold the very same handler instances.
    pub fn ptr_eq(&self, other: &Chain) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chain({} handlers)", self.0.len())
    }
}

/// Anything registrable as a route's chain: a single handler, a tuple of
/// handlers run left to right, or a prebuilt [`Chain`].
pub trait IntoChain {
    fn into_chain(self) -> Chain;
}

impl IntoChain for Chain {
    fn into_chain(self) -> Chain {
        self
    }
}

impl<H: Handler> IntoChain for H {
    fn into_chain(self) -> Chain {
        Chain(vec![self.into_boxed_handler()])
    }
}

macro_rules! tuple_chain {
    ($($h:ident),+) => {
        impl<$($h: Handler),+> IntoChain for ($($h,)+) {
            #[allow(non_snake_case)]
            fn into_chain(self) -> Chain {
                let ($($h,)+) = self;
                Chain(vec![$($h.into_boxed_handler()),+])
            }
        }
    };
}

tuple_chain!(A, B);
tuple_chain!(A, B, C);
tuple_chain!(A, B, C, D);
tuple_chain!(A, B, C, D, E);
tuple_chain!(A, B, C, D, E, G);
