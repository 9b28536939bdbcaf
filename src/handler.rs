//! Route adapters and how the router stores them.
//!
//! An adapter is any `async fn(Request) -> impl IntoResponse`. Every one has
//! its own type, so registration wraps it in a closure that boxes the future
//! and converts its output; the router only ever holds those closures.
//!
//! ```text
//! async fn create_person(req: Request) -> Result<Response, ApiError>
//!        ↓ router.post("/person/new", create_person)
//! Arc<dyn Fn(Request) -> BoxFuture>        ← one allocation, at startup
//!        ↓ handler(req)
//! Response                                 ← errors already rendered
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A registered endpoint, shared by every request that routes to it.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync + 'static>;

/// Implemented for every `async fn(Request) -> impl IntoResponse`.
///
/// Sealed: the blanket impl is the only one.
pub trait Handler: sealed::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod sealed {
    pub trait Sealed {}
}

impl<F, Fut, R> sealed::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(move |req: Request| {
            let fut = self(req);
            Box::pin(async move { fut.await.into_response() }) as BoxFuture
        })
    }
}
