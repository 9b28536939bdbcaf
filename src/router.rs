//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router is also the
//! binding edge: it buffers the body (bounded), builds a [`Request`] and turns
//! whatever the handler returns into a hyper response.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use matchit::Router as MatchitRouter;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::state::AppState;
use crate::status::Status;

/// Default cap on a buffered request body: 10 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// The application router.
///
/// Build it once at startup and hand it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    state: Arc<AppState>,
    body_limit: usize,
}

enum Route {
    Found(BoxedHandler, Method, HashMap<String, String>),
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            state: Arc::new(AppState::default()),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Replaces the shared state every request can read.
    pub fn with_state(mut self, state: AppState) -> Self {
        self.state = Arc::new(state);
        self
    }

    /// Caps how many body bytes are buffered per request. Larger bodies get 413.
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting route pattern. Routes are fixed
    /// at startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    fn route(&self, method: &http::Method, path: &str) -> Route {
        if let Ok(method) = Method::try_from(method) {
            if let Some(matched) = self.routes.get(&method).and_then(|t| t.at(path).ok()) {
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                return Route::Found(Arc::clone(matched.value), method, params);
            }
        }
        if self.routes.values().any(|t| t.at(path).is_ok()) {
            Route::MethodNotAllowed
        } else {
            Route::NotFound
        }
    }

    /// Runs one request through routing, body buffering and the handler.
    ///
    /// Never fails: every problem becomes an error response.
    pub async fn call<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_owned();

        let (handler, method, params) = match self.route(&parts.method, &path) {
            Route::Found(handler, method, params) => (handler, method, params),
            Route::MethodNotAllowed => {
                return detail(Status::MethodNotAllowed, "Method Not Allowed").into_http();
            }
            Route::NotFound => return detail(Status::NotFound, "Not Found").into_http(),
        };

        let body = match Limited::new(body, self.body_limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(%method, %path, limit = self.body_limit, "request body over limit");
                return ApiError::PayloadTooLarge.into_response().into_http();
            }
            Err(e) => {
                warn!(%method, %path, "failed to read request body: {e}");
                return ApiError::BadRequest(format!("unreadable body: {e}"))
                    .into_response()
                    .into_http();
            }
        };

        let req = Request::new(parts, method, body, params, Arc::clone(&self.state));
        let response = handler(req).await;

        let status = response.status_code();
        if status == Status::UnprocessableContent {
            warn!(%method, %path, "request failed validation");
        }
        debug!(%method, %path, status = status.as_u16(), "handled");
        response.into_http()
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn detail(status: Status, message: &str) -> Response {
    Response::builder().status(status).json_value(&json!({ "detail": message }))
}
