//! # persons-api
//!
//! A small HTTP API over person records, plus demo endpoints for login,
//! contact forms and file upload.
//!
//! Every request goes through the same pipeline:
//!
//! 1. [`Router`] matches method + path (radix tree via [`matchit`]) and
//!    buffers the body up to a configured limit.
//! 2. A route adapter in [`routes`] binds each input source (path, query,
//!    header, cookie, form, JSON, multipart) and validates it against the
//!    [`schema`] constraints. Any violation short-circuits with a 422 listing
//!    every failing field.
//! 3. The pure function in [`handlers`] produces the result, which is
//!    serialized with the route's status code.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use persons_api::{AppState, Server, routes};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), persons_api::Error> {
//!     let app = routes::router(AppState::default());
//!     Server::bind("0.0.0.0:8000")?.serve(app).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod state;
mod status;

pub mod config;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod routes;
pub mod schema;
pub mod validate;

pub use config::Config;
pub use error::{ApiError, Error, FieldError};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::{DEFAULT_BODY_LIMIT, Router};
pub use server::Server;
pub use state::{AppState, PersonDirectory};
pub use status::Status;
