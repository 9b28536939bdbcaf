//! Error types.
//!
//! [`Error`] surfaces infrastructure failures: loading configuration,
//! binding to a port. Everything a single request can get wrong is an
//! [`ApiError`], which renders itself as the matching HTTP response.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// The error type returned by the service's fallible startup operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(Box<figment::Error>),

    #[error("invalid listen address `{0}`")]
    Addr(String),
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Self::Config(Box::new(e))
    }
}

/// One field-level violation: where it happened, what is wrong, and a
/// machine-readable error type.
///
/// `loc` starts with the input source (`path`, `query`, `header`, `cookie`,
/// `body`) followed by the field path inside it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new<L, S>(loc: L, msg: impl Into<String>, kind: impl Into<String>) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// A required value that was not supplied at all.
    pub fn missing(source: &str, field: &str) -> Self {
        Self::new([source, field], "Field required", "missing")
    }
}

/// A request that cannot be answered successfully.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input failed binding or validation. Handlers never run.
    #[error("{} validation error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A domain lookup came up empty.
    #[error("{0}")]
    NotFound(String),

    /// The body could not be read off the connection.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_)   => Status::UnprocessableContent,
            Self::NotFound(_)     => Status::NotFound,
            Self::BadRequest(_)   => Status::BadRequest,
            Self::PayloadTooLarge => Status::ContentTooLarge,
            Self::Internal(_)     => Status::InternalServerError,
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(e: FieldError) -> Self {
        Self::Validation(vec![e])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => json!({ "detail": errors }),
            Self::NotFound(detail) | Self::BadRequest(detail) => json!({ "detail": detail }),
            Self::PayloadTooLarge => json!({ "detail": "Request body too large" }),
            Self::Internal(reason) => {
                error!(%reason, "internal error");
                json!({ "detail": "Internal Server Error" })
            }
        };
        Response::builder().status(status).json_value(&body)
    }
}
