//! HTTP status codes as a typed enum.
//!
//! Only the codes this service actually emits are listed. Use [`Status`]
//! anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use persons_api::{Response, Status};
//!
//! Response::status(Status::NotFound);
//!
//! Response::builder()
//!     .status(Status::Created)
//!     .json(br#"{"first_name":"Daniel"}"#.to_vec());
//! ```

/// The response statuses produced by the API.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    Created,              // 201

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    NotFound,             // 404
    MethodNotAllowed,     // 405
    ContentTooLarge,      // 413
    UnprocessableContent, // 422

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
}

impl Status {
    /// Numeric code, e.g. `422`.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok                   => 200,
            Self::Created              => 201,
            Self::BadRequest           => 400,
            Self::NotFound             => 404,
            Self::MethodNotAllowed     => 405,
            Self::ContentTooLarge      => 413,
            Self::UnprocessableContent => 422,
            Self::InternalServerError  => 500,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.as_u16()
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        match s {
            Status::Ok                   => http::StatusCode::OK,
            Status::Created              => http::StatusCode::CREATED,
            Status::BadRequest           => http::StatusCode::BAD_REQUEST,
            Status::NotFound             => http::StatusCode::NOT_FOUND,
            Status::MethodNotAllowed     => http::StatusCode::METHOD_NOT_ALLOWED,
            Status::ContentTooLarge      => http::StatusCode::PAYLOAD_TOO_LARGE,
            Status::UnprocessableContent => http::StatusCode::UNPROCESSABLE_ENTITY,
            Status::InternalServerError  => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
