//! Incoming HTTP request type and input binding.
//!
//! Each binding method reads one input source (path, query, header, cookie,
//! JSON body, form body, multipart file) and reports failures as located
//! [`FieldError`]s, so a route adapter can bind, validate and only then call
//! its handler.

use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use serde_json::Value;

use crate::error::{ApiError, FieldError};
use crate::method::Method;
use crate::schema::UploadFile;
use crate::state::AppState;
use crate::validate::{Model, bind, from_serde, object_from_pairs};

/// An incoming HTTP request with its body already buffered.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) state: Arc<AppState>,
}

impl Request {
    pub(crate) fn new(
        parts: http::request::Parts,
        method: Method,
        body: Bytes,
        params: HashMap<String, String>,
        state: Arc<AppState>,
    ) -> Self {
        Self {
            method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
            params,
            state,
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn state(&self) -> &AppState { &self.state }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// A single cookie from the `Cookie` header(s).
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(http::header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/person/{person_id}`, `req.param("person_id")` on
    /// `/person/3` returns `Some("3")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Parses a path parameter into `T`.
    pub fn path_param<T: FromStr>(&self, key: &str) -> Result<T, ApiError> {
        let raw = self.param(key).ok_or_else(|| FieldError::missing("path", key))?;
        raw.parse().map_err(|_| {
            ApiError::from(FieldError::new(
                ["path", key],
                format!("unable to parse `{raw}` as {}", short_type_name::<T>()),
                "parsing",
            ))
        })
    }

    /// Binds and validates the query string. A repeated key keeps its last value.
    pub fn query<T: Model>(&self) -> Result<T, ApiError> {
        let raw = self.query.as_deref().unwrap_or("");
        let pairs = serde_urlencoded::from_str(raw)
            .map_err(|e| ApiError::from(from_serde("query", &e.to_string())))?;
        bind(object_from_pairs(pairs), "query")
    }

    /// Binds and validates a JSON body.
    pub fn json<T: Model>(&self) -> Result<T, ApiError> {
        if self.body.is_empty() {
            return Err(FieldError::new(["body"], "Field required", "missing").into());
        }
        let value: Value = serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::from(from_serde("body", &e.to_string())))?;
        bind(value, "body")
    }

    /// Binds and validates an `application/x-www-form-urlencoded` body.
    pub fn form<T: Model>(&self) -> Result<T, ApiError> {
        let pairs = serde_urlencoded::from_bytes(&self.body)
            .map_err(|e| ApiError::from(from_serde("body", &e.to_string())))?;
        bind(object_from_pairs(pairs), "body")
    }

    /// Pulls the file part named `field` out of a `multipart/form-data` body.
    /// A part without a filename is a plain form value, not a file.
    pub async fn upload(&self, field: &str) -> Result<UploadFile, ApiError> {
        let boundary = self
            .header(http::header::CONTENT_TYPE.as_str())
            .and_then(|ct| multer::parse_boundary(ct).ok())
            .ok_or_else(|| FieldError::missing("body", field))?;

        let body = self.body.clone();
        let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let malformed = |e: multer::Error| {
            ApiError::from(FieldError::new(["body", field], e.to_string(), "multipart"))
        };
        while let Some(part) = multipart.next_field().await.map_err(malformed)? {
            if part.name() != Some(field) {
                continue;
            }
            let Some(filename) = part.file_name().map(str::to_owned) else {
                return Err(FieldError::new(["body", field], "Expected UploadFile", "value_error").into());
            };
            let content_type = part.content_type().map(ToString::to_string);
            let data = part.bytes().await.map_err(malformed)?;
            return Ok(UploadFile { filename, content_type, data });
        }
        Err(FieldError::missing("body", field).into())
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
