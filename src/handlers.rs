//! Endpoint logic.
//!
//! Every function here takes already-bound, already-validated input and
//! returns plain data. No I/O, no shared mutable state; the only dependency
//! is the read-only [`PersonDirectory`] passed in by the caller.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::schema::{
    ContactForm, ImageInfo, LoginForm, LoginOut, Person, PersonOut, PersonQuery, UpdatePerson,
    UploadFile,
};
use crate::state::PersonDirectory;

pub const PERSON_NOT_FOUND: &str = "This person does not exist";
pub const PERSON_EXISTS: &str = "It exists";

pub fn home() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([("Hello", "world")])
}

/// Echoes the new person back without the credential.
pub fn create_person(person: Person) -> PersonOut {
    PersonOut::from(person)
}

/// `{name: age}`. An absent name is keyed as `"null"`.
pub fn show_person_query(query: PersonQuery) -> BTreeMap<String, String> {
    let name = query.name.unwrap_or_else(|| "null".to_owned());
    BTreeMap::from([(name, query.age)])
}

pub fn show_person(
    directory: &PersonDirectory,
    person_id: i64,
) -> Result<BTreeMap<String, &'static str>, ApiError> {
    if !directory.contains(person_id) {
        return Err(ApiError::NotFound(PERSON_NOT_FOUND.to_owned()));
    }
    Ok(BTreeMap::from([(person_id.to_string(), PERSON_EXISTS)]))
}

/// Merges every person field and every location field into one object.
///
/// Unlike [`show_person`], the id is not checked against the directory.
pub fn update_person(person_id: i64, update: UpdatePerson) -> Result<Map<String, Value>, ApiError> {
    debug!(person_id, "updating person");
    let mut merged = into_object(&update.person)?;
    merged.extend(into_object(&update.location)?);
    Ok(merged)
}

fn into_object<T: serde::Serialize>(value: &T) -> Result<Map<String, Value>, ApiError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApiError::Internal(format!("expected an object, got {other}"))),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

/// Acknowledges the user. The password is accepted and dropped.
pub fn login(form: LoginForm) -> LoginOut {
    LoginOut::new(form.username)
}

/// Returns the caller's `User-Agent` verbatim.
pub fn contact(_form: ContactForm, user_agent: Option<String>, ads: Option<String>) -> Option<String> {
    debug!(has_ads_cookie = ads.is_some(), "contact form received");
    user_agent
}

pub fn post_image(file: UploadFile) -> ImageInfo {
    ImageInfo {
        filename: file.filename,
        format: file.content_type,
        size_kb: kilobytes(file.data.len()),
    }
}

/// Byte count in KiB, rounded to two decimals.
fn kilobytes(len: usize) -> f64 {
    (len as f64 / 1024.0 * 100.0).round() / 100.0
}
