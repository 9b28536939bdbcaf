//! Request and response schemas.
//!
//! Every constraint a field carries is declared here with `validator`
//! attributes; binding in [`crate::request`] runs them before any handler
//! sees the value.

use std::borrow::Cow;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

pub const LOGIN_SUCCESS: &str = "Login Successfully";
const MIN_PASSWORD_CHARS: usize = 8;

/// Hair colors a person may declare. Any other token is rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HairColor {
    White,
    Brown,
    Black,
    Blonde,
    Red,
}

/// Fields shared by the input and output person shapes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PersonBase {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub last_name: String,

    #[validate(range(min = 1, max = 115, message = "must be greater than 0 and at most 115"))]
    pub age: i64,

    #[serde(default)]
    pub hair_color: Option<HairColor>,

    #[serde(default)]
    pub is_married: Option<bool>,
}

/// A person as submitted by a client, credential included.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(flatten)]
    pub base: PersonBase,
    pub password: String,
}

// Hand-written so the flattened base reports its fields at the top level
// (`age`, not `base.age`), matching the JSON the client sent.
impl Validate for Person {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.base.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            let mut err = ValidationError::new("length");
            err.add_param(Cow::from("min"), &MIN_PASSWORD_CHARS);
            err.message = Some(Cow::from("must be at least 8 characters"));
            errors.add("password", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// A person as returned to a client. There is no credential field to leak.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonOut {
    #[serde(flatten)]
    pub base: PersonBase,
}

impl From<Person> for PersonOut {
    fn from(person: Person) -> Self {
        Self { base: person.base }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub city: String,

    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub state: String,

    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub country: String,
}

/// JSON body of `PUT /person/{person_id}`: both models keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpdatePerson {
    #[validate(nested)]
    pub person: Person,

    #[validate(nested)]
    pub location: Location,
}

/// Path input of `GET /person/detail/{person_id}` and `PUT /person/{person_id}`.
#[derive(Clone, Copy, Debug, Validate)]
pub struct PersonPath {
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub person_id: i64,
}

/// Query input of the deprecated `GET /person/detail`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct PersonQuery {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    #[serde(default)]
    pub name: Option<String>,

    pub age: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 20, message = "must be between 1 and 20 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Login acknowledgement. The username is bounded by [`LoginForm`] on the way in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginOut {
    pub username: String,
    pub message: String,
}

impl LoginOut {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), message: LOGIN_SUCCESS.to_owned() }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 20, message = "must be between 1 and 20 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 20, message = "must be between 1 and 20 characters"))]
    pub last_name: String,

    #[validate(email(message = "value is not a valid email address"))]
    pub email: String,
}

/// A file part pulled out of a `multipart/form-data` body.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// What `POST /post-image` reports about an upload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageInfo {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Format")]
    pub format: Option<String>,
    #[serde(rename = "Size(kb)")]
    pub size_kb: f64,
}
