//! Binding decoded input into models and turning failures into [`FieldError`]s.
//!
//! Violations are aggregated: a request with three bad fields gets three
//! entries back, each located by input source and field path. That holds
//! across kinds too, so a missing field and an over-long name come back in
//! the same response.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{ApiError, FieldError};

/// An input shape that can be bound from decoded JSON, query or form data.
///
/// `Default` supplies a well-typed placeholder for every field, which lets
/// [`bind`] test each submitted field on its own.
pub trait Model: DeserializeOwned + Serialize + Default + Validate {}

impl<T: DeserializeOwned + Serialize + Default + Validate> Model for T {}

/// Deserializes and validates `input`, reporting every violation at once.
///
/// When plain deserialization fails, each field is tried in isolation
/// against the model's defaults: absent required fields become `missing`,
/// ill-typed ones are located at their own key. The fields that did bind
/// are then validated as usual, and both lists are returned together.
pub fn bind<T: Model>(input: Value, source: &str) -> Result<T, ApiError> {
    if let Ok(value) = serde_json::from_value::<T>(input.clone()) {
        return validated(value, source);
    }

    let template = serde_json::to_value(T::default())
        .map_err(|e| ApiError::Internal(format!("model defaults: {e}")))?;
    let mut shape = Shape::<T> {
        source,
        merged: template.clone(),
        errors: Vec::new(),
        model: std::marker::PhantomData,
    };
    shape.walk(&template, &input, &mut Vec::new());

    let value: T = serde_json::from_value(shape.merged)
        .map_err(|e| ApiError::Internal(format!("rebuild model: {e}")))?;
    let mut errors = shape.errors;
    if errors.is_empty() {
        return validated(value, source);
    }
    if let Err(found) = value.validate() {
        // Placeholders stand in for fields already reported; their own
        // constraint failures are noise.
        let reported: Vec<Vec<String>> = errors.iter().map(|e| e.loc.clone()).collect();
        errors.extend(
            field_errors(&found, &[source.to_owned()])
                .into_iter()
                .filter(|e| !reported.iter().any(|loc| e.loc.starts_with(loc))),
        );
    }
    errors.sort_by(|a, b| a.loc.cmp(&b.loc));
    Err(ApiError::Validation(errors))
}

/// Collects flat `key=value` pairs into a JSON object. A repeated key keeps
/// its last value.
pub fn object_from_pairs(pairs: Vec<(String, String)>) -> Value {
    Value::Object(pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect::<Map<_, _>>())
}

struct Shape<'a, T> {
    source: &'a str,
    /// Always deserializes as `T`: starts as the defaults and only takes
    /// submitted values that keep it that way.
    merged: Value,
    errors: Vec<FieldError>,
    model: std::marker::PhantomData<T>,
}

impl<T: Model> Shape<'_, T> {
    fn walk(&mut self, template: &Value, input: &Value, path: &mut Vec<String>) {
        let (Value::Object(fields), Value::Object(given)) = (template, input) else {
            let loc = self.loc(path);
            self.errors.push(FieldError::new(
                loc,
                "Input should be a valid dictionary or object",
                "model_attributes_type",
            ));
            return;
        };
        for (key, placeholder) in fields {
            path.push(key.clone());
            match given.get(key) {
                Some(v) if placeholder.is_object() && v.is_object() => self.walk(placeholder, v, path),
                Some(v) => self.try_field(path, Some(v.clone())),
                None => self.try_field(path, None),
            }
            path.pop();
        }
    }

    /// Puts `value` (or its absence) at `path` and keeps it only if the
    /// model still deserializes.
    fn try_field(&mut self, path: &[String], value: Option<Value>) {
        let Some((key, parent)) = path.split_last() else { return };
        let mut candidate = self.merged.clone();
        let Some(Value::Object(object)) = candidate.pointer_mut(&pointer(parent)) else { return };
        let missing = value.is_none();
        match value {
            Some(v) => object.insert(key.clone(), v),
            None => object.remove(key),
        };
        let loc = self.loc(path);
        match serde_json::from_value::<T>(candidate.clone()) {
            Ok(_) => self.merged = candidate,
            Err(_) if missing => self.errors.push(FieldError::new(loc, "Field required", "missing")),
            Err(e) => {
                let msg = e.to_string();
                let kind = if msg.contains("unknown variant") { "enum" } else { "type_error" };
                self.errors.push(FieldError::new(loc, msg, kind));
            }
        }
    }

    fn loc(&self, path: &[String]) -> Vec<String> {
        std::iter::once(self.source.to_owned()).chain(path.iter().cloned()).collect()
    }
}

/// RFC 6901 pointer to `path`.
fn pointer(path: &[String]) -> String {
    path.iter()
        .map(|p| format!("/{}", p.replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Runs the value's declared constraints. `source` names where the value
/// came from (`body`, `query`, `path`, ...) and prefixes every error location.
pub fn validated<T: Validate>(value: T, source: &str) -> Result<T, ApiError> {
    match value.validate() {
        Ok(()) => Ok(value),
        Err(errors) => Err(ApiError::Validation(field_errors(&errors, &[source.to_owned()]))),
    }
}

/// Flattens nested validation errors, sorted by location for stable output.
pub fn field_errors(errors: &ValidationErrors, prefix: &[String]) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, prefix, &mut out);
    out.sort_by(|a, b| a.loc.cmp(&b.loc));
    out
}

fn collect(errors: &ValidationErrors, prefix: &[String], out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let mut loc = prefix.to_vec();
        loc.push(field.to_string());
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| to_field_error(&loc, e)));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &loc, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let mut item_loc = loc.clone();
                    item_loc.push(index.to_string());
                    collect(inner, &item_loc, out);
                }
            }
        }
    }
}

fn to_field_error(loc: &[String], e: &ValidationError) -> FieldError {
    let msg = match &e.message {
        Some(m) => m.to_string(),
        None => format!("failed `{}` check", e.code),
    };
    FieldError::new(loc.iter().cloned(), msg, e.code.to_string())
}

/// Locates an input that could not be decoded at all (malformed JSON or
/// form encoding) at its source.
pub fn from_serde(source: &str, message: &str) -> FieldError {
    let kind = if source == "body" { "json_invalid" } else { "value_error" };
    FieldError::new([source], message, kind)
}
