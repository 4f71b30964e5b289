//! Per-collection wire description: paths, envelopes, identity.
//!
//! The API is inconsistent about envelopes. Classes and students wrap their
//! payloads (`{"classes": [...]}`, `{"student": {...}}`) while teachers are
//! returned bare. Each [`Resource`] names its keys and [`unwrap_envelope`]
//! accepts either form.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{ClassItem, Student, Teacher};

/// A record type mirrored from a server-side collection.
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Collection path, e.g. `/api/classes`.
    const PATH: &'static str;
    /// Key wrapping the list body, if any.
    const LIST_KEY: Option<&'static str>;
    /// Key wrapping a single-record body, if any.
    const ITEM_KEY: Option<&'static str>;
    /// Lowercase singular noun used in prompts and notices.
    const NOUN: &'static str;

    fn id(&self) -> Option<&str>;

    /// JSON body sent on create/update.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized.
    fn payload(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Take `key` out of an object body, or return the body untouched when it is
/// not wrapped.
#[must_use]
pub fn unwrap_envelope(body: Value, key: Option<&str>) -> Value {
    let Some(key) = key else {
        return body;
    };
    match body {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}

/// Decode a list body for `R`.
///
/// # Errors
///
/// Returns an error if the unwrapped body is not an array of `R`.
pub fn decode_list<R: Resource>(body: Value) -> Result<Vec<R>, serde_json::Error> {
    serde_json::from_value(unwrap_envelope(body, R::LIST_KEY))
}

/// Decode a single-record body for `R`.
///
/// # Errors
///
/// Returns an error if the unwrapped body is not an `R`.
pub fn decode_item<R: Resource>(body: Value) -> Result<R, serde_json::Error> {
    serde_json::from_value(unwrap_envelope(body, R::ITEM_KEY))
}

impl Resource for ClassItem {
    const PATH: &'static str = "/api/classes";
    const LIST_KEY: Option<&'static str> = Some("classes");
    const ITEM_KEY: Option<&'static str> = Some("class");
    const NOUN: &'static str = "class";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Resource for Student {
    const PATH: &'static str = "/api/students";
    const LIST_KEY: Option<&'static str> = Some("students");
    const ITEM_KEY: Option<&'static str> = Some("student");
    const NOUN: &'static str = "student";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// An empty photo is omitted so the server keeps its default avatar.
    fn payload(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if self.photo.as_deref().is_none_or(str::is_empty) {
            if let Some(map) = value.as_object_mut() {
                map.remove("photo");
            }
        }
        Ok(value)
    }
}

impl Resource for Teacher {
    const PATH: &'static str = "/api/teachers";
    const LIST_KEY: Option<&'static str> = None;
    const ITEM_KEY: Option<&'static str> = None;
    const NOUN: &'static str = "teacher";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
