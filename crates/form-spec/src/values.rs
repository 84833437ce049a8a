use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Raw input keyed by field name.
pub type RawValues = Map<String, Value>;

/// Category of a field-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Required,
    TypeMismatch,
    Coercion,
    Predicate,
}

/// Validation error attached to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub field: String,
    pub path: String,
    pub message: String,
    pub code: String,
    pub kind: ErrorKind,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Per-field errors, at most one per field, in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `error`, replacing any existing error for the same field in place.
    pub fn set(&mut self, error: FieldError) {
        match self.errors.iter_mut().find(|slot| slot.field == error.field) {
            Some(slot) => *slot = error,
            None => self.errors.push(error),
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldError> {
        let index = self.errors.iter().position(|error| error.field == field)?;
        Some(self.errors.remove(index))
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|error| error.field.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Field name to message, the shape form renderers usually want.
    pub fn messages(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|error| (error.field.clone(), error.message.clone()))
            .collect()
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, error) in self.errors.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        let mut errors = FieldErrors::new();
        for error in iter {
            errors.set(error);
        }
        errors
    }
}

/// Output of a successful validation: every declared field in declaration order, with
/// `None` marking an optional field that had no input.
///
/// Serializes as a JSON object that omits the undefined fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformedValues {
    values: Vec<(String, Option<Value>)>,
}

impl TransformedValues {
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Option<Value>) {
        let name = name.into();
        match self.values.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    fn slot(&self, name: &str) -> Option<&Option<Value>> {
        self.values
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slot(name).and_then(Option::as_ref)
    }

    /// True when `name` is declared but carries no value.
    pub fn is_undefined(&self, name: &str) -> bool {
        matches!(self.slot(name), Some(None))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The defined fields as a JSON value. Object keys in a `Value` are sorted, so use
    /// `Serialize` or [`Self::to_json_pretty`] when declaration order matters.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .filter_map(|(name, value)| value.clone().map(|value| (name.clone(), value)))
                .collect(),
        )
    }

    /// Pretty JSON with four-space indentation, fields in declaration order.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Serialize for TransformedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let defined = self.values.iter().filter(|(_, value)| value.is_some());
        let mut map = serializer.serialize_map(Some(defined.clone().count()))?;
        for (name, value) in defined {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
