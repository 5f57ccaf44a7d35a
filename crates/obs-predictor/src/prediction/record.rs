use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};

use super::schema::FieldSchema;

/// Scalar supplied by a caller for one input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(Number),
    Flag(bool),
}

impl RawValue {
    /// Numeric reading of the value. Text is trimmed before parsing; booleans
    /// and non-finite results have no numeric reading.
    pub fn as_number(&self) -> Option<f64> {
        let parsed = match self {
            RawValue::Text(text) => text.trim().parse::<f64>().ok(),
            RawValue::Number(number) => number.as_f64(),
            RawValue::Flag(_) => None,
        };
        parsed.filter(|value| value.is_finite())
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(text) => f.write_str(text),
            RawValue::Number(number) => write!(f, "{number}"),
            RawValue::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(Number::from(value))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Flag(value)
    }
}

/// Field-name-to-value mapping as supplied by a caller. A `None` entry is an
/// explicit null; a missing key is absent. Both read as null downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawInputRecord {
    fields: BTreeMap<String, Option<RawValue>>,
}

impl RawInputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(name.into(), Some(value.into()));
    }

    pub fn insert_null(&mut self, name: impl Into<String>) {
        self.fields.insert(name.into(), None);
    }

    /// Value for `name`, or `None` when absent or null.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name).and_then(Option::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Literal text of a field as the caller supplied it; empty when absent
    /// or null.
    pub fn display_value(&self, name: &str) -> String {
        self.get(name).map(ToString::to_string).unwrap_or_default()
    }

    /// Build a record from a JSON object body. Nested arrays and objects are
    /// not scalar field values and are rejected.
    pub fn from_json(body: Value) -> Result<Self, InputError> {
        let map = match body {
            Value::Object(map) => map,
            other => return Err(InputError::NotAnObject(json_kind(&other))),
        };

        let mut record = Self::new();
        for (name, value) in map {
            match value {
                Value::Null => record.insert_null(name),
                Value::String(text) => record.insert(name, RawValue::Text(text)),
                Value::Number(number) => record.insert(name, RawValue::Number(number)),
                Value::Bool(flag) => record.insert(name, RawValue::Flag(flag)),
                other => {
                    return Err(InputError::UnsupportedValue {
                        field: name,
                        kind: json_kind(&other),
                    })
                }
            }
        }
        Ok(record)
    }

    /// Build a record from submitted form fields, keeping only the schema's
    /// columns. Columns the form did not send are recorded as null.
    pub fn from_form(fields: &HashMap<String, String>, schema: &FieldSchema) -> Self {
        let mut record = Self::new();
        for column in schema.columns() {
            match fields.get(column) {
                Some(value) => record.insert(column.clone(), value.as_str()),
                None => record.insert_null(column.clone()),
            }
        }
        record
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&RawValue>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }
}

impl<K, V> FromIterator<(K, V)> for RawInputRecord
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Raised when a caller's payload cannot be read as a flat field record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("request body must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("field '{field}' must be a string, number, boolean or null, got {kind}")]
    UnsupportedValue { field: String, kind: &'static str },
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),
}
