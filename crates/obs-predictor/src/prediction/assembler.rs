//! Turns a caller's raw field record into the single feature row the model
//! consumes.
//!
//! Every schema column is carried over (null when the caller omitted it), the
//! year column is coerced to a number, and the 5-year bucket the model was
//! trained with is recomputed. Nothing else is validated here; unknown codes
//! travel through untouched and are the predictor's concern.

use std::borrow::Cow;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::record::{RawInputRecord, RawValue};
use super::schema::FieldSchema;

/// Width, in years, of the training-time year buckets.
pub const BUCKET_WIDTH: f64 = 5.0;

/// Start of the 5-year bucket containing `year` (floor division semantics).
pub fn year_bucket(year: f64) -> f64 {
    (year / BUCKET_WIDTH).floor() * BUCKET_WIDTH
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Text used when the value is matched against categorical levels.
    /// Integral numbers drop their fractional part so `2021.0` reads `2021`.
    pub fn category_text(&self) -> Cow<'_, str> {
        match self {
            FeatureValue::Text(text) => Cow::Borrowed(text),
            FeatureValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                Cow::Owned(format!("{}", *value as i64))
            }
            FeatureValue::Number(value) => Cow::Owned(value.to_string()),
            FeatureValue::Flag(flag) => Cow::Owned(flag.to_string()),
        }
    }
}

impl From<&RawValue> for FeatureValue {
    fn from(value: &RawValue) -> Self {
        match value {
            RawValue::Text(text) => FeatureValue::Text(text.clone()),
            RawValue::Number(number) => match number.as_f64() {
                Some(value) => FeatureValue::Number(value),
                None => FeatureValue::Text(number.to_string()),
            },
            RawValue::Flag(flag) => FeatureValue::Flag(*flag),
        }
    }
}

/// One assembled model input: schema columns in order, then the bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<(String, Option<FeatureValue>)>,
}

impl FeatureRow {
    /// Value of `name`, or `None` when the column is null or not part of
    /// the row.
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(column, _)| column == name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FeatureValue::as_number)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(column, _)| column.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FeatureValue>)> {
        self.columns
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in &self.columns {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

pub fn assemble(raw_input: &RawInputRecord, schema: &FieldSchema) -> FeatureRow {
    let year = raw_input
        .get(schema.year_field())
        .and_then(RawValue::as_number);
    let bucket = year.map(year_bucket);

    let columns = schema
        .feature_columns()
        .map(|column| {
            let value = if column == schema.year_field() {
                year.map(FeatureValue::Number)
            } else if column == schema.bucket_field() {
                bucket.map(FeatureValue::Number)
            } else {
                raw_input.get(column).map(FeatureValue::from)
            };
            (column.to_string(), value)
        })
        .collect();

    FeatureRow { columns }
}
