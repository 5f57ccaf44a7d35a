use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_YEAR_FIELD: &str = "TIME_PERIOD";
pub const DEFAULT_BUCKET_FIELD: &str = "year_bucket";

/// Columns the shipped e-commerce model was trained on.
pub const ECOMMERCE_COLUMNS: [&str; 7] = [
    "freq",
    "indic_is",
    "size_emp",
    "unit",
    "nace_r2",
    "geo",
    DEFAULT_YEAR_FIELD,
];

/// Ordered input fields a predictor declares, plus the names of the year
/// column and the derived bucket column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    columns: Vec<String>,
    year_field: String,
    bucket_field: String,
}

impl FieldSchema {
    pub fn new<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_fields(columns, DEFAULT_YEAR_FIELD, DEFAULT_BUCKET_FIELD)
    }

    pub fn with_fields<I, S>(
        columns: I,
        year_field: impl Into<String>,
        bucket_field: impl Into<String>,
    ) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
        }

        let year_field = year_field.into();
        if !seen.contains(year_field.as_str()) {
            return Err(SchemaError::MissingYearField(year_field));
        }

        let bucket_field = bucket_field.into();
        if bucket_field == year_field {
            return Err(SchemaError::BucketShadowsYear(bucket_field));
        }

        Ok(Self {
            columns,
            year_field,
            bucket_field,
        })
    }

    /// Schema of the shipped e-commerce model.
    pub fn ecommerce() -> Self {
        Self {
            columns: ECOMMERCE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            year_field: DEFAULT_YEAR_FIELD.to_string(),
            bucket_field: DEFAULT_BUCKET_FIELD.to_string(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn year_field(&self) -> &str {
        &self.year_field
    }

    pub fn bucket_field(&self) -> &str {
        &self.bucket_field
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Column names of an assembled row: schema order, then the bucket
    /// column unless the schema already lists it.
    pub fn feature_columns(&self) -> impl Iterator<Item = &str> + '_ {
        let trailing_bucket =
            (!self.contains(&self.bucket_field)).then_some(self.bucket_field.as_str());
        self.columns.iter().map(String::as_str).chain(trailing_bucket)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("field schema must list at least one column")]
    Empty,
    #[error("field schema lists column '{0}' more than once")]
    DuplicateColumn(String),
    #[error("field schema does not contain the year column '{0}'")]
    MissingYearField(String),
    #[error("bucket column '{0}' cannot reuse the year column name")]
    BucketShadowsYear(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecommerce_schema_appends_bucket_column() {
        let schema = FieldSchema::ecommerce();
        let columns: Vec<&str> = schema.feature_columns().collect();
        assert_eq!(columns.len(), 8);
        assert_eq!(columns.last(), Some(&"year_bucket"));
        assert_eq!(schema.year_field(), "TIME_PERIOD");
    }

    #[test]
    fn listed_bucket_column_is_not_repeated() {
        let schema =
            FieldSchema::new(["geo", "TIME_PERIOD", "year_bucket"]).expect("valid schema");
        let columns: Vec<&str> = schema.feature_columns().collect();
        assert_eq!(columns, vec!["geo", "TIME_PERIOD", "year_bucket"]);
    }

    #[test]
    fn rejects_invalid_schemas() {
        assert_eq!(
            FieldSchema::new(Vec::<String>::new()),
            Err(SchemaError::Empty)
        );
        assert_eq!(
            FieldSchema::new(["geo", "geo", "TIME_PERIOD"]),
            Err(SchemaError::DuplicateColumn("geo".to_string()))
        );
        assert_eq!(
            FieldSchema::new(["geo"]),
            Err(SchemaError::MissingYearField("TIME_PERIOD".to_string()))
        );
        assert_eq!(
            FieldSchema::with_fields(["year"], "year", "year"),
            Err(SchemaError::BucketShadowsYear("year".to_string()))
        );
    }
}
