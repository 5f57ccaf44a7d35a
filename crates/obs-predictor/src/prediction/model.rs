use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::assembler::{FeatureRow, FeatureValue};
use super::schema::{FieldSchema, SchemaError, DEFAULT_BUCKET_FIELD, DEFAULT_YEAR_FIELD};

/// Pre-trained model boundary. Implementations are loaded once and shared
/// across requests, so they must be safe for concurrent reads.
pub trait Predictor: Send + Sync {
    /// Display name of the underlying estimator.
    fn name(&self) -> &str;
    fn schema(&self) -> &FieldSchema;
    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictorError>;
}

/// Rejection of an assembled row by a predictor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictorError {
    #[error("feature row is missing column '{0}'")]
    MissingColumn(String),
    #[error("found unknown category '{level}' in column '{column}'")]
    UnknownLevel { column: String, level: String },
    #[error("column '{0}' is null and the model has no value to impute")]
    MissingValue(String),
    #[error("column '{column}' expects a number, got '{value}'")]
    TypeMismatch { column: String, value: String },
    #[error("model produced a non-finite prediction")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownLevelPolicy {
    /// Unknown and null levels contribute nothing.
    #[default]
    Ignore,
    /// Unknown and null levels reject the row.
    Error,
}

/// One-hot encoded column: each known level carries its own coefficient.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoricalTerm {
    pub levels: BTreeMap<String, f64>,
    #[serde(default)]
    pub handle_unknown: UnknownLevelPolicy,
}

impl CategoricalTerm {
    fn contribution(
        &self,
        column: &str,
        value: Option<&FeatureValue>,
    ) -> Result<f64, PredictorError> {
        let Some(value) = value else {
            return match self.handle_unknown {
                UnknownLevelPolicy::Ignore => Ok(0.0),
                UnknownLevelPolicy::Error => {
                    Err(PredictorError::MissingValue(column.to_string()))
                }
            };
        };

        let level = value.category_text();
        match (self.levels.get(level.as_ref()), self.handle_unknown) {
            (Some(weight), _) => Ok(*weight),
            (None, UnknownLevelPolicy::Ignore) => Ok(0.0),
            (None, UnknownLevelPolicy::Error) => Err(PredictorError::UnknownLevel {
                column: column.to_string(),
                level: level.into_owned(),
            }),
        }
    }
}

/// Centered linear term for a numeric column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumericTerm {
    pub coefficient: f64,
    #[serde(default)]
    pub center: f64,
    /// Value substituted for nulls. Without it a null rejects the row.
    #[serde(default)]
    pub impute: Option<f64>,
}

impl NumericTerm {
    fn contribution(
        &self,
        column: &str,
        value: Option<&FeatureValue>,
    ) -> Result<f64, PredictorError> {
        let input = match value {
            Some(FeatureValue::Number(number)) => *number,
            Some(other) => {
                return Err(PredictorError::TypeMismatch {
                    column: column.to_string(),
                    value: other.category_text().into_owned(),
                })
            }
            None => self
                .impute
                .ok_or_else(|| PredictorError::MissingValue(column.to_string()))?,
        };
        Ok((input - self.center) * self.coefficient)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelArtifact {
    model_name: String,
    columns: Vec<String>,
    #[serde(default = "default_year_field")]
    year_field: String,
    #[serde(default = "default_bucket_field")]
    bucket_field: String,
    intercept: f64,
    #[serde(default)]
    categorical: BTreeMap<String, CategoricalTerm>,
    #[serde(default)]
    numeric: BTreeMap<String, NumericTerm>,
    #[serde(default)]
    clip: Option<[f64; 2]>,
}

fn default_year_field() -> String {
    DEFAULT_YEAR_FIELD.to_string()
}

fn default_bucket_field() -> String {
    DEFAULT_BUCKET_FIELD.to_string()
}

/// Linear regressor over one-hot encoded categorical columns and centered
/// numeric columns, read from a JSON model artifact.
#[derive(Debug, Clone)]
pub struct LinearPipeline {
    name: String,
    schema: FieldSchema,
    intercept: f64,
    categorical: BTreeMap<String, CategoricalTerm>,
    numeric: BTreeMap<String, NumericTerm>,
    clip: Option<(f64, f64)>,
}

impl LinearPipeline {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let pipeline = Self::from_reader(BufReader::new(file))?;
        info!(
            model = %pipeline.name,
            path = %path.display(),
            columns = pipeline.schema.columns().len(),
            "loaded model artifact"
        );
        Ok(pipeline)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelLoadError> {
        let schema = FieldSchema::with_fields(
            artifact.columns,
            artifact.year_field,
            artifact.bucket_field,
        )?;

        let referenced = artifact
            .categorical
            .keys()
            .chain(artifact.numeric.keys());
        for column in referenced {
            if !schema.feature_columns().any(|known| known == column) {
                return Err(ModelLoadError::UnknownColumn(column.clone()));
            }
        }

        let clip = match artifact.clip {
            Some([lo, hi]) if lo.is_finite() && hi.is_finite() && lo <= hi => Some((lo, hi)),
            Some([lo, hi]) => return Err(ModelLoadError::InvalidClip { lo, hi }),
            None => None,
        };

        Ok(Self {
            name: artifact.model_name,
            schema,
            intercept: artifact.intercept,
            categorical: artifact.categorical,
            numeric: artifact.numeric,
            clip,
        })
    }
}

impl Predictor for LinearPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictorError> {
        let mut total = self.intercept;

        for (column, term) in &self.categorical {
            if !row.contains(column) {
                return Err(PredictorError::MissingColumn(column.clone()));
            }
            total += term.contribution(column, row.get(column))?;
        }

        for (column, term) in &self.numeric {
            if !row.contains(column) {
                return Err(PredictorError::MissingColumn(column.clone()));
            }
            total += term.contribution(column, row.get(column))?;
        }

        if !total.is_finite() {
            return Err(PredictorError::NonFinite);
        }

        Ok(match self.clip {
            Some((lo, hi)) => total.clamp(lo, hi),
            None => total,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("model references column '{0}' outside its schema")]
    UnknownColumn(String),
    #[error("clip range [{lo}, {hi}] is not a finite ascending interval")]
    InvalidClip { lo: f64, hi: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::assembler::assemble;
    use crate::prediction::record::RawInputRecord;

    const ARTIFACT: &str = r#"{
        "model_name": "Ridge",
        "columns": ["geo", "nace_r2", "TIME_PERIOD"],
        "intercept": 10.0,
        "categorical": {
            "geo": { "levels": { "DE": 5.0, "FR": 3.0 } },
            "nace_r2": { "levels": { "C": 1.5 }, "handle_unknown": "error" }
        },
        "numeric": {
            "TIME_PERIOD": { "coefficient": 0.5, "center": 2020.0, "impute": 2020.0 },
            "year_bucket": { "coefficient": 1.0, "center": 2020.0 }
        },
        "clip": [0.0, 100.0]
    }"#;

    fn pipeline() -> LinearPipeline {
        LinearPipeline::from_reader(ARTIFACT.as_bytes()).expect("artifact parses")
    }

    fn row(geo: &str, nace: &str, year: &str) -> FeatureRow {
        let pipeline = pipeline();
        let raw = RawInputRecord::new()
            .with("geo", geo)
            .with("nace_r2", nace)
            .with("TIME_PERIOD", year);
        assemble(&raw, pipeline.schema())
    }

    #[test]
    fn sums_encoded_terms() {
        let prediction = pipeline()
            .predict(&row("DE", "C", "2022"))
            .expect("row accepted");
        // 10 + 5 + 1.5 + (2022 - 2020) * 0.5 + (2020 - 2020) * 1.0
        assert_eq!(prediction, 17.5);
        assert_eq!(pipeline().name(), "Ridge");
    }

    #[test]
    fn ignores_unknown_geo_but_rejects_unknown_industry() {
        let pipeline = pipeline();
        let prediction = pipeline
            .predict(&row("XX", "C", "2020"))
            .expect("unknown geo ignored");
        assert_eq!(prediction, 11.5);

        let err = pipeline.predict(&row("DE", "Q", "2020")).unwrap_err();
        assert_eq!(
            err,
            PredictorError::UnknownLevel {
                column: "nace_r2".to_string(),
                level: "Q".to_string(),
            }
        );
    }

    #[test]
    fn null_bucket_without_impute_is_rejected() {
        let err = pipeline().predict(&row("DE", "C", "abc")).unwrap_err();
        assert_eq!(err, PredictorError::MissingValue("year_bucket".to_string()));
    }

    #[test]
    fn rejects_rows_missing_referenced_columns() {
        let schema = FieldSchema::new(["geo", "TIME_PERIOD"]).expect("valid schema");
        let narrow = assemble(&RawInputRecord::new().with("TIME_PERIOD", "2020"), &schema);
        let err = pipeline().predict(&narrow).unwrap_err();
        assert_eq!(err, PredictorError::MissingColumn("nace_r2".to_string()));
    }

    #[test]
    fn clips_output() {
        let prediction = pipeline()
            .predict(&row("DE", "C", "2400"))
            .expect("row accepted");
        assert_eq!(prediction, 100.0);
    }

    #[test]
    fn text_in_numeric_column_is_a_type_mismatch() {
        let artifact = r#"{
            "model_name": "Ridge",
            "columns": ["size", "TIME_PERIOD"],
            "intercept": 0.0,
            "numeric": { "size": { "coefficient": 1.0 } }
        }"#;
        let pipeline = LinearPipeline::from_reader(artifact.as_bytes()).expect("artifact parses");
        let raw = RawInputRecord::new()
            .with("size", "GE10")
            .with("TIME_PERIOD", "2020");
        let err = pipeline.predict(&assemble(&raw, pipeline.schema())).unwrap_err();
        assert!(matches!(err, PredictorError::TypeMismatch { ref column, .. } if column == "size"));
    }

    #[test]
    fn load_rejects_columns_outside_schema() {
        let artifact = r#"{
            "model_name": "Ridge",
            "columns": ["TIME_PERIOD"],
            "intercept": 0.0,
            "categorical": { "geo": { "levels": {} } }
        }"#;
        let err = LinearPipeline::from_reader(artifact.as_bytes()).unwrap_err();
        assert!(matches!(err, ModelLoadError::UnknownColumn(column) if column == "geo"));
    }

    #[test]
    fn load_rejects_bad_clip_and_schema() {
        let artifact = r#"{
            "model_name": "Ridge",
            "columns": ["TIME_PERIOD"],
            "intercept": 0.0,
            "clip": [5.0, 1.0]
        }"#;
        let err = LinearPipeline::from_reader(artifact.as_bytes()).unwrap_err();
        assert!(matches!(err, ModelLoadError::InvalidClip { .. }));

        let artifact = r#"{ "model_name": "Ridge", "columns": ["geo"], "intercept": 0.0 }"#;
        let err = LinearPipeline::from_reader(artifact.as_bytes()).unwrap_err();
        assert!(matches!(err, ModelLoadError::Schema(SchemaError::MissingYearField(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LinearPipeline::from_path("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
