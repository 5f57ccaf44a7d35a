use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::assembler::{assemble, FeatureRow};
use super::composer::{describe, PredictionSentence};
use super::lookups::CodeLookupTables;
use super::model::{Predictor, PredictorError};
use super::presets::QuickExample;
use super::record::{InputError, RawInputRecord};
use super::schema::FieldSchema;

/// Service composing the feature assembler, the shared predictor, and the
/// response composer.
pub struct PredictionService<P> {
    predictor: Arc<P>,
    lookups: Arc<CodeLookupTables>,
}

impl<P> Clone for PredictionService<P> {
    fn clone(&self) -> Self {
        Self {
            predictor: Arc::clone(&self.predictor),
            lookups: Arc::clone(&self.lookups),
        }
    }
}

impl<P> PredictionService<P>
where
    P: Predictor + 'static,
{
    pub fn new(predictor: Arc<P>, lookups: CodeLookupTables) -> Self {
        Self {
            predictor,
            lookups: Arc::new(lookups),
        }
    }

    pub fn model_name(&self) -> &str {
        self.predictor.name()
    }

    pub fn schema(&self) -> &FieldSchema {
        self.predictor.schema()
    }

    pub fn assemble(&self, raw_input: &RawInputRecord) -> FeatureRow {
        assemble(raw_input, self.predictor.schema())
    }

    /// Run one record through the model. Predictor rejections are returned
    /// unchanged; no partial result is produced.
    pub fn predict(
        &self,
        raw_input: RawInputRecord,
    ) -> Result<PredictionOutcome, PredictionError> {
        let row = self.assemble(&raw_input);
        let prediction = self.predictor.predict(&row)?;
        if !prediction.is_finite() {
            return Err(PredictorError::NonFinite.into());
        }
        let sentence = describe(&raw_input, self.schema(), prediction, &self.lookups);

        debug!(
            model = self.predictor.name(),
            prediction,
            year_bucket = ?row.number(self.schema().bucket_field()),
            "prediction composed"
        );

        Ok(PredictionOutcome {
            prediction,
            message: sentence.to_string(),
            model: self.predictor.name().to_string(),
            inputs: raw_input,
            sentence,
        })
    }

    /// JSON-body entry point. The body is parsed regardless of content type.
    pub fn predict_json(&self, body: &[u8]) -> Result<PredictionOutcome, PredictionError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|err| InputError::MalformedJson(err.to_string()))?;
        let raw_input = RawInputRecord::from_json(value)?;
        self.predict(raw_input)
    }

    /// Form entry point: only the schema's columns are read from the fields.
    pub fn predict_form(
        &self,
        fields: &HashMap<String, String>,
    ) -> Result<PredictionOutcome, PredictionError> {
        let raw_input = RawInputRecord::from_form(fields, self.schema());
        self.predict(raw_input)
    }

    pub fn predict_example(
        &self,
        example: QuickExample,
    ) -> Result<PredictionOutcome, PredictionError> {
        self.predict(example.record())
    }
}

/// Prediction plus the display sentence and the inputs it was made from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub prediction: f64,
    pub message: String,
    pub model: String,
    pub inputs: RawInputRecord,
    #[serde(skip)]
    pub sentence: PredictionSentence,
}

/// Error raised by the prediction service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Model(#[from] PredictorError),
}
