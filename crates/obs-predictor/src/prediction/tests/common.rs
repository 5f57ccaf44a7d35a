use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::prediction::assembler::FeatureRow;
use crate::prediction::lookups::{CodeLookupTables, FormCatalog};
use crate::prediction::model::{Predictor, PredictorError};
use crate::prediction::page::PageRenderer;
use crate::prediction::router::prediction_router;
use crate::prediction::schema::FieldSchema;
use crate::prediction::service::PredictionService;

/// Returns a fixed value and remembers every row it was handed.
pub(super) struct StubPredictor {
    value: f64,
    schema: FieldSchema,
    rows: Mutex<Vec<FeatureRow>>,
}

impl StubPredictor {
    pub(super) fn returning(value: f64) -> Self {
        Self {
            value,
            schema: FieldSchema::ecommerce(),
            rows: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn rows(&self) -> Vec<FeatureRow> {
        self.rows.lock().expect("row mutex poisoned").clone()
    }
}

impl Predictor for StubPredictor {
    fn name(&self) -> &str {
        "StubRegressor"
    }

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictorError> {
        self.rows
            .lock()
            .expect("row mutex poisoned")
            .push(row.clone());
        Ok(self.value)
    }
}

/// Rejects every row the way a strict encoder rejects an unseen level.
pub(super) struct RejectingPredictor {
    schema: FieldSchema,
}

impl Default for RejectingPredictor {
    fn default() -> Self {
        Self {
            schema: FieldSchema::ecommerce(),
        }
    }
}

impl Predictor for RejectingPredictor {
    fn name(&self) -> &str {
        "StrictRegressor"
    }

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictorError> {
        let level = row
            .get("geo")
            .map(|value| value.category_text().into_owned())
            .unwrap_or_default();
        Err(PredictorError::UnknownLevel {
            column: "geo".to_string(),
            level,
        })
    }
}

pub(super) fn build_service(
    value: f64,
) -> (PredictionService<StubPredictor>, Arc<StubPredictor>) {
    let predictor = Arc::new(StubPredictor::returning(value));
    let service = PredictionService::new(predictor.clone(), CodeLookupTables::standard());
    (service, predictor)
}

pub(super) fn rejecting_service() -> PredictionService<RejectingPredictor> {
    PredictionService::new(
        Arc::new(RejectingPredictor::default()),
        CodeLookupTables::standard(),
    )
}

pub(super) fn router_with_service<P>(service: PredictionService<P>) -> axum::Router
where
    P: Predictor + 'static,
{
    let pages = PageRenderer::new(FormCatalog::standard()).expect("template registers");
    prediction_router(Arc::new(service), Arc::new(pages))
}

pub(super) async fn read_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_str(&body).expect("json payload")
}
