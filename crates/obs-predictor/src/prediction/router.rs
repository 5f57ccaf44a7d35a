use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, warn};

use super::model::Predictor;
use super::page::{quick_example_path, PageError, PageRenderer};
use super::presets::QuickExample;
use super::service::PredictionService;

/// Shared handler state: the prediction service and the page renderer.
pub struct PredictionState<P> {
    pub service: Arc<PredictionService<P>>,
    pub pages: Arc<PageRenderer>,
}

impl<P> Clone for PredictionState<P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            pages: Arc::clone(&self.pages),
        }
    }
}

/// Router builder exposing the form page, the JSON API, and the demo buttons.
pub fn prediction_router<P>(
    service: Arc<PredictionService<P>>,
    pages: Arc<PageRenderer>,
) -> Router
where
    P: Predictor + 'static,
{
    Router::new()
        .route("/", get(index_handler::<P>))
        .route("/predict_form", post(form_handler::<P>))
        .route("/predict", post(predict_handler::<P>))
        .route(
            &quick_example_path(QuickExample::First),
            post(first_example_handler::<P>),
        )
        .route(
            &quick_example_path(QuickExample::Second),
            post(second_example_handler::<P>),
        )
        .with_state(PredictionState { service, pages })
}

pub(crate) async fn index_handler<P>(State(state): State<PredictionState<P>>) -> Response
where
    P: Predictor + 'static,
{
    page_response(StatusCode::OK, state.pages.form())
}

pub(crate) async fn form_handler<P>(
    State(state): State<PredictionState<P>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response
where
    P: Predictor + 'static,
{
    match state.service.predict_form(&fields) {
        Ok(outcome) => page_response(StatusCode::OK, state.pages.outcome(&outcome)),
        Err(err) => {
            warn!(error = %err, "form prediction failed");
            page_response(StatusCode::BAD_REQUEST, state.pages.error(&err.to_string()))
        }
    }
}

/// JSON API. The body is read as JSON whatever its content type.
pub(crate) async fn predict_handler<P>(
    State(state): State<PredictionState<P>>,
    body: Bytes,
) -> Response
where
    P: Predictor + 'static,
{
    match state.service.predict_json(&body) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => {
            warn!(error = %err, "api prediction failed");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn first_example_handler<P>(
    State(state): State<PredictionState<P>>,
) -> Response
where
    P: Predictor + 'static,
{
    example_response(&state, QuickExample::First)
}

pub(crate) async fn second_example_handler<P>(
    State(state): State<PredictionState<P>>,
) -> Response
where
    P: Predictor + 'static,
{
    example_response(&state, QuickExample::Second)
}

fn example_response<P>(state: &PredictionState<P>, example: QuickExample) -> Response
where
    P: Predictor + 'static,
{
    match state.service.predict_example(example) {
        Ok(outcome) => page_response(StatusCode::OK, state.pages.outcome(&outcome)),
        Err(err) => {
            warn!(error = %err, example = example.number(), "quick example failed");
            page_response(StatusCode::BAD_REQUEST, state.pages.error(&err.to_string()))
        }
    }
}

fn page_response(status: StatusCode, rendered: Result<String, PageError>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            error!(error = %err, "page rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    }
}
