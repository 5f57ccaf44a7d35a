use metrics_exporter_prometheus::PrometheusHandle;
use obs_predictor::config::AppConfig;
use obs_predictor::error::AppError;
use obs_predictor::prediction::{CodeLookupTables, LinearPipeline, PredictionService};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type ModelService = PredictionService<LinearPipeline>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load configuration and apply a `--model` override.
pub(crate) fn load_config(model: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = model {
        config.model.artifact_path = path;
    }
    Ok(config)
}

pub(crate) fn load_service(artifact_path: &Path) -> Result<ModelService, AppError> {
    let pipeline = LinearPipeline::from_path(artifact_path)?;
    Ok(PredictionService::new(
        Arc::new(pipeline),
        CodeLookupTables::standard(),
    ))
}
