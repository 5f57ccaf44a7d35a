use crate::infra::{load_config, load_service, ModelService};
use clap::Args;
use obs_predictor::error::AppError;
use obs_predictor::prediction::{score_csv, QuickExample, RawInputRecord};
use obs_predictor::telemetry;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct PredictArgs {
    /// Frequency code (e.g. A)
    #[arg(long)]
    pub(crate) freq: Option<String>,
    /// E-commerce indicator code (e.g. E_SELL)
    #[arg(long)]
    pub(crate) indic_is: Option<String>,
    /// Company size class (e.g. GE10)
    #[arg(long)]
    pub(crate) size_emp: Option<String>,
    /// Unit of measure (e.g. PC_ENT)
    #[arg(long)]
    pub(crate) unit: Option<String>,
    /// NACE Rev.2 industry code (e.g. C)
    #[arg(long)]
    pub(crate) nace_r2: Option<String>,
    /// Country or region code (e.g. DE)
    #[arg(long)]
    pub(crate) geo: Option<String>,
    /// Calendar year
    #[arg(long)]
    pub(crate) year: Option<String>,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Print the full JSON result instead of the sentence
    #[arg(long)]
    pub(crate) json: bool,
}

impl PredictArgs {
    /// Omitted flags stay absent so the model sees them as nulls. `--year`
    /// is keyed on the loaded model's year field.
    pub(crate) fn record(&self, year_field: &str) -> RawInputRecord {
        [
            ("freq", &self.freq),
            ("indic_is", &self.indic_is),
            ("size_emp", &self.size_emp),
            ("unit", &self.unit),
            ("nace_r2", &self.nace_r2),
            ("geo", &self.geo),
            (year_field, &self.year),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|value| (name, value)))
        .collect()
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file whose header names the input fields
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let service = prepare(args.model.clone())?;
    let outcome = service.predict(args.record(service.schema().year_field()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome).map_err(io::Error::from)?;
        println!("{json}");
    } else {
        println!("{}", outcome.message);
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let service = prepare(args.model)?;
    let input = BufReader::new(File::open(&args.input)?);

    let summary = score_csv(&service, input, io::stdout().lock())?;
    eprintln!(
        "Scored {} rows from {} ({} succeeded, {} failed)",
        summary.rows,
        args.input.display(),
        summary.succeeded,
        summary.failed
    );
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = prepare(args.model)?;

    println!("E-commerce OBS_VALUE demo (model: {})", service.model_name());
    for example in QuickExample::ALL {
        println!("\nExample {} ({})", example.number(), example.label());
        match service.predict_example(example) {
            Ok(outcome) => {
                println!("- {}", outcome.message);
                println!("  Raw prediction: {:.4}", outcome.prediction);
            }
            Err(err) => println!("  Prediction failed: {}", err),
        }
    }
    Ok(())
}

fn prepare(model: Option<PathBuf>) -> Result<ModelService, AppError> {
    let config = load_config(model)?;
    telemetry::init(&config.telemetry)?;
    load_service(&config.model.artifact_path)
}
