//! Request-to-prediction marshaling for the e-commerce OBS_VALUE model.
//!
//! Raw caller fields are assembled into the model's feature row, scored by a
//! shared [`Predictor`], and rendered as a plain-language sentence. The HTTP
//! router and the CSV batch scorer are thin adapters over
//! [`PredictionService`].

pub mod assembler;
pub mod batch;
pub mod composer;
pub mod lookups;
pub mod model;
pub mod page;
pub mod presets;
pub mod record;
pub mod router;
pub mod schema;
pub mod service;

#[cfg(test)]
mod tests;

pub use assembler::{assemble, year_bucket, FeatureRow, FeatureValue};
pub use batch::{score_csv, BatchError, BatchSummary};
pub use composer::{compose, describe, round_one_decimal, PredictionSentence};
pub use lookups::{CodeLookupTables, FormCatalog, FormOption};
pub use model::{LinearPipeline, ModelLoadError, Predictor, PredictorError};
pub use page::{PageError, PageRenderer};
pub use presets::QuickExample;
pub use record::{InputError, RawInputRecord, RawValue};
pub use router::{prediction_router, PredictionState};
pub use schema::{FieldSchema, SchemaError};
pub use service::{PredictionError, PredictionOutcome, PredictionService};
