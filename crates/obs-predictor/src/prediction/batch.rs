use std::io::{Read, Write};

use tracing::{info, warn};

use super::model::Predictor;
use super::record::RawInputRecord;
use super::service::PredictionService;

pub const PREDICTION_COLUMN: &str = "prediction";
pub const MESSAGE_COLUMN: &str = "message";
pub const ERROR_COLUMN: &str = "error";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Score every row of a CSV whose header names the input fields. Empty cells
/// are treated as absent fields. Each output row repeats the input and adds
/// the prediction, the sentence, and the error of a rejected row. Rows that
/// cannot be parsed are rejected individually; only unreadable input or a
/// failed write aborts the batch.
pub fn score_csv<P, R, W>(
    service: &PredictionService<P>,
    input: R,
    output: W,
) -> Result<BatchSummary, BatchError>
where
    P: Predictor + 'static,
    R: Read,
    W: Write,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let mut writer = csv::Writer::from_writer(output);
    let mut output_headers = headers.clone();
    output_headers.push_field(PREDICTION_COLUMN);
    output_headers.push_field(MESSAGE_COLUMN);
    output_headers.push_field(ERROR_COLUMN);
    writer.write_record(&output_headers)?;

    let mut summary = BatchSummary::default();
    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        summary.rows += 1;

        let record = match record {
            Ok(record) if record.len() == headers.len() => record,
            Ok(record) => {
                let message = format!(
                    "row has {} fields but the header has {}",
                    record.len(),
                    headers.len()
                );
                warn!(row, error = %message, "batch row rejected");
                writer.write_record(&rejected_row(record, headers.len(), &message))?;
                summary.failed += 1;
                continue;
            }
            Err(err) if !err.is_io_error() => {
                warn!(row, error = %err, "batch row rejected");
                let message = err.to_string();
                writer.write_record(&rejected_row(
                    csv::StringRecord::new(),
                    headers.len(),
                    &message,
                ))?;
                summary.failed += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let raw_input: RawInputRecord = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let mut scored = record;
        match service.predict(raw_input) {
            Ok(outcome) => {
                scored.push_field(&outcome.prediction.to_string());
                scored.push_field(&outcome.message);
                scored.push_field("");
                summary.succeeded += 1;
            }
            Err(err) => {
                warn!(row, error = %err, "batch row rejected");
                scored.push_field("");
                scored.push_field("");
                scored.push_field(&err.to_string());
                summary.failed += 1;
            }
        }
        writer.write_record(&scored)?;
    }

    writer.flush()?;
    info!(
        rows = summary.rows,
        failed = summary.failed,
        "batch scoring finished"
    );
    Ok(summary)
}

/// Pad or cut a malformed row to the header width and fill the error column.
fn rejected_row(record: csv::StringRecord, width: usize, message: &str) -> csv::StringRecord {
    let mut fields: Vec<&str> = record.iter().take(width).collect();
    fields.resize(width, "");
    let mut row = csv::StringRecord::from(fields);
    row.push_field("");
    row.push_field("");
    row.push_field(message);
    row
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("invalid batch CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write batch output: {0}")]
    Io(#[from] std::io::Error),
}
