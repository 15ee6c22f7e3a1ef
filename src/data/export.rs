use std::borrow::Cow;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::EvaluationBundle;

// ---------------------------------------------------------------------------
// Prediction table export
// ---------------------------------------------------------------------------

/// Write the source feature columns plus the predicted column as CSV.
///
/// Cells loaded from text are written back verbatim. Other cells are written
/// in shortest round-trip form, nulls as empty fields.
pub fn write_predictions_csv<W: io::Write>(
    writer: W,
    bundle: &EvaluationBundle,
    prediction_column: &str,
) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = bundle
        .observations
        .columns()
        .iter()
        .map(String::as_str)
        .collect();
    header.push(prediction_column);
    out.write_record(&header).context("writing CSV header")?;

    for row in bundle.observations.rows() {
        let mut record: Vec<Cow<'_, str>> = row.texts().collect();
        record.push(bundle.prediction_text(row.index()));
        out.write_record(record.iter().map(|field| field.as_bytes()))
            .with_context(|| format!("writing CSV row {}", row.index()))?;
    }

    out.flush().context("flushing CSV output")?;
    Ok(())
}

/// Export to a file path.
pub fn export_predictions(path: &Path, bundle: &EvaluationBundle, prediction_column: &str) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_predictions_csv(file, bundle, prediction_column)?;
    log::info!("Exported {} predictions to {}", bundle.len(), path.display());
    Ok(())
}
