use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, EvaluationBundle, ImportanceTable, ObservationTable};
use crate::config::ReportConfig;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the four report inputs from `dir`, named as `config` says.
pub fn load_bundle(dir: &Path, config: &ReportConfig) -> Result<EvaluationBundle> {
    let observations = load_table(&dir.join(&config.features_file))?;

    let labels_path = dir.join(&config.labels_file);
    let labels = label_values(&load_table(&labels_path)?, config.label_column.as_deref())
        .with_context(|| format!("reading labels from {}", labels_path.display()))?;

    let predictions_path = dir.join(&config.predictions_file);
    let prediction_table = load_table(&predictions_path)?;
    let (predictions, prediction_text) = prediction_table
        .numeric_column(&config.prediction_column)
        .and_then(|values| Ok((values, prediction_table.column_text(&config.prediction_column)?)))
        .with_context(|| format!("reading predictions from {}", predictions_path.display()))?;

    let importance_path = dir.join(&config.importance_file);
    let importances = importance_values(&load_table(&importance_path)?, config)
        .with_context(|| format!("reading importances from {}", importance_path.display()))?;

    let missing = labels.iter().chain(&predictions).filter(|v| v.is_nan()).count();
    if missing > 0 {
        log::warn!("{missing} missing label/prediction values; metrics will be undefined");
    }

    let bundle = EvaluationBundle::new(observations, labels, predictions, importances)
        .and_then(|bundle| bundle.with_prediction_text(prediction_text))
        .context("input tables are not aligned")?;
    log::info!(
        "Loaded {} observations with {} feature columns and {} importances from {}",
        bundle.len(),
        bundle.observations.columns().len(),
        bundle.importances.len(),
        dir.display()
    );
    Ok(bundle)
}

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one observation per record
/// * `.json`    – `[{ "column": value, ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_table(path: &Path) -> Result<ObservationTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    };
    table.with_context(|| format!("loading {}", path.display()))
}

/// Labels are either the configured column or, like a squeezed one-column
/// frame, the only column of the file.
fn label_values(table: &ObservationTable, column: Option<&str>) -> Result<Vec<f64>> {
    let name = match column {
        Some(name) => name,
        None => match table.columns() {
            [only] => only.as_str(),
            cols => bail!(
                "expected a single label column, found {} ({}); set label_column",
                cols.len(),
                cols.join(", ")
            ),
        },
    };
    Ok(table.numeric_column(name)?)
}

fn importance_values(table: &ObservationTable, config: &ReportConfig) -> Result<ImportanceTable> {
    let feature_pos = table.require(&config.importance_feature_column)?;
    let scores = table.numeric_column(&config.importance_score_column)?;
    let entries = table
        .rows()
        .zip(scores)
        .map(|(row, score)| (row.values()[feature_pos].to_field(), score))
        .collect();
    Ok(ImportanceTable::new(entries)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "surface": 52.5, "rooms": 3, "Nom de la région": "Bretagne" },
///   ...
/// ]
/// ```
///
/// Columns are taken in first-seen order; a key missing from a record is null.
fn load_json(path: &Path) -> Result<ObservationTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(ObservationTable::new(columns, rows)?)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one observation per record.
/// Cell types are guessed per value; the field text is kept for export.
fn load_csv(path: &Path) -> Result<ObservationTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    let mut text = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
        text.push(record.iter().map(str::to_string).collect());
    }

    Ok(ObservationTable::new(headers, rows)?.with_source_text(text)?)
}

pub(crate) fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" || s == "True" || s == "False" {
        return CellValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat scalar columns (strings, ints, floats, bools).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<ObservationTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let values = batch
                .columns()
                .iter()
                .zip(&columns)
                .map(|(col, name)| {
                    extract_cell(col, row).with_context(|| format!("Row {row}, column '{name}'"))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(values);
        }
    }

    Ok(ObservationTable::new(columns, rows)?)
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| CellValue::Bool(a.value(row))),
        other => bail!("unsupported column type {other:?}"),
    };
    value.with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn write(dir: &Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn write_bundle(dir: &Path) {
        write(
            dir,
            "X_test.csv",
            "surface,rooms,Nom de la région\n52.5,2,Bretagne\n80,4,Occitanie\n31.0,1,Bretagne\n",
        );
        write(dir, "y_test.csv", "price\n150000\n240000\n98000\n");
        write(dir, "predictions.csv", "target\n155000.5\n230000\n99000\n");
        write(
            dir,
            "feature_importance.csv",
            "Feature,Importance\nsurface,0.7\nrooms,0.2\nNom de la région,0.1\n",
        );
    }

    #[test]
    fn csv_cells_are_typed() {
        assert_eq!(guess_cell_type(""), CellValue::Null);
        assert_eq!(guess_cell_type("12"), CellValue::Integer(12));
        assert_eq!(guess_cell_type("1.5"), CellValue::Float(1.5));
        assert_eq!(guess_cell_type("True"), CellValue::Bool(true));
        assert_eq!(guess_cell_type("Lyon"), CellValue::from("Lyon"));
    }

    #[test]
    fn loads_csv_bundle_with_default_config() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());

        let bundle = load_bundle(dir.path(), &ReportConfig::default()).unwrap();
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.labels, vec![150000.0, 240000.0, 98000.0]);
        assert_eq!(bundle.predictions[0], 155000.5);
        assert_eq!(bundle.importances.entries()[2].feature, "Nom de la région");
        assert_eq!(
            bundle.observations.columns(),
            &["surface", "rooms", "Nom de la région"]
        );
    }

    #[test]
    fn csv_cells_keep_their_source_text() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "x.csv", "surface,rooms,garden,size\n70.0,007,True,1e3\n");
        let t = load_table(&dir.path().join("x.csv")).unwrap();
        let row = t.row(0).unwrap();
        assert_eq!(row.get("rooms"), Some(&CellValue::Integer(7)));
        let texts: Vec<_> = row.texts().collect();
        assert_eq!(texts, vec!["70.0", "007", "True", "1e3"]);
    }

    #[test]
    fn misaligned_files_fail_with_context() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());
        write(dir.path(), "predictions.csv", "target\n1\n2\n");

        let err = load_bundle(dir.path(), &ReportConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("not aligned"));
    }

    #[test]
    fn ambiguous_label_file_needs_a_column() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());
        write(dir.path(), "y_test.csv", "id,price\n0,1\n1,2\n2,3\n");

        assert!(load_bundle(dir.path(), &ReportConfig::default()).is_err());

        let config = ReportConfig {
            label_column: Some("price".into()),
            ..ReportConfig::default()
        };
        let bundle = load_bundle(dir.path(), &config).unwrap();
        assert_eq!(bundle.labels, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "x.json",
            r#"[{"a": 1, "b": "x"}, {"a": 2.5}, {"b": "y", "c": true}]"#,
        );
        let t = load_table(&dir.path().join("x.json")).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.columns(), &["a", "b", "c"]);
        assert_eq!(t.row(1).unwrap().get("b"), Some(&CellValue::Null));
        assert_eq!(t.row(2).unwrap().get("c"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn loads_parquet_scalar_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("surface", DataType::Float64, false),
            Field::new("rooms", DataType::Int64, true),
            Field::new("region", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![52.5, 80.0])),
                Arc::new(Int64Array::from(vec![Some(2), None])),
                Arc::new(StringArray::from(vec!["Bretagne", "Occitanie"])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let t = load_table(&path).unwrap();
        assert_eq!(t.columns(), &["surface", "rooms", "region"]);
        let row = t.row(1).unwrap();
        assert_eq!(row.get("surface"), Some(&CellValue::Float(80.0)));
        assert_eq!(row.get("rooms"), Some(&CellValue::Null));
        assert_eq!(row.get("region"), Some(&CellValue::from("Occitanie")));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_table(Path::new("data.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}
