use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::report::error::{check_aligned, ReportError};

// ---------------------------------------------------------------------------
// CellValue – a single cell of an observation table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Used as a filter key, so `CellValue` must be `Eq`/`Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so floats compare by total order --

// Equality follows `Ord` (and the bit-level `Hash`): -0.0 and 0.0 differ,
// NaN equals itself.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text written to a CSV field: full precision, empty for null.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

// ---------------------------------------------------------------------------
// ObservationTable – ordered rows with a name → position schema
// ---------------------------------------------------------------------------

/// Test-set features: one row per observation, in input order.
///
/// Text-based sources also keep each cell's source text, so an export writes
/// back exactly what was read (`007` stays `007`, `1e3` stays `1e3`).
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    columns: Vec<String>,
    positions: BTreeMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
    source_text: Option<Vec<Vec<String>>>,
}

impl ObservationTable {
    /// Build a table, rejecting duplicate column names and ragged rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, ReportError> {
        let mut positions = BTreeMap::new();
        for (i, name) in columns.iter().enumerate() {
            if positions.insert(name.clone(), i).is_some() {
                return Err(ReportError::DuplicateField(name.clone()));
            }
        }
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(ReportError::RaggedRow {
                row,
                expected: columns.len(),
                found: values.len(),
            });
        }
        Ok(ObservationTable {
            columns,
            positions,
            rows,
            source_text: None,
        })
    }

    /// Attach the verbatim text of every cell. Must have the table's shape.
    pub fn with_source_text(mut self, text: Vec<Vec<String>>) -> Result<Self, ReportError> {
        if text.len() != self.rows.len() {
            return Err(ReportError::ShapeMismatch {
                left: "rows",
                left_len: self.rows.len(),
                right: "source text rows",
                right_len: text.len(),
            });
        }
        if let Some((row, cells)) = text
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != self.columns.len())
        {
            return Err(ReportError::RaggedRow {
                row,
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.source_text = Some(text);
        Ok(self)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no observations.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in schema order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column in the schema.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Position of a column, or `UnknownField`.
    pub fn require(&self, name: &str) -> Result<usize, ReportError> {
        self.position(name)
            .ok_or_else(|| ReportError::UnknownField(name.to_string()))
    }

    /// Row view at a positional index.
    pub fn row(&self, index: usize) -> Option<Observation<'_>> {
        (index < self.rows.len()).then_some(Observation { table: self, index })
    }

    /// All rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Observation<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Observation { table: self, index })
    }

    /// Cell at (row, column position). Callers hold a valid position.
    pub(crate) fn cell(&self, row: usize, position: usize) -> &CellValue {
        &self.rows[row][position]
    }

    /// Text of a cell as it appeared in the source, or its CSV field form
    /// when the source was not text.
    pub fn cell_text(&self, row: usize, position: usize) -> Cow<'_, str> {
        match &self.source_text {
            Some(text) => Cow::Borrowed(text[row][position].as_str()),
            None => Cow::Owned(self.rows[row][position].to_field()),
        }
    }

    /// Every cell of a column as text, see [`ObservationTable::cell_text`].
    pub fn column_text(&self, name: &str) -> Result<Vec<String>, ReportError> {
        let pos = self.require(name)?;
        Ok((0..self.rows.len())
            .map(|row| self.cell_text(row, pos).into_owned())
            .collect())
    }

    /// Every value of a numeric column as `f64`. Nulls become NaN.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, ReportError> {
        let pos = self.require(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, values)| match &values[pos] {
                CellValue::Null => Ok(f64::NAN),
                v => v.as_f64().ok_or_else(|| ReportError::NonNumericValue {
                    field: name.to_string(),
                    row,
                }),
            })
            .collect()
    }
}

/// One borrowed row of an [`ObservationTable`].
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    table: &'a ObservationTable,
    index: usize,
}

impl<'a> Observation<'a> {
    /// 0-based position in input order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of a named field.
    pub fn get(&self, name: &str) -> Option<&'a CellValue> {
        let pos = self.table.position(name)?;
        Some(self.table.cell(self.index, pos))
    }

    /// Values in schema order.
    pub fn values(&self) -> &'a [CellValue] {
        &self.table.rows[self.index]
    }

    /// Source text of every field in schema order.
    pub fn texts(&self) -> impl Iterator<Item = Cow<'a, str>> + 'a {
        let (table, index) = (self.table, self.index);
        (0..table.columns.len()).map(move |pos| table.cell_text(index, pos))
    }

    /// `(column, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + 'a {
        let table = self.table;
        table
            .columns
            .iter()
            .map(String::as_str)
            .zip(table.rows[self.index].iter())
    }
}

// ---------------------------------------------------------------------------
// ImportanceTable – feature name → score, in load order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ImportanceEntry {
    pub feature: String,
    pub score: f64,
}

/// Per-feature importance scores. Feature names are unique; order is the
/// load order and carries no meaning beyond tie-breaking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportanceTable {
    entries: Vec<ImportanceEntry>,
}

impl ImportanceTable {
    pub fn new(entries: Vec<(String, f64)>) -> Result<Self, ReportError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for (feature, score) in &entries {
            if !seen.insert(feature.as_str()) {
                return Err(ReportError::DuplicateFeature(feature.clone()));
            }
            if !score.is_finite() {
                return Err(ReportError::NonFiniteScore(feature.clone()));
            }
        }
        Ok(ImportanceTable {
            entries: entries
                .into_iter()
                .map(|(feature, score)| ImportanceEntry { feature, score })
                .collect(),
        })
    }

    pub fn entries(&self) -> &[ImportanceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// EvaluationBundle – the four loaded inputs, aligned
// ---------------------------------------------------------------------------

/// Everything the report is built from. Alignment is checked once here.
#[derive(Debug, Clone)]
pub struct EvaluationBundle {
    pub observations: ObservationTable,
    pub labels: Vec<f64>,
    pub predictions: Vec<f64>,
    pub importances: ImportanceTable,
    prediction_text: Option<Vec<String>>,
}

impl EvaluationBundle {
    pub fn new(
        observations: ObservationTable,
        labels: Vec<f64>,
        predictions: Vec<f64>,
        importances: ImportanceTable,
    ) -> Result<Self, ReportError> {
        check_aligned(observations.len(), &labels, &predictions)?;
        Ok(EvaluationBundle {
            observations,
            labels,
            predictions,
            importances,
            prediction_text: None,
        })
    }

    /// Keep the predictions' source text for export. One entry per prediction.
    pub fn with_prediction_text(mut self, text: Vec<String>) -> Result<Self, ReportError> {
        if text.len() != self.predictions.len() {
            return Err(ReportError::ShapeMismatch {
                left: "predictions",
                left_len: self.predictions.len(),
                right: "prediction text",
                right_len: text.len(),
            });
        }
        self.prediction_text = Some(text);
        Ok(self)
    }

    /// Prediction `index` as export text: the source text when known,
    /// otherwise shortest round-trip form, empty when missing.
    pub fn prediction_text(&self, index: usize) -> Cow<'_, str> {
        if let Some(text) = &self.prediction_text {
            return Cow::Borrowed(text[index].as_str());
        }
        match self.predictions[index] {
            p if p.is_nan() => Cow::Borrowed(""),
            p => Cow::Owned(p.to_string()),
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
