use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy of the report engine
// ---------------------------------------------------------------------------

/// Which metric a degenerate-input marker refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    R2,
    Mae,
    Mape,
    Rmse,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::R2 => write!(f, "R²"),
            Metric::Mae => write!(f, "MAE"),
            Metric::Mape => write!(f, "MAPE"),
            Metric::Rmse => write!(f, "RMSE"),
        }
    }
}

/// Why a metric has no finite, well-defined value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// One of the vectors has all-identical values; correlation is undefined.
    ZeroVariance,
    /// A true label is zero, so the relative error at `index` divides by zero.
    ZeroDenominator { index: usize },
    /// Labels or predictions hold NaN or an infinity at `index`.
    NonFiniteValue { index: usize },
    /// Inputs are finite but the metric exceeds the `f64` range.
    Overflow,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degeneracy::ZeroVariance => write!(f, "zero variance"),
            Degeneracy::ZeroDenominator { index } => {
                write!(f, "true value is zero at row {index}")
            }
            Degeneracy::NonFiniteValue { index } => {
                write!(f, "non-finite value at row {index}")
            }
            Degeneracy::Overflow => write!(f, "value exceeds the floating-point range"),
        }
    }
}

/// Every failure the engine can report. All of them are recoverable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("length mismatch: {left_len} {left} vs {right_len} {right}")]
    ShapeMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("input is empty")]
    EmptyInput,

    #[error("{metric} is undefined: {reason}")]
    DegenerateInput { metric: Metric, reason: Degeneracy },

    #[error("index {index} out of range for {len} observations")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("duplicate column '{0}'")]
    DuplicateField(String),

    #[error("row {row} has {found} values but the schema has {expected} columns")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("duplicate feature '{0}' in importance table")]
    DuplicateFeature(String),

    #[error("feature '{0}' has a non-finite importance score")]
    NonFiniteScore(String),

    #[error("column '{field}' row {row}: value is not numeric")]
    NonNumericValue { field: String, row: usize },
}

impl ReportError {
    pub(crate) fn shape(
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    ) -> Self {
        ReportError::ShapeMismatch {
            left,
            left_len,
            right,
            right_len,
        }
    }
}

/// Labels and predictions must have one length.
pub(crate) fn check_pair(labels: &[f64], predictions: &[f64]) -> Result<(), ReportError> {
    if labels.len() != predictions.len() {
        return Err(ReportError::shape(
            "labels",
            labels.len(),
            "predictions",
            predictions.len(),
        ));
    }
    Ok(())
}

/// Observations, labels and predictions must share one length.
pub(crate) fn check_aligned(
    observations: usize,
    labels: &[f64],
    predictions: &[f64],
) -> Result<(), ReportError> {
    check_pair(labels, predictions)?;
    if labels.len() != observations {
        return Err(ReportError::shape(
            "observations",
            observations,
            "labels",
            labels.len(),
        ));
    }
    Ok(())
}
