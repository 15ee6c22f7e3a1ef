use std::collections::HashSet;

use super::model::{CellValue, ObservationTable};
use crate::report::error::ReportError;

// ---------------------------------------------------------------------------
// Categorical filtering (regional filter)
// ---------------------------------------------------------------------------

/// Indices of observations whose `field` equals `value`, in input order.
///
/// Returns positions into the table rather than copies of the rows.
pub fn filter_by_categorical_value(
    observations: &ObservationTable,
    field: &str,
    value: &CellValue,
) -> Result<Vec<usize>, ReportError> {
    let pos = observations.require(field)?;
    Ok((0..observations.len())
        .filter(|&row| observations.cell(row, pos) == value)
        .collect())
}

/// Distinct values of `field`, in order of first appearance.
pub fn distinct_values(
    observations: &ObservationTable,
    field: &str,
) -> Result<Vec<CellValue>, ReportError> {
    let pos = observations.require(field)?;
    let mut seen = HashSet::new();
    Ok((0..observations.len())
        .map(|row| observations.cell(row, pos))
        .filter(|v| seen.insert(*v))
        .cloned()
        .collect())
}
