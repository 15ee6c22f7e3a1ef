use crate::data::model::{Observation, ObservationTable};

use super::error::{check_aligned, ReportError};

// ---------------------------------------------------------------------------
// Row-level inspection
// ---------------------------------------------------------------------------

/// One observation with its true and predicted values.
#[derive(Debug, Clone, Copy)]
pub struct ObservationDetail<'a> {
    pub features: Observation<'a>,
    pub true_value: f64,
    pub predicted_value: f64,
}

impl ObservationDetail<'_> {
    pub fn index(&self) -> usize {
        self.features.index()
    }

    pub fn absolute_error(&self) -> f64 {
        (self.true_value - self.predicted_value).abs()
    }
}

/// Look up the row at `index` across the three aligned inputs.
pub fn lookup_observation<'a>(
    observations: &'a ObservationTable,
    labels: &[f64],
    predictions: &[f64],
    index: usize,
) -> Result<ObservationDetail<'a>, ReportError> {
    check_aligned(observations.len(), labels, predictions)?;
    let features = observations
        .row(index)
        .ok_or(ReportError::IndexOutOfRange {
            index,
            len: observations.len(),
        })?;
    Ok(ObservationDetail {
        features,
        true_value: labels[index],
        predicted_value: predictions[index],
    })
}

/// An observation ranked by how far its prediction is from the truth.
#[derive(Debug, Clone, Copy)]
pub struct RankedError<'a> {
    pub detail: ObservationDetail<'a>,
    pub absolute_error: f64,
}

impl RankedError<'_> {
    pub fn index(&self) -> usize {
        self.detail.index()
    }
}

/// The `top_k` observations with the largest absolute error, worst first.
/// Equal errors are ordered by ascending index.
pub fn rank_by_absolute_error<'a>(
    observations: &'a ObservationTable,
    labels: &[f64],
    predictions: &[f64],
    top_k: usize,
) -> Result<Vec<RankedError<'a>>, ReportError> {
    check_aligned(observations.len(), labels, predictions)?;

    let mut ranked: Vec<RankedError<'a>> = observations
        .rows()
        .zip(labels.iter().zip(predictions))
        .map(|(features, (&true_value, &predicted_value))| {
            let detail = ObservationDetail {
                features,
                true_value,
                predicted_value,
            };
            RankedError {
                absolute_error: detail.absolute_error(),
                detail,
            }
        })
        .collect();

    // Rows are generated in index order and the sort is stable, so ties
    // stay in ascending index order.
    ranked.sort_by(|a, b| b.absolute_error.total_cmp(&a.absolute_error));
    ranked.truncate(top_k);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn observations(n: usize) -> ObservationTable {
        ObservationTable::new(
            vec!["id".into()],
            (0..n).map(|i| vec![CellValue::Integer(i as i64)]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn lookup_returns_aligned_values() {
        let obs = observations(6);
        let labels = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let predictions = [1.1, 2.2, 2.9, 4.4, 4.8, 6.1];
        let detail = lookup_observation(&obs, &labels, &predictions, 5).unwrap();
        assert_eq!(detail.true_value, 6.0);
        assert_eq!(detail.predicted_value, 6.1);
        assert_eq!(detail.index(), 5);
        assert_eq!(detail.features.get("id"), Some(&CellValue::Integer(5)));
    }

    #[test]
    fn lookup_rejects_out_of_range() {
        let obs = observations(2);
        let err = lookup_observation(&obs, &[1.0, 2.0], &[1.0, 2.0], 2).unwrap_err();
        assert_eq!(err, ReportError::IndexOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn lookup_rejects_misaligned_inputs() {
        let obs = observations(3);
        let err = lookup_observation(&obs, &[1.0, 2.0], &[1.0, 2.0], 0).unwrap_err();
        assert!(matches!(err, ReportError::ShapeMismatch { .. }));
    }

    #[test]
    fn ranks_worst_first_with_index_tie_break() {
        let obs = observations(5);
        let labels = [10.0, 10.0, 10.0, 10.0, 10.0];
        let predictions = [9.0, 13.0, 7.0, 11.0, 12.0];
        let ranked = rank_by_absolute_error(&obs, &labels, &predictions, 10).unwrap();
        let order: Vec<usize> = ranked.iter().map(|r| r.index()).collect();
        assert_eq!(order, vec![1, 2, 4, 0, 3]);
        for pair in ranked.windows(2) {
            assert!(pair[0].absolute_error >= pair[1].absolute_error);
        }
    }

    #[test]
    fn rank_truncates_to_top_k() {
        let obs = observations(4);
        let ranked =
            rank_by_absolute_error(&obs, &[1.0, 2.0, 3.0, 4.0], &[1.0, 0.0, 3.5, 4.0], 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index(), 1);
        assert_eq!(ranked[0].absolute_error, 2.0);
        assert_eq!(ranked[1].index(), 2);
    }
}
