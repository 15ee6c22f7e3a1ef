use std::fmt;

use super::error::{check_pair, Degeneracy, Metric, ReportError};

// ---------------------------------------------------------------------------
// MetricsSummary – R², MAE, MAPE, RMSE for one (labels, predictions) pair
// ---------------------------------------------------------------------------

/// A single metric: a finite value, or a `DegenerateInput` error explaining
/// why the metric has no value for these inputs.
pub type MetricValue = Result<f64, ReportError>;

/// Immutable snapshot of the four regression metrics.
///
/// Each metric is undefined independently, so a zero label only takes MAPE
/// away and the remaining three stay usable.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    r2: MetricValue,
    mae: MetricValue,
    mape: MetricValue,
    rmse: MetricValue,
    len: usize,
}

impl MetricsSummary {
    /// Squared Pearson correlation between labels and predictions.
    pub fn r2(&self) -> &MetricValue {
        &self.r2
    }

    pub fn mae(&self) -> &MetricValue {
        &self.mae
    }

    /// Mean absolute percentage error, in percent.
    pub fn mape(&self) -> &MetricValue {
        &self.mape
    }

    pub fn rmse(&self) -> &MetricValue {
        &self.rmse
    }

    /// Number of observations the summary was computed from.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All four metrics in display order.
    pub fn entries(&self) -> [(Metric, &MetricValue); 4] {
        [
            (Metric::R2, &self.r2),
            (Metric::Mae, &self.mae),
            (Metric::Mape, &self.mape),
            (Metric::Rmse, &self.rmse),
        ]
    }
}

/// Decimal places used when rendering a metric.
pub fn precision(metric: Metric) -> usize {
    match metric {
        Metric::R2 => 4,
        Metric::Mae | Metric::Mape | Metric::Rmse => 2,
    }
}

/// Heading used for a metric in the report.
pub fn metric_label(metric: Metric) -> String {
    match metric {
        Metric::Mape => "MAPE (%)".to_string(),
        other => other.to_string(),
    }
}

/// Render one metric value, `n/a` when undefined.
pub fn format_metric(metric: Metric, value: &MetricValue) -> String {
    match value {
        Ok(v) if metric == Metric::Mape => format!("{v:.prec$}%", prec = precision(metric)),
        Ok(v) => format!("{v:.prec$}", prec = precision(metric)),
        Err(_) => "n/a".to_string(),
    }
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (metric, value) in self.entries() {
            writeln!(f, "- {} : {}", metric_label(metric), format_metric(metric, value))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// compute_metrics
// ---------------------------------------------------------------------------

/// Compute R², MAE, MAPE (%) and RMSE.
///
/// Fails with `ShapeMismatch` on unequal lengths and `EmptyInput` when both
/// are empty. Degenerate numeric cases never fail the call; they show up as
/// `DegenerateInput` on the affected metric only.
pub fn compute_metrics(labels: &[f64], predictions: &[f64]) -> Result<MetricsSummary, ReportError> {
    check_pair(labels, predictions)?;
    if labels.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    if let Some(index) = labels
        .iter()
        .zip(predictions)
        .position(|(l, p)| !l.is_finite() || !p.is_finite())
    {
        let undefined = |metric| {
            Err(ReportError::DegenerateInput {
                metric,
                reason: Degeneracy::NonFiniteValue { index },
            })
        };
        return Ok(MetricsSummary {
            r2: undefined(Metric::R2),
            mae: undefined(Metric::Mae),
            mape: undefined(Metric::Mape),
            rmse: undefined(Metric::Rmse),
            len: labels.len(),
        });
    }

    Ok(MetricsSummary {
        r2: r_squared(labels, predictions),
        mae: mae(labels, predictions),
        mape: mape(labels, predictions),
        rmse: rmse(labels, predictions),
        len: labels.len(),
    })
}

/// Finite results pass through; anything else becomes an `Overflow` marker.
fn finite(metric: Metric, value: f64) -> MetricValue {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ReportError::DegenerateInput {
            metric,
            reason: Degeneracy::Overflow,
        })
    }
}

/// Largest magnitude, used to bring values into `[-1, 1]` before squaring.
/// Returns 1 for an all-zero input.
fn magnitude(values: impl Iterator<Item = f64>) -> f64 {
    let max_abs = values.fold(0.0f64, |m, v| m.max(v.abs()));
    if max_abs > 0.0 {
        max_abs
    } else {
        1.0
    }
}

fn mae(labels: &[f64], predictions: &[f64]) -> MetricValue {
    let n = labels.len() as f64;
    // Dividing each term keeps the running sum below the largest error.
    let value = labels
        .iter()
        .zip(predictions)
        .map(|(l, p)| (l - p).abs() / n)
        .sum();
    finite(Metric::Mae, value)
}

fn rmse(labels: &[f64], predictions: &[f64]) -> MetricValue {
    let errors: Vec<f64> = labels.iter().zip(predictions).map(|(l, p)| l - p).collect();
    if errors.iter().any(|e| !e.is_finite()) {
        return finite(Metric::Rmse, f64::INFINITY);
    }
    let scale = magnitude(errors.iter().copied());
    let mean_sq = errors
        .iter()
        .map(|e| (e / scale) * (e / scale))
        .sum::<f64>()
        / errors.len() as f64;
    finite(Metric::Rmse, mean_sq.sqrt() * scale)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn all_identical(values: &[f64]) -> bool {
    values.iter().all(|&v| v == values[0])
}

/// Squared Pearson correlation. Correlation is scale-invariant, so each
/// vector is rescaled to unit magnitude before the moments are taken.
fn r_squared(labels: &[f64], predictions: &[f64]) -> MetricValue {
    let zero_variance = Err(ReportError::DegenerateInput {
        metric: Metric::R2,
        reason: Degeneracy::ZeroVariance,
    });
    if all_identical(labels) || all_identical(predictions) {
        return zero_variance;
    }

    let scale_l = magnitude(labels.iter().copied());
    let scale_p = magnitude(predictions.iter().copied());
    let labels: Vec<f64> = labels.iter().map(|v| v / scale_l).collect();
    let predictions: Vec<f64> = predictions.iter().map(|v| v / scale_p).collect();

    let mean_l = mean(&labels);
    let mean_p = mean(&predictions);

    let mut cov = 0.0;
    let mut var_l = 0.0;
    let mut var_p = 0.0;
    for (l, p) in labels.iter().zip(&predictions) {
        let dl = l - mean_l;
        let dp = p - mean_p;
        cov += dl * dp;
        var_l += dl * dl;
        var_p += dp * dp;
    }

    if var_l == 0.0 || var_p == 0.0 {
        return zero_variance;
    }
    let r = cov / (var_l.sqrt() * var_p.sqrt());
    if !r.is_finite() {
        return finite(Metric::R2, r);
    }
    // Rounding can push a perfect correlation marginally above one.
    Ok((r * r).min(1.0))
}

fn mape(labels: &[f64], predictions: &[f64]) -> MetricValue {
    if let Some(index) = labels.iter().position(|&l| l == 0.0) {
        return Err(ReportError::DegenerateInput {
            metric: Metric::Mape,
            reason: Degeneracy::ZeroDenominator { index },
        });
    }
    let n = labels.len() as f64;
    let sum: f64 = labels
        .iter()
        .zip(predictions)
        .map(|(l, p)| ((l - p) / l).abs() / n)
        .sum();
    finite(Metric::Mape, 100.0 * sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn worked_example_matches_hand_computation() {
        let m = compute_metrics(&[10.0, 20.0, 30.0], &[12.0, 18.0, 33.0]).unwrap();
        assert!(approx(*m.mae().as_ref().unwrap(), 7.0 / 3.0));
        assert!(approx(*m.rmse().as_ref().unwrap(), (17.0f64 / 3.0).sqrt()));
        assert!(approx(
            *m.mape().as_ref().unwrap(),
            100.0 * (0.2 + 0.1 + 0.1) / 3.0
        ));
        let r2 = *m.r2().as_ref().unwrap();
        assert!(r2 > 0.9 && r2 <= 1.0);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn perfect_predictions_give_zero_error_and_unit_r2() {
        let v = [1.5, -2.0, 3.25, 8.0];
        let m = compute_metrics(&v, &v).unwrap();
        assert_eq!(m.mae(), &Ok(0.0));
        assert_eq!(m.mape(), &Ok(0.0));
        assert_eq!(m.rmse(), &Ok(0.0));
        assert!(approx(*m.r2().as_ref().unwrap(), 1.0));
    }

    #[test]
    fn constant_vectors_leave_r2_undefined() {
        let v = [4.0, 4.0, 4.0];
        let m = compute_metrics(&v, &v).unwrap();
        assert_eq!(
            m.r2(),
            &Err(ReportError::DegenerateInput {
                metric: Metric::R2,
                reason: Degeneracy::ZeroVariance,
            })
        );
        assert_eq!(m.mae(), &Ok(0.0));
        assert_eq!(m.rmse(), &Ok(0.0));
    }

    #[test]
    fn zero_label_only_disables_mape() {
        let m = compute_metrics(&[1.0, 0.0, 3.0, 0.0], &[1.0, 0.5, 2.0, 1.0]).unwrap();
        assert_eq!(
            m.mape(),
            &Err(ReportError::DegenerateInput {
                metric: Metric::Mape,
                reason: Degeneracy::ZeroDenominator { index: 1 },
            })
        );
        assert!(m.mae().is_ok());
        assert!(m.rmse().is_ok());
        assert!(m.r2().is_ok());
    }

    #[test]
    fn mape_uses_magnitude_of_relative_error() {
        let m = compute_metrics(&[-10.0, 10.0], &[-12.0, 8.0]).unwrap();
        assert!(approx(*m.mape().as_ref().unwrap(), 20.0));
    }

    #[test]
    fn non_finite_inputs_leave_every_metric_undefined() {
        let m = compute_metrics(&[1.0, f64::NAN], &[1.0, 2.0]).unwrap();
        for (_, value) in m.entries() {
            assert!(matches!(
                value,
                Err(ReportError::DegenerateInput {
                    reason: Degeneracy::NonFiniteValue { index: 1 },
                    ..
                })
            ));
        }
    }

    #[test]
    fn inexact_constants_are_zero_variance() {
        let m = compute_metrics(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            m.r2(),
            &Err(ReportError::DegenerateInput {
                metric: Metric::R2,
                reason: Degeneracy::ZeroVariance,
            })
        );
        let m = compute_metrics(&[1.0, 2.0, 3.0], &[0.7, 0.7, 0.7]).unwrap();
        assert!(m.r2().is_err());
    }

    #[test]
    fn huge_finite_inputs_keep_scale_invariant_r2() {
        let big = compute_metrics(&[1e200, -1e200, 1e200], &[1e200, 1e200, -1e200]).unwrap();
        let unit = compute_metrics(&[1.0, -1.0, 1.0], &[1.0, 1.0, -1.0]).unwrap();
        let r2_big = *big.r2().as_ref().unwrap();
        let r2_unit = *unit.r2().as_ref().unwrap();
        assert!(approx(r2_unit, 0.25));
        assert!(approx(r2_big, r2_unit));

        let rmse = *big.rmse().as_ref().unwrap();
        let expected = 1e200 * (8.0f64 / 3.0).sqrt();
        assert!(rmse.is_finite());
        assert!((rmse - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn overflowing_errors_are_marked_not_infinite() {
        let m = compute_metrics(&[f64::MAX, -f64::MAX], &[-f64::MAX, f64::MAX]).unwrap();
        let overflow = |metric| {
            Err(ReportError::DegenerateInput {
                metric,
                reason: Degeneracy::Overflow,
            })
        };
        assert_eq!(m.mae(), &overflow(Metric::Mae));
        assert_eq!(m.rmse(), &overflow(Metric::Rmse));
        assert_eq!(m.mape(), &overflow(Metric::Mape));
        // Correlation of the rescaled vectors is still well defined.
        assert!(approx(*m.r2().as_ref().unwrap(), 1.0));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = compute_metrics(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert!(matches!(err, ReportError::ShapeMismatch { .. }));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(compute_metrics(&[], &[]), Err(ReportError::EmptyInput));
    }

    #[test]
    fn rmse_dominates_mae() {
        let labels = [3.0, 7.5, 1.0, 12.0, 5.5, 9.0];
        let predictions = [2.0, 9.0, 1.5, 8.0, 5.5, 11.0];
        let m = compute_metrics(&labels, &predictions).unwrap();
        let mae = *m.mae().as_ref().unwrap();
        let rmse = *m.rmse().as_ref().unwrap();
        assert!(mae >= 0.0);
        assert!(rmse >= mae);
    }

    #[test]
    fn display_uses_report_precision() {
        let m = compute_metrics(&[10.0, 20.0, 30.0], &[12.0, 18.0, 33.0]).unwrap();
        let text = m.to_string();
        assert!(text.contains("- MAE : 2.33"));
        assert!(text.contains("- MAPE (%) : 13.33%"));
        assert!(text.contains("- RMSE : 2.38"));

        let zero = compute_metrics(&[0.0, 1.0], &[0.5, 1.0]).unwrap();
        assert!(zero.to_string().contains("- MAPE (%) : n/a"));
    }
}
