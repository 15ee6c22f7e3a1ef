use super::error::{check_pair, ReportError};

/// Points for the real-vs-predicted chart plus the identity reference line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterView {
    /// `[true, predicted]` per observation, in input order.
    pub points: Vec<[f64; 2]>,
    /// Source observation index of each point.
    pub indices: Vec<usize>,
    /// Identity segment from the smallest to the largest true value.
    pub diagonal: [[f64; 2]; 2],
}

/// Build the scatter view. Non-finite pairs are left out of both the points
/// and the diagonal bounds.
pub fn prediction_scatter(labels: &[f64], predictions: &[f64]) -> Result<ScatterView, ReportError> {
    check_pair(labels, predictions)?;

    let (indices, points): (Vec<usize>, Vec<[f64; 2]>) = labels
        .iter()
        .zip(predictions)
        .enumerate()
        .filter(|(_, (l, p))| l.is_finite() && p.is_finite())
        .map(|(i, (&l, &p))| (i, [l, p]))
        .unzip();
    if points.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    let min = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);

    Ok(ScatterView {
        points,
        indices,
        diagonal: [[min, min], [max, max]],
    })
}
