//! Report engine: pure computations over the loaded evaluation data.
//!
//! ```text
//!   labels, predictions ──► metrics   ──► MetricsSummary (R², MAE, MAPE, RMSE)
//!                       └─► scatter   ──► points + identity line
//!   importance table    ──► importance ─► top-N features
//!   observations + both ──► inspect   ──► row lookup, worst-error ranking
//! ```
//!
//! Nothing here holds state or performs I/O; every function borrows its
//! inputs and returns a fresh value or a [`ReportError`].

pub mod error;
pub mod importance;
pub mod inspect;
pub mod metrics;
pub mod scatter;

pub use error::{Degeneracy, Metric, ReportError};
pub use importance::top_importances;
pub use inspect::{lookup_observation, rank_by_absolute_error, ObservationDetail, RankedError};
pub use metrics::{compute_metrics, MetricValue, MetricsSummary};
pub use scatter::{prediction_scatter, ScatterView};
pub use crate::data::filter::{distinct_values, filter_by_categorical_value};
