use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::color::ColorMap;
use crate::config::ReportConfig;
use crate::data::filter::{distinct_values, filter_by_categorical_value};
use crate::data::model::{CellValue, EvaluationBundle, ImportanceEntry};
use crate::data::{export, loader};
use crate::report::{
    self, compute_metrics, prediction_scatter, MetricsSummary, ObservationDetail, RankedError,
    ReportError, ScatterView,
};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The loaded bundle is kept here for the whole session; derived views are
/// recomputed from it when inputs or controls change.
pub struct AppState {
    /// Column names and control bounds for the current directory.
    pub config: ReportConfig,

    /// Directory the bundle was loaded from.
    pub data_dir: Option<PathBuf>,

    /// Loaded inputs (None until a directory is opened).
    pub bundle: Option<EvaluationBundle>,

    /// Metrics for the loaded bundle.
    pub metrics: Option<Result<MetricsSummary, ReportError>>,

    /// Real-vs-predicted points (cached).
    pub scatter: Option<ScatterView>,

    /// How many features the importance chart shows.
    pub top_n: usize,

    /// Observation under inspection.
    pub selected_index: usize,

    /// Rows in the worst-error table.
    pub error_top_k: usize,

    /// Distinct values of the region column; empty when it is absent.
    pub region_values: Vec<CellValue>,

    /// Region chosen in the selector.
    pub selected_region: Option<CellValue>,

    /// Observations in the selected region (cached).
    pub region_indices: Vec<usize>,

    /// Scatter colouring by region.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        let config = ReportConfig::default();
        Self {
            top_n: config.top_n_default,
            error_top_k: config.error_top_k,
            config,
            data_dir: None,
            bundle: None,
            metrics: None,
            scatter: None,
            selected_index: 0,
            region_values: Vec::new(),
            selected_region: None,
            region_indices: Vec::new(),
            color_map: None,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Load the config and bundle from `dir`. Failures land in the status
    /// line and leave the previous report in place.
    pub fn open_directory(&mut self, dir: &Path) {
        self.loading = true;
        let loaded = ReportConfig::for_directory(dir)
            .and_then(|config| Ok((loader::load_bundle(dir, &config)?, config)));
        match loaded {
            Ok((bundle, config)) => {
                self.data_dir = Some(dir.to_path_buf());
                self.set_bundle(bundle, config);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", dir.display());
                self.status_message = Some(format!("Error: {e:#}"));
                self.loading = false;
            }
        }
    }

    /// Ingest a newly loaded bundle, recompute metrics and reset controls.
    pub fn set_bundle(&mut self, bundle: EvaluationBundle, config: ReportConfig) {
        let metrics = compute_metrics(&bundle.labels, &bundle.predictions);
        match &metrics {
            Ok(summary) => {
                for (metric, value) in summary.entries() {
                    if let Err(e) = value {
                        log::warn!("{metric} not shown: {e}");
                    }
                }
            }
            Err(e) => log::warn!("Metrics unavailable: {e}"),
        }
        self.metrics = Some(metrics);
        self.scatter = prediction_scatter(&bundle.labels, &bundle.predictions).ok();

        self.top_n = config.top_n_default;
        self.error_top_k = config.error_top_k;
        self.selected_index = 0;

        self.region_values =
            distinct_values(&bundle.observations, &config.region_column).unwrap_or_default();
        self.color_map = (!self.region_values.is_empty())
            .then(|| ColorMap::new(&self.region_values));
        self.config = config;
        self.bundle = Some(bundle);

        let first = self.region_values.first().cloned();
        self.select_region(first);

        self.status_message = None;
        self.loading = false;
    }

    /// Whether the regional filter section applies to this bundle.
    pub fn has_region_filter(&self) -> bool {
        !self.region_values.is_empty()
    }

    /// Choose a region and refresh the matching indices.
    pub fn select_region(&mut self, value: Option<CellValue>) {
        self.region_indices = match (&self.bundle, &value) {
            (Some(bundle), Some(v)) => {
                filter_by_categorical_value(&bundle.observations, &self.config.region_column, v)
                    .unwrap_or_default()
            }
            _ => Vec::new(),
        };
        self.selected_region = value;
    }

    /// Clamp and set the importance slider.
    pub fn set_top_n(&mut self, n: usize) {
        self.top_n = n.clamp(self.config.top_n_min, self.config.top_n_max);
    }

    /// Clamp and set the inspected observation.
    pub fn set_selected_index(&mut self, index: usize) {
        let len = self.bundle.as_ref().map_or(0, |b| b.len());
        self.selected_index = index.min(len.saturating_sub(1));
    }

    pub fn top_features(&self) -> Vec<&ImportanceEntry> {
        self.bundle
            .as_ref()
            .map(|b| report::top_importances(&b.importances, self.top_n))
            .unwrap_or_default()
    }

    pub fn selected_detail(&self) -> Option<Result<ObservationDetail<'_>, ReportError>> {
        let b = self.bundle.as_ref()?;
        Some(report::lookup_observation(
            &b.observations,
            &b.labels,
            &b.predictions,
            self.selected_index,
        ))
    }

    pub fn worst_errors(&self) -> Result<Vec<RankedError<'_>>, ReportError> {
        match &self.bundle {
            Some(b) => report::rank_by_absolute_error(
                &b.observations,
                &b.labels,
                &b.predictions,
                self.error_top_k,
            ),
            None => Ok(Vec::new()),
        }
    }

    /// Write the prediction table to `path`, reporting failures in the
    /// status line.
    pub fn export_to(&mut self, path: &Path) -> Result<()> {
        let Some(bundle) = &self.bundle else {
            anyhow::bail!("no report loaded");
        };
        let result =
            export::export_predictions(path, bundle, &self.config.export_prediction_column);
        match &result {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ImportanceTable, ObservationTable};

    fn bundle() -> EvaluationBundle {
        let observations = ObservationTable::new(
            vec!["surface".into(), "Nom de la région".into()],
            vec![
                vec![CellValue::Float(40.0), "Bretagne".into()],
                vec![CellValue::Float(75.0), "Occitanie".into()],
                vec![CellValue::Float(62.0), "Bretagne".into()],
            ],
        )
        .unwrap();
        let importances = ImportanceTable::new(
            (0..12).map(|i| (format!("f{i}"), i as f64)).collect(),
        )
        .unwrap();
        EvaluationBundle::new(
            observations,
            vec![100.0, 200.0, 150.0],
            vec![110.0, 190.0, 120.0],
            importances,
        )
        .unwrap()
    }

    #[test]
    fn set_bundle_derives_views() {
        let mut state = AppState::default();
        state.set_bundle(bundle(), ReportConfig::default());

        assert!(matches!(state.metrics, Some(Ok(_))));
        assert_eq!(state.scatter.as_ref().unwrap().points.len(), 3);
        assert!(state.has_region_filter());
        assert_eq!(state.selected_region, Some(CellValue::from("Bretagne")));
        assert_eq!(state.region_indices, vec![0, 2]);
        assert_eq!(state.top_features().len(), 10);
        assert_eq!(state.top_features()[0].feature, "f11");

        let worst = state.worst_errors().unwrap();
        assert_eq!(worst[0].index(), 2);
    }

    #[test]
    fn controls_are_clamped() {
        let mut state = AppState::default();
        state.set_bundle(bundle(), ReportConfig::default());

        state.set_top_n(100);
        assert_eq!(state.top_n, 30);
        state.set_top_n(1);
        assert_eq!(state.top_n, 5);

        state.set_selected_index(9);
        assert_eq!(state.selected_index, 2);
        let detail = state.selected_detail().unwrap().unwrap();
        assert_eq!(detail.predicted_value, 120.0);
    }

    #[test]
    fn missing_region_column_disables_filter() {
        let mut state = AppState::default();
        let config = ReportConfig {
            region_column: "city".into(),
            ..ReportConfig::default()
        };
        state.set_bundle(bundle(), config);
        assert!(!state.has_region_filter());
        assert!(state.region_indices.is_empty());
        assert!(state.color_map.is_none());
    }

    #[test]
    fn failed_open_keeps_status_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.open_directory(dir.path());
        assert!(state.bundle.is_none());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
        assert!(!state.loading);
    }
}
