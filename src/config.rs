use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Report configuration
// ---------------------------------------------------------------------------

/// File looked up in a data directory to override the defaults.
pub const CONFIG_FILE_NAME: &str = "report.json";

/// Where the four inputs live and how their columns are named.
///
/// Every field has a default, so a `report.json` only needs the keys it
/// changes:
///
/// ```json
/// { "prediction_column": "price", "region_column": "city" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub features_file: String,
    pub labels_file: String,
    pub predictions_file: String,
    pub importance_file: String,

    /// Label column; `None` means the labels file must have exactly one.
    pub label_column: Option<String>,
    pub prediction_column: String,
    pub importance_feature_column: String,
    pub importance_score_column: String,

    /// Categorical column offered for regional filtering, if present.
    pub region_column: String,

    /// Bounds and default of the top-N importance slider.
    pub top_n_min: usize,
    pub top_n_max: usize,
    pub top_n_default: usize,

    /// Rows shown in the worst-error table.
    pub error_top_k: usize,

    /// Rows previewed under the regional filter.
    pub region_preview_rows: usize,

    /// Header of the predicted column in exported CSV.
    pub export_prediction_column: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            features_file: "X_test.csv".into(),
            labels_file: "y_test.csv".into(),
            predictions_file: "predictions.csv".into(),
            importance_file: "feature_importance.csv".into(),
            label_column: None,
            prediction_column: "target".into(),
            importance_feature_column: "Feature".into(),
            importance_score_column: "Importance".into(),
            region_column: "Nom de la région".into(),
            top_n_min: 5,
            top_n_max: 30,
            top_n_default: 10,
            error_top_k: 10,
            region_preview_rows: 5,
            export_prediction_column: "prediction".into(),
        }
    }
}

impl ReportConfig {
    /// Parse a JSON config file and validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: ReportConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// `report.json` in `dir` if it exists, defaults otherwise.
    pub fn for_directory(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            log::info!("Using report config {}", path.display());
            Self::from_file(&path)
        } else {
            log::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", dir.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n_min > self.top_n_max {
            bail!(
                "top_n_min ({}) is larger than top_n_max ({})",
                self.top_n_min,
                self.top_n_max
            );
        }
        if !(self.top_n_min..=self.top_n_max).contains(&self.top_n_default) {
            bail!(
                "top_n_default ({}) is outside {}..={}",
                self.top_n_default,
                self.top_n_min,
                self.top_n_max
            );
        }
        if self.export_prediction_column.is_empty() {
            bail!("export_prediction_column must not be empty");
        }
        Ok(())
    }
}
