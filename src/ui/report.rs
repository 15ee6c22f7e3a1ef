use eframe::egui::{Grid, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::report::metrics::{format_metric, metric_label};
use crate::state::AppState;

use super::plot;

// ---------------------------------------------------------------------------
// Central report
// ---------------------------------------------------------------------------

/// Render every report section in a vertical scroll area.
pub fn central_report(ui: &mut Ui, state: &AppState) {
    if state.bundle.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an evaluation folder to view the report  (File → Open folder…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Model evaluation");
            metrics_section(ui, state);
            ui.separator();

            ui.heading("True values vs predictions");
            plot::prediction_scatter(ui, state);
            ui.separator();

            ui.heading("Feature importance");
            plot::importance_chart(ui, state);
            ui.separator();

            ui.heading("Explore predictions");
            observation_section(ui, state);
            ui.separator();

            ui.heading("Largest errors");
            worst_errors_section(ui, state);

            if state.has_region_filter() {
                ui.separator();
                ui.heading(format!("Filter by {}", state.config.region_column));
                region_section(ui, state);
            }
        });
}

fn metrics_section(ui: &mut Ui, state: &AppState) {
    let summary = match &state.metrics {
        Some(Ok(summary)) => summary,
        Some(Err(e)) => {
            ui.label(RichText::new(format!("Metrics unavailable: {e}")).weak());
            return;
        }
        None => return,
    };

    Grid::new("metrics_grid")
        .num_columns(2)
        .spacing([24.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (metric, value) in summary.entries() {
                ui.strong(metric_label(metric));
                let text = RichText::new(format_metric(metric, value)).monospace();
                let response = ui.label(text);
                if let Err(e) = value {
                    response.on_hover_text(e.to_string());
                }
                ui.end_row();
            }
        });
}

fn observation_section(ui: &mut Ui, state: &AppState) {
    let detail = match state.selected_detail() {
        Some(Ok(detail)) => detail,
        Some(Err(e)) => {
            ui.label(format!("Cannot show row {}: {e}", state.selected_index));
            return;
        }
        None => return,
    };

    ui.label(format!("🔍 Features of row {}:", detail.index()));
    Grid::new("observation_grid")
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            for (name, value) in detail.features.fields() {
                ui.label(name);
                ui.monospace(value.to_string());
                ui.end_row();
            }
        });
    ui.label(format!("True value: {:.2}", detail.true_value));
    ui.strong(format!("🎯 Model prediction: {:.2}", detail.predicted_value));
}

fn worst_errors_section(ui: &mut Ui, state: &AppState) {
    let ranked = match state.worst_errors() {
        Ok(r) => r,
        Err(e) => {
            ui.label(format!("Ranking unavailable: {e}"));
            return;
        }
    };

    TableBuilder::new(ui)
        .id_salt("worst_errors")
        .striped(true)
        .vscroll(false)
        .columns(Column::auto().at_least(60.0), 4)
        .header(20.0, |mut header| {
            for title in ["Row", "True", "Predicted", "Abs. error"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for r in &ranked {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(r.index().to_string());
                    });
                    row.col(|ui| {
                        ui.monospace(format!("{:.2}", r.detail.true_value));
                    });
                    row.col(|ui| {
                        ui.monospace(format!("{:.2}", r.detail.predicted_value));
                    });
                    row.col(|ui| {
                        ui.monospace(format!("{:.2}", r.absolute_error));
                    });
                });
            }
        });
}

fn region_section(ui: &mut Ui, state: &AppState) {
    let Some(bundle) = &state.bundle else {
        return;
    };
    ui.label(format!(
        "{} observations found in this region.",
        state.region_indices.len()
    ));

    let columns = bundle.observations.columns();
    ScrollArea::horizontal()
        .id_salt("region_preview")
        .show(ui, |ui: &mut Ui| {
            Grid::new("region_preview_grid")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    ui.strong("row");
                    for name in columns {
                        ui.strong(name);
                    }
                    ui.end_row();

                    let preview = state
                        .region_indices
                        .iter()
                        .take(state.config.region_preview_rows)
                        .filter_map(|&i| bundle.observations.row(i));
                    for row in preview {
                        ui.label(row.index().to_string());
                        for value in row.values() {
                            ui.monospace(value.to_string());
                        }
                        ui.end_row();
                    }
                });
        });
}
