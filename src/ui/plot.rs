use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoints, Points};

use crate::data::model::CellValue;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Real vs predicted scatter
// ---------------------------------------------------------------------------

/// Scatter of true against predicted values with the identity line.
pub fn prediction_scatter(ui: &mut Ui, state: &AppState) {
    let (Some(bundle), Some(view)) = (&state.bundle, &state.scatter) else {
        ui.label("No finite values to plot.");
        return;
    };

    // Group points by region so each gets a colour and a legend entry.
    let region = state.config.region_column.as_str();
    let mut groups: BTreeMap<Option<&CellValue>, Vec<[f64; 2]>> = BTreeMap::new();
    for (&idx, &point) in view.indices.iter().zip(&view.points) {
        let key = state
            .color_map
            .as_ref()
            .and_then(|_| bundle.observations.row(idx)?.get(region));
        groups.entry(key).or_default().push(point);
    }

    Plot::new("prediction_scatter")
        .height(320.0)
        .legend(Legend::default())
        .x_axis_label("True values")
        .y_axis_label("Predictions")
        .data_aspect(1.0)
        .show(ui, |plot_ui| {
            for (key, points) in groups {
                let (name, color) = match (key, &state.color_map) {
                    (Some(value), Some(cm)) => (value.to_string(), cm.color_for(value)),
                    _ => ("observations".to_string(), Color32::LIGHT_BLUE),
                };
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(name)
                        .color(color.gamma_multiply(0.5))
                        .radius(2.5),
                );
            }

            plot_ui.line(
                Line::new(PlotPoints::from(view.diagonal.to_vec()))
                    .name("perfect prediction")
                    .color(Color32::RED)
                    .style(LineStyle::dashed_loose()),
            );
        });
}

// ---------------------------------------------------------------------------
// Feature importance bars
// ---------------------------------------------------------------------------

/// Horizontal bar chart of the top-N importances, most important on top.
pub fn importance_chart(ui: &mut Ui, state: &AppState) {
    let top = state.top_features();
    if top.is_empty() {
        ui.label("No feature importances loaded.");
        return;
    }

    let n = top.len();
    let bars: Vec<Bar> = top
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            Bar::new((n - 1 - rank) as f64, entry.score)
                .name(&entry.feature)
                .width(0.7)
        })
        .collect();

    let names: Vec<String> = top.iter().map(|e| e.feature.clone()).collect();

    Plot::new("importance_chart")
        .height(24.0 * n as f32 + 40.0)
        .x_axis_label("Importance")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .y_axis_formatter(move |mark, _range| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > 1e-6 || pos < 0.0 || pos as usize >= names.len() {
                return String::new();
            }
            names[names.len() - 1 - pos as usize].clone()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .horizontal()
                    .color(Color32::from_rgb(70, 130, 180))
                    .name("Importance"),
            );
        });
}
