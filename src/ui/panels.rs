use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – report controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    let Some(len) = state.bundle.as_ref().map(|b| b.len()) else {
        ui.label("No report loaded.");
        return;
    };

    // ---- Importance ----
    ui.strong("Number of features to show");
    let mut top_n = state.top_n;
    let slider = egui::Slider::new(&mut top_n, state.config.top_n_min..=state.config.top_n_max);
    if ui.add(slider).changed() {
        state.set_top_n(top_n);
    }
    ui.separator();

    // ---- Row inspection ----
    ui.strong("Select an index (test row)");
    let mut index = state.selected_index;
    let drag = egui::DragValue::new(&mut index).range(0..=len.saturating_sub(1));
    if ui.add(drag).changed() {
        state.set_selected_index(index);
    }
    ui.separator();

    // ---- Worst errors ----
    ui.strong("Largest errors to list");
    let mut top_k = state.error_top_k;
    if ui
        .add(egui::DragValue::new(&mut top_k).range(1..=len.max(1)))
        .changed()
    {
        state.error_top_k = top_k;
    }

    // ---- Regional filter ----
    if state.has_region_filter() {
        ui.separator();
        ui.strong(format!("Filter by {}", state.config.region_column));

        let current = state
            .selected_region
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        let mut chosen = None;
        egui::ComboBox::from_id_salt("region_filter")
            .selected_text(&current)
            .show_ui(ui, |ui: &mut Ui| {
                for value in &state.region_values {
                    let selected = state.selected_region.as_ref() == Some(value);
                    let mut text = RichText::new(value.to_string());
                    if let Some(cm) = &state.color_map {
                        text = text.color(cm.color_for(value));
                    }
                    if ui.selectable_label(selected, text).clicked() {
                        chosen = Some(value.clone());
                    }
                }
            });
        if let Some(value) = chosen {
            state.select_region(Some(value));
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            let can_export = state.bundle.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export predictions…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.bundle {
            let source = state
                .data_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default();
            ui.label(format!("{} test rows loaded from {source}", ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open evaluation folder")
        .pick_folder();

    if let Some(dir) = folder {
        state.open_directory(&dir);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export predictions")
        .set_file_name("predictions_export.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        // Errors are already logged and shown in the status line.
        let _ = state.export_to(&path);
    }
}
