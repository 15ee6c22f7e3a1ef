use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, report};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyReportApp {
    pub state: AppState,
}

impl RustyReportApp {
    /// Start with the bundle in `dir` already loaded, if given.
    pub fn new(dir: Option<PathBuf>) -> Self {
        let mut app = Self::default();
        if let Some(dir) = dir {
            app.state.open_directory(&dir);
        }
        app
    }
}

impl eframe::App for RustyReportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            report::central_report(ui, &self.state);
        });
    }
}
