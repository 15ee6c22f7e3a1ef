use std::path::PathBuf;

use eframe::egui;
use rusty_report::app::RustyReportApp;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional evaluation folder to open at start-up.
    let data_dir = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 850.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Report – Model Evaluation",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyReportApp::new(data_dir)))),
    )
}
