mod app;
mod ui;

use app::DashboardApp;
use data_dashboard::data::loader::LoadOptions;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 480.0]),
        ..Default::default()
    };

    let load_options = LoadOptions::from_env();
    log::info!("Starting with {load_options:?}");

    eframe::run_native(
        "Interactive Data Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(load_options)))),
    )
}
