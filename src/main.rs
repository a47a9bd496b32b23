use std::path::Path;
use std::sync::Arc;

use eframe::egui;
use vasalytics::app::VasalyticsApp;
use vasalytics::config::{CONFIG_FILE, DashboardConfig};
use vasalytics::data::DataStore;
use vasalytics::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));
    let store = Arc::new(DataStore::new(&config));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Vasalytics",
        options,
        Box::new(move |_cc| Ok(Box::new(VasalyticsApp::new(AppState::new(store, config))))),
    )
}
