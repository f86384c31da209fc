use std::path::PathBuf;

use eframe::egui;
use sales_dashboard::app::SalesDashboardApp;
use sales_dashboard::config::{DEFAULT_CONFIG_FILE, DashboardConfig};

fn main() -> eframe::Result {
    env_logger::init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = match DashboardConfig::load_or_default(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(config)))),
    )
}
