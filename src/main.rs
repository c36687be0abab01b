mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::TitanicApp;
use clap::Parser;
use config::Config;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();
    let config = Config::parse();

    data::loader::configure(config.source());
    let mut state = AppState::new(&config);
    match data::loader::load() {
        Ok(dataset) => state.set_dataset(dataset),
        Err(e) => {
            log::error!("{e}");
            state.set_load_error(e);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Titanic Data Analysis",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the header image.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(TitanicApp::new(state)))
        }),
    )
}
