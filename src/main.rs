// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod config;
mod gui;
mod stream;
mod types;

use eframe::egui;

use crate::config::{AppConfig, MODE_ENV_VAR};

fn main() -> eframe::Result<()> {
    env_logger::init();

    let mode_override = std::env::var(MODE_ENV_VAR).ok();
    let config = AppConfig::load_or_default().with_mode_override(mode_override.as_deref());
    log::info!("starting in {:?} mode", config.run_mode);

    // Platform probe happens exactly once, here, and the result is threaded
    // into the app composition.
    let provider = stream::probe_provider(config.run_mode);

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1100.0, 720.0])
        .with_min_inner_size([900.0, 600.0])
        .with_title("DeepSpectrum demo v0.1");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "DeepSpectrum",
        options,
        Box::new(move |_cc| Box::new(gui::DeepSpectrumApp::new(config, provider))),
    )
}
