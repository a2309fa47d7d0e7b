// main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;
use rigpuppet::app::RigPuppetApp;

fn main() -> eframe::Result {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let app = RigPuppetApp::default();
    let size = app.canvas + egui::vec2(32.0, 64.0);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(size)
            .with_min_inner_size([320.0, 400.0]),
        centered: true,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "RigPuppet",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_theme(egui::Theme::Light);
            Ok(Box::new(app))
        }),
    )
}
