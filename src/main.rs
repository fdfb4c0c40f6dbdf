// src/main.rs
mod drivers;
mod engine;
mod gui;
mod scope;
mod types;
use anyhow::{anyhow, Context, Result};
use eframe::egui;
use drivers::AppSettings;
// 入口函数
fn main() -> Result<()> {
    env_logger::init();
    let settings = AppSettings::from_env().context("invalid SCOPE_* environment")?;
    log::info!("starting scope viewer: {:?}", settings.mode);
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 760.0])
        .with_min_inner_size([800.0, 480.0])
        .with_title("ADC Scope");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "ADC Scope",
        options,
        Box::new(move |_cc| Box::new(gui::ScopeApp::new(settings))),
    )
    .map_err(|err| anyhow!("viewer exited with error: {err}"))
}
