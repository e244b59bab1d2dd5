use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use dashboard_core::load_settings;
use eframe::egui;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::SellerDashboardApp;

#[derive(Debug, Parser)]
#[command(
    name = "seller_dashboard",
    about = "Desktop dashboard for listing products and fulfilling orders"
)]
struct Args {
    /// TOML settings file. `dashboard.toml` is read when present and this is omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings(args.config.as_deref())
        .context("failed to load dashboard settings")?;
    info!(endpoint = %settings.endpoint_url, "seller dashboard starting");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Seller Dashboard")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Seller Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SellerDashboardApp::new(cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow::anyhow!("ui event loop failed: {err}"))
}
