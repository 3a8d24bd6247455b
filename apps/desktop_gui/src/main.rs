//! Desktop GUI for the employee directory.
//!
//! The egui frontend never performs I/O itself: UI actions are queued as
//! backend commands over a crossbeam channel, a dedicated worker thread
//! drives the async directory client on a tokio runtime, and results flow
//! back as UI events drained each frame.

mod backend_bridge;
mod controller;
mod ui;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

fn resolve_server_url() -> String {
    std::env::var("EMPLOYEE_DIR_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string())
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let server_url = resolve_server_url();
    tracing::info!(%server_url, "starting employee directory gui");

    let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(256);
    let (ui_tx, ui_rx) = crossbeam_channel::bounded(2048);

    backend_bridge::runtime::launch(cmd_rx, ui_tx, server_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Employee Directory")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([860.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Employee Directory",
        options,
        Box::new(move |_cc| Ok(Box::new(ui::DirectoryGuiApp::new(cmd_tx, ui_rx)))),
    )
}
