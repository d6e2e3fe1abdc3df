use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voicehud::connection::{ConnectionManager, WsTransport};
use voicehud::dispatch::CommandDispatcher;
use voicehud::ui::HudApp;
use voicehud::utils::SessionChannels;
use voicehud::ClientConfig;

fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to read .env");
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voicehud=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting voice HUD");

    let config = ClientConfig::from_env().context("invalid configuration")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 860.0])
            .with_min_inner_size([440.0, 600.0])
            .with_title("Voice Assistant"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Voice Assistant",
        options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let channels = SessionChannels::new();
            let sink = channels
                .sink
                .with_waker(Arc::new(move || ctx.request_repaint()));

            let manager = ConnectionManager::new(WsTransport::default(), &config)?;
            let connection = manager.connect(&handle, sink);

            Ok(Box::new(HudApp::new(
                &cc.egui_ctx,
                &config,
                CommandDispatcher::new(connection),
                channels.events,
            )))
        }),
    );

    // Give the worker a moment to close the link cleanly
    runtime.shutdown_timeout(std::time::Duration::from_millis(500));

    if let Err(e) = result {
        error!("UI exited with error: {}", e);
        anyhow::bail!("UI error: {}", e);
    }
    Ok(())
}
