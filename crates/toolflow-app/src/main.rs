mod app;
mod drafts;
mod steps;
mod theme;
mod wizard_view;

use anyhow::Context;
use app::ToolflowApp;
use std::path::PathBuf;
use toolflow_engine::WizardConfig;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn log_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("logs")
}

fn load_config() -> anyhow::Result<WizardConfig> {
    let path = std::env::var("TOOLFLOW_CONFIG").unwrap_or_else(|_| "toolflow.yaml".to_string());
    let mut config = WizardConfig::load_or_default(PathBuf::from(&path).as_path())
        .with_context(|| format!("loading config from {path}"))?;
    if let Ok(key) = std::env::var("TOOLFLOW_API_KEY") {
        config.backend.api_key = Some(key);
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("toolflow")
        .filename_suffix("log")
        .build(&log_dir)
        .context("creating log file appender")?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_filter = EnvFilter::new("debug");

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(console_filter))
        .with(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(file_filter),
        )
        .init();

    let config = load_config()?;
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    tracing::info!(
        backend = %config.backend.base_url,
        drafts = ?config.draft_location(),
        "toolflow starting"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1180.0, 780.0])
            .with_min_inner_size([820.0, 600.0])
            .with_title("Toolflow"),
        ..Default::default()
    };

    eframe::run_native(
        "Toolflow",
        options,
        Box::new(move |cc| {
            theme::apply_theme(&cc.egui_ctx);
            Ok(Box::new(ToolflowApp::new(config, runtime)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("UI exited with an error: {e}"))
}
