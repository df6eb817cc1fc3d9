mod api;
mod app;
mod application;
mod browser;
mod config;
mod domain;
mod ui;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use iced::window;

use crate::api::{ApiClient, ReleaseFeed};
use crate::config::{AppConfig, Cli};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref());
    config.apply_cli(&cli);
    tracing::info!("Using Hitomi Downloader HTTP API at {}", config.service_url);

    let api = match ApiClient::new(config.api_config()) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("Failed to set up HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let release_feed = config.active_release_feed().and_then(|url| {
        ReleaseFeed::new(url)
            .map_err(|e| tracing::warn!("Release check disabled: {e}"))
            .ok()
    });

    let parts = app::AppParts {
        api,
        config,
        config_path: cli.config,
        release_feed,
        initial_url: cli.url,
    };

    let result = iced::application(
        move || app::PopupApp::boot(parts.clone()),
        app::update,
        app::view,
    )
    .title("Hitomi Downloader companion")
    .subscription(app::subscription)
    .window(window::Settings {
        size: iced::Size::new(520.0, 560.0),
        ..Default::default()
    })
    .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
