use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::api::{ApiConfig, DEFAULT_SERVICE_URL};
use crate::domain::AppError;

const APP_DIR: &str = "hitomi-companion";
const CONFIG_FILE: &str = "config.json";

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Send pages to Hitomi Downloader", long_about = None)]
pub struct Cli {
    /// Page URL to check on startup
    pub url: Option<String>,

    /// Base URL of the Hitomi Downloader HTTP API
    #[arg(long, value_name = "URL")]
    pub service_url: Option<String>,

    /// Netscape cookies.txt to read cookies from
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Release feed (GitHub releases API) of this application
    #[arg(long, value_name = "URL")]
    pub release_feed: Option<String>,

    /// Skip the release check
    #[arg(long)]
    pub no_update_check: bool,

    /// Use this config file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_url: String,
    pub request_timeout_secs: u64,
    /// No feed means no release check.
    pub release_feed_url: Option<String>,
    pub check_for_updates: bool,
    pub cookies_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout_secs: 5,
            release_feed_url: None,
            check_for_updates: true,
            cookies_file: None,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        let base = dirs::config_dir().or_else(dirs::home_dir)?;
        Some(base.join(APP_DIR).join(CONFIG_FILE))
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(AppError::Io(format!("{}: {}", path.display(), e))),
        };
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from `path` or the default location, falling back to defaults
    /// on any error.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::Io(e.to_string()))?;
        }
        let raw =
            serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        fs::write(path, raw).map_err(|e| AppError::Io(format!("{}: {}", path.display(), e)))
    }

    /// Command-line flags win over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.service_url {
            self.service_url = url.clone();
        }
        if let Some(cookies) = &cli.cookies {
            self.cookies_file = Some(cookies.clone());
        }
        if let Some(feed) = &cli.release_feed {
            self.release_feed_url = Some(feed.clone());
        }
        if cli.no_update_check {
            self.check_for_updates = false;
        }
    }

    /// The feed to poll this session, if any.
    pub fn active_release_feed(&self) -> Option<&str> {
        self.release_feed_url
            .as_deref()
            .filter(|url| self.check_for_updates && !url.trim().is_empty())
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.service_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }
}
