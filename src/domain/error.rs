use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Could not reach Hitomi Downloader: {0}")]
    NetworkUnreachable(String),

    #[error("Service answered with HTTP {0}")]
    NonSuccessStatus(u16),

    #[error("Service returned an empty result")]
    EmptyResult,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("No page URL to work with")]
    MissingUrl,

    #[error("Cookie store error: {0}")]
    CookieStore(String),

    #[error("Failed to open {uri}: {reason}")]
    Launch { uri: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}
