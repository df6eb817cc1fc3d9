mod client;
mod models;
mod releases;

pub use client::ApiClient;
pub use models::{ApiConfig, CookiePayload, Release, DEFAULT_SERVICE_URL};
pub use releases::{is_new_release, ReleaseFeed};
