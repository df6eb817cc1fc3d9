use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::BrowserCookie;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:6975";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Response from the /version endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

/// Body shared by /types and /download
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputRequest {
    pub input: String,
}

/// Response from the /types endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TypesResponse {
    #[serde(default)]
    pub types: Vec<String>,
}

/// One cookie as the service expects it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CookiePayload {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    pub name: String,
    pub value: String,
    pub path: String,
}

impl From<&BrowserCookie> for CookiePayload {
    fn from(cookie: &BrowserCookie) -> Self {
        Self {
            domain: cookie.domain.clone(),
            expires: cookie.expires_at,
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            path: cookie.path.clone(),
        }
    }
}

/// Body of the /update_cookies endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateCookiesRequest {
    pub cookies: Vec<CookiePayload>,
}

/// One entry of a GitHub-style release feed
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Release {
    pub tag_name: String,
    /// Page to send the user to; absent on some mirrors.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVICE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
