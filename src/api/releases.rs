use std::cmp::Ordering;

use reqwest::{Client, StatusCode};

use super::client::{ApiError, Result};
use super::models::{Release, DEFAULT_TIMEOUT};

/// Reads a GitHub-style release feed once per session.
///
/// The feed must list releases of this application; its tags are compared
/// against `CARGO_PKG_VERSION`.
#[derive(Clone)]
pub struct ReleaseFeed {
    feed_url: String,
    http: Client,
}

impl ReleaseFeed {
    pub fn new(feed_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            feed_url: feed_url.into(),
            http,
        })
    }

    /// The most recent release, if the feed lists any.
    pub async fn latest(&self) -> Result<Option<Release>> {
        let response = self
            .http
            .get(&self.feed_url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::Status(response.status().as_u16()));
        }

        let releases: Vec<Release> = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;
        Ok(releases.into_iter().next())
    }
}

fn version_parts(tag: &str) -> Option<Vec<u64>> {
    let core = tag.trim().trim_start_matches(['v', 'V']);
    let core = core.split(['-', '+']).next().unwrap_or_default();
    if core.is_empty() {
        return None;
    }
    core.split('.').map(|part| part.parse().ok()).collect()
}

fn compare_versions(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// True only when `latest` is a strictly newer version than `installed`.
/// Tags that aren't dotted numbers are never announced.
pub fn is_new_release(installed: &str, latest: &str) -> bool {
    match (version_parts(installed), version_parts(latest)) {
        (Some(installed), Some(latest)) => {
            compare_versions(&latest, &installed) == Ordering::Greater
        }
        _ => false,
    }
}
