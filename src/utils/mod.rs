use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix timestamp in seconds
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// The URI handed to the OS in compatibility mode.
pub fn hitomi_uri(page_url: &str) -> String {
    format!("hitomi://{}", page_url)
}
