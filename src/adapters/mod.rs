// Adapters layer: concrete implementations of the ports for external systems.

pub mod chatwork;
pub mod csv_source;
pub mod google_auth;
pub mod sheets;

use crate::utils::error::{NoticeError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("daily-notice/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// 在 base URL 後面接上路徑片段，片段會被 percent-encode
pub(crate) fn join_segments(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url).map_err(|e| NoticeError::InvalidConfigValueError {
        field: "base_url".to_string(),
        value: base_url.to_string(),
        reason: e.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|_| NoticeError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
