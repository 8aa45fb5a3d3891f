//! Translations provider client.

use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::SyncError;
use crate::config::Config;

/// Build the provider URL for a branch.
pub fn branch_url(template: &str, branch: &str) -> Result<Url, SyncError> {
    let raw = template.replace("{branch}", branch);

    Url::parse(&raw).map_err(|source| SyncError::InvalidUrl { url: raw, source })
}

/// Fetch the full translations payload for `branch`.
///
/// Requires a provider token (config or environment), a URL template and
/// an auth header name. Any transport error, non-success status or
/// non-JSON body is fatal.
pub async fn fetch(config: &Config, branch: &str) -> Result<Value, SyncError> {
    let token = config.provider_token().ok_or(SyncError::MissingToken)?;

    let template = config
        .provider_url_template
        .as_deref()
        .ok_or(SyncError::MissingUrlTemplate)?;

    let auth_header = config
        .provider_auth_header
        .as_deref()
        .ok_or(SyncError::MissingAuthHeader)?;

    let url = branch_url(template, branch)?;
    info!("Pulling translations from {}", url);

    let client = reqwest::Client::builder()
        .timeout(config.provider_timeout)
        .user_agent(concat!("translations/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client.get(url).header(auth_header, token).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::Status(status));
    }

    let body = response.bytes().await?;
    debug!("Provider answered {} bytes", body.len());

    serde_json::from_slice(&body).map_err(SyncError::InvalidJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_url() {
        let url = branch_url("https://tr.example.com/export/{branch}.json", "main").unwrap();

        assert_eq!(url.as_str(), "https://tr.example.com/export/main.json");
    }

    #[test]
    fn test_branch_url_invalid() {
        let err = branch_url("not a url/{branch}", "main").unwrap_err();

        assert!(matches!(err, SyncError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_missing_token_checked_first() {
        let config = Config {
            provider_token: None,
            provider_url_template: None,
            ..Config::default()
        };

        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::remove_var(crate::config::PROVIDER_TOKEN_VAR) };

        let err = fetch(&config, "main").await.unwrap_err();
        assert!(matches!(err, SyncError::MissingToken));
    }
}
