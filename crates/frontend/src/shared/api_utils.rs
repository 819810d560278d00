//! API utilities for frontend-backend communication
//!
//! Provides helper functions for constructing API URLs.

use crate::shared::app_config::app_config;
use contracts::shared::config::ApiConfig;

/// Get the base URL for API requests
///
/// Uses `[api] base_url` when configured, otherwise builds it from the
/// current window location and the configured port and prefix.
///
/// # Returns
/// - API base URL like "http://localhost:3200/api/v1"
/// - Empty string if window is not available and no base URL is configured
pub fn api_base() -> String {
    let config = app_config();
    if config.api.base_url.is_none() {
        let Some(window) = web_sys::window() else {
            return String::new();
        };
        let location = window.location();
        let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
        let hostname = location
            .hostname()
            .unwrap_or_else(|_| "127.0.0.1".to_string());
        return build_api_base(&config.api, &protocol, &hostname);
    }
    build_api_base(&config.api, "", "")
}

pub fn build_api_base(api: &ApiConfig, protocol: &str, hostname: &str) -> String {
    match &api.base_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => format!(
            "{}//{}:{}{}",
            protocol, hostname, api.port, api.path_prefix
        ),
    }
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust,ignore
/// let url = api_url("/contracts/chip-search/");
/// ```
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::config::AppConfig;

    #[test]
    fn test_default_base_from_location() {
        let api = AppConfig::default().api;
        assert_eq!(
            build_api_base(&api, "https:", "philgeps.example.org"),
            "https://philgeps.example.org:3200/api/v1"
        );
    }

    #[test]
    fn test_configured_base_wins() {
        let mut api = AppConfig::default().api;
        api.base_url = Some("https://api.example.org/api/v1/".into());
        assert_eq!(
            build_api_base(&api, "http:", "localhost"),
            "https://api.example.org/api/v1"
        );
    }
}
