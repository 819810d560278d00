//! Runtime configuration: embedded defaults patched by an optional TOML
//! override kept in local storage.

use contracts::shared::config::{load_config, AppConfig};
use std::cell::OnceCell;

pub const CONFIG_OVERRIDE_KEY: &str = "philgeps_config_override";

thread_local! {
    static APP_CONFIG: OnceCell<AppConfig> = const { OnceCell::new() };
}

pub(crate) fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Reads the override from local storage. An override that does not parse
/// or validate is ignored with a warning.
pub fn load_app_config() -> AppConfig {
    let raw = storage().and_then(|s| s.get_item(CONFIG_OVERRIDE_KEY).ok().flatten());
    config_from_override(raw.as_deref())
}

pub fn config_from_override(raw: Option<&str>) -> AppConfig {
    match load_config(raw) {
        Ok(config) => config,
        Err(e) => {
            log::warn!(
                "Ignoring invalid config override in '{}': {}",
                CONFIG_OVERRIDE_KEY,
                e
            );
            AppConfig::default()
        }
    }
}

/// Configuration loaded once per page.
pub fn app_config() -> AppConfig {
    APP_CONFIG.with(|cell| cell.get_or_init(load_app_config).clone())
}
