use contracts::shared::config::AppConfig;
use leptos::prelude::Effect;
use leptos::prelude::*;
use std::collections::HashMap;
use web_sys::window;

/// Вкладки главной страницы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Contracts,
    Analytics,
}

impl DashboardTab {
    pub fn key(&self) -> &'static str {
        match self {
            DashboardTab::Contracts => "contracts",
            DashboardTab::Analytics => "analytics",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "contracts" => Some(DashboardTab::Contracts),
            "analytics" => Some(DashboardTab::Analytics),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DashboardTab::Contracts => "Contracts",
            DashboardTab::Analytics => "Analytics",
        }
    }
}

#[derive(Clone, Copy)]
pub struct AppGlobalContext {
    pub active: RwSignal<DashboardTab>,
    pub config: StoredValue<AppConfig>,
}

impl AppGlobalContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            active: RwSignal::new(DashboardTab::Contracts),
            config: StoredValue::new(config),
        }
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    /// Restores the active tab from `?tab=` and keeps the URL in sync.
    pub fn init_router_integration(&self) {
        let search = window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let params: HashMap<String, String> =
            serde_qs::from_str(search.trim_start_matches('?')).unwrap_or_default();
        if let Some(tab) = params.get("tab").and_then(|k| DashboardTab::from_key(k)) {
            self.active.set(tab);
        }

        let this = *self;
        Effect::new(move |_| {
            let tab = this.active.get();
            let query_string = serde_qs::to_string(&HashMap::from([(
                "tab".to_string(),
                tab.key().to_string(),
            )]))
            .unwrap_or_default();

            let new_url = format!("?{}", query_string);

            let current_search = window()
                .and_then(|w| w.location().search().ok())
                .unwrap_or_default();

            // Only update URL if it actually changed
            if current_search != new_url {
                if let Some(w) = window() {
                    if let Ok(history) = w.history() {
                        let _ = history.replace_state_with_url(
                            &wasm_bindgen::JsValue::NULL,
                            "",
                            Some(&new_url),
                        );
                    }
                }
            }
        });
    }

    pub fn activate_tab(&self, tab: DashboardTab) {
        leptos::logging::log!("activate_tab: '{}'", tab.key());
        self.active.set(tab);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_keys() {
        for tab in [DashboardTab::Contracts, DashboardTab::Analytics] {
            assert_eq!(DashboardTab::from_key(tab.key()), Some(tab));
        }
        assert_eq!(DashboardTab::from_key("pivot"), None);
    }
}
