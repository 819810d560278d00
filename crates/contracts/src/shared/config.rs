use crate::shared::chip_payload::ChipFilterPayload;
use crate::usecases::u601_chip_export::{
    export_filename, ConcurrentExportPolicy, DataSource, EstimateHistory, ExportConfig,
    FallbackPolicy, ProgressBasis, Smoothing,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub export: ExportConfigSection,
    pub pagination: PaginationConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    /// Полный базовый URL API; если не задан, строится из window.location и `port`
    #[serde(default)]
    pub base_url: Option<String>,
    pub port: u16,
    pub path_prefix: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExportConfigSection {
    pub fallback_rows: u64,
    pub contracts_bytes_per_row: u64,
    pub aggregated_bytes_per_row: u64,
    pub history_capacity: usize,
    pub smoothing: String,
    pub smoothing_alpha: f64,
    pub assumed_throughput_bytes_per_sec: u64,
    pub heuristic_progress_cap: u8,
    pub concurrent_policy: String,
    /// Отдельный сервис выгрузки контрактов; пусто = стандартные эндпоинты
    #[serde(default)]
    pub custom_endpoint: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PaginationConfig {
    pub default_page_size: usize,
    pub page_size_options: Vec<usize>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    pub top_n: usize,
}

/// Default configuration embedded in the binary
pub const DEFAULT_CONFIG: &str = r#"
[api]
port = 3200
path_prefix = "/api/v1"

[export]
fallback_rows = 10000
contracts_bytes_per_row = 350
aggregated_bytes_per_row = 60
history_capacity = 50
smoothing = "mean"
smoothing_alpha = 0.3
assumed_throughput_bytes_per_sec = 524288
heuristic_progress_cap = 95
concurrent_policy = "reject_new"

[pagination]
default_page_size = 20
page_size_options = [20, 50, 100]

[search]
top_n = 20
"#;

/// Partial override; every key is optional and falls back to the defaults.
#[derive(Debug, Deserialize, Default)]
struct ConfigOverride {
    #[serde(default)]
    api: Option<toml::Table>,
    #[serde(default)]
    export: Option<toml::Table>,
    #[serde(default)]
    pagination: Option<toml::Table>,
    #[serde(default)]
    search: Option<toml::Table>,
}

fn merge_section(base: &mut toml::Table, section: &str, patch: Option<toml::Table>) {
    let Some(patch) = patch else { return };
    if let Some(toml::Value::Table(target)) = base.get_mut(section) {
        for (key, value) in patch {
            target.insert(key, value);
        }
    }
}

/// Loads configuration: embedded defaults, optionally patched by an override
/// TOML document (the frontend reads it from local storage).
pub fn load_config(override_toml: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut base: toml::Table = toml::from_str(DEFAULT_CONFIG)?;
    if let Some(raw) = override_toml.filter(|s| !s.trim().is_empty()) {
        let patch: ConfigOverride = toml::from_str(raw)?;
        merge_section(&mut base, "api", patch.api);
        merge_section(&mut base, "export", patch.export);
        merge_section(&mut base, "pagination", patch.pagination);
        merge_section(&mut base, "search", patch.search);
    }
    let config: AppConfig = toml::Value::Table(base).try_into()?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    fn validate(&self) -> anyhow::Result<()> {
        if self.pagination.default_page_size == 0 {
            anyhow::bail!("pagination.default_page_size must be greater than zero");
        }
        if self.export.history_capacity == 0 {
            anyhow::bail!("export.history_capacity must be greater than zero");
        }
        if self.export.heuristic_progress_cap > 100 {
            anyhow::bail!("export.heuristic_progress_cap must be within 0..=100");
        }
        self.smoothing()?;
        self.concurrent_policy()?;
        Ok(())
    }

    pub fn smoothing(&self) -> anyhow::Result<Smoothing> {
        match self.export.smoothing.as_str() {
            "mean" => Ok(Smoothing::Mean),
            "exponential" => {
                let alpha = self.export.smoothing_alpha;
                if !(alpha > 0.0 && alpha <= 1.0) {
                    anyhow::bail!("export.smoothing_alpha must be within (0, 1], got {}", alpha);
                }
                Ok(Smoothing::Exponential { alpha })
            }
            other => anyhow::bail!("unknown export.smoothing `{}`", other),
        }
    }

    pub fn concurrent_policy(&self) -> anyhow::Result<ConcurrentExportPolicy> {
        ConcurrentExportPolicy::from_str(&self.export.concurrent_policy).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown export.concurrent_policy `{}`",
                self.export.concurrent_policy
            )
        })
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        FallbackPolicy {
            rows: self.export.fallback_rows,
            contracts_bytes_per_row: self.export.contracts_bytes_per_row,
            aggregated_bytes_per_row: self.export.aggregated_bytes_per_row,
        }
    }

    pub fn estimate_history(&self) -> anyhow::Result<EstimateHistory> {
        Ok(EstimateHistory::new(
            self.export.history_capacity,
            self.smoothing()?,
        ))
    }

    /// Export of the contracts table: the built-in endpoints, or the custom
    /// export endpoint when one is configured.
    pub fn contracts_export(&self, filters: ChipFilterPayload, at: DateTime<Utc>) -> ExportConfig {
        match self.export.custom_endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => ExportConfig::custom(
                endpoint,
                &export_filename(DataSource::Custom, None, at),
                filters,
            ),
            _ => ExportConfig::contracts(filters, at),
        }
    }

    /// Heuristic progress basis for a download expected to be `expected_bytes` long.
    pub fn heuristic_progress(&self, expected_bytes: u64) -> ProgressBasis {
        ProgressBasis::Heuristic {
            expected_bytes,
            throughput_bytes_per_sec: self.export.assumed_throughput_bytes_per_sec,
            cap: self.export.heuristic_progress_cap,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: None,
                port: 3200,
                path_prefix: "/api/v1".to_string(),
            },
            export: ExportConfigSection {
                fallback_rows: 10_000,
                contracts_bytes_per_row: 350,
                aggregated_bytes_per_row: 60,
                history_capacity: 50,
                smoothing: "mean".to_string(),
                smoothing_alpha: 0.3,
                assumed_throughput_bytes_per_sec: 512 * 1024,
                heuristic_progress_cap: 95,
                concurrent_policy: "reject_new".to_string(),
                custom_endpoint: None,
            },
            pagination: PaginationConfig {
                default_page_size: 20,
                page_size_options: vec![20, 50, 100],
            },
            search: SearchConfig { top_n: 20 },
        }
    }
}
