use crate::dashboards::d501_contract_search::Dimension;
use crate::shared::chip_payload::ChipFilterPayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CONTRACTS_ESTIMATE_PATH: &str = "/contracts/chip-export-estimate/";
pub const AGGREGATED_ESTIMATE_PATH: &str = "/contracts/chip-export-aggregated-estimate/";
pub const CONTRACTS_EXPORT_PATH: &str = "/contracts/chip-export/";
pub const AGGREGATED_EXPORT_PATH: &str = "/contracts/chip-export-aggregated/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    /// CSV генерируется сервером и читается потоком
    Streaming,
    /// CSV собирается в браузере из уже загруженных строк
    ClientSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Contracts,
    Aggregated,
    Analytics,
    Custom,
}

impl DataSource {
    /// Aggregated and analytics exports share the aggregated endpoints and row size.
    pub fn is_aggregated(&self) -> bool {
        matches!(self, DataSource::Aggregated | DataSource::Analytics)
    }
}

/// Request body of the estimate and export endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    #[serde(flatten)]
    pub filters: ChipFilterPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
}

/// One export intent. Built when the user clicks export, consumed once by the
/// streamer and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub kind: ExportKind,
    pub data_source: DataSource,
    pub endpoint: Option<String>,
    pub filename: String,
    pub filters: ChipFilterPayload,
    pub dimension: Option<Dimension>,
}

impl ExportConfig {
    pub fn contracts(filters: ChipFilterPayload, at: DateTime<Utc>) -> Self {
        Self {
            kind: ExportKind::Streaming,
            data_source: DataSource::Contracts,
            endpoint: None,
            filename: export_filename(DataSource::Contracts, None, at),
            filters,
            dimension: None,
        }
    }

    pub fn aggregated(filters: ChipFilterPayload, dimension: Dimension, at: DateTime<Utc>) -> Self {
        Self {
            kind: ExportKind::Streaming,
            data_source: DataSource::Aggregated,
            endpoint: None,
            filename: export_filename(DataSource::Aggregated, Some(dimension), at),
            filters,
            dimension: Some(dimension),
        }
    }

    pub fn analytics(filters: ChipFilterPayload, dimension: Dimension, at: DateTime<Utc>) -> Self {
        Self {
            data_source: DataSource::Analytics,
            filename: export_filename(DataSource::Analytics, Some(dimension), at),
            ..Self::aggregated(filters, dimension, at)
        }
    }

    pub fn custom(endpoint: &str, filename: &str, filters: ChipFilterPayload) -> Self {
        Self {
            kind: ExportKind::Streaming,
            data_source: DataSource::Custom,
            endpoint: Some(endpoint.to_string()),
            filename: filename.to_string(),
            filters,
            dimension: None,
        }
    }

    /// Export of rows already loaded in the table; no request is made.
    pub fn client_side(data_source: DataSource, filename: &str) -> Self {
        Self {
            kind: ExportKind::ClientSide,
            data_source,
            endpoint: None,
            filename: filename.to_string(),
            filters: ChipFilterPayload::default(),
            dimension: None,
        }
    }

    pub fn payload(&self) -> ExportPayload {
        ExportPayload {
            filters: self.filters.clone(),
            dimension: if self.data_source.is_aggregated() {
                Some(self.dimension.unwrap_or_default())
            } else {
                None
            },
        }
    }

    /// Estimate endpoint path; None sends the estimator straight to the fallback.
    pub fn estimate_path(&self) -> Option<&str> {
        match self.data_source {
            DataSource::Contracts => Some(CONTRACTS_ESTIMATE_PATH),
            DataSource::Aggregated | DataSource::Analytics => Some(AGGREGATED_ESTIMATE_PATH),
            DataSource::Custom => self.endpoint.as_deref(),
        }
    }

    pub fn export_path(&self) -> Option<&str> {
        match self.data_source {
            DataSource::Contracts => Some(CONTRACTS_EXPORT_PATH),
            DataSource::Aggregated | DataSource::Analytics => Some(AGGREGATED_EXPORT_PATH),
            DataSource::Custom => self.endpoint.as_deref(),
        }
    }
}

/// `contracts_<ts>.csv` or `analytics_<dimension>_<ts>.csv`
pub fn export_filename(
    data_source: DataSource,
    dimension: Option<Dimension>,
    at: DateTime<Utc>,
) -> String {
    let ts = at.format("%Y-%m-%dT%H-%M-%S");
    match data_source {
        DataSource::Aggregated | DataSource::Analytics => format!(
            "analytics_{}_{}.csv",
            dimension.unwrap_or_default().short_name(),
            ts
        ),
        DataSource::Contracts => format!("contracts_{}.csv", ts),
        DataSource::Custom => format!("export_{}.csv", ts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::chip_payload::normalize_filters;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 14, 2, 26).unwrap()
    }

    #[test]
    fn test_aggregated_contractor_export() {
        let filters = normalize_filters(&json!({"keywords": ["road"]}))
            .unwrap()
            .payload;
        let config = ExportConfig::aggregated(filters, Dimension::ByContractor, at());

        assert_eq!(config.filename, "analytics_contractor_2024-03-15T14-02-26.csv");
        assert!(config.filename.starts_with("analytics_contractor_"));
        assert!(config.filename.ends_with(".csv"));

        let body = serde_json::to_value(config.payload()).unwrap();
        assert_eq!(body["dimension"], json!("by_contractor"));
        assert_eq!(body["keywords"], json!(["road"]));
        assert_eq!(body["contractors"], json!([]));
        assert_eq!(config.estimate_path(), Some(AGGREGATED_ESTIMATE_PATH));
        assert_eq!(config.export_path(), Some(AGGREGATED_EXPORT_PATH));
    }

    #[test]
    fn test_contracts_payload_has_no_dimension() {
        let config = ExportConfig::contracts(ChipFilterPayload::default(), at());
        let body = serde_json::to_value(config.payload()).unwrap();
        assert!(body.get("dimension").is_none());
        assert_eq!(config.filename, "contracts_2024-03-15T14-02-26.csv");
        assert_eq!(config.estimate_path(), Some(CONTRACTS_ESTIMATE_PATH));
        assert_eq!(config.export_path(), Some(CONTRACTS_EXPORT_PATH));
    }

    #[test]
    fn test_analytics_uses_aggregated_endpoints() {
        let config = ExportConfig::analytics(ChipFilterPayload::default(), Dimension::ByArea, at());
        assert_eq!(config.filename, "analytics_area_2024-03-15T14-02-26.csv");
        assert_eq!(config.export_path(), Some(AGGREGATED_EXPORT_PATH));
        assert_eq!(config.payload().dimension, Some(Dimension::ByArea));
    }

    #[test]
    fn test_custom_endpoint() {
        let config = ExportConfig::custom("/contracts/custom-export/", "custom.csv", ChipFilterPayload::default());
        assert_eq!(config.estimate_path(), Some("/contracts/custom-export/"));
        assert_eq!(config.export_path(), Some("/contracts/custom-export/"));
        assert_eq!(config.filename, "custom.csv");

        let without_endpoint = ExportConfig {
            endpoint: None,
            ..config
        };
        assert_eq!(without_endpoint.estimate_path(), None);
        assert_eq!(without_endpoint.export_path(), None);
    }
}
