use super::request::DataSource;
use serde::{Deserialize, Serialize};

/// Ответ эндпоинтов chip-export-estimate / chip-export-aggregated-estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub total_count: u64,
    pub estimated_csv_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EstimateSource {
    Remote,
    /// Сервер недоступен или ответил ошибкой; причина для лога
    Fallback { reason: String },
}

/// Export size shown in the export modal.
///
/// `bytes` is the history-corrected figure; `base_bytes` is what the server
/// (or the fallback formula) said and is what gets recorded into the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEstimate {
    pub count: u64,
    pub bytes: u64,
    pub base_bytes: u64,
    pub source: EstimateSource,
}

impl ExportEstimate {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, EstimateSource::Fallback { .. })
    }
}

/// Constants of the fallback estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    pub rows: u64,
    pub contracts_bytes_per_row: u64,
    pub aggregated_bytes_per_row: u64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            rows: 10_000,
            contracts_bytes_per_row: 350,
            aggregated_bytes_per_row: 60,
        }
    }
}

impl FallbackPolicy {
    pub fn bytes_per_row(&self, data_source: DataSource) -> u64 {
        if data_source.is_aggregated() {
            self.aggregated_bytes_per_row
        } else {
            self.contracts_bytes_per_row
        }
    }

    pub fn estimate(&self, data_source: DataSource, reason: impl Into<String>) -> ExportEstimate {
        let bytes = self.rows.saturating_mul(self.bytes_per_row(data_source));
        ExportEstimate {
            count: self.rows,
            bytes,
            base_bytes: bytes,
            source: EstimateSource::Fallback {
                reason: reason.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_formula() {
        let policy = FallbackPolicy::default();
        let contracts = policy.estimate(DataSource::Contracts, "offline");
        assert_eq!((contracts.count, contracts.bytes), (10_000, 3_500_000));
        let aggregated = policy.estimate(DataSource::Aggregated, "offline");
        assert_eq!((aggregated.count, aggregated.bytes), (10_000, 600_000));
        let analytics = policy.estimate(DataSource::Analytics, "offline");
        assert_eq!(analytics.bytes, 600_000);
        assert!(analytics.is_fallback());
    }

    #[test]
    fn test_fallback_saturates_on_huge_settings() {
        let policy = FallbackPolicy {
            rows: u64::MAX / 2,
            ..FallbackPolicy::default()
        };
        let estimate = policy.estimate(DataSource::Contracts, "offline");
        assert_eq!(estimate.bytes, u64::MAX);
        assert_eq!(estimate.base_bytes, u64::MAX);
    }
}
