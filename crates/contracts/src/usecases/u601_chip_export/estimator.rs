use super::request::ExportConfig;
use super::response::{EstimateSource, ExportEstimate, FallbackPolicy};
use super::transport::ExportTransport;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How past (estimated, actual) pairs are folded into a correction factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Smoothing {
    /// Среднее отношений actual / estimated, без затухания
    Mean,
    /// Экспоненциальное сглаживание, alpha ∈ (0, 1]: вес последнего замера
    Exponential { alpha: f64 },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Mean
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateSample {
    pub estimated_bytes: u64,
    pub actual_bytes: u64,
}

impl EstimateSample {
    fn ratio(&self) -> f64 {
        self.actual_bytes as f64 / self.estimated_bytes as f64
    }
}

/// Rolling history of export sizes, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateHistory {
    samples: VecDeque<EstimateSample>,
    capacity: usize,
    smoothing: Smoothing,
}

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

impl Default for EstimateHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, Smoothing::Mean)
    }
}

impl EstimateHistory {
    pub fn new(capacity: usize, smoothing: Smoothing) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            smoothing,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = &EstimateSample> {
        self.samples.iter()
    }

    /// Records a finished export. Zero estimates carry no ratio and are skipped.
    pub fn record(&mut self, estimated_bytes: u64, actual_bytes: u64) {
        if estimated_bytes == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(EstimateSample {
            estimated_bytes,
            actual_bytes,
        });
    }

    pub fn correction_factor(&self) -> f64 {
        if self.samples.is_empty() {
            return 1.0;
        }
        match self.smoothing {
            Smoothing::Mean => {
                let sum: f64 = self.samples.iter().map(EstimateSample::ratio).sum();
                sum / self.samples.len() as f64
            }
            Smoothing::Exponential { alpha } => {
                let mut ratios = self.samples.iter().map(EstimateSample::ratio);
                let first = ratios.next().unwrap_or(1.0);
                ratios.fold(first, |acc, r| alpha * r + (1.0 - alpha) * acc)
            }
        }
    }

    /// `base * factor`, rounded.
    pub fn improve(&self, base_bytes: u64) -> u64 {
        (base_bytes as f64 * self.correction_factor()).round().max(0.0) as u64
    }
}

/// Produces export estimates. Never fails: remote errors turn into the
/// fallback estimate with the reason attached.
#[derive(Debug, Clone, Default)]
pub struct ExportEstimator {
    fallback: FallbackPolicy,
    history: EstimateHistory,
}

impl ExportEstimator {
    pub fn new(fallback: FallbackPolicy, history: EstimateHistory) -> Self {
        Self { fallback, history }
    }

    pub fn record_completion(&mut self, estimate: &ExportEstimate, actual_bytes: u64) {
        self.history.record(estimate.base_bytes, actual_bytes);
    }

    pub async fn estimate<T: ExportTransport + ?Sized>(
        &self,
        transport: &T,
        config: &ExportConfig,
    ) -> ExportEstimate {
        let base = match config.estimate_path() {
            Some(path) => match transport.post_estimate(path, &config.payload()).await {
                Ok(resp) => ExportEstimate {
                    count: resp.total_count,
                    bytes: resp.estimated_csv_bytes,
                    base_bytes: resp.estimated_csv_bytes,
                    source: EstimateSource::Remote,
                },
                Err(e) => self.fallback.estimate(config.data_source, e.to_string()),
            },
            None => self
                .fallback
                .estimate(config.data_source, "no estimate endpoint for this export"),
        };

        ExportEstimate {
            bytes: self.history.improve(base.base_bytes),
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d501_contract_search::Dimension;
    use crate::shared::chip_payload::ChipFilterPayload;
    use crate::usecases::u601_chip_export::error::ExportError;
    use crate::usecases::u601_chip_export::request::{
        ExportPayload, AGGREGATED_ESTIMATE_PATH, CONTRACTS_ESTIMATE_PATH,
    };
    use crate::usecases::u601_chip_export::response::EstimateResponse;
    use crate::usecases::u601_chip_export::transport::{
        CancelToken, ChunkSource, StreamResponse,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use futures::executor::block_on;
    use std::cell::RefCell;

    struct NoBody;

    #[async_trait(?Send)]
    impl ChunkSource for NoBody {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ExportError> {
            Ok(None)
        }
    }

    struct FakeTransport {
        response: Result<EstimateResponse, ExportError>,
        calls: RefCell<Vec<(String, ExportPayload)>>,
    }

    impl FakeTransport {
        fn new(response: Result<EstimateResponse, ExportError>) -> Self {
            Self {
                response,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl ExportTransport for FakeTransport {
        type Cancel = CancelToken;
        type Source = NoBody;

        async fn post_estimate(
            &self,
            path: &str,
            payload: &ExportPayload,
        ) -> Result<EstimateResponse, ExportError> {
            self.calls
                .borrow_mut()
                .push((path.to_string(), payload.clone()));
            self.response.clone()
        }

        async fn open_stream(
            &self,
            _path: &str,
            _payload: &ExportPayload,
            _cancel: &CancelToken,
        ) -> Result<StreamResponse<NoBody>, ExportError> {
            Ok(StreamResponse {
                content_length: None,
                body: NoBody,
            })
        }
    }

    #[test]
    fn test_failed_estimate_resolves_to_fallback() {
        let transport = FakeTransport::new(Err(ExportError::Http { status: 500 }));
        let estimator = ExportEstimator::default();

        let contracts = ExportConfig::contracts(ChipFilterPayload::default(), Utc::now());
        let estimate = block_on(estimator.estimate(&transport, &contracts));
        assert_eq!((estimate.count, estimate.bytes), (10_000, 10_000 * 350));
        assert!(estimate.is_fallback());

        let aggregated = ExportConfig::aggregated(
            ChipFilterPayload::default(),
            Dimension::ByContractor,
            Utc::now(),
        );
        let estimate = block_on(estimator.estimate(&transport, &aggregated));
        assert_eq!((estimate.count, estimate.bytes), (10_000, 10_000 * 60));
    }

    #[test]
    fn test_remote_estimate_and_endpoint_selection() {
        let transport = FakeTransport::new(Ok(EstimateResponse {
            total_count: 1234,
            estimated_csv_bytes: 148_080,
        }));
        let estimator = ExportEstimator::default();

        let aggregated = ExportConfig::aggregated(
            ChipFilterPayload::default(),
            Dimension::ByOrganization,
            Utc::now(),
        );
        let estimate = block_on(estimator.estimate(&transport, &aggregated));
        assert_eq!(estimate.source, EstimateSource::Remote);
        assert_eq!(estimate.count, 1234);
        assert_eq!(estimate.bytes, 148_080);

        let contracts = ExportConfig::contracts(ChipFilterPayload::default(), Utc::now());
        block_on(estimator.estimate(&transport, &contracts));

        let calls = transport.calls.borrow();
        assert_eq!(calls[0].0, AGGREGATED_ESTIMATE_PATH);
        assert_eq!(calls[0].1.dimension, Some(Dimension::ByOrganization));
        assert_eq!(calls[1].0, CONTRACTS_ESTIMATE_PATH);
        assert_eq!(calls[1].1.dimension, None);
    }

    #[test]
    fn test_custom_estimate_posts_to_its_endpoint() {
        let transport = FakeTransport::new(Ok(EstimateResponse {
            total_count: 7,
            estimated_csv_bytes: 700,
        }));
        let estimator = ExportEstimator::default();
        let config = ExportConfig::custom("/x/", "x.csv", ChipFilterPayload::default());
        let estimate = block_on(estimator.estimate(&transport, &config));
        assert!(!estimate.is_fallback());
        assert_eq!((estimate.count, estimate.bytes), (7, 700));
        assert_eq!(transport.calls.borrow()[0].0, "/x/");
    }

    #[test]
    fn test_custom_without_endpoint_uses_fallback() {
        let transport = FakeTransport::new(Ok(EstimateResponse {
            total_count: 1,
            estimated_csv_bytes: 1,
        }));
        let estimator = ExportEstimator::default();
        let config = ExportConfig {
            endpoint: None,
            ..ExportConfig::custom("/x/", "x.csv", ChipFilterPayload::default())
        };
        let estimate = block_on(estimator.estimate(&transport, &config));
        assert!(estimate.is_fallback());
        assert_eq!(estimate.bytes, 3_500_000);
        assert!(transport.calls.borrow().is_empty());
    }

    #[test]
    fn test_history_biases_estimates() {
        let transport = FakeTransport::new(Ok(EstimateResponse {
            total_count: 100,
            estimated_csv_bytes: 1000,
        }));
        let mut estimator = ExportEstimator::default();
        let config = ExportConfig::contracts(ChipFilterPayload::default(), Utc::now());

        let first = block_on(estimator.estimate(&transport, &config));
        assert_eq!(first.bytes, 1000);
        estimator.record_completion(&first, 1500);

        let second = block_on(estimator.estimate(&transport, &config));
        assert_eq!(second.base_bytes, 1000);
        assert_eq!(second.bytes, 1500);
    }

    #[test]
    fn test_history_capped() {
        let mut history = EstimateHistory::new(50, Smoothing::Mean);
        for _ in 0..60 {
            history.record(100, 300);
        }
        history.record(100, 100);
        assert_eq!(history.len(), 50);
        // 49 × 3.0 + 1 × 1.0
        let expected = (49.0 * 3.0 + 1.0) / 50.0;
        assert!((history.correction_factor() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_estimate_not_recorded() {
        let mut history = EstimateHistory::default();
        history.record(0, 500);
        assert!(history.is_empty());
        assert_eq!(history.correction_factor(), 1.0);
        assert_eq!(history.improve(777), 777);
    }

    #[test]
    fn test_exponential_smoothing_weights_recent_samples() {
        let mut history = EstimateHistory::new(10, Smoothing::Exponential { alpha: 0.5 });
        history.record(100, 100); // 1.0
        history.record(100, 200); // 2.0
        history.record(100, 400); // 4.0
        // 1.0 → 0.5·2 + 0.5·1 = 1.5 → 0.5·4 + 0.5·1.5 = 2.75
        assert!((history.correction_factor() - 2.75).abs() < 1e-9);
        assert_eq!(history.improve(1000), 2750);
    }
}
