pub mod error;
pub mod estimator;
pub mod progress;
pub mod request;
pub mod response;
pub mod session;
pub mod stream;
pub mod transport;

pub use error::ExportError;
pub use estimator::{EstimateHistory, ExportEstimator, Smoothing};
pub use progress::{ProgressBasis, ProgressTracker};
pub use request::{export_filename, DataSource, ExportConfig, ExportKind, ExportPayload};
pub use response::{EstimateResponse, EstimateSource, ExportEstimate, FallbackPolicy};
pub use session::{ConcurrentExportPolicy, ExportPhase, ExportSession, ExportState, ExportTicket};
pub use stream::{download_export, pump_stream};
pub use transport::{CancelHandle, CancelToken, ChunkSink, ChunkSource, ExportTransport, StreamResponse};

use crate::usecases::common::UseCaseMetadata;

pub struct ChipExport;

impl UseCaseMetadata for ChipExport {
    fn usecase_index() -> &'static str {
        "u601"
    }

    fn usecase_name() -> &'static str {
        "chip_export"
    }

    fn display_name() -> &'static str {
        "Export to CSV"
    }

    fn description() -> &'static str {
        "Estimate and stream a CSV export of contracts or aggregated analytics for the active chip filters"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(ChipExport::full_name(), "u601_chip_export");
    }
}
