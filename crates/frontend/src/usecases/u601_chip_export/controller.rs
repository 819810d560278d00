use super::api::{AbortHandle, FetchTransport};
use crate::shared::export::{export_to_csv, BlobSink, CsvExportable};
use contracts::shared::config::AppConfig;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u601_chip_export::{
    download_export, ChipExport, ConcurrentExportPolicy, EstimateHistory, EstimateSource, ExportConfig,
    ExportError, ExportEstimate, ExportEstimator, ExportSession, ExportState, ExportTicket, ProgressBasis,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Export flow bound to Leptos signals.
///
/// The session (and the abort controller it owns) lives in local storage of
/// the reactive owner; `state` mirrors it for the views after every step.
#[derive(Clone, Copy)]
pub struct ExportController {
    pub state: RwSignal<ExportState>,
    session: StoredValue<ExportSession<AbortHandle>, LocalStorage>,
    estimator: StoredValue<ExportEstimator>,
    app_config: StoredValue<AppConfig>,
}

impl ExportController {
    pub fn new(config: &AppConfig) -> Self {
        let policy = config.concurrent_policy().unwrap_or_else(|e| {
            log::warn!("{}; using reject_new", e);
            ConcurrentExportPolicy::default()
        });
        let history = config.estimate_history().unwrap_or_else(|e| {
            log::warn!("{}; using mean smoothing", e);
            EstimateHistory::default()
        });

        Self {
            state: RwSignal::new(ExportState::default()),
            session: StoredValue::new_local(ExportSession::new(policy)),
            estimator: StoredValue::new(ExportEstimator::new(config.fallback_policy(), history)),
            app_config: StoredValue::new(config.clone()),
        }
    }

    fn sync(&self) {
        let snapshot = self.session.with_value(|s| s.state().clone());
        self.state.set(snapshot);
    }

    /// Idle → Estimating → ModalOpen. The estimate never fails; a broken
    /// estimate endpoint yields the fallback figures.
    pub fn initiate_export(&self, config: ExportConfig) -> Result<(), ExportError> {
        let ticket = self
            .session
            .try_update_value(|s| s.begin_estimate(config.clone()))
            .unwrap_or(Err(ExportError::Stale))?;
        self.sync();
        log::info!("{}: estimate started for {}", ChipExport::full_name(), config.filename);

        let this = *self;
        spawn_local(async move {
            let transport = FetchTransport::new();
            let estimator = this.estimator.get_value();
            let estimate = estimator.estimate(&transport, &config).await;
            this.on_estimate(ticket, estimate);
        });
        Ok(())
    }

    fn on_estimate(&self, ticket: ExportTicket, estimate: ExportEstimate) {
        if let EstimateSource::Fallback { reason } = &estimate.source {
            log::warn!("Export estimate unavailable, using fallback: {}", reason);
        }
        let result = self
            .session
            .try_update_value(|s| s.estimate_ready(ticket, estimate))
            .unwrap_or(Err(ExportError::Stale));
        match result {
            Ok(()) => self.sync(),
            Err(e) => log::debug!("Estimate dropped: {}", e),
        }
    }

    /// ModalOpen → Downloading, streams the file and saves it.
    pub fn download_export(&self) -> Result<(), ExportError> {
        let handle = AbortHandle::new()?;
        let (ticket, config) = self
            .session
            .try_update_value(|s| s.start_download(handle.clone()))
            .unwrap_or(Err(ExportError::Stale))?;
        self.sync();

        let estimate = self.state.with_untracked(|s| s.estimate.clone());
        let expected = estimate.as_ref().map(|e| e.bytes).unwrap_or(0);
        let heuristic: ProgressBasis = self.app_config.with_value(|c| c.heuristic_progress(expected));
        log::info!("{}: download started for {}", ChipExport::full_name(), config.filename);

        let this = *self;
        spawn_local(async move {
            let transport = FetchTransport::new();
            let mut sink = BlobSink::new();
            let result = download_export(
                &transport,
                &config,
                heuristic,
                &mut sink,
                &handle,
                js_sys::Date::now,
                |pct| this.on_progress(ticket, pct),
            )
            .await;
            this.on_finished(ticket, estimate, result);
        });
        Ok(())
    }

    fn on_progress(&self, ticket: ExportTicket, percent: u8) {
        self.session.update_value(|s| s.update_progress(ticket, percent));
        self.sync();
    }

    fn on_finished(
        &self,
        ticket: ExportTicket,
        estimate: Option<ExportEstimate>,
        result: Result<u64, ExportError>,
    ) {
        let outcome = match result {
            Ok(bytes) => {
                log::info!("Export completed: {} bytes", bytes);
                if let Some(estimate) = &estimate {
                    self.estimator
                        .update_value(|e| e.record_completion(estimate, bytes));
                }
                self.session
                    .try_update_value(|s| s.complete(ticket, bytes))
                    .unwrap_or(Err(ExportError::Stale))
            }
            Err(ExportError::Cancelled) => {
                log::info!("Export cancelled");
                return;
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.session
                    .try_update_value(|s| s.fail(ticket, e.to_string()))
                    .unwrap_or(Err(ExportError::Stale))
            }
        };
        match outcome {
            Ok(()) => self.sync(),
            Err(e) => log::debug!("Export result dropped: {}", e),
        }
    }

    /// Downloading → Cancelled: fires the abort and clears progress and error.
    pub fn cancel_export(&self) {
        let cancelled = self.session.try_update_value(|s| s.cancel()).unwrap_or(false);
        if cancelled {
            log::info!("Export cancel requested");
        }
        self.sync();
    }

    pub fn close_modal(&self) {
        self.session.update_value(|s| s.close_modal());
        self.sync();
    }

    /// Exports rows already on screen without a server round trip.
    pub fn export_client_side<T: CsvExportable>(&self, rows: &[T], config: &ExportConfig) {
        if let Err(e) = export_to_csv(rows, &config.filename) {
            log::error!("Client-side export failed: {}", e);
        }
    }
}
