use super::error::ExportError;
use super::request::ExportConfig;
use super::response::ExportEstimate;
use super::transport::CancelHandle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    #[default]
    Idle,
    Estimating,
    ModalOpen,
    Downloading,
    Completed,
    Failed,
    Cancelled,
}

impl ExportPhase {
    /// Phases that own network work.
    pub fn is_busy(&self) -> bool {
        matches!(self, ExportPhase::Estimating | ExportPhase::Downloading)
    }
}

/// What happens when an export is started while another is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrentExportPolicy {
    /// Новый экспорт отклоняется с `AlreadyRunning`
    #[default]
    RejectNew,
    /// Текущий экспорт отменяется, новый запускается
    CancelPrevious,
}

impl ConcurrentExportPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcurrentExportPolicy::RejectNew => "reject_new",
            ConcurrentExportPolicy::CancelPrevious => "cancel_previous",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "reject_new" => Some(ConcurrentExportPolicy::RejectNew),
            "cancel_previous" => Some(ConcurrentExportPolicy::CancelPrevious),
            _ => None,
        }
    }
}

/// Identifies one estimate or download run. Results carrying an old ticket
/// are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExportTicket(u64);

/// Snapshot rendered by the export modal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportState {
    pub phase: ExportPhase,
    pub is_estimating: bool,
    pub show_modal: bool,
    pub is_exporting: bool,
    pub progress: u8,
    pub error: Option<String>,
    pub estimate: Option<ExportEstimate>,
    pub config: Option<ExportConfig>,
    pub bytes_received: u64,
}

/// Export state machine with an owned single-flight cancel handle.
///
/// Idle → Estimating → ModalOpen → Downloading → Completed | Failed | Cancelled,
/// and back to Idle through `close_modal`. A failed or cancelled download can be
/// restarted from the open modal.
pub struct ExportSession<C: CancelHandle> {
    state: ExportState,
    policy: ConcurrentExportPolicy,
    generation: u64,
    cancel: Option<C>,
}

impl<C: CancelHandle> Default for ExportSession<C> {
    fn default() -> Self {
        Self::new(ConcurrentExportPolicy::default())
    }
}

impl<C: CancelHandle> ExportSession<C> {
    pub fn new(policy: ConcurrentExportPolicy) -> Self {
        Self {
            state: ExportState::default(),
            policy,
            generation: 0,
            cancel: None,
        }
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    pub fn phase(&self) -> ExportPhase {
        self.state.phase
    }

    pub fn has_cancel_handle(&self) -> bool {
        self.cancel.is_some()
    }

    fn next_ticket(&mut self) -> ExportTicket {
        self.generation += 1;
        ExportTicket(self.generation)
    }

    fn check(&self, ticket: ExportTicket) -> Result<(), ExportError> {
        if ticket.0 == self.generation {
            Ok(())
        } else {
            Err(ExportError::Stale)
        }
    }

    /// Applies the concurrency policy when work is already in flight.
    fn admit(&mut self) -> Result<(), ExportError> {
        if !self.state.phase.is_busy() {
            return Ok(());
        }
        match self.policy {
            ConcurrentExportPolicy::RejectNew => Err(ExportError::AlreadyRunning),
            ConcurrentExportPolicy::CancelPrevious => {
                self.abort_in_flight();
                Ok(())
            }
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.cancel.take() {
            handle.cancel();
        }
        // invalidates tickets of the aborted run
        self.generation += 1;
    }

    pub fn begin_estimate(&mut self, config: ExportConfig) -> Result<ExportTicket, ExportError> {
        self.admit()?;
        let ticket = self.next_ticket();
        self.state = ExportState {
            phase: ExportPhase::Estimating,
            is_estimating: true,
            config: Some(config),
            ..ExportState::default()
        };
        Ok(ticket)
    }

    pub fn estimate_ready(
        &mut self,
        ticket: ExportTicket,
        estimate: ExportEstimate,
    ) -> Result<(), ExportError> {
        self.check(ticket)?;
        if self.state.phase != ExportPhase::Estimating {
            return Err(ExportError::InvalidTransition {
                from: self.state.phase,
                action: "show estimate",
            });
        }
        self.state.phase = ExportPhase::ModalOpen;
        self.state.is_estimating = false;
        self.state.show_modal = true;
        self.state.estimate = Some(estimate);
        Ok(())
    }

    /// Starts the download of the config currently shown in the modal and
    /// takes ownership of its cancel handle.
    pub fn start_download(&mut self, handle: C) -> Result<(ExportTicket, ExportConfig), ExportError> {
        match self.state.phase {
            ExportPhase::ModalOpen | ExportPhase::Failed | ExportPhase::Cancelled => {}
            ExportPhase::Downloading => self.admit()?,
            from => {
                return Err(ExportError::InvalidTransition {
                    from,
                    action: "start download",
                })
            }
        }
        let config = self.state.config.clone().ok_or(ExportError::InvalidTransition {
            from: self.state.phase,
            action: "start download",
        })?;

        let ticket = self.next_ticket();
        self.cancel = Some(handle);
        self.state.phase = ExportPhase::Downloading;
        self.state.is_exporting = true;
        self.state.progress = 0;
        self.state.error = None;
        self.state.bytes_received = 0;
        Ok((ticket, config))
    }

    /// Stale or out-of-phase updates are ignored.
    pub fn update_progress(&mut self, ticket: ExportTicket, percent: u8) {
        if self.check(ticket).is_err() || self.state.phase != ExportPhase::Downloading {
            return;
        }
        self.state.progress = percent.min(100).max(self.state.progress);
    }

    pub fn complete(&mut self, ticket: ExportTicket, bytes_received: u64) -> Result<(), ExportError> {
        self.finish(ticket, "complete download")?;
        self.state.phase = ExportPhase::Completed;
        self.state.progress = 100;
        self.state.bytes_received = bytes_received;
        Ok(())
    }

    pub fn fail(&mut self, ticket: ExportTicket, message: impl Into<String>) -> Result<(), ExportError> {
        self.finish(ticket, "fail download")?;
        self.state.phase = ExportPhase::Failed;
        self.state.error = Some(message.into());
        Ok(())
    }

    fn finish(&mut self, ticket: ExportTicket, action: &'static str) -> Result<(), ExportError> {
        self.check(ticket)?;
        if self.state.phase != ExportPhase::Downloading {
            return Err(ExportError::InvalidTransition {
                from: self.state.phase,
                action,
            });
        }
        self.cancel = None;
        self.state.is_exporting = false;
        Ok(())
    }

    /// Cancels the running estimate or download. Returns false when nothing
    /// was in flight.
    pub fn cancel(&mut self) -> bool {
        if !self.state.phase.is_busy() {
            return false;
        }
        self.abort_in_flight();
        self.state.phase = ExportPhase::Cancelled;
        self.state.is_estimating = false;
        self.state.is_exporting = false;
        self.state.progress = 0;
        self.state.error = None;
        true
    }

    /// Закрывает модалку; идущая загрузка при этом отменяется
    pub fn close_modal(&mut self) {
        if self.state.phase.is_busy() {
            self.abort_in_flight();
        }
        self.state = ExportState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::chip_payload::ChipFilterPayload;
    use crate::usecases::u601_chip_export::response::FallbackPolicy;
    use crate::usecases::u601_chip_export::request::DataSource;
    use crate::usecases::u601_chip_export::transport::CancelToken;
    use chrono::Utc;

    fn config() -> ExportConfig {
        ExportConfig::contracts(ChipFilterPayload::default(), Utc::now())
    }

    fn estimate() -> ExportEstimate {
        FallbackPolicy::default().estimate(DataSource::Contracts, "test")
    }

    fn open_modal(session: &mut ExportSession<CancelToken>) {
        let ticket = session.begin_estimate(config()).unwrap();
        session.estimate_ready(ticket, estimate()).unwrap();
    }

    #[test]
    fn test_happy_path() {
        let mut session = ExportSession::<CancelToken>::default();
        let ticket = session.begin_estimate(config()).unwrap();
        assert!(session.state().is_estimating);
        assert_eq!(session.phase(), ExportPhase::Estimating);

        session.estimate_ready(ticket, estimate()).unwrap();
        assert!(session.state().show_modal);
        assert_eq!(session.phase(), ExportPhase::ModalOpen);

        let (ticket, cfg) = session.start_download(CancelToken::new()).unwrap();
        assert_eq!(cfg.filename, session.state().config.as_ref().unwrap().filename);
        assert!(session.state().is_exporting);

        session.update_progress(ticket, 40);
        assert_eq!(session.state().progress, 40);
        session.complete(ticket, 1_000_000).unwrap();
        assert_eq!(session.phase(), ExportPhase::Completed);
        assert_eq!(session.state().progress, 100);
        assert!(!session.state().is_exporting);
        assert!(!session.has_cancel_handle());

        session.close_modal();
        assert_eq!(session.state(), &ExportState::default());
    }

    #[test]
    fn test_cancel_clears_state() {
        let mut session = ExportSession::<CancelToken>::default();
        open_modal(&mut session);
        let token = CancelToken::new();
        let (ticket, _) = session.start_download(token.clone()).unwrap();
        session.update_progress(ticket, 55);

        assert!(session.cancel());
        assert!(token.is_cancelled());
        let state = session.state();
        assert_eq!(state.phase, ExportPhase::Cancelled);
        assert!(!state.is_exporting);
        assert_eq!(state.progress, 0);
        assert_eq!(state.error, None);

        // the aborted read loop reports late; it must not touch the state
        assert_eq!(session.fail(ticket, "aborted"), Err(ExportError::Stale));
        session.update_progress(ticket, 90);
        assert_eq!(session.state().progress, 0);
        assert_eq!(session.state().error, None);
    }

    #[test]
    fn test_failure_then_manual_retry() {
        let mut session = ExportSession::<CancelToken>::default();
        open_modal(&mut session);
        let (ticket, _) = session.start_download(CancelToken::new()).unwrap();
        session.fail(ticket, "HTTP error: 500").unwrap();
        assert_eq!(session.phase(), ExportPhase::Failed);
        assert_eq!(session.state().error.as_deref(), Some("HTTP error: 500"));

        session.start_download(CancelToken::new()).unwrap();
        assert_eq!(session.phase(), ExportPhase::Downloading);
        assert_eq!(session.state().error, None);
    }

    #[test]
    fn test_reject_new_policy() {
        let mut session = ExportSession::<CancelToken>::new(ConcurrentExportPolicy::RejectNew);
        open_modal(&mut session);
        let token = CancelToken::new();
        session.start_download(token.clone()).unwrap();

        assert_eq!(
            session.begin_estimate(config()),
            Err(ExportError::AlreadyRunning)
        );
        assert_eq!(
            session.start_download(CancelToken::new()).map(|_| ()),
            Err(ExportError::AlreadyRunning)
        );
        assert!(!token.is_cancelled());
        assert_eq!(session.phase(), ExportPhase::Downloading);
    }

    #[test]
    fn test_cancel_previous_policy() {
        let mut session = ExportSession::<CancelToken>::new(ConcurrentExportPolicy::CancelPrevious);
        open_modal(&mut session);
        let first = CancelToken::new();
        let (old_ticket, _) = session.start_download(first.clone()).unwrap();

        let ticket = session.begin_estimate(config()).unwrap();
        assert!(first.is_cancelled());
        assert_eq!(session.complete(old_ticket, 10), Err(ExportError::Stale));
        session.estimate_ready(ticket, estimate()).unwrap();
        assert_eq!(session.phase(), ExportPhase::ModalOpen);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut session = ExportSession::<CancelToken>::default();
        assert!(matches!(
            session.start_download(CancelToken::new()),
            Err(ExportError::InvalidTransition { from: ExportPhase::Idle, .. })
        ));
        assert!(!session.cancel());
    }

    #[test]
    fn test_close_modal_during_download_cancels() {
        let mut session = ExportSession::<CancelToken>::default();
        open_modal(&mut session);
        let token = CancelToken::new();
        session.start_download(token.clone()).unwrap();
        session.close_modal();
        assert!(token.is_cancelled());
        assert_eq!(session.phase(), ExportPhase::Idle);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(
            ConcurrentExportPolicy::from_str("cancel_previous"),
            Some(ConcurrentExportPolicy::CancelPrevious)
        );
        assert_eq!(ConcurrentExportPolicy::RejectNew.as_str(), "reject_new");
        assert_eq!(ConcurrentExportPolicy::from_str("queue"), None);
    }
}
