use super::request::DataSource;
use super::session::ExportPhase;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExportError {
    #[error("another export is already in progress")]
    AlreadyRunning,

    #[error("cannot {action} while export is {from:?}")]
    InvalidTransition {
        from: ExportPhase,
        action: &'static str,
    },

    #[error("export was superseded by a newer export")]
    Stale,

    #[error("export cancelled")]
    Cancelled,

    #[error("no endpoint configured for {0:?} export")]
    NoEndpoint(DataSource),

    #[error("estimate request failed: {0}")]
    EstimateFailed(String),

    #[error("HTTP error: {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Transport(String),

    #[error("failed to save file: {0}")]
    Sink(String),
}
