use super::error::ExportError;
use super::request::ExportPayload;
use super::response::EstimateResponse;
use async_trait::async_trait;

/// Cancellation handle owned by the export session while a download runs.
pub trait CancelHandle {
    fn cancel(&self);
    fn is_cancelled(&self) -> bool;
}

/// Plain shared flag; the browser handle wraps an `AbortController` instead.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(std::rc::Rc<std::cell::Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CancelHandle for CancelToken {
    fn cancel(&self) {
        self.0.set(true);
    }

    fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Incremental reader over a response body.
#[async_trait(?Send)]
pub trait ChunkSource {
    /// `Ok(None)` at end of stream.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ExportError>;
}

/// Destination of the downloaded bytes. Receives each chunk as soon as it is
/// read; implementations must not require the whole file in memory.
pub trait ChunkSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), ExportError>;
    fn finish(&mut self, filename: &str) -> Result<(), ExportError>;
}

pub struct StreamResponse<S> {
    /// Значение Content-Length, если сервер его прислал
    pub content_length: Option<u64>,
    pub body: S,
}

/// Network side of the export flow. Paths are relative to the API base.
#[async_trait(?Send)]
pub trait ExportTransport {
    type Cancel: CancelHandle;
    type Source: ChunkSource;

    async fn post_estimate(
        &self,
        path: &str,
        payload: &ExportPayload,
    ) -> Result<EstimateResponse, ExportError>;

    async fn open_stream(
        &self,
        path: &str,
        payload: &ExportPayload,
        cancel: &Self::Cancel,
    ) -> Result<StreamResponse<Self::Source>, ExportError>;
}
