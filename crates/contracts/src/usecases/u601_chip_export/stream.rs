use super::error::ExportError;
use super::progress::{ProgressBasis, ProgressTracker};
use super::request::ExportConfig;
use super::transport::{CancelHandle, ChunkSink, ChunkSource, ExportTransport};

/// Reads `source` to the end, writing each chunk to `sink`.
///
/// The cancel flag is checked before every read, so a cancelled download
/// stops within one chunk. `on_progress` fires only when the percentage
/// changes. Returns the number of bytes received.
pub async fn pump_stream<S, K, C>(
    source: &mut S,
    sink: &mut K,
    tracker: &mut ProgressTracker,
    cancel: &C,
    now_ms: impl Fn() -> f64,
    mut on_progress: impl FnMut(u8),
) -> Result<u64, ExportError>
where
    S: ChunkSource + ?Sized,
    K: ChunkSink + ?Sized,
    C: CancelHandle + ?Sized,
{
    let mut reported = tracker.percent();
    loop {
        if cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        let chunk = match source.next_chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            // Обрыв после отмены считается отменой, а не ошибкой сети
            Err(_) if cancel.is_cancelled() => return Err(ExportError::Cancelled),
            Err(e) => return Err(e),
        };
        sink.write_chunk(&chunk)?;
        let pct = tracker.on_chunk(chunk.len(), now_ms());
        if pct != reported {
            reported = pct;
            on_progress(pct);
        }
    }
    if cancel.is_cancelled() {
        return Err(ExportError::Cancelled);
    }
    let pct = tracker.complete();
    if pct != reported {
        on_progress(pct);
    }
    Ok(tracker.received())
}

/// Opens the export stream for `config` and saves it through `sink`.
///
/// `heuristic` is the progress basis used when the server omits Content-Length.
pub async fn download_export<T, K>(
    transport: &T,
    config: &ExportConfig,
    heuristic: ProgressBasis,
    sink: &mut K,
    cancel: &T::Cancel,
    now_ms: impl Fn() -> f64,
    on_progress: impl FnMut(u8),
) -> Result<u64, ExportError>
where
    T: ExportTransport + ?Sized,
    K: ChunkSink + ?Sized,
{
    let path = config
        .export_path()
        .ok_or(ExportError::NoEndpoint(config.data_source))?;
    let response = transport
        .open_stream(path, &config.payload(), cancel)
        .await
        .map_err(|e| {
            if cancel.is_cancelled() {
                ExportError::Cancelled
            } else {
                e
            }
        })?;

    let basis = ProgressBasis::choose(response.content_length, heuristic);
    let mut tracker = ProgressTracker::new(basis, now_ms());
    let mut body = response.body;
    let received = pump_stream(&mut body, &mut *sink, &mut tracker, cancel, now_ms, on_progress).await?;
    sink.finish(&config.filename)?;
    Ok(received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::chip_payload::ChipFilterPayload;
    use crate::usecases::u601_chip_export::request::ExportPayload;
    use crate::usecases::u601_chip_export::response::EstimateResponse;
    use crate::usecases::u601_chip_export::transport::{CancelToken, StreamResponse};
    use async_trait::async_trait;
    use chrono::Utc;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedSource {
        chunks: VecDeque<Result<Vec<u8>, ExportError>>,
        /// cancel the token when this many chunks have been handed out
        cancel_after: Option<(usize, CancelToken)>,
        served: usize,
    }

    impl ScriptedSource {
        fn new(sizes: &[usize]) -> Self {
            Self {
                chunks: sizes.iter().map(|n| Ok(vec![b'x'; *n])).collect(),
                cancel_after: None,
                served: 0,
            }
        }
    }

    #[async_trait(?Send)]
    impl ChunkSource for ScriptedSource {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ExportError> {
            if let Some((n, token)) = &self.cancel_after {
                if self.served == *n {
                    token.cancel();
                }
            }
            self.served += 1;
            match self.chunks.pop_front() {
                Some(Ok(chunk)) => Ok(Some(chunk)),
                Some(Err(e)) => Err(e),
                None => Ok(None),
            }
        }
    }

    #[derive(Default)]
    struct MemorySink {
        chunks: Vec<usize>,
        finished: Option<String>,
    }

    impl ChunkSink for MemorySink {
        fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), ExportError> {
            self.chunks.push(chunk.len());
            Ok(())
        }

        fn finish(&mut self, filename: &str) -> Result<(), ExportError> {
            self.finished = Some(filename.to_string());
            Ok(())
        }
    }

    struct StreamTransport {
        content_length: Option<u64>,
        sizes: Vec<usize>,
        opened: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl ExportTransport for StreamTransport {
        type Cancel = CancelToken;
        type Source = ScriptedSource;

        async fn post_estimate(
            &self,
            _path: &str,
            _payload: &ExportPayload,
        ) -> Result<EstimateResponse, ExportError> {
            Err(ExportError::Transport("unused".into()))
        }

        async fn open_stream(
            &self,
            path: &str,
            _payload: &ExportPayload,
            _cancel: &CancelToken,
        ) -> Result<StreamResponse<ScriptedSource>, ExportError> {
            self.opened.borrow_mut().push(path.to_string());
            Ok(StreamResponse {
                content_length: self.content_length,
                body: ScriptedSource::new(&self.sizes),
            })
        }
    }

    #[test]
    fn test_progress_from_content_length() {
        let transport = StreamTransport {
            content_length: Some(1_000_000),
            sizes: vec![400_000, 600_000],
            opened: RefCell::new(Vec::new()),
        };
        let config = ExportConfig::contracts(ChipFilterPayload::default(), Utc::now());
        let mut sink = MemorySink::default();
        let mut reported = Vec::new();

        let received = block_on(download_export(
            &transport,
            &config,
            ProgressBasis::heuristic(0),
            &mut sink,
            &CancelToken::new(),
            || 0.0,
            |p| reported.push(p),
        ))
        .unwrap();

        assert_eq!(received, 1_000_000);
        assert_eq!(reported, vec![40, 100]);
        assert_eq!(sink.chunks, vec![400_000, 600_000]);
        assert_eq!(sink.finished.as_deref(), Some(config.filename.as_str()));
        assert_eq!(transport.opened.borrow()[0], config.export_path().unwrap());
    }

    #[test]
    fn test_heuristic_progress_ends_at_100() {
        let transport = StreamTransport {
            content_length: None,
            sizes: vec![10, 10],
            opened: RefCell::new(Vec::new()),
        };
        let config = ExportConfig::contracts(ChipFilterPayload::default(), Utc::now());
        let mut sink = MemorySink::default();
        let mut reported = Vec::new();

        block_on(download_export(
            &transport,
            &config,
            ProgressBasis::heuristic(1_000_000_000),
            &mut sink,
            &CancelToken::new(),
            || 0.0,
            |p| reported.push(p),
        ))
        .unwrap();

        assert_eq!(reported, vec![100]);
    }

    #[test]
    fn test_cancel_stops_between_chunks() {
        let token = CancelToken::new();
        let mut source = ScriptedSource::new(&[100, 100, 100]);
        source.cancel_after = Some((1, token.clone()));
        let mut sink = MemorySink::default();
        let mut tracker = ProgressTracker::new(ProgressBasis::ContentLength(300), 0.0);

        let result = block_on(pump_stream(
            &mut source,
            &mut sink,
            &mut tracker,
            &token,
            || 0.0,
            |_| {},
        ));

        assert_eq!(result, Err(ExportError::Cancelled));
        // token flips while the second chunk is being read; it is still written,
        // the third is never requested
        assert_eq!(sink.chunks, vec![100, 100]);
        assert!(sink.finished.is_none());
    }

    #[test]
    fn test_read_error_after_cancel_reported_as_cancel() {
        let token = CancelToken::new();
        let mut source = ScriptedSource::new(&[]);
        source.chunks.push_back(Err(ExportError::Transport("aborted".into())));
        source.cancel_after = Some((0, token.clone()));
        let mut sink = MemorySink::default();
        let mut tracker = ProgressTracker::new(ProgressBasis::ContentLength(10), 0.0);

        let result = block_on(pump_stream(
            &mut source, &mut sink, &mut tracker, &token, || 0.0, |_| {},
        ));
        assert_eq!(result, Err(ExportError::Cancelled));
    }

    #[test]
    fn test_network_error_propagates() {
        let token = CancelToken::new();
        let mut source = ScriptedSource::new(&[5]);
        source.chunks.push_back(Err(ExportError::Transport("reset".into())));
        let mut sink = MemorySink::default();
        let mut tracker = ProgressTracker::new(ProgressBasis::ContentLength(10), 0.0);

        let result = block_on(pump_stream(
            &mut source, &mut sink, &mut tracker, &token, || 0.0, |_| {},
        ));
        assert_eq!(result, Err(ExportError::Transport("reset".into())));
        assert_eq!(sink.chunks, vec![5]);
    }
}
