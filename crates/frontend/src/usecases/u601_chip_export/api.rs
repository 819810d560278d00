use crate::shared::api_utils::api_base;
use async_trait::async_trait;
use contracts::usecases::u601_chip_export::{
    CancelHandle, ChunkSource, EstimateResponse, ExportError, ExportPayload, ExportTransport,
    StreamResponse,
};
use gloo_net::http::Request;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    window, AbortController, ReadableStreamDefaultReader, RequestInit, RequestMode, Response,
};

/// Cancel handle backed by an `AbortController`; aborting rejects the
/// pending fetch and any pending body read.
#[derive(Clone)]
pub struct AbortHandle {
    controller: AbortController,
}

impl AbortHandle {
    pub fn new() -> Result<Self, ExportError> {
        let controller = AbortController::new()
            .map_err(|e| ExportError::Transport(format!("Failed to create AbortController: {:?}", e)))?;
        Ok(Self { controller })
    }
}

impl CancelHandle for AbortHandle {
    fn cancel(&self) {
        self.controller.abort();
    }

    fn is_cancelled(&self) -> bool {
        self.controller.signal().aborted()
    }
}

/// Body reader of a streaming export response.
pub struct ResponseBodyReader {
    reader: ReadableStreamDefaultReader,
}

#[async_trait(?Send)]
impl ChunkSource for ResponseBodyReader {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, ExportError> {
        let result = JsFuture::from(self.reader.read())
            .await
            .map_err(|e| ExportError::Transport(format!("Read failed: {:?}", e)))?;

        let done = js_sys::Reflect::get(&result, &JsValue::from_str("done"))
            .map(|v| v.is_truthy())
            .unwrap_or(true);
        if done {
            return Ok(None);
        }

        let value = js_sys::Reflect::get(&result, &JsValue::from_str("value"))
            .map_err(|e| ExportError::Transport(format!("Malformed chunk: {:?}", e)))?;
        let bytes: js_sys::Uint8Array = value
            .dyn_into()
            .map_err(|_| ExportError::Transport("Chunk is not a Uint8Array".to_string()))?;
        Ok(Some(bytes.to_vec()))
    }
}

/// HTTP side of the export flow against the configured API base.
pub struct FetchTransport {
    base: String,
}

impl FetchTransport {
    pub fn new() -> Self {
        Self { base: api_base() }
    }
}

impl Default for FetchTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl ExportTransport for FetchTransport {
    type Cancel = AbortHandle;
    type Source = ResponseBodyReader;

    async fn post_estimate(
        &self,
        path: &str,
        payload: &ExportPayload,
    ) -> Result<EstimateResponse, ExportError> {
        let url = format!("{}{}", self.base, path);

        let response = Request::post(&url)
            .json(payload)
            .map_err(|e| ExportError::EstimateFailed(format!("Failed to build request: {}", e)))?
            .send()
            .await
            .map_err(|e| ExportError::EstimateFailed(format!("Request failed: {}", e)))?;

        if !response.ok() {
            return Err(ExportError::Http {
                status: response.status(),
            });
        }

        response
            .json::<EstimateResponse>()
            .await
            .map_err(|e| ExportError::EstimateFailed(format!("Failed to parse response: {}", e)))
    }

    async fn open_stream(
        &self,
        path: &str,
        payload: &ExportPayload,
        cancel: &AbortHandle,
    ) -> Result<StreamResponse<ResponseBodyReader>, ExportError> {
        let window = window().ok_or_else(|| ExportError::Transport("No window object".into()))?;
        let url = format!("{}{}", self.base, path);

        let body = serde_json::to_string(payload).map_err(|e| ExportError::Transport(e.to_string()))?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body));
        opts.set_signal(Some(&cancel.controller.signal()));

        let request = web_sys::Request::new_with_str_and_init(&url, &opts)
            .map_err(|e| ExportError::Transport(format!("Failed to create request: {:?}", e)))?;

        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|e| ExportError::Transport(format!("Failed to set header: {:?}", e)))?;

        let response_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ExportError::Transport(format!("Fetch failed: {:?}", e)))?;

        let response: Response = response_value
            .dyn_into()
            .map_err(|_| ExportError::Transport("Not a Response".into()))?;

        if !response.ok() {
            return Err(ExportError::Http {
                status: response.status(),
            });
        }

        let content_length = response
            .headers()
            .get("Content-Length")
            .ok()
            .flatten()
            .and_then(|v| v.trim().parse::<u64>().ok());

        let stream = response
            .body()
            .ok_or_else(|| ExportError::Transport("Response has no body".into()))?;
        let reader: ReadableStreamDefaultReader = stream
            .get_reader()
            .dyn_into()
            .map_err(|_| ExportError::Transport("Body is not readable as a stream".into()))?;

        Ok(StreamResponse {
            content_length,
            body: ResponseBodyReader { reader },
        })
    }
}
