/// Сохранение CSV в браузере: потоковая выгрузка с сервера и экспорт уже загруженных строк
use contracts::usecases::u601_chip_export::{ChunkSink, ExportError};
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

const CSV_MIME: &str = "text/csv;charset=utf-8;";

/// Trait для строк, которые можно выгрузить в CSV на клиенте
pub trait CsvExportable {
    /// Заголовки колонок
    fn headers() -> Vec<&'static str>;

    /// Значения ячеек строки, в порядке заголовков
    fn to_csv_row(&self) -> Vec<String>;
}

/// Builds CSV text with a UTF-8 BOM, comma separated.
pub fn build_csv<T: CsvExportable>(data: &[T]) -> String {
    let mut csv_content = String::new();

    // BOM: Excel otherwise misreads non-ASCII names
    csv_content.push('\u{FEFF}');

    csv_content.push_str(&T::headers().join(","));
    csv_content.push('\n');

    for item in data {
        let escaped_row: Vec<String> = item
            .to_csv_row()
            .iter()
            .map(|cell| escape_csv_cell(cell))
            .collect();
        csv_content.push_str(&escaped_row.join(","));
        csv_content.push('\n');
    }

    csv_content
}

/// Экспортирует список строк в CSV файл и инициирует скачивание
pub fn export_to_csv<T: CsvExportable>(data: &[T], filename: &str) -> Result<(), String> {
    if data.is_empty() {
        return Err("No data to export".to_string());
    }

    let csv_content = build_csv(data);
    let array = js_sys::Array::new();
    array.push(&wasm_bindgen::JsValue::from_str(&csv_content));

    let blob = Blob::new_with_str_sequence_and_options(&array, &csv_properties())
        .map_err(|e| format!("Failed to create blob: {:?}", e))?;

    download_blob(&blob, filename)
}

/// Quotes a cell containing the separator, quotes or line breaks.
fn escape_csv_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r') {
        let escaped = cell.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        cell.to_string()
    }
}

fn csv_properties() -> BlobPropertyBag {
    let properties = BlobPropertyBag::new();
    properties.set_type(CSV_MIME);
    properties
}

/// Receives the streamed export chunk by chunk.
///
/// Each chunk is copied into its own JS `Uint8Array` as soon as it arrives,
/// so the Wasm heap never holds more than one chunk. The browser assembles
/// the parts into a Blob on `finish`.
pub struct BlobSink {
    parts: js_sys::Array,
}

impl BlobSink {
    pub fn new() -> Self {
        Self {
            parts: js_sys::Array::new(),
        }
    }
}

impl Default for BlobSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkSink for BlobSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), ExportError> {
        self.parts.push(&js_sys::Uint8Array::from(chunk));
        Ok(())
    }

    fn finish(&mut self, filename: &str) -> Result<(), ExportError> {
        let blob = Blob::new_with_u8_array_sequence_and_options(&self.parts, &csv_properties())
            .map_err(|e| ExportError::Sink(format!("Failed to create blob: {:?}", e)))?;
        // части больше не нужны, Blob держит свою копию
        self.parts = js_sys::Array::new();
        download_blob(&blob, filename).map_err(ExportError::Sink)
    }
}

/// Инициирует скачивание Blob через браузер
fn download_blob(blob: &Blob, filename: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;

    let url = Url::create_object_url_with_blob(blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    let body = document.body().ok_or("No body element")?;
    body.append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;

    anchor.click();

    body.remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;

    Url::revoke_object_url(&url).map_err(|e| format!("Failed to revoke URL: {:?}", e))?;

    Ok(())
}
