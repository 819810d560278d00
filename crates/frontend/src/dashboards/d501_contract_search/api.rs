use crate::shared::api_utils::api_url;
use contracts::dashboards::d501_contract_search::dto::{
    http_error_message, AGGREGATES_PAGINATED_PATH, AGGREGATES_PATH, FILTER_OPTIONS_PATH, SEARCH_PATH,
};
use contracts::dashboards::d501_contract_search::{
    AggregatesPageRequest, AggregatesPageResponse, AggregatesRequest, AggregatesResponse,
    FilterOptions, SearchRequest, SearchResponse,
};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    if !response.ok() {
        let body = response.text().await.unwrap_or_default();
        return Err(http_error_message(response.status(), &body));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

async fn post_json<B: Serialize, T: DeserializeOwned>(path: &str, body: &B) -> Result<T, String> {
    let response = Request::post(&api_url(path))
        .json(body)
        .map_err(|e| format!("Failed to serialize request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    read_json(response).await
}

/// Страница контрактов по чипам фильтра
pub async fn search(request: &SearchRequest) -> Result<SearchResponse, String> {
    post_json(SEARCH_PATH, request).await
}

/// Сводка, разбивки по годам/месяцам и top-N по измерениям
pub async fn aggregates(request: &AggregatesRequest) -> Result<AggregatesResponse, String> {
    post_json(AGGREGATES_PATH, request).await
}

pub async fn aggregates_page(
    request: &AggregatesPageRequest,
) -> Result<AggregatesPageResponse, String> {
    post_json(AGGREGATES_PAGINATED_PATH, request).await
}

/// Values offered as chip suggestions
pub async fn filter_options() -> Result<FilterOptions, String> {
    let response = Request::get(&api_url(FILTER_OPTIONS_PATH))
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    read_json(response).await
}
