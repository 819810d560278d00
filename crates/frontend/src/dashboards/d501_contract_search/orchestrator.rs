//! Search + aggregates round trip for the contracts dashboard.

use super::api;
use contracts::dashboards::d501_contract_search::snapshot::{
    aggregates_page_request, aggregates_request, search_request,
};
use contracts::dashboards::d501_contract_search::{
    merge_results, AggregateSortField, AggregatesPageResponse, ContractSort, DashboardSnapshot,
    Dimension, SortDirection,
};
use contracts::domain::a001_filter_set::FilterSet;
use contracts::shared::chip_payload::{normalize_filters, ChipFilterPayload};
use contracts::shared::pagination::PaginationState;
use futures::future::join;

/// Canonical payload for the current chips.
///
/// Goes through the same normalization as any other filter source, so time
/// ranges the server would reject are dropped here and logged.
pub fn prepare_payload(filters: &FilterSet) -> ChipFilterPayload {
    let payload = filters.to_payload();
    let raw = match serde_json::to_value(&payload) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("Failed to serialize filters: {}", e);
            return payload;
        }
    };

    match normalize_filters(&raw) {
        Ok(normalized) => {
            for dropped in &normalized.dropped_time_ranges {
                log::warn!("Dropping time range {}: {}", dropped.entry, dropped.reason);
            }
            normalized.payload
        }
        Err(e) => {
            log::warn!("Filter normalization failed, sending as is: {}", e);
            payload
        }
    }
}

/// Issues search and aggregates together and waits for both.
///
/// Returns the merged snapshot and the pagination state updated with the
/// total from the search response.
pub async fn load(
    filters: &ChipFilterPayload,
    mut pagination: PaginationState,
    sort: ContractSort,
    top_n: usize,
) -> (DashboardSnapshot, PaginationState) {
    let search_req = search_request(filters, &pagination, sort);
    let aggregates_req = aggregates_request(filters, top_n);

    let (search, aggregates) =
        join(api::search(&search_req), api::aggregates(&aggregates_req)).await;

    let snapshot = merge_results(search, aggregates, &mut pagination);
    if let Some(err) = &snapshot.error {
        log::error!("Contract search failed: {}", err);
    }
    if let Some(err) = &snapshot.aggregates_error {
        log::warn!("Aggregates unavailable, showing search results only: {}", err);
    }
    (snapshot, pagination)
}

/// Одна страница аналитической таблицы по измерению
pub async fn load_aggregates_page(
    filters: &ChipFilterPayload,
    dimension: Dimension,
    pagination: &PaginationState,
    sort_by: AggregateSortField,
    sort_direction: SortDirection,
) -> Result<AggregatesPageResponse, String> {
    let request = aggregates_page_request(filters, dimension, pagination, sort_by, sort_direction);
    api::aggregates_page(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_filter_set::{ChipKind, TimeRange};

    #[test]
    fn test_prepare_payload_keeps_chips() {
        let mut filters = FilterSet::new();
        filters.insert(ChipKind::Keyword, "road");
        filters.insert(ChipKind::Area, "Cebu");
        filters.insert_time_range(TimeRange::quarterly(2023, 2));
        filters.include_flood_control = true;

        let payload = prepare_payload(&filters);
        assert_eq!(payload.keywords, vec!["road".to_string()]);
        assert_eq!(payload.areas, vec!["Cebu".to_string()]);
        assert_eq!(payload.time_ranges, vec![TimeRange::quarterly(2023, 2)]);
        assert!(payload.include_flood_control);
        assert_eq!(payload, filters.to_payload());
    }

    #[test]
    fn test_prepare_payload_empty() {
        let payload = prepare_payload(&FilterSet::new());
        assert!(!payload.has_filters());
        assert!(payload.value_range.is_none());
    }
}
