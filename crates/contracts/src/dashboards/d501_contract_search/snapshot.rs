use super::dimension::Dimension;
use super::dto::{
    AggregateSortField, Aggregates, AggregatesPageRequest, AggregatesRequest, AggregatesResponse,
    ContractRow, ContractSortField, SearchRequest, SearchResponse, SortDirection,
};
use crate::shared::chip_payload::ChipFilterPayload;
use crate::shared::pagination::PaginationState;
use std::fmt::Display;

/// Sort state of the contracts table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContractSort {
    pub field: ContractSortField,
    pub direction: SortDirection,
}

impl ContractSort {
    /// Clicking the active column flips direction; another column starts descending.
    pub fn toggle(self, field: ContractSortField) -> Self {
        if self.field == field {
            Self {
                field,
                direction: self.direction.toggled(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Desc,
            }
        }
    }
}

pub fn search_request(
    filters: &ChipFilterPayload,
    pagination: &PaginationState,
    sort: ContractSort,
) -> SearchRequest {
    SearchRequest {
        filters: filters.clone(),
        page: pagination.current_page(),
        page_size: pagination.page_size(),
        sort_by: sort.field,
        sort_direction: sort.direction,
    }
}

pub fn aggregates_request(filters: &ChipFilterPayload, top_n: usize) -> AggregatesRequest {
    AggregatesRequest {
        filters: filters.clone(),
        top_n,
    }
}

pub fn aggregates_page_request(
    filters: &ChipFilterPayload,
    dimension: Dimension,
    pagination: &PaginationState,
    sort_by: AggregateSortField,
    sort_direction: SortDirection,
) -> AggregatesPageRequest {
    AggregatesPageRequest {
        filters: filters.clone(),
        dimension,
        page: pagination.current_page(),
        page_size: pagination.page_size(),
        sort_by,
        sort_direction,
    }
}

/// Dashboard state after one search + aggregates round.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSnapshot {
    pub rows: Vec<ContractRow>,
    pub aggregates: Option<Aggregates>,
    /// Search failure, shown to the user
    pub error: Option<String>,
    /// Aggregates failure, logged only
    pub aggregates_error: Option<String>,
}

/// Combines both settled responses with the partial-success policy:
/// a failed search is an error, failed aggregates only leave the charts empty.
/// `pagination` takes its total from the search response.
pub fn merge_results<E: Display>(
    search: Result<SearchResponse, E>,
    aggregates: Result<AggregatesResponse, E>,
    pagination: &mut PaginationState,
) -> DashboardSnapshot {
    let mut snapshot = DashboardSnapshot::default();

    match search {
        Ok(resp) if resp.success => {
            pagination.set_total_count(resp.pagination.total_count as usize);
            snapshot.rows = resp.data;
        }
        Ok(resp) => {
            pagination.set_total_count(0);
            snapshot.error = Some(resp.error.unwrap_or_else(|| "Search failed".to_string()));
        }
        Err(e) => {
            pagination.set_total_count(0);
            snapshot.error = Some(e.to_string());
        }
    }

    match aggregates {
        Ok(resp) if resp.success => snapshot.aggregates = Some(resp.data),
        Ok(resp) => {
            snapshot.aggregates_error =
                Some(resp.error.unwrap_or_else(|| "Aggregation failed".to_string()))
        }
        Err(e) => snapshot.aggregates_error = Some(e.to_string()),
    }

    snapshot
}
