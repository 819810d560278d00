pub mod dimension;
pub mod dto;
pub mod snapshot;

pub use dimension::Dimension;
pub use dto::{
    AggregateSortField, Aggregates, AggregatesPageRequest, AggregatesPageResponse,
    AggregatesRequest, AggregatesResponse, AggregationItem, ContractRow, ContractSortField,
    FilterOptions, MonthlyAggregation, Pagination, SearchRequest, SearchResponse, SortDirection,
    Summary, YearlyAggregation,
};
pub use snapshot::{merge_results, ContractSort, DashboardSnapshot};
