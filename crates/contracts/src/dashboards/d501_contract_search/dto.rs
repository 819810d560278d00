use super::dimension::Dimension;
use crate::shared::chip_payload::ChipFilterPayload;
use serde::{Deserialize, Deserializer, Serialize};

pub const SEARCH_PATH: &str = "/contracts/chip-search/";
pub const AGGREGATES_PATH: &str = "/contracts/chip-aggregates/";
pub const AGGREGATES_PAGINATED_PATH: &str = "/contracts/chip-aggregates-paginated/";
pub const FILTER_OPTIONS_PATH: &str = "/contracts/filter-options/";

/// Amounts arrive as JSON numbers, decimal strings ("1234.50") or null.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
        Null(()),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(n) => Ok(n),
        Amount::Text(s) if s.trim().is_empty() => Ok(0.0),
        Amount::Text(s) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid amount '{}': {}", s, e))),
        Amount::Null(()) => Ok(0.0),
    }
}

/// Text columns the server may send as null; null reads as an empty string.
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error body of a failed request: `{"success": false, "error": "..."}`, or
/// `{"detail": "..."}` from the framework's own error handlers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Message for a non-2xx response; the server's own message when the body has one.
pub fn http_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.detail))
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
        .map(|msg| format!("HTTP error {}: {}", status, msg))
        .unwrap_or_else(|| format!("HTTP error: {}", status))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Columns the search endpoint accepts in `sortBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractSortField {
    #[default]
    AwardDate,
    ContractAmount,
    ReferenceId,
    OrganizationName,
    AwardeeName,
    BusinessCategory,
    AreaOfDelivery,
    AwardTitle,
    NoticeTitle,
}

/// Sort columns of the paginated aggregates table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateSortField {
    #[default]
    TotalValue,
    Count,
    AvgValue,
    Label,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub filters: ChipFilterPayload,
    pub page: usize,
    pub page_size: usize,
    #[serde(rename = "sortBy")]
    pub sort_by: ContractSortField,
    #[serde(rename = "sortDirection")]
    pub sort_direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatesRequest {
    #[serde(flatten)]
    pub filters: ChipFilterPayload,
    #[serde(rename = "topN")]
    pub top_n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatesPageRequest {
    #[serde(flatten)]
    pub filters: ChipFilterPayload,
    pub dimension: Dimension,
    pub page: usize,
    pub page_size: usize,
    pub sort_by: AggregateSortField,
    pub sort_direction: SortDirection,
}

/// One contract row of the search table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractRow {
    pub id: Option<i64>,
    #[serde(deserialize_with = "deserialize_text")]
    pub reference_id: String,
    pub contract_no: Option<String>,
    pub award_title: Option<String>,
    pub notice_title: Option<String>,
    pub award_date: Option<String>,
    pub awardee_name: Option<String>,
    pub area_of_delivery: Option<String>,
    pub organization_name: Option<String>,
    pub business_category: Option<String>,
    #[serde(deserialize_with = "deserialize_amount")]
    pub contract_amount: f64,
    pub award_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ContractRow>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationItem {
    pub label: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub total_value: f64,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YearlyAggregation {
    pub year: i32,
    #[serde(deserialize_with = "deserialize_amount")]
    pub total_value: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyAggregation {
    /// YYYY-MM
    pub month: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub total_value: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub count: u64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub total_value: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub avg_value: f64,
}

/// Aggregates block of the dashboard. Any list the server could not compute
/// comes back empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggregates {
    pub summary: Vec<Summary>,
    pub by_year: Vec<YearlyAggregation>,
    pub by_month: Vec<MonthlyAggregation>,
    pub by_contractor: Vec<AggregationItem>,
    pub by_organization: Vec<AggregationItem>,
    pub by_area: Vec<AggregationItem>,
    pub by_category: Vec<AggregationItem>,
}

impl Aggregates {
    pub fn by_dimension(&self, dimension: Dimension) -> &[AggregationItem] {
        match dimension {
            Dimension::ByContractor => &self.by_contractor,
            Dimension::ByOrganization => &self.by_organization,
            Dimension::ByArea => &self.by_area,
            Dimension::ByCategory => &self.by_category,
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary.first().cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatesResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub data: Aggregates,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatesPageResponse {
    pub data: Vec<AggregationItem>,
    pub pagination: Pagination,
}

/// Values offered by the filter chip inputs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub contractors: Vec<String>,
    pub areas: Vec<String>,
    pub organizations: Vec<String>,
    pub business_categories: Vec<String>,
    pub years: Vec<i32>,
}
