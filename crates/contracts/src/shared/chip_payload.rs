//! Canonical chip-filter payload and normalization of the two filter shapes
//! (camelCase from UI state, snake_case from stored or server-side state).

use crate::domain::a001_filter_set::{TimeRange, TimeRangeKind, ValueRange};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Payload shared by chip-search, chip-aggregates and all export endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipFilterPayload {
    pub contractors: Vec<String>,
    pub areas: Vec<String>,
    pub organizations: Vec<String>,
    pub business_categories: Vec<String>,
    pub keywords: Vec<String>,
    pub time_ranges: Vec<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_range: Option<ValueRange>,
    pub include_flood_control: bool,
}

impl ChipFilterPayload {
    pub fn has_filters(&self) -> bool {
        !(self.contractors.is_empty()
            && self.areas.is_empty()
            && self.organizations.is_empty()
            && self.business_categories.is_empty()
            && self.keywords.is_empty()
            && self.time_ranges.is_empty())
    }
}

/// Time range entry dropped during normalization, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedTimeRange {
    pub entry: Value,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFilters {
    pub payload: ChipFilterPayload,
    pub dropped_time_ranges: Vec<DroppedTimeRange>,
}

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("filters must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("field `{field}` is malformed: {message}")]
    Malformed { field: &'static str, message: String },
}

/// Both accepted shapes, folded together through aliases.
#[derive(Debug, Default, Deserialize)]
struct RawFilters {
    #[serde(default)]
    contractors: Vec<String>,
    #[serde(default)]
    areas: Vec<String>,
    #[serde(default)]
    organizations: Vec<String>,
    #[serde(default, alias = "businessCategories")]
    business_categories: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default, alias = "timeRanges")]
    time_ranges: Vec<Value>,
    #[serde(default, alias = "valueRange")]
    value_range: Option<ValueRange>,
    #[serde(default, alias = "includeFloodControl")]
    include_flood_control: bool,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn normalize_time_range(entry: &Value) -> Result<TimeRange, String> {
    let kind = entry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing `type`".to_string())?;
    if TimeRangeKind::from_str(kind).is_none() {
        return Err(format!("unsupported type `{}`", kind));
    }
    serde_json::from_value::<TimeRange>(entry.clone()).map_err(|e| e.to_string())
}

/// Normalizes a filter object in either supported shape.
///
/// Time ranges whose `type` is not yearly, quarterly or custom (or that do not
/// parse) are dropped and reported in `dropped_time_ranges`; the caller decides
/// how loudly to report them.
pub fn normalize_filters(raw: &Value) -> Result<NormalizedFilters, NormalizeError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| NormalizeError::NotAnObject(json_kind(raw)))?;

    // Поле может прийти в обоих вариантах сразу; snake_case приоритетнее
    let mut obj = obj.clone();
    for (camel, snake) in [
        ("businessCategories", "business_categories"),
        ("timeRanges", "time_ranges"),
        ("valueRange", "value_range"),
        ("includeFloodControl", "include_flood_control"),
    ] {
        if obj.contains_key(snake) {
            obj.remove(camel);
        }
    }
    // null трактуется как отсутствующее поле
    obj.retain(|_, v| !v.is_null());

    let parsed: RawFilters =
        serde_json::from_value(Value::Object(obj)).map_err(|e| NormalizeError::Malformed {
            field: "filters",
            message: e.to_string(),
        })?;

    let mut time_ranges: Vec<TimeRange> = Vec::new();
    let mut dropped = Vec::new();
    for entry in parsed.time_ranges {
        match normalize_time_range(&entry) {
            Ok(range) => {
                if !time_ranges.contains(&range) {
                    time_ranges.push(range);
                }
            }
            Err(reason) => dropped.push(DroppedTimeRange { entry, reason }),
        }
    }

    Ok(NormalizedFilters {
        payload: ChipFilterPayload {
            contractors: dedupe(parsed.contractors),
            areas: dedupe(parsed.areas),
            organizations: dedupe(parsed.organizations),
            business_categories: dedupe(parsed.business_categories),
            keywords: dedupe(parsed.keywords),
            time_ranges,
            value_range: parsed.value_range.filter(|r| !r.is_empty()),
            include_flood_control: parsed.include_flood_control,
        },
        dropped_time_ranges: dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_and_snake_shapes_normalize_identically() {
        let camel = json!({
            "contractors": ["ACME"],
            "businessCategories": ["Construction Projects"],
            "keywords": ["road"],
            "timeRanges": [{"type": "yearly", "year": 2023}],
            "includeFloodControl": true,
            "valueRange": {"min": 1000.0}
        });
        let snake = json!({
            "contractors": ["ACME"],
            "business_categories": ["Construction Projects"],
            "keywords": ["road"],
            "time_ranges": [{"type": "yearly", "year": 2023}],
            "include_flood_control": true,
            "value_range": {"min": 1000.0}
        });

        let a = normalize_filters(&camel).unwrap();
        let b = normalize_filters(&snake).unwrap();
        assert_eq!(a.payload, b.payload);
        assert_eq!(
            serde_json::to_value(&a.payload).unwrap(),
            serde_json::to_value(&b.payload).unwrap()
        );
        assert!(a.payload.include_flood_control);
    }

    #[test]
    fn test_only_known_time_range_types_survive() {
        let raw = json!({
            "time_ranges": [
                {"type": "yearly", "year": 2021},
                {"type": "monthly", "year": 2021},
                {"type": "quarterly", "year": 2021, "quarter": 3},
                {"year": 2020},
                "2019",
                {"type": "custom", "startDate": "2022-01-01", "endDate": "2022-06-30"}
            ]
        });
        let normalized = normalize_filters(&raw).unwrap();
        let kinds: Vec<TimeRangeKind> =
            normalized.payload.time_ranges.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TimeRangeKind::Yearly, TimeRangeKind::Quarterly, TimeRangeKind::Custom]
        );
        assert_eq!(normalized.dropped_time_ranges.len(), 3);
        assert!(normalized.dropped_time_ranges[0].reason.contains("monthly"));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let normalized = normalize_filters(&json!({})).unwrap();
        assert_eq!(normalized.payload, ChipFilterPayload::default());
        assert!(!normalized.payload.has_filters());
    }

    #[test]
    fn test_duplicates_removed_in_order() {
        let raw = json!({"keywords": ["road", "bridge", "road", " bridge ", ""]});
        let normalized = normalize_filters(&raw).unwrap();
        assert_eq!(normalized.payload.keywords, vec!["road", "bridge"]);
    }

    #[test]
    fn test_null_fields_treated_as_absent() {
        let raw = json!({"keywords": null, "timeRanges": null, "valueRange": null});
        let normalized = normalize_filters(&raw).unwrap();
        assert!(normalized.payload.keywords.is_empty());
        assert!(normalized.payload.value_range.is_none());
    }

    #[test]
    fn test_snake_case_wins_when_both_present() {
        let raw = json!({
            "businessCategories": ["from camel"],
            "business_categories": ["from snake"]
        });
        let normalized = normalize_filters(&raw).unwrap();
        assert_eq!(normalized.payload.business_categories, vec!["from snake"]);
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            normalize_filters(&json!(["road"])),
            Err(NormalizeError::NotAnObject("array"))
        );
    }

    #[test]
    fn test_payload_serializes_snake_case() {
        let normalized = normalize_filters(&json!({"businessCategories": ["IT"]})).unwrap();
        let value = serde_json::to_value(&normalized.payload).unwrap();
        assert_eq!(value["business_categories"], json!(["IT"]));
        assert_eq!(value["include_flood_control"], json!(false));
        assert!(value.get("businessCategories").is_none());
        assert!(value.get("value_range").is_none());
    }
}
