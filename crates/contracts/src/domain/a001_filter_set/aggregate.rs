use super::time_range::TimeRange;
use crate::shared::chip_payload::ChipFilterPayload;
use serde::{Deserialize, Serialize};

/// Вид чипа фильтра (строковые коллекции FilterSet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipKind {
    Contractor,
    Area,
    Organization,
    BusinessCategory,
    Keyword,
}

impl ChipKind {
    pub fn all() -> [ChipKind; 5] {
        [
            ChipKind::Contractor,
            ChipKind::Area,
            ChipKind::Organization,
            ChipKind::BusinessCategory,
            ChipKind::Keyword,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChipKind::Contractor => "Contractor",
            ChipKind::Area => "Area",
            ChipKind::Organization => "Organization",
            ChipKind::BusinessCategory => "Category",
            ChipKind::Keyword => "Keyword",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ValueRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Current filter chips of a search or analytics view.
///
/// Every collection keeps insertion order and never holds duplicates; the
/// insert methods are the only way chips get in, deserialization included.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "StoredFilterSet")]
pub struct FilterSet {
    contractors: Vec<String>,
    areas: Vec<String>,
    organizations: Vec<String>,
    business_categories: Vec<String>,
    keywords: Vec<String>,
    time_ranges: Vec<TimeRange>,
    pub value_range: Option<ValueRange>,
    pub include_flood_control: bool,
}

/// Wire shape of a saved FilterSet, before deduplication.
#[derive(Deserialize)]
struct StoredFilterSet {
    #[serde(default)]
    contractors: Vec<String>,
    #[serde(default)]
    areas: Vec<String>,
    #[serde(default)]
    organizations: Vec<String>,
    #[serde(default)]
    business_categories: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    time_ranges: Vec<TimeRange>,
    #[serde(default)]
    value_range: Option<ValueRange>,
    #[serde(default)]
    include_flood_control: bool,
}

impl From<StoredFilterSet> for FilterSet {
    fn from(stored: StoredFilterSet) -> Self {
        let mut filters = FilterSet::new();
        let chips = [
            (ChipKind::Contractor, stored.contractors),
            (ChipKind::Area, stored.areas),
            (ChipKind::Organization, stored.organizations),
            (ChipKind::BusinessCategory, stored.business_categories),
            (ChipKind::Keyword, stored.keywords),
        ];
        for (kind, values) in chips {
            for value in values {
                filters.insert(kind, &value);
            }
        }
        for range in stored.time_ranges {
            filters.insert_time_range(range);
        }
        filters.set_value_range(stored.value_range);
        filters.include_flood_control = stored.include_flood_control;
        filters
    }
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn values_mut(&mut self, kind: ChipKind) -> &mut Vec<String> {
        match kind {
            ChipKind::Contractor => &mut self.contractors,
            ChipKind::Area => &mut self.areas,
            ChipKind::Organization => &mut self.organizations,
            ChipKind::BusinessCategory => &mut self.business_categories,
            ChipKind::Keyword => &mut self.keywords,
        }
    }

    pub fn values(&self, kind: ChipKind) -> &[String] {
        match kind {
            ChipKind::Contractor => &self.contractors,
            ChipKind::Area => &self.areas,
            ChipKind::Organization => &self.organizations,
            ChipKind::BusinessCategory => &self.business_categories,
            ChipKind::Keyword => &self.keywords,
        }
    }

    pub fn time_ranges(&self) -> &[TimeRange] {
        &self.time_ranges
    }

    /// Добавляет чип. Возвращает false для пустого значения или дубликата.
    pub fn insert(&mut self, kind: ChipKind, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let values = self.values_mut(kind);
        if values.iter().any(|v| v == value) {
            return false;
        }
        values.push(value.to_string());
        true
    }

    pub fn remove(&mut self, kind: ChipKind, value: &str) -> bool {
        let values = self.values_mut(kind);
        let before = values.len();
        values.retain(|v| v != value);
        values.len() != before
    }

    pub fn insert_time_range(&mut self, range: TimeRange) -> bool {
        if self.time_ranges.contains(&range) {
            return false;
        }
        self.time_ranges.push(range);
        true
    }

    pub fn remove_time_range(&mut self, range: &TimeRange) -> bool {
        let before = self.time_ranges.len();
        self.time_ranges.retain(|r| r != range);
        self.time_ranges.len() != before
    }

    pub fn set_value_range(&mut self, range: Option<ValueRange>) {
        self.value_range = range.filter(|r| !r.is_empty());
    }

    /// Количество активных чипов (для бейджа панели фильтров)
    pub fn active_count(&self) -> usize {
        let chips: usize = ChipKind::all()
            .iter()
            .map(|kind| self.values(*kind).len())
            .sum();
        let value_range = usize::from(self.value_range.is_some_and(|r| !r.is_empty()));
        chips + self.time_ranges.len() + value_range + usize::from(self.include_flood_control)
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Canonical snake_case payload sent to every chip endpoint.
    pub fn to_payload(&self) -> ChipFilterPayload {
        ChipFilterPayload {
            contractors: self.contractors.clone(),
            areas: self.areas.clone(),
            organizations: self.organizations.clone(),
            business_categories: self.business_categories.clone(),
            keywords: self.keywords.clone(),
            time_ranges: self.time_ranges.clone(),
            value_range: self.value_range.filter(|r| !r.is_empty()),
            include_flood_control: self.include_flood_control,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicates_and_blanks() {
        let mut filters = FilterSet::new();
        assert!(filters.insert(ChipKind::Contractor, "ACME Builders"));
        assert!(!filters.insert(ChipKind::Contractor, "ACME Builders"));
        assert!(!filters.insert(ChipKind::Contractor, "  ACME Builders "));
        assert!(!filters.insert(ChipKind::Keyword, "   "));
        assert!(filters.insert(ChipKind::Keyword, "road"));
        assert_eq!(filters.values(ChipKind::Contractor), ["ACME Builders"]);
        assert_eq!(filters.active_count(), 2);
    }

    #[test]
    fn test_same_value_allowed_in_different_fields() {
        let mut filters = FilterSet::new();
        assert!(filters.insert(ChipKind::Area, "Cebu"));
        assert!(filters.insert(ChipKind::Keyword, "Cebu"));
        assert_eq!(filters.active_count(), 2);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut filters = FilterSet::new();
        filters.insert(ChipKind::Organization, "DPWH");
        filters.insert_time_range(TimeRange::yearly(2022));
        assert!(!filters.insert_time_range(TimeRange::yearly(2022)));
        filters.include_flood_control = true;
        filters.set_value_range(Some(ValueRange { min: Some(1.0), max: None }));
        assert_eq!(filters.active_count(), 4);

        assert!(filters.remove(ChipKind::Organization, "DPWH"));
        assert!(!filters.remove(ChipKind::Organization, "DPWH"));
        assert!(filters.remove_time_range(&TimeRange::yearly(2022)));
        assert_eq!(filters.active_count(), 2);

        filters.clear();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_restored_filters_are_deduplicated() {
        let filters: FilterSet = serde_json::from_value(serde_json::json!({
            "keywords": ["road", "road", " road ", ""],
            "contractors": ["ACME"],
            "time_ranges": [
                {"type": "yearly", "year": 2023},
                {"type": "yearly", "year": 2023}
            ],
            "value_range": {},
            "include_flood_control": true
        }))
        .unwrap();
        assert_eq!(filters.values(ChipKind::Keyword), ["road"]);
        assert_eq!(filters.time_ranges().len(), 1);
        assert_eq!(filters.value_range, None);
        assert_eq!(filters.active_count(), 4);

        let roundtrip: FilterSet =
            serde_json::from_value(serde_json::to_value(&filters).unwrap()).unwrap();
        assert_eq!(roundtrip, filters);
    }

    #[test]
    fn test_empty_value_range_is_not_a_chip() {
        let mut filters = FilterSet::new();
        filters.set_value_range(Some(ValueRange::default()));
        assert_eq!(filters.value_range, None);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_payload_mirrors_chips() {
        let mut filters = FilterSet::new();
        filters.insert(ChipKind::BusinessCategory, "Construction Projects");
        filters.insert(ChipKind::Keyword, "road");
        let payload = filters.to_payload();
        assert_eq!(payload.business_categories, vec!["Construction Projects"]);
        assert_eq!(payload.keywords, vec!["road"]);
        assert!(payload.contractors.is_empty());
        assert!(!payload.include_flood_control);
    }
}
