use super::aggregate::FilterSet;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

/// Снимок фильтров для localStorage ("последний фильтр" и пресеты)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedFilters {
    #[serde(default)]
    pub filters: FilterSet,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub include_flood_control: bool,
}

impl PersistedFilters {
    pub fn from_filters(filters: &FilterSet, date_range: DateRange) -> Self {
        Self {
            filters: filters.clone(),
            date_range,
            include_flood_control: filters.include_flood_control,
        }
    }

    /// Восстанавливает FilterSet; флаг верхнего уровня имеет приоритет
    pub fn into_filters(self) -> FilterSet {
        let mut filters = self.filters;
        filters.include_flood_control = self.include_flood_control;
        filters
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    pub id: Uuid,
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub state: PersistedFilters,
}

impl FilterPreset {
    pub fn new(name: &str, state: PersistedFilters) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            saved_at: Utc::now(),
            state,
        }
    }
}

/// Named filter presets, newest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetBook {
    presets: Vec<FilterPreset>,
}

impl PresetBook {
    pub fn presets(&self) -> &[FilterPreset] {
        &self.presets
    }

    /// Saves a preset, replacing any preset with the same name.
    pub fn save(&mut self, preset: FilterPreset) {
        self.presets.retain(|p| p.name != preset.name);
        self.presets.push(preset);
        self.presets.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.id != id);
        self.presets.len() != before
    }

    pub fn find(&self, id: Uuid) -> Option<&FilterPreset> {
        self.presets.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_filter_set::ChipKind;
    use chrono::Duration;

    fn preset(name: &str, minutes_ago: i64) -> FilterPreset {
        let mut p = FilterPreset::new(name, PersistedFilters::default());
        p.saved_at = Utc::now() - Duration::minutes(minutes_ago);
        p
    }

    #[test]
    fn test_save_replaces_same_name_and_sorts_newest_first() {
        let mut book = PresetBook::default();
        book.save(preset("roads", 30));
        book.save(preset("bridges", 10));
        book.save(preset("roads", 1));

        let names: Vec<&str> = book.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["roads", "bridges"]);
    }

    #[test]
    fn test_delete_by_id() {
        let mut book = PresetBook::default();
        let p = preset("flood", 0);
        let id = p.id;
        book.save(p);
        assert!(book.find(id).is_some());
        assert!(book.delete(id));
        assert!(!book.delete(id));
        assert!(book.presets().is_empty());
    }

    #[test]
    fn test_persisted_round_trip_through_json() {
        let mut filters = FilterSet::new();
        filters.insert(ChipKind::Keyword, "road");
        filters.include_flood_control = true;
        let state = PersistedFilters::from_filters(&filters, DateRange::default());

        let raw = serde_json::to_string(&state).unwrap();
        let restored: PersistedFilters = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored.into_filters(), filters);
    }

    #[test]
    fn test_missing_fields_default() {
        let restored: PersistedFilters = serde_json::from_str("{}").unwrap();
        assert!(restored.filters.is_empty());
        assert!(!restored.include_flood_control);
    }
}
