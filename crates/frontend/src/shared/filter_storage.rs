//! Last-used filters and named presets in local storage.

use crate::shared::app_config::storage;
use contracts::domain::a001_filter_set::{FilterPreset, PersistedFilters, PresetBook};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub const LAST_FILTERS_KEY: &str = "philgeps_last_filters_v1";
pub const PRESETS_KEY: &str = "philgeps_filter_presets_v1";

/// Unreadable stored values are logged and treated as absent.
fn parse_stored<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str::<T>(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable local storage entry '{}': {}", key, e);
            None
        }
    }
}

fn read<T: DeserializeOwned>(key: &str) -> Option<T> {
    let raw = storage()?.get_item(key).ok().flatten()?;
    parse_stored(key, &raw)
}

fn write<T: Serialize>(key: &str, value: &T) {
    let Some(s) = storage() else { return };
    match serde_json::to_string(value) {
        Ok(json) => {
            if let Err(e) = s.set_item(key, &json) {
                log::warn!("Failed to write '{}' to local storage: {:?}", key, e);
            }
        }
        Err(e) => log::error!("Failed to serialize '{}': {}", key, e),
    }
}

pub fn load_last_filters() -> Option<PersistedFilters> {
    read(LAST_FILTERS_KEY)
}

pub fn save_last_filters(state: &PersistedFilters) {
    write(LAST_FILTERS_KEY, state);
}

pub fn clear_last_filters() {
    if let Some(s) = storage() {
        let _ = s.remove_item(LAST_FILTERS_KEY);
    }
}

pub fn load_presets() -> PresetBook {
    read(PRESETS_KEY).unwrap_or_default()
}

/// Saves `state` under `name` (replacing a preset with the same name) and
/// returns the updated book.
pub fn save_preset(name: &str, state: PersistedFilters) -> PresetBook {
    let mut book = load_presets();
    book.save(FilterPreset::new(name, state));
    write(PRESETS_KEY, &book);
    book
}

pub fn delete_preset(id: Uuid) -> PresetBook {
    let mut book = load_presets();
    if book.delete(id) {
        write(PRESETS_KEY, &book);
    }
    book
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_filter_set::{ChipKind, FilterSet};

    #[test]
    fn test_parse_stored_roundtrip_and_garbage() {
        let mut filters = FilterSet::new();
        filters.insert(ChipKind::Area, "Cebu");
        let state = PersistedFilters::from_filters(&filters, Default::default());
        let json = serde_json::to_string(&state).unwrap();

        let restored: Option<PersistedFilters> = parse_stored(LAST_FILTERS_KEY, &json);
        assert_eq!(restored, Some(state));

        let garbage: Option<PresetBook> = parse_stored(PRESETS_KEY, "{not json");
        assert_eq!(garbage, None);
    }
}
