pub mod aggregate;
pub mod preset;
pub mod time_range;

pub use aggregate::{ChipKind, FilterSet, ValueRange};
pub use preset::{DateRange, FilterPreset, PersistedFilters, PresetBook};
pub use time_range::{TimeRange, TimeRangeKind};
