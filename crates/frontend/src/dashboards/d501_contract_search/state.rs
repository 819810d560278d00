//! Reactive state of the contracts dashboard.
//!
//! All mutations go through these methods: each one updates the filter chips,
//! stores them as the last-used filters and reloads the affected data.

use super::{api, orchestrator};
use contracts::dashboards::d501_contract_search::{
    AggregateSortField, Aggregates, AggregationItem, ContractRow, ContractSort, ContractSortField,
    Dimension, FilterOptions, SortDirection,
};
use contracts::domain::a001_filter_set::{
    ChipKind, DateRange, FilterSet, PersistedFilters, PresetBook, TimeRange,
};
use contracts::shared::chip_payload::ChipFilterPayload;
use contracts::shared::config::AppConfig;
use contracts::shared::pagination::PaginationState;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use uuid::Uuid;

use crate::shared::filter_storage;

/// Быстрые клики по чипам и страницам сливаются в один запрос
const RELOAD_DEBOUNCE_MS: u32 = 150;

fn initial_pagination(config: &AppConfig) -> PaginationState {
    PaginationState::new(config.pagination.default_page_size).unwrap_or_else(|e| {
        log::warn!("{}; using default page size", e);
        PaginationState::default()
    })
}

#[derive(Clone, Copy)]
pub struct ContractSearchState {
    pub filters: RwSignal<FilterSet>,
    pub date_range: RwSignal<DateRange>,
    pub pagination: RwSignal<PaginationState>,
    pub sort: RwSignal<ContractSort>,
    pub rows: RwSignal<Vec<ContractRow>>,
    pub aggregates: RwSignal<Option<Aggregates>>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    pub options: RwSignal<FilterOptions>,
    pub presets: RwSignal<PresetBook>,
    pub analytics: AnalyticsState,
    pub page_size_options: StoredValue<Vec<usize>>,
    top_n: usize,
    // Ответ применяется только если за время запроса не было нового
    generation: StoredValue<u64>,
}

impl ContractSearchState {
    pub fn new(config: &AppConfig) -> Self {
        let restored = filter_storage::load_last_filters().unwrap_or_default();
        let date_range = restored.date_range.clone();
        let filters = restored.into_filters();
        let pagination = initial_pagination(config);

        Self {
            filters: RwSignal::new(filters),
            date_range: RwSignal::new(date_range),
            pagination: RwSignal::new(pagination),
            sort: RwSignal::new(ContractSort::default()),
            rows: RwSignal::new(Vec::new()),
            aggregates: RwSignal::new(None),
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
            options: RwSignal::new(FilterOptions::default()),
            presets: RwSignal::new(filter_storage::load_presets()),
            analytics: AnalyticsState::new(pagination),
            page_size_options: StoredValue::new(config.pagination.page_size_options.clone()),
            top_n: config.search.top_n,
            generation: StoredValue::new(0),
        }
    }

    pub fn payload(&self) -> ChipFilterPayload {
        self.filters.with_untracked(orchestrator::prepare_payload)
    }

    pub fn active_filters_count(&self) -> usize {
        self.filters.with(|f| f.active_count())
    }

    /// Loads the current contracts page and the aggregates.
    pub fn reload(&self) {
        let generation = self.generation.get_value() + 1;
        self.generation.set_value(generation);

        let payload = self.payload();
        let pagination = self.pagination.get_untracked();
        let sort = self.sort.get_untracked();
        let top_n = self.top_n;
        self.loading.set(true);

        let this = *self;
        spawn_local(async move {
            TimeoutFuture::new(RELOAD_DEBOUNCE_MS).await;
            if this.generation.get_value() != generation {
                return;
            }
            let (snapshot, pagination) = orchestrator::load(&payload, pagination, sort, top_n).await;
            if this.generation.get_value() != generation {
                log::debug!("Discarding outdated search response");
                return;
            }
            this.pagination.set(pagination);
            this.rows.set(snapshot.rows);
            this.aggregates.set(snapshot.aggregates);
            this.error.set(snapshot.error);
            this.loading.set(false);
        });
    }

    /// Contracts page and analytics table, after the filters changed.
    pub fn reload_all(&self) {
        self.reload();
        self.analytics.reload(self.payload());
    }

    pub fn load_filter_options(&self) {
        let options = self.options;
        spawn_local(async move {
            match api::filter_options().await {
                Ok(data) => options.set(data),
                Err(e) => log::warn!("Failed to load filter options: {}", e),
            }
        });
    }

    fn persisted(&self) -> PersistedFilters {
        let date_range = self.date_range.get_untracked();
        self.filters
            .with_untracked(|f| PersistedFilters::from_filters(f, date_range))
    }

    /// Filters changed: remember them, go back to page 1 and reload.
    fn filters_changed(&self) {
        filter_storage::save_last_filters(&self.persisted());
        self.pagination.update(|p| p.reset());
        self.analytics.pagination.update(|p| p.reset());
        self.reload_all();
    }

    fn mutate_filters(&self, f: impl FnOnce(&mut FilterSet) -> bool) {
        let mut changed = false;
        self.filters.update(|filters| changed = f(filters));
        if changed {
            self.filters_changed();
        }
    }

    pub fn add_chip(&self, kind: ChipKind, value: &str) {
        self.mutate_filters(|f| f.insert(kind, value));
    }

    pub fn remove_chip(&self, kind: ChipKind, value: &str) {
        self.mutate_filters(|f| f.remove(kind, value));
    }

    pub fn add_time_range(&self, range: TimeRange) {
        self.mutate_filters(|f| f.insert_time_range(range));
    }

    pub fn remove_time_range(&self, range: &TimeRange) {
        self.mutate_filters(|f| f.remove_time_range(range));
    }

    pub fn set_flood_control(&self, include: bool) {
        self.mutate_filters(|f| {
            let changed = f.include_flood_control != include;
            f.include_flood_control = include;
            changed
        });
    }

    pub fn clear_filters(&self) {
        self.filters.update(|f| f.clear());
        self.date_range.set(DateRange::default());
        filter_storage::clear_last_filters();
        self.pagination.update(|p| p.reset());
        self.analytics.pagination.update(|p| p.reset());
        self.reload_all();
    }

    pub fn set_page(&self, page: usize) {
        self.pagination.update(|p| p.set_page(page));
        self.reload();
    }

    pub fn set_page_size(&self, page_size: usize) {
        let mut result = Ok(());
        self.pagination.update(|p| result = p.set_page_size(page_size));
        match result {
            Ok(()) => self.reload(),
            Err(e) => log::warn!("Ignoring page size {}: {}", page_size, e),
        }
    }

    pub fn toggle_sort(&self, field: ContractSortField) {
        self.sort.update(|s| *s = s.toggle(field));
        self.pagination.update(|p| p.reset());
        self.reload();
    }

    pub fn save_preset(&self, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        let book = filter_storage::save_preset(name, self.persisted());
        self.presets.set(book);
        log::info!("Filter preset saved: {}", name.trim());
    }

    pub fn apply_preset(&self, id: Uuid) {
        let Some(preset) = self.presets.with_untracked(|b| b.find(id).cloned()) else {
            log::warn!("Filter preset {} not found", id);
            return;
        };
        self.date_range.set(preset.state.date_range.clone());
        self.filters.set(preset.state.into_filters());
        self.filters_changed();
    }

    pub fn delete_preset(&self, id: Uuid) {
        self.presets.set(filter_storage::delete_preset(id));
    }
}

/// Paginated aggregates table of the analytics tab.
#[derive(Clone, Copy)]
pub struct AnalyticsState {
    pub dimension: RwSignal<Dimension>,
    pub pagination: RwSignal<PaginationState>,
    pub sort_by: RwSignal<AggregateSortField>,
    pub sort_direction: RwSignal<SortDirection>,
    pub rows: RwSignal<Vec<AggregationItem>>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    generation: StoredValue<u64>,
}

impl AnalyticsState {
    fn new(pagination: PaginationState) -> Self {
        Self {
            dimension: RwSignal::new(Dimension::default()),
            pagination: RwSignal::new(pagination),
            sort_by: RwSignal::new(AggregateSortField::default()),
            sort_direction: RwSignal::new(SortDirection::default()),
            rows: RwSignal::new(Vec::new()),
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
            generation: StoredValue::new(0),
        }
    }

    pub fn reload(&self, payload: ChipFilterPayload) {
        let generation = self.generation.get_value() + 1;
        self.generation.set_value(generation);

        let dimension = self.dimension.get_untracked();
        let pagination = self.pagination.get_untracked();
        let sort_by = self.sort_by.get_untracked();
        let sort_direction = self.sort_direction.get_untracked();
        self.loading.set(true);

        let this = *self;
        spawn_local(async move {
            let result = orchestrator::load_aggregates_page(
                &payload,
                dimension,
                &pagination,
                sort_by,
                sort_direction,
            )
            .await;
            if this.generation.get_value() != generation {
                return;
            }
            match result {
                Ok(page) => {
                    this.pagination
                        .update(|p| p.set_total_count(page.pagination.total_count as usize));
                    this.rows.set(page.data);
                    this.error.set(None);
                }
                Err(e) => {
                    log::error!("Failed to load {} aggregates: {}", dimension.as_str(), e);
                    this.rows.set(Vec::new());
                    this.pagination.update(|p| p.set_total_count(0));
                    this.error.set(Some(e));
                }
            }
            this.loading.set(false);
        });
    }

    pub fn set_dimension(&self, dimension: Dimension, payload: ChipFilterPayload) {
        self.dimension.set(dimension);
        self.pagination.update(|p| p.reset());
        self.reload(payload);
    }

    /// Clicking the active column flips direction; another column starts descending.
    pub fn toggle_sort(&self, field: AggregateSortField, payload: ChipFilterPayload) {
        if self.sort_by.get_untracked() == field {
            self.sort_direction.update(|d| *d = d.toggled());
        } else {
            self.sort_by.set(field);
            self.sort_direction.set(SortDirection::Desc);
        }
        self.pagination.update(|p| p.reset());
        self.reload(payload);
    }
}
