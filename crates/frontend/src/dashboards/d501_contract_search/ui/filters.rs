use crate::dashboards::d501_contract_search::state::ContractSearchState;
use crate::shared::components::date_input::DateInput;
use crate::shared::components::filter_panel::{FilterPanel, FilterTag};
use crate::shared::icons::icon;
use chrono::{Datelike, NaiveDate, Utc};
use contracts::dashboards::d501_contract_search::FilterOptions;
use contracts::domain::a001_filter_set::{ChipKind, TimeRange};
use leptos::prelude::*;
use std::sync::Arc;
use thaw::*;
use uuid::Uuid;

const MAX_SUGGESTIONS: usize = 6;
const MIN_QUERY_LEN: usize = 2;
/// Первый год в данных PhilGEPS
const FIRST_DATA_YEAR: i32 = 2013;

fn suggestion_source(options: &FilterOptions, kind: ChipKind) -> &[String] {
    match kind {
        ChipKind::Contractor => &options.contractors,
        ChipKind::Area => &options.areas,
        ChipKind::Organization => &options.organizations,
        ChipKind::BusinessCategory => &options.business_categories,
        ChipKind::Keyword => &[],
    }
}

/// Case-insensitive substring match; suggestions that are already chips are skipped.
pub fn filter_suggestions(
    source: &[String],
    query: &str,
    existing: &[String],
    limit: usize,
) -> Vec<String> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    source
        .iter()
        .filter(|v| v.to_lowercase().contains(&query) && !existing.contains(v))
        .take(limit)
        .cloned()
        .collect()
}

/// Years offered in the period selector, newest first.
fn year_choices(options: &FilterOptions, current_year: i32) -> Vec<i32> {
    let mut years = if options.years.is_empty() {
        (FIRST_DATA_YEAR..=current_year).collect::<Vec<_>>()
    } else {
        options.years.clone()
    };
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// Period chip from the selector values; the quarter is optional.
fn period_from_selection(year: &str, quarter: &str) -> Option<TimeRange> {
    let year: i32 = year.parse().ok()?;
    match quarter.parse::<u8>() {
        Ok(q @ 1..=4) => Some(TimeRange::quarterly(year, q)),
        _ => Some(TimeRange::yearly(year)),
    }
}

fn custom_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<TimeRange> {
    match (from, to) {
        (Some(from), Some(to)) if from <= to => Some(TimeRange::custom(from, to)),
        _ => None,
    }
}

#[component]
pub fn ContractFilters() -> impl IntoView {
    let state = use_context::<ContractSearchState>().expect("ContractSearchState not found");
    let is_expanded = RwSignal::new(true);
    let active_filters_count = Signal::derive(move || state.active_filters_count());

    let header_content: ChildrenFn = Arc::new(move || view! { <PresetBar /> }.into_any());
    let filter_content: ChildrenFn = Arc::new(move || {
        view! {
            <div class="filter-panel__grid">
                {ChipKind::all()
                    .into_iter()
                    .map(|kind| view! { <ChipInput kind=kind /> })
                    .collect_view()}
                <PeriodInput />
                <FloodControlSwitch />
            </div>
        }
        .into_any()
    });
    let filter_tags: ChildrenFn = Arc::new(move || view! { <ActiveChips /> }.into_any());

    view! {
        <FilterPanel
            is_expanded=is_expanded
            active_filters_count=active_filters_count
            header_content=header_content
            filter_content=filter_content
            filter_tags=filter_tags
        />
    }
}

#[component]
fn ChipInput(kind: ChipKind) -> impl IntoView {
    let state = use_context::<ContractSearchState>().expect("ContractSearchState not found");
    let text = RwSignal::new(String::new());

    let add = move || {
        let value = text.get_untracked();
        if !value.trim().is_empty() {
            state.add_chip(kind, &value);
            text.set(String::new());
        }
    };

    let suggestions = Memo::new(move |_| {
        let query = text.get();
        state.options.with(|options| {
            state.filters.with(|filters| {
                filter_suggestions(
                    suggestion_source(options, kind),
                    &query,
                    filters.values(kind),
                    MAX_SUGGESTIONS,
                )
            })
        })
    });

    view! {
        <div class="chip-input">
            <label class="chip-input__label">{kind.display_name()}</label>
            <div class="chip-input__row">
                <Input
                    value=text
                    placeholder=format!("Add {}", kind.display_name().to_lowercase())
                />
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| add()>
                    "Add"
                </Button>
            </div>
            <Show when=move || suggestions.with(|s| !s.is_empty())>
                <ul class="chip-input__suggestions">
                    {move || {
                        suggestions
                            .get()
                            .into_iter()
                            .map(|item| {
                                let value = item.clone();
                                view! {
                                    <li on:click=move |_| {
                                        state.add_chip(kind, &value);
                                        text.set(String::new());
                                    }>{item}</li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
            </Show>
        </div>
    }
}

#[component]
fn PeriodInput() -> impl IntoView {
    let state = use_context::<ContractSearchState>().expect("ContractSearchState not found");
    let year = RwSignal::new(String::new());
    let quarter = RwSignal::new(String::new());
    let current_year = Utc::now().year();

    let add_period = move |_| match period_from_selection(&year.get_untracked(), &quarter.get_untracked()) {
        Some(range) => state.add_time_range(range),
        None => log::debug!("Period selector is empty"),
    };

    let add_custom = move |_| {
        let range = state.date_range.with_untracked(|d| custom_range(d.from, d.to));
        match range {
            Some(range) => state.add_time_range(range),
            None => log::warn!("Custom range needs both dates, start not after end"),
        }
    };

    view! {
        <div class="period-input">
            <label class="chip-input__label">"Period"</label>
            <div class="chip-input__row">
                <Select value=year size=SelectSize::Small>
                    <option value="">"Year"</option>
                    {move || {
                        state.options.with(|o| year_choices(o, current_year))
                            .into_iter()
                            .map(|y| view! { <option value=y.to_string()>{y}</option> })
                            .collect_view()
                    }}
                </Select>
                <Select value=quarter size=SelectSize::Small>
                    <option value="">"Whole year"</option>
                    <option value="1">"Q1"</option>
                    <option value="2">"Q2"</option>
                    <option value="3">"Q3"</option>
                    <option value="4">"Q4"</option>
                </Select>
                <Button appearance=ButtonAppearance::Secondary on_click=add_period>
                    "Add"
                </Button>
            </div>
            <div class="chip-input__row">
                <DateInput
                    label="From"
                    value=Signal::derive(move || state.date_range.with(|d| d.from))
                    on_change=Callback::new(move |d| state.date_range.update(|r| r.from = d))
                />
                <DateInput
                    label="To"
                    value=Signal::derive(move || state.date_range.with(|d| d.to))
                    on_change=Callback::new(move |d| state.date_range.update(|r| r.to = d))
                />
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click=add_custom
                    disabled=Signal::derive(move || {
                        state.date_range.with(|d| custom_range(d.from, d.to).is_none())
                    })
                >
                    "Add range"
                </Button>
            </div>
        </div>
    }
}

#[component]
fn FloodControlSwitch() -> impl IntoView {
    let state = use_context::<ContractSearchState>().expect("ContractSearchState not found");
    let checked = RwSignal::new(state.filters.with_untracked(|f| f.include_flood_control));

    Effect::new(move |_| {
        let include = checked.get();
        state.set_flood_control(include);
    });

    // Пресет или сброс фильтров меняют флаг снаружи
    Effect::new(move |_| {
        let include = state.filters.with(|f| f.include_flood_control);
        if checked.get_untracked() != include {
            checked.set(include);
        }
    });

    view! {
        <div class="flood-control-switch">
            <Switch checked=checked label="Include flood control projects" />
        </div>
    }
}

#[component]
fn ActiveChips() -> impl IntoView {
    let state = use_context::<ContractSearchState>().expect("ContractSearchState not found");

    view! {
        <div class="filter-tags">
            {move || {
                state.filters.with(|filters| {
                    let mut tags = Vec::new();
                    for kind in ChipKind::all() {
                        for value in filters.values(kind) {
                            let chip = value.clone();
                            tags.push(view! {
                                <FilterTag
                                    kind=kind.display_name()
                                    label=value.clone()
                                    on_remove=Callback::new(move |_| state.remove_chip(kind, &chip))
                                />
                            }.into_any());
                        }
                    }
                    for range in filters.time_ranges() {
                        let chip = range.clone();
                        tags.push(view! {
                            <FilterTag
                                kind="Period"
                                label=range.label()
                                on_remove=Callback::new(move |_| state.remove_time_range(&chip))
                            />
                        }.into_any());
                    }
                    if filters.include_flood_control {
                        tags.push(view! {
                            <FilterTag
                                kind="Scope"
                                label="Flood control"
                                on_remove=Callback::new(move |_| state.set_flood_control(false))
                            />
                        }.into_any());
                    }
                    tags
                })
            }}
            <Show when=move || { state.active_filters_count() > 0 }>
                <button class="filter-tags__clear" on:click=move |_| state.clear_filters()>
                    "Clear all"
                </button>
            </Show>
        </div>
    }
}

#[component]
fn PresetBar() -> impl IntoView {
    let state = use_context::<ContractSearchState>().expect("ContractSearchState not found");
    let name = RwSignal::new(String::new());

    let save = move |_| {
        let value = name.get_untracked();
        if value.trim().is_empty() {
            return;
        }
        state.save_preset(&value);
        name.set(String::new());
    };

    let preset_items = move || {
        state.presets.with(|book| {
            book.presets()
                .iter()
                .map(|p| (p.id, p.name.clone()))
                .collect::<Vec<(Uuid, String)>>()
        })
    };

    view! {
        <div class="preset-bar" on:click=|e| e.stop_propagation()>
            <Input value=name placeholder="Preset name" />
            <Button appearance=ButtonAppearance::Subtle on_click=save>
                {icon("save")}
            </Button>
            {move || {
                preset_items()
                    .into_iter()
                    .map(|(id, label)| {
                        view! {
                            <span class="preset-bar__item">
                                <button class="preset-bar__apply" on:click=move |_| state.apply_preset(id)>
                                    {label}
                                </button>
                                <button
                                    class="preset-bar__delete"
                                    aria-label="Delete preset"
                                    on:click=move |_| state.delete_preset(id)
                                >
                                    {icon("trash")}
                                </button>
                            </span>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_filter_suggestions() {
        let source = names(&["ACME Builders", "Acme Trading", "Cebu Works", "Road Corp"]);
        assert_eq!(
            filter_suggestions(&source, "acme", &[], 5),
            names(&["ACME Builders", "Acme Trading"])
        );
        assert_eq!(
            filter_suggestions(&source, "acme", &names(&["Acme Trading"]), 5),
            names(&["ACME Builders"])
        );
        assert_eq!(filter_suggestions(&source, "a", &[], 5), Vec::<String>::new());
        assert_eq!(filter_suggestions(&source, "o", &[], 5).len(), 0);
        assert_eq!(filter_suggestions(&source, "or", &[], 1), names(&["Cebu Works"]));
    }

    #[test]
    fn test_period_from_selection() {
        assert_eq!(period_from_selection("2023", ""), Some(TimeRange::yearly(2023)));
        assert_eq!(
            period_from_selection("2023", "3"),
            Some(TimeRange::quarterly(2023, 3))
        );
        assert_eq!(period_from_selection("2023", "7"), Some(TimeRange::yearly(2023)));
        assert_eq!(period_from_selection("", "2"), None);
    }

    #[test]
    fn test_custom_range_requires_order() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1);
        let b = NaiveDate::from_ymd_opt(2024, 6, 30);
        assert!(custom_range(a, b).is_some());
        assert!(custom_range(b, a).is_none());
        assert!(custom_range(a, None).is_none());
    }

    #[test]
    fn test_year_choices() {
        let options = FilterOptions {
            years: vec![2021, 2023, 2022, 2023],
            ..Default::default()
        };
        assert_eq!(year_choices(&options, 2025), vec![2023, 2022, 2021]);
        let fallback = year_choices(&FilterOptions::default(), 2015);
        assert_eq!(fallback, vec![2015, 2014, 2013]);
    }
}
