use crate::dashboards::d501_contract_search::state::ContractSearchState;
use crate::shared::components::stat_card::{StatCard, StatFormat};
use crate::shared::components::table::{format_money, format_number_int};
use leptos::prelude::*;

/// Summary cards and the yearly breakdown from the aggregates response.
///
/// Aggregates are optional: when their request failed the cards show dashes
/// and the contracts table is still usable.
#[component]
pub fn SummaryCards() -> impl IntoView {
    let state = use_context::<ContractSearchState>().expect("ContractSearchState not found");
    let summary = Memo::new(move |_| state.aggregates.with(|a| a.as_ref().map(|a| a.summary())));

    view! {
        <div class="summary-cards">
            <StatCard
                label="Contracts"
                icon_name="search"
                value=Signal::derive(move || summary.get().map(|s| s.count as f64))
                format=StatFormat::Integer
            />
            <StatCard
                label="Total value"
                icon_name="bar-chart"
                value=Signal::derive(move || summary.get().map(|s| s.total_value))
                format=StatFormat::Money
            />
            <StatCard
                label="Average contract"
                icon_name="bar-chart"
                value=Signal::derive(move || summary.get().map(|s| s.avg_value))
                format=StatFormat::Money
            />
        </div>
        <div class="summary-years">
            {move || {
                state.aggregates.with(|a| {
                    a.as_ref()
                        .map(|a| a.by_year.clone())
                        .unwrap_or_default()
                        .into_iter()
                        .map(|y| {
                            view! {
                                <div class="summary-years__item">
                                    <span class="summary-years__year">{y.year}</span>
                                    <span>{format_money(y.total_value)}</span>
                                    <span class="text-muted">
                                        {format!("{} contracts", format_number_int(y.count as f64))}
                                    </span>
                                </div>
                            }
                        })
                        .collect_view()
                })
            }}
        </div>
    }
}
