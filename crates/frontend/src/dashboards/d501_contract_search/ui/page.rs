use super::analytics_table::AnalyticsTable;
use super::contracts_table::ContractsTable;
use super::filters::ContractFilters;
use super::summary::SummaryCards;
use crate::dashboards::d501_contract_search::state::ContractSearchState;
use crate::layout::global_context::{AppGlobalContext, DashboardTab};
use crate::usecases::u601_chip_export::ExportModal;
use leptos::prelude::*;
use thaw::*;

#[component]
pub fn ContractSearchPage() -> impl IntoView {
    let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext not found");
    let state = ContractSearchState::new(&ctx.config());
    provide_context(state);

    state.load_filter_options();
    state.reload_all();

    let tab_button = move |tab: DashboardTab| {
        view! {
            <Button
                appearance=move || {
                    if ctx.active.get() == tab {
                        ButtonAppearance::Primary
                    } else {
                        ButtonAppearance::Subtle
                    }
                }
                on_click=move |_| ctx.activate_tab(tab)
            >
                {tab.title()}
            </Button>
        }
    };

    view! {
        <div id="d501_contract_search--dashboard" class="page d501-dashboard">
            <div class="page__header">
                <div class="page__header-left">
                    <h1 class="page__title">"PhilGEPS Contracts"</h1>
                </div>
                <div class="page__header-right">
                    {tab_button(DashboardTab::Contracts)}
                    {tab_button(DashboardTab::Analytics)}
                </div>
            </div>

            <div class="page__content">
                <ContractFilters />
                <SummaryCards />
                {move || match ctx.active.get() {
                    DashboardTab::Contracts => view! { <ContractsTable /> }.into_any(),
                    DashboardTab::Analytics => view! { <AnalyticsTable /> }.into_any(),
                }}
            </div>

            <ExportModal />
        </div>
    }
}
