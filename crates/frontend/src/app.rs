use crate::dashboards::d501_contract_search::ui::ContractSearchPage;
use crate::layout::global_context::AppGlobalContext;
use crate::shared::app_config::app_config;
use crate::usecases::u601_chip_export::controller::ExportController;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    let config = app_config();

    // Provide the AppGlobalContext store to the whole app via context.
    let ctx = AppGlobalContext::new(config.clone());
    ctx.init_router_integration();
    provide_context(ctx);

    // One export controller per app: only one export may run at a time.
    provide_context(ExportController::new(&config));

    view! {
        <ContractSearchPage />
    }
}
