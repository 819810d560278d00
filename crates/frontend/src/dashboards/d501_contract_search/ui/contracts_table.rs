use crate::dashboards::d501_contract_search::state::ContractSearchState;
use crate::shared::app_config::app_config;
use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::components::table::{SortableHeaderCell, TableCellMoney};
use crate::shared::export::CsvExportable;
use crate::usecases::u601_chip_export::{ExportButton, ExportController};
use chrono::Utc;
use contracts::dashboards::d501_contract_search::{ContractRow, ContractSortField, SortDirection};
use contracts::usecases::u601_chip_export::{DataSource, ExportConfig};
use leptos::prelude::*;
use thaw::*;

impl CsvExportable for ContractRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "Reference ID",
            "Contract No",
            "Award Title",
            "Notice Title",
            "Award Date",
            "Awardee",
            "Organization",
            "Area of Delivery",
            "Business Category",
            "Contract Amount",
        ]
    }

    fn to_csv_row(&self) -> Vec<String> {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            self.reference_id.clone(),
            text(&self.contract_no),
            text(&self.award_title),
            text(&self.notice_title),
            text(&self.award_date),
            text(&self.awardee_name),
            text(&self.organization_name),
            text(&self.area_of_delivery),
            text(&self.business_category),
            format!("{:.2}", self.contract_amount),
        ]
    }
}

fn dash(v: &Option<String>) -> String {
    v.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "—".to_string())
}

#[component]
pub fn ContractsTable() -> impl IntoView {
    let state = use_context::<ContractSearchState>().expect("ContractSearchState not found");
    let controller = use_context::<ExportController>().expect("ExportController not found");

    let header = move |label: &'static str, field: ContractSortField, align: &'static str| {
        view! {
            <SortableHeaderCell
                label=label
                active=Signal::derive(move || state.sort.get().field == field)
                ascending=Signal::derive(move || state.sort.get().direction == SortDirection::Asc)
                on_sort=Callback::new(move |_| state.toggle_sort(field))
                align=align
            />
        }
    };

    let export_config =
        Callback::new(move |_| app_config().contracts_export(state.payload(), Utc::now()));

    let export_page = move |_| {
        let filename = format!("contracts_page_{}.csv", state.pagination.get_untracked().current_page());
        let config = ExportConfig::client_side(DataSource::Contracts, &filename);
        state.rows.with_untracked(|rows| controller.export_client_side(rows, &config));
    };

    view! {
        <div class="contracts-table">
            <div class="table-toolbar">
                <PaginationControls
                    state=state.pagination
                    on_page_change=Callback::new(move |page| state.set_page(page))
                    on_page_size_change=Callback::new(move |size| state.set_page_size(size))
                    page_size_options=state.page_size_options.get_value()
                />
                <div class="table-toolbar__actions">
                    <Button appearance=ButtonAppearance::Subtle on_click=export_page>
                        "Export page"
                    </Button>
                    <ExportButton label="Export all" build_config=export_config />
                </div>
            </div>

            {move || state.error.get().map(|err| view! {
                <div class="alert alert--error">
                    <strong>"Search failed: "</strong>{err}
                </div>
            })}

            <div class="table-wrapper" class:table-wrapper--loading=move || state.loading.get()>
                <Table>
                    <TableHeader>
                        <TableRow>
                            {header("Award date", ContractSortField::AwardDate, "left")}
                            {header("Reference", ContractSortField::ReferenceId, "left")}
                            {header("Award title", ContractSortField::AwardTitle, "left")}
                            {header("Awardee", ContractSortField::AwardeeName, "left")}
                            {header("Organization", ContractSortField::OrganizationName, "left")}
                            {header("Area", ContractSortField::AreaOfDelivery, "left")}
                            {header("Category", ContractSortField::BusinessCategory, "left")}
                            {header("Amount", ContractSortField::ContractAmount, "right")}
                        </TableRow>
                    </TableHeader>
                    <TableBody>
                        {move || {
                            state.rows.get().into_iter().map(|row| {
                                let amount = row.contract_amount;
                                view! {
                                    <TableRow>
                                        <TableCell><TableCellLayout>{dash(&row.award_date)}</TableCellLayout></TableCell>
                                        <TableCell><TableCellLayout>{row.reference_id.clone()}</TableCellLayout></TableCell>
                                        <TableCell>
                                            <TableCellLayout truncate=true>
                                                {dash(&row.award_title.clone().or(row.notice_title.clone()))}
                                            </TableCellLayout>
                                        </TableCell>
                                        <TableCell><TableCellLayout truncate=true>{dash(&row.awardee_name)}</TableCellLayout></TableCell>
                                        <TableCell><TableCellLayout truncate=true>{dash(&row.organization_name)}</TableCellLayout></TableCell>
                                        <TableCell><TableCellLayout>{dash(&row.area_of_delivery)}</TableCellLayout></TableCell>
                                        <TableCell><TableCellLayout>{dash(&row.business_category)}</TableCellLayout></TableCell>
                                        <TableCellMoney value=Signal::derive(move || Some(amount)) />
                                    </TableRow>
                                }
                            }).collect_view()
                        }}
                    </TableBody>
                </Table>
                <Show when=move || !state.loading.get() && state.error.with(|e| e.is_none()) && state.rows.with(|r| r.is_empty())>
                    <div class="table-empty">"No contracts match the current filters"</div>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_row_csv() {
        let row = ContractRow {
            reference_id: "R-1".into(),
            award_title: Some("Road, phase 2".into()),
            contract_amount: 1500.5,
            ..Default::default()
        };
        let cells = row.to_csv_row();
        assert_eq!(cells.len(), ContractRow::headers().len());
        assert_eq!(cells[0], "R-1");
        assert_eq!(cells[2], "Road, phase 2");
        assert_eq!(cells[1], "");
        assert_eq!(cells[9], "1500.50");
    }
}
