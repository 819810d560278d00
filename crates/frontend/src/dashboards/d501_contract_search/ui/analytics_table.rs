use crate::dashboards::d501_contract_search::state::ContractSearchState;
use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::components::table::{format_number_int, SortableHeaderCell, TableCellMoney};
use crate::shared::export::CsvExportable;
use crate::usecases::u601_chip_export::{ExportButton, ExportController};
use chrono::Utc;
use contracts::dashboards::d501_contract_search::{
    AggregateSortField, AggregationItem, Dimension, SortDirection,
};
use contracts::usecases::u601_chip_export::{export_filename, DataSource, ExportConfig};
use leptos::prelude::*;
use thaw::*;

impl CsvExportable for AggregationItem {
    fn headers() -> Vec<&'static str> {
        vec!["Label", "Contracts", "Total Value", "Average Value"]
    }

    fn to_csv_row(&self) -> Vec<String> {
        vec![
            self.label.clone(),
            self.count.to_string(),
            format!("{:.2}", self.total_value),
            format!("{:.2}", average(self)),
        ]
    }
}

/// Сервер может не прислать avg_value, тогда считаем сами
fn average(item: &AggregationItem) -> f64 {
    match item.avg_value {
        Some(avg) => avg,
        None if item.count > 0 => item.total_value / item.count as f64,
        None => 0.0,
    }
}

/// Paginated aggregates by the selected dimension, with server-side export.
#[component]
pub fn AnalyticsTable() -> impl IntoView {
    let state = use_context::<ContractSearchState>().expect("ContractSearchState not found");
    let controller = use_context::<ExportController>().expect("ExportController not found");
    let analytics = state.analytics;

    let dimension_key = RwSignal::new(analytics.dimension.get_untracked().as_str().to_string());
    Effect::new(move |_| {
        let key = dimension_key.get();
        let Some(dimension) = Dimension::from_str(&key) else {
            log::warn!("Unknown dimension '{}'", key);
            return;
        };
        if dimension != analytics.dimension.get_untracked() {
            analytics.set_dimension(dimension, state.payload());
        }
    });

    let header = move |label: &'static str, field: AggregateSortField, align: &'static str| {
        view! {
            <SortableHeaderCell
                label=label
                active=Signal::derive(move || analytics.sort_by.get() == field)
                ascending=Signal::derive(move || analytics.sort_direction.get() == SortDirection::Asc)
                on_sort=Callback::new(move |_| analytics.toggle_sort(field, state.payload()))
                align=align
            />
        }
    };

    let export_config = Callback::new(move |_| {
        ExportConfig::analytics(state.payload(), analytics.dimension.get_untracked(), Utc::now())
    });

    let export_page = move |_| {
        let dimension = analytics.dimension.get_untracked();
        let filename = export_filename(DataSource::Analytics, Some(dimension), Utc::now());
        let config = ExportConfig::client_side(DataSource::Analytics, &filename);
        analytics
            .rows
            .with_untracked(|rows| controller.export_client_side(rows, &config));
    };

    view! {
        <div class="analytics-table">
            <div class="table-toolbar">
                <Select value=dimension_key size=SelectSize::Small>
                    {Dimension::all()
                        .into_iter()
                        .map(|d| view! { <option value=d.as_str()>{d.display_name()}</option> })
                        .collect_view()}
                </Select>
                <PaginationControls
                    state=analytics.pagination
                    on_page_change=Callback::new(move |page| {
                        analytics.pagination.update(|p| p.set_page(page));
                        analytics.reload(state.payload());
                    })
                    on_page_size_change=Callback::new(move |size| {
                        let mut result = Ok(());
                        analytics.pagination.update(|p| result = p.set_page_size(size));
                        match result {
                            Ok(()) => analytics.reload(state.payload()),
                            Err(e) => log::warn!("Ignoring page size {}: {}", size, e),
                        }
                    })
                    page_size_options=state.page_size_options.get_value()
                />
                <div class="table-toolbar__actions">
                    <Button appearance=ButtonAppearance::Subtle on_click=export_page>
                        "Export page"
                    </Button>
                    <ExportButton label="Export all" build_config=export_config />
                </div>
            </div>

            {move || analytics.error.get().map(|err| view! {
                <div class="alert alert--error">
                    <strong>"Analytics unavailable: "</strong>{err}
                </div>
            })}

            <div class="table-wrapper" class:table-wrapper--loading=move || analytics.loading.get()>
                <Table>
                    <TableHeader>
                        <TableRow>
                            {move || header(analytics.dimension.get().display_name(), AggregateSortField::Label, "left")}
                            {header("Contracts", AggregateSortField::Count, "right")}
                            {header("Total value", AggregateSortField::TotalValue, "right")}
                            {header("Average", AggregateSortField::AvgValue, "right")}
                        </TableRow>
                    </TableHeader>
                    <TableBody>
                        {move || {
                            analytics.rows.get().into_iter().map(|item| {
                                let total = item.total_value;
                                let avg = average(&item);
                                view! {
                                    <TableRow>
                                        <TableCell><TableCellLayout truncate=true>{item.label.clone()}</TableCellLayout></TableCell>
                                        <TableCell class="text-right">{format_number_int(item.count as f64)}</TableCell>
                                        <TableCellMoney value=Signal::derive(move || Some(total)) bold=true />
                                        <TableCellMoney value=Signal::derive(move || Some(avg)) />
                                    </TableRow>
                                }
                            }).collect_view()
                        }}
                    </TableBody>
                </Table>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_falls_back_to_division() {
        let mut item = AggregationItem {
            label: "ACME".into(),
            total_value: 300.0,
            count: 3,
            avg_value: None,
        };
        assert_eq!(average(&item), 100.0);
        item.avg_value = Some(90.0);
        assert_eq!(average(&item), 90.0);
        item.count = 0;
        item.avg_value = None;
        assert_eq!(average(&item), 0.0);
    }

    #[test]
    fn test_aggregation_csv_row() {
        let item = AggregationItem {
            label: "Cebu".into(),
            total_value: 1000.0,
            count: 4,
            avg_value: None,
        };
        assert_eq!(item.to_csv_row(), vec!["Cebu", "4", "1000.00", "250.00"]);
    }
}
