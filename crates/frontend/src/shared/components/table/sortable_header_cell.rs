//! Sortable table header cell
//!
//! ```rust,ignore
//! <SortableHeaderCell
//!     label="Amount"
//!     active=Signal::derive(move || sort.get().field == ContractSortField::ContractAmount)
//!     ascending=Signal::derive(move || sort.get().direction == SortDirection::Asc)
//!     on_sort=Callback::new(move |_| toggle(ContractSortField::ContractAmount))
//!     align="right"
//! />
//! ```

use leptos::prelude::*;
use thaw::*;

pub fn sort_indicator(active: bool, ascending: bool) -> &'static str {
    match (active, ascending) {
        (true, true) => " ▲",
        (true, false) => " ▼",
        (false, _) => " ⇅",
    }
}

#[component]
pub fn SortableHeaderCell(
    /// Header text
    #[prop(into)]
    label: String,

    /// Whether the table is sorted by this column
    #[prop(into)]
    active: Signal<bool>,

    /// Sort direction of the active column
    #[prop(into)]
    ascending: Signal<bool>,

    /// Click handler
    on_sort: Callback<()>,

    #[prop(optional, default = 100.0)]
    min_width: f64,

    /// left / right
    #[prop(optional, default = "left")]
    align: &'static str,
) -> impl IntoView {
    let header_style = if align == "right" {
        "cursor: pointer; justify-content: flex-end; padding-right: 12px;"
    } else {
        "cursor: pointer; padding-right: 12px;"
    };

    view! {
        <TableHeaderCell min_width=min_width>
            <div
                class="table__sortable-header"
                style=header_style
                on:click=move |_| on_sort.run(())
            >
                {label}
                <span class=move || {
                    if active.get() { "table__sort-indicator table__sort-indicator--active" } else { "table__sort-indicator" }
                }>
                    {move || sort_indicator(active.get(), ascending.get())}
                </span>
            </div>
        </TableHeaderCell>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_indicator() {
        assert_eq!(sort_indicator(true, true), " ▲");
        assert_eq!(sort_indicator(true, false), " ▼");
        assert_eq!(sort_indicator(false, true), " ⇅");
    }
}
