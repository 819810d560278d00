//! Table cell for peso amounts
//!
//! ```rust,ignore
//! <TableCellMoney value=Signal::derive(move || Some(row.contract_amount)) />
//! <TableCellMoney value=total bold=true />
//! ```

use super::number_format::format_money;
use leptos::prelude::*;
use thaw::*;

/// Right aligned, formatted with [`format_money`]; `None` renders as a dash
#[component]
pub fn TableCellMoney(
    #[prop(into)]
    value: Signal<Option<f64>>,

    #[prop(optional, default = false)]
    bold: bool,
) -> impl IntoView {
    let formatted_text = move || match value.get() {
        Some(v) => format_money(v),
        None => "—".to_string(),
    };

    view! {
        <TableCell class="text-right">
            <span style=if bold { "font-weight: 600" } else { "" }>
                {formatted_text}
            </span>
        </TableCell>
    }
}
