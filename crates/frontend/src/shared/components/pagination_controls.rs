use crate::shared::icons::icon;
use contracts::shared::pagination::PaginationState;
use leptos::prelude::*;

/// PaginationControls component - first/prev/next/last buttons, range label
/// and page size selector over a [`PaginationState`]
#[component]
pub fn PaginationControls(
    /// Pagination state (pages are 1-based)
    #[prop(into)]
    state: Signal<PaginationState>,

    /// Callback when page changes
    on_page_change: Callback<usize>,

    /// Callback when page size changes
    on_page_size_change: Callback<usize>,

    /// Available page size options
    #[prop(optional)]
    page_size_options: Option<Vec<usize>>,
) -> impl IntoView {
    let page_size_opts = page_size_options.unwrap_or_else(|| vec![20, 50, 100]);

    view! {
        <div class="pagination-controls">
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(1)
                disabled=move || !state.get().has_previous()
                title="First page"
            >
                {icon("chevrons-left")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let s = state.get();
                    if s.has_previous() {
                        on_page_change.run(s.current_page() - 1);
                    }
                }
                disabled=move || !state.get().has_previous()
                title="Previous page"
            >
                {icon("chevron-left")}
            </button>
            <span class="pagination-info">
                {move || {
                    let s = state.get();
                    let (start, end) = s.display_range();
                    format!(
                        "{}–{} of {} · page {} / {}",
                        start,
                        end,
                        s.total_count(),
                        s.current_page(),
                        s.total_pages().max(1)
                    )
                }}
            </span>
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let s = state.get();
                    if s.has_next() {
                        on_page_change.run(s.current_page() + 1);
                    }
                }
                disabled=move || !state.get().has_next()
                title="Next page"
            >
                {icon("chevron-right")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(state.get().total_pages().max(1))
                disabled=move || !state.get().has_next()
                title="Last page"
            >
                {icon("chevrons-right")}
            </button>
            <select
                class="page-size-select"
                on:change=move |ev| {
                    if let Ok(val) = event_target_value(&ev).parse::<usize>() {
                        on_page_size_change.run(val);
                    }
                }
                prop:value=move || state.get().page_size().to_string()
            >
                {page_size_opts.iter().map(|&size| {
                    view! {
                        <option value={size.to_string()} selected=move || state.get().page_size() == size>
                            {size.to_string()}
                        </option>
                    }
                }).collect_view()}
            </select>
        </div>
    }
}
