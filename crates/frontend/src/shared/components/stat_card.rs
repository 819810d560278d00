use super::table::{format_money, format_number_int};
use crate::shared::icons::icon;
use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatFormat {
    Money,
    Integer,
}

/// Millions are shortened on cards: `₱12.3M`
pub fn format_stat(value: f64, format: StatFormat) -> String {
    match format {
        StatFormat::Money if value.abs() >= 1_000_000_000.0 => {
            format!("₱{:.1}B", value / 1_000_000_000.0)
        }
        StatFormat::Money if value.abs() >= 1_000_000.0 => {
            format!("₱{:.1}M", value / 1_000_000.0)
        }
        StatFormat::Money => format_money(value),
        StatFormat::Integer => format_number_int(value),
    }
}

#[component]
pub fn StatCard(
    /// Label displayed above the value
    #[prop(into)]
    label: String,
    /// Icon name from the icon() helper
    #[prop(into)]
    icon_name: String,
    /// None while loading or when aggregates are unavailable
    #[prop(into)]
    value: Signal<Option<f64>>,
    format: StatFormat,
) -> impl IntoView {
    let formatted = move || match value.get() {
        Some(v) => format_stat(v, format),
        None => "—".to_string(),
    };

    view! {
        <div class="stat-card">
            <div class="stat-card__icon">
                {icon(&icon_name)}
            </div>
            <div class="stat-card__content">
                <div class="stat-card__label">{label}</div>
                <div class="stat-card__value">{formatted}</div>
            </div>
        </div>
    }
}
