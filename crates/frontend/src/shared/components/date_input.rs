use chrono::NaiveDate;
use leptos::prelude::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Value of a native date input: empty or unparsable text is no date.
pub fn parse_date_input(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Native date picker bound to an optional date
#[component]
pub fn DateInput(
    #[prop(into)]
    value: Signal<Option<NaiveDate>>,
    on_change: Callback<Option<NaiveDate>>,
    #[prop(optional, into)]
    label: Option<String>,
) -> impl IntoView {
    let text = move || {
        value
            .get()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    };

    view! {
        <label class="date-input">
            {label.map(|l| view! { <span class="date-input__label">{l}</span> })}
            <input
                type="date"
                class="date-input__field"
                prop:value=text
                on:input=move |ev| on_change.run(parse_date_input(&event_target_value(&ev)))
            />
        </label>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_input() {
        assert_eq!(
            parse_date_input("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_date_input(""), None);
        assert_eq!(parse_date_input("01.03.2024"), None);
    }
}
