use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Тип временного фильтра. Бэкенд принимает только эти три значения.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRangeKind {
    Yearly,
    Quarterly,
    Custom,
}

impl TimeRangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRangeKind::Yearly => "yearly",
            TimeRangeKind::Quarterly => "quarterly",
            TimeRangeKind::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "yearly" => Some(TimeRangeKind::Yearly),
            "quarterly" => Some(TimeRangeKind::Quarterly),
            "custom" => Some(TimeRangeKind::Custom),
            _ => None,
        }
    }
}

/// Time range chip.
///
/// The wire format keeps `startDate` / `endDate` in camelCase: that is what
/// the search serializer on the server expects, even inside snake_case
/// payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(rename = "type")]
    pub kind: TimeRangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u8>,
    #[serde(
        default,
        rename = "startDate",
        alias = "start_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        rename = "endDate",
        alias = "end_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
}

impl TimeRange {
    pub fn yearly(year: i32) -> Self {
        Self {
            kind: TimeRangeKind::Yearly,
            year: Some(year),
            quarter: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn quarterly(year: i32, quarter: u8) -> Self {
        Self {
            kind: TimeRangeKind::Quarterly,
            year: Some(year),
            quarter: Some(quarter),
            start_date: None,
            end_date: None,
        }
    }

    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            kind: TimeRangeKind::Custom,
            year: None,
            quarter: None,
            start_date: Some(start),
            end_date: Some(end),
        }
    }

    /// Текст для чипа фильтра
    pub fn label(&self) -> String {
        match self.kind {
            TimeRangeKind::Yearly => self
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "Year".to_string()),
            TimeRangeKind::Quarterly => match (self.quarter, self.year) {
                (Some(q), Some(y)) => format!("Q{} {}", q, y),
                (None, Some(y)) => format!("Quarter {}", y),
                _ => "Quarter".to_string(),
            },
            TimeRangeKind::Custom => {
                let fmt = |d: Option<NaiveDate>| {
                    d.map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "…".to_string())
                };
                format!("{} – {}", fmt(self.start_date), fmt(self.end_date))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(TimeRange::yearly(2023).label(), "2023");
        assert_eq!(TimeRange::quarterly(2023, 2).label(), "Q2 2023");
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
        assert_eq!(TimeRange::custom(start, end).label(), "2023-01-01 – 2023-03-31");
    }

    #[test]
    fn test_wire_format_keeps_camel_case_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let json = serde_json::to_value(TimeRange::custom(start, end)).unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["startDate"], "2024-05-01");
        assert_eq!(json["endDate"], "2024-05-31");
        assert!(json.get("year").is_none());
    }

    #[test]
    fn test_snake_case_dates_accepted() {
        let tr: TimeRange = serde_json::from_str(
            r#"{"type":"custom","start_date":"2024-01-01","end_date":"2024-02-01"}"#,
        )
        .unwrap();
        assert_eq!(tr.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
    }
}
