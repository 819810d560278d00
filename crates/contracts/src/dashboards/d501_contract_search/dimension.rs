use serde::{Deserialize, Serialize};

/// Grouping axis for aggregated analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[default]
    ByContractor,
    ByOrganization,
    ByArea,
    ByCategory,
}

impl Dimension {
    pub fn all() -> [Dimension; 4] {
        [
            Dimension::ByContractor,
            Dimension::ByOrganization,
            Dimension::ByArea,
            Dimension::ByCategory,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::ByContractor => "by_contractor",
            Dimension::ByOrganization => "by_organization",
            Dimension::ByArea => "by_area",
            Dimension::ByCategory => "by_category",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|d| d.as_str() == s)
    }

    /// Used in export filenames: `by_contractor` → `contractor`
    pub fn short_name(&self) -> &'static str {
        &self.as_str()[3..]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::ByContractor => "Contractor",
            Dimension::ByOrganization => "Organization",
            Dimension::ByArea => "Area",
            Dimension::ByCategory => "Business Category",
        }
    }
}
