use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineOverviewReport {
    pub provider: String,
    pub organization: String,
    pub projects: Vec<String>,
    pub collected_at: DateTime<Utc>,
    pub show_as_percentage: bool,
    pub total_pipelines: usize,
    pub pipelines: Vec<PipelineOverview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRef {
    pub id: u64,
    pub name: String,
    pub url: Option<String>,
}

/// Per-pipeline statistics over finished runs.
///
/// `succeeded`, `failed` and `canceled` hold either raw counts or percentages
/// of `runs`, depending on how the overview was collected. `runs` is always a
/// raw count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub runs: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub canceled: usize,
    pub avg_duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOverview {
    pub project: String,
    pub pipeline: PipelineRef,
    pub stats: PipelineStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BusinessValueReport {
    pub organization: String,
    pub project: String,
    pub work_item_type: String,
    pub period: Period,
    pub period_start: DateTime<Utc>,
    pub currency: Currency,
    pub target_value: Option<f64>,
    pub work_items_counted: usize,
    pub total_business_value: f64,
    pub collected_at: DateTime<Utc>,
}

impl BusinessValueReport {
    /// A missing target always counts as met; otherwise the total must exceed it.
    pub fn meets_target(&self) -> bool {
        self.target_value
            .map_or(true, |target| self.total_business_value > target)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Year,
    Month,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Brl,
    Eur,
    Gbp,
    Cad,
    Aud,
    Jpy,
    Cny,
    Inr,
    Mxn,
    Nzd,
    Sgd,
    Zar,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Brl => "BRL",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
            Self::Jpy => "JPY",
            Self::Cny => "CNY",
            Self::Inr => "INR",
            Self::Mxn => "MXN",
            Self::Nzd => "NZD",
            Self::Sgd => "SGD",
            Self::Zar => "ZAR",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Brl => "R$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Cad => "CA$",
            Self::Aud => "A$",
            Self::Jpy => "¥",
            Self::Cny => "CN¥",
            Self::Inr => "₹",
            Self::Mxn => "MX$",
            Self::Nzd => "NZ$",
            Self::Sgd => "SGD ",
            Self::Zar => "ZAR ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(total: f64, target: Option<f64>) -> BusinessValueReport {
        BusinessValueReport {
            organization: "org".to_string(),
            project: "proj".to_string(),
            work_item_type: "Epic".to_string(),
            period: Period::Year,
            period_start: Utc::now(),
            currency: Currency::Usd,
            target_value: target,
            work_items_counted: 0,
            total_business_value: total,
            collected_at: Utc::now(),
        }
    }

    #[test]
    fn meets_target_without_target() {
        assert!(report(0.0, None).meets_target());
    }

    #[test]
    fn meets_target_is_strict() {
        assert!(!report(100.0, Some(100.0)).meets_target());
        assert!(report(100.5, Some(100.0)).meets_target());
        assert!(!report(10.0, Some(100.0)).meets_target());
    }

    #[test]
    fn currency_serializes_as_iso_code() {
        let json = serde_json::to_string(&Currency::Gbp).unwrap();
        assert_eq!(json, "\"GBP\"");
        let parsed: Currency = serde_json::from_str("\"JPY\"").unwrap();
        assert_eq!(parsed, Currency::Jpy);
        assert_eq!(parsed.code(), "JPY");
    }

    #[test]
    fn period_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Period::Month).unwrap(), "\"month\"");
    }
}
