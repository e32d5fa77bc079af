use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Canonical field set handed over by a county adapter after its own key
/// mapping. Values stay as raw strings because each auditor site formats
/// dates and currency differently; the record builder owns the parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPropertyFields {
    pub parcel_id: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub county: String,
    pub owner_name: String,
    pub owner_mailing_address: String,
    pub purchase_date: Option<String>,
    pub purchase_price: Option<String>,
    pub assessed_value: Option<String>,
    pub beds: Option<String>,
    pub baths: Option<String>,
    pub sqft: Option<String>,
    pub year_built: Option<String>,
    pub property_class: Option<String>,
}

/// Outreach priority bucket derived from the propensity score plus the
/// configured eligibility floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityTier {
    #[serde(rename = "HOT")]
    Hot,
    #[serde(rename = "WARM")]
    Warm,
    #[serde(rename = "COLD")]
    Cold,
}

impl PriorityTier {
    pub const fn label(self) -> &'static str {
        match self {
            PriorityTier::Hot => "HOT",
            PriorityTier::Warm => "WARM",
            PriorityTier::Cold => "COLD",
        }
    }
}

/// The master-store schema for a single parcel. Derived fields are filled by
/// the record builder; scores stay `None` until the engine runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub parcel_id: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub county: String,
    pub neighborhood: String,
    pub owner_name: String,
    pub owner_mailing_address: String,
    pub is_owner_occupied: bool,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: f64,
    pub years_owned: f64,
    pub assessed_value: f64,
    pub estimated_market_value: f64,
    pub estimated_equity: f64,
    pub equity_gain_pct: f64,
    pub beds: Option<i64>,
    pub baths: Option<f64>,
    pub sqft: Option<i64>,
    pub year_built: Option<i32>,
    pub property_class: String,
    pub propensity_score: Option<u8>,
    pub td_fit_score: Option<u8>,
    pub priority_tier: Option<PriorityTier>,
    pub last_updated: DateTime<Utc>,
}

/// Per-ZIP rollup. Recomputed wholesale every run and fully replaced in the
/// store so published stats never mix runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodStats {
    pub zip: String,
    pub total_properties: usize,
    pub avg_years_owned: f64,
    pub avg_equity: f64,
    pub avg_propensity_score: f64,
    pub hot_lead_count: usize,
    pub warm_lead_count: usize,
    pub turnover_rate_12mo: f64,
    pub last_updated: DateTime<Utc>,
}

/// Overall outcome reported for a scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
    Error,
}

impl RunStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
            RunStatus::Error => "error",
        }
    }
}

/// Summary emitted at the end of every run for the run log and operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub records_processed: usize,
    pub hot_leads: usize,
    pub warm_leads: usize,
    pub neighborhoods: usize,
    pub duration_seconds: f64,
    pub errors: Vec<String>,
}

impl RunSummary {
    /// Bounded error digest for the run log; individual record failures can
    /// number in the hundreds on a bad source day.
    pub fn error_digest(&self) -> String {
        self.errors
            .iter()
            .take(5)
            .cloned()
            .collect::<Vec<_>>()
            .join("; ")
    }
}
