use crate::error::{ForecastError, Result};
use crate::utils::MonthKey;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub type BusinessId = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[schemars(description = "Money received from customers")]
    Revenue,

    #[schemars(description = "Money spent by the business; stored as a non-negative magnitude")]
    Expense,
}

impl FromStr for EntryKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revenue" => Ok(EntryKind::Revenue),
            "expense" | "expenses" => Ok(EntryKind::Expense),
            other => Err(ForecastError::InvalidEntryKind(other.to_string())),
        }
    }
}

/// A single ledger fact read from the storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct LedgerEntry {
    pub business_id: BusinessId,
    pub kind: EntryKind,
    pub amount: f64,
    pub occurred_on: NaiveDate,
}

/// Net value per calendar month. Keys are unique and iterate chronologically.
pub type MonthlySeries = BTreeMap<MonthKey, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct HistoricalSeries {
    pub business_id: BusinessId,

    #[schemars(
        description = "Reference date; the first forecast period is the month after this date"
    )]
    pub as_of: NaiveDate,

    #[schemars(description = "Monthly revenue totals")]
    pub revenue: MonthlySeries,

    #[schemars(description = "Monthly expense totals as positive magnitudes")]
    pub expenses: MonthlySeries,

    #[schemars(description = "Monthly revenue minus expenses")]
    pub combined: MonthlySeries,
}

impl HistoricalSeries {
    pub fn empty(business_id: BusinessId, as_of: NaiveDate) -> Self {
        Self {
            business_id,
            as_of,
            revenue: BTreeMap::new(),
            expenses: BTreeMap::new(),
            combined: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.revenue.is_empty() && self.expenses.is_empty() && self.combined.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ExpenseBreakdown {
    pub fixed: f64,
    pub variable: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ForecastPoint {
    pub period: MonthKey,

    #[schemars(description = "Projected amount, clamped to be non-negative")]
    pub amount: f64,

    #[schemars(
        description = "Relative change against the previous value; 0 when the previous value is 0"
    )]
    pub growth_rate: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ExpenseBreakdown>,
}

/// Consecutive forecast periods in chronological order.
pub type Forecast = Vec<ForecastPoint>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CashFlowPoint {
    pub period: MonthKey,
    pub net_cash_flow: f64,
    pub revenue: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Metrics {
    pub projected_profit_margin: f64,
    pub average_monthly_revenue: f64,
    pub average_monthly_expenses: f64,

    #[schemars(description = "First forecast index where revenue strictly exceeds expenses")]
    pub breakeven_months: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FinancialForecast {
    pub revenue_forecast: Forecast,
    pub expense_forecast: Forecast,
    pub cash_flow_forecast: Vec<CashFlowPoint>,
    pub metrics: Metrics,
}

impl FinancialForecast {
    pub fn horizon(&self) -> usize {
        self.revenue_forecast.len()
    }

    pub fn total_revenue(&self) -> f64 {
        self.revenue_forecast.iter().map(|p| p.amount).sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.expense_forecast.iter().map(|p| p.amount).sum()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FinancialForecast)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// A named multiplicative stress test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Scenario {
    pub name: String,
    pub revenue_multiplier: f64,
    pub expense_multiplier: f64,
}

impl Scenario {
    pub fn new(name: impl Into<String>, revenue_multiplier: f64, expense_multiplier: f64) -> Self {
        Self {
            name: name.into(),
            revenue_multiplier,
            expense_multiplier,
        }
    }

    pub fn optimistic() -> Self {
        Self::new("optimistic", 1.2, 0.9)
    }

    pub fn realistic() -> Self {
        Self::new("realistic", 1.0, 1.0)
    }

    pub fn pessimistic() -> Self {
        Self::new("pessimistic", 0.8, 1.1)
    }

    pub fn is_identity(&self) -> bool {
        self.revenue_multiplier == 1.0 && self.expense_multiplier == 1.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ScenarioSet {
    pub optimistic: FinancialForecast,
    pub realistic: FinancialForecast,
    pub pessimistic: FinancialForecast,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CustomerTransaction {
    pub customer_id: String,
    pub amount: f64,
    pub date: NaiveDate,
}

/// Min-max normalized recency/frequency/monetary features, each in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct RfmVector {
    pub customer_id: String,
    pub recency: f64,
    pub frequency: f64,
    pub monetary: f64,
}

impl RfmVector {
    pub fn features(&self) -> [f64; 3] {
        [self.recency, self.frequency, self.monetary]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Segment {
    pub segment_id: usize,
    pub size: usize,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SegmentationReport {
    pub segments: Vec<Segment>,

    #[schemars(description = "Requested cluster count: min(max_segments, customer_count)")]
    pub k: usize,

    pub customer_count: usize,

    #[schemars(description = "Within-cluster sum of squared distances to each segment mean")]
    pub inertia: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct RevenueSummary {
    pub total_revenue: f64,
    pub average_transaction: f64,
    pub transaction_count: usize,
}
