//! # Financial Forecast Engine
//!
//! Turns sparse historical ledger entries into trend and seasonality aware
//! revenue/expense projections, derived cash flow and profitability metrics,
//! multiplicative stress-test scenarios, and RFM-based customer segments.
//!
//! ## Core Concepts
//!
//! - **Monthly Series**: ledger entries bucketed by calendar month (revenue, expenses, combined)
//! - **Seasonal Trend**: a least-squares line scaled by per-calendar-month factors; fewer than
//!   12 months of history falls back to a flat mean with no seasonality
//! - **Expense Coupling**: expenses are a fixed baseline plus a share of projected revenue
//! - **Scenarios**: optimistic `(1.2, 0.9)`, realistic `(1.0, 1.0)` and pessimistic `(0.8, 1.1)`
//!   revenue/expense multipliers with cash flow and metrics recomputed
//! - **Segments**: k-means over min-max normalized recency/frequency/monetary features
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_forecast_engine::*;
//! use chrono::NaiveDate;
//!
//! let mut store = InMemoryLedgerStore::new();
//! store.add_entry(LedgerEntry {
//!     business_id: 1,
//!     kind: EntryKind::Revenue,
//!     amount: 1_000.0,
//!     occurred_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//! });
//!
//! let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
//! let history = aggregate_history(&store, 1, as_of).unwrap();
//! let forecast = forecast_financials(&history, 12).unwrap();
//! let scenarios = generate_scenarios(&forecast).unwrap();
//! ```

pub mod aggregation;
pub mod benchmarks;
pub mod cash_flow;
pub mod config;
pub mod error;
pub mod expenses;
pub mod forecaster;
pub mod ingestion;
pub mod rfm;
pub mod scenarios;
pub mod schema;
pub mod seasonality;
pub mod segmentation;
pub mod store;
pub mod utils;

pub use aggregation::{summarize_revenue, HistoricalAggregator};
pub use benchmarks::{
    assess_financial_risks, compare_with_benchmarks, forecast_metric_map, BenchmarkComparison,
    FinancialRisk, Performance, RiskKind, RiskSeverity,
};
pub use cash_flow::{CashFlowComposer, MetricsCalculator};
pub use config::{ForecastConfig, SegmentationConfig};
pub use error::{ForecastError, Result};
pub use expenses::ExpenseProjector;
pub use forecaster::{growth_rate, SeasonalTrendForecaster};
pub use ingestion::*;
pub use rfm::{min_max_normalize, CustomerRfm, RfmFeatureBuilder};
pub use scenarios::ScenarioAdjuster;
pub use schema::*;
pub use seasonality::{seasonal_factors, SeasonalModel, TrendLine, MIN_SEASONAL_HISTORY};
pub use segmentation::SegmentationEngine;
pub use store::{InMemoryLedgerStore, LedgerStore};
pub use utils::MonthKey;

use chrono::NaiveDate;
use log::{debug, info};

/// Service-layer entry point bound to a storage collaborator and a configuration.
pub struct FinancialForecaster<S: LedgerStore> {
    store: S,
    config: ForecastConfig,
}

impl<S: LedgerStore> FinancialForecaster<S> {
    pub fn new(store: S, config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn aggregate_history(
        &self,
        business_id: BusinessId,
        as_of: NaiveDate,
    ) -> Result<HistoricalSeries> {
        let entries = self.load_entries(business_id, as_of)?;
        HistoricalAggregator::new(self.config.lookback_days).aggregate(business_id, as_of, &entries)
    }

    pub fn generate_financial_forecast(
        &self,
        business_id: BusinessId,
        as_of: NaiveDate,
    ) -> Result<FinancialForecast> {
        info!(
            "Generating {}-month forecast for business {} as of {}",
            self.config.horizon_months, business_id, as_of
        );
        let history = self.aggregate_history(business_id, as_of)?;
        forecast_financials(&history, self.config.horizon_months)
    }

    pub fn generate_financial_scenarios(
        &self,
        business_id: BusinessId,
        as_of: NaiveDate,
    ) -> Result<ScenarioSet> {
        let base = self.generate_financial_forecast(business_id, as_of)?;
        generate_scenarios(&base)
    }

    pub fn segment_business_customers(
        &self,
        business_id: BusinessId,
        as_of: NaiveDate,
    ) -> Result<SegmentationReport> {
        self.ensure_business(business_id)?;
        let transactions = self.store.customer_transactions(business_id)?;
        segment_customers(&transactions, as_of, &self.config.segmentation)
    }

    pub fn revenue_summary(
        &self,
        business_id: BusinessId,
        as_of: NaiveDate,
    ) -> Result<RevenueSummary> {
        let entries = self.load_entries(business_id, as_of)?;
        Ok(summarize_revenue(&entries))
    }

    fn ensure_business(&self, business_id: BusinessId) -> Result<()> {
        if !self.store.business_exists(business_id)? {
            return Err(ForecastError::NotFound(format!(
                "business {} does not exist",
                business_id
            )));
        }
        Ok(())
    }

    fn load_entries(&self, business_id: BusinessId, as_of: NaiveDate) -> Result<Vec<LedgerEntry>> {
        self.ensure_business(business_id)?;
        let (start, end) = HistoricalAggregator::new(self.config.lookback_days).window(as_of)?;
        self.store.entries_between(business_id, start, end)
    }
}

/// Reads the trailing 365-day window for `business_id` and buckets it by month.
pub fn aggregate_history<S: LedgerStore + ?Sized>(
    store: &S,
    business_id: BusinessId,
    as_of: NaiveDate,
) -> Result<HistoricalSeries> {
    if !store.business_exists(business_id)? {
        return Err(ForecastError::NotFound(format!(
            "business {} does not exist",
            business_id
        )));
    }

    let aggregator = HistoricalAggregator::default();
    let (start, end) = aggregator.window(as_of)?;
    let entries = store.entries_between(business_id, start, end)?;
    aggregator.aggregate(business_id, as_of, &entries)
}

/// Projects revenue, couples expenses to it, then derives cash flow and metrics.
/// The first forecast period is the month after `historical.as_of`.
pub fn forecast_financials(
    historical: &HistoricalSeries,
    horizon_months: usize,
) -> Result<FinancialForecast> {
    if horizon_months == 0 {
        return Err(ForecastError::InvalidHorizon(horizon_months));
    }

    let first_period = MonthKey::from_date(historical.as_of).next();

    let revenue_forecast = SeasonalTrendForecaster::fit(&historical.revenue)
        .project(first_period, horizon_months)?;
    let expense_forecast = ExpenseProjector::fit(&historical.expenses).project(&revenue_forecast);
    let cash_flow_forecast = CashFlowComposer::compose(&revenue_forecast, &expense_forecast)?;
    let metrics = MetricsCalculator::calculate(&revenue_forecast, &expense_forecast)?;

    debug!(
        "Business {}: margin={:.4}, breakeven={:?}",
        historical.business_id, metrics.projected_profit_margin, metrics.breakeven_months
    );

    Ok(FinancialForecast {
        revenue_forecast,
        expense_forecast,
        cash_flow_forecast,
        metrics,
    })
}

pub fn generate_scenarios(base_forecast: &FinancialForecast) -> Result<ScenarioSet> {
    ScenarioAdjuster::generate(base_forecast)
}

/// Returns [`ForecastError::InsufficientData`] when `transactions` is empty.
pub fn segment_customers(
    transactions: &[CustomerTransaction],
    as_of: NaiveDate,
    config: &SegmentationConfig,
) -> Result<SegmentationReport> {
    info!("Segmenting {} customer transactions", transactions.len());
    let vectors = RfmFeatureBuilder::new(as_of).build(transactions)?;
    SegmentationEngine::new(config.clone()).segment(&vectors)
}
