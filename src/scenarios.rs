use crate::cash_flow::{CashFlowComposer, MetricsCalculator};
use crate::error::{ForecastError, Result};
use crate::schema::{FinancialForecast, ForecastPoint, Scenario, ScenarioSet};
use log::debug;

fn validate_multiplier(scenario: &Scenario, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ForecastError::InvalidMultiplier {
            scenario: scenario.name.clone(),
            value,
        });
    }
    Ok(())
}

/// Scales amounts only; `growth_rate` and `breakdown` are carried over from the base as-is.
fn scale(points: &[ForecastPoint], multiplier: f64) -> Vec<ForecastPoint> {
    points
        .iter()
        .map(|p| ForecastPoint {
            amount: p.amount * multiplier,
            ..p.clone()
        })
        .collect()
}

pub struct ScenarioAdjuster;

impl ScenarioAdjuster {
    /// Returns a new forecast; the base is never modified.
    pub fn apply(base: &FinancialForecast, scenario: &Scenario) -> Result<FinancialForecast> {
        validate_multiplier(scenario, scenario.revenue_multiplier)?;
        validate_multiplier(scenario, scenario.expense_multiplier)?;

        if scenario.is_identity() {
            return Ok(base.clone());
        }

        debug!(
            "Applying scenario '{}' (revenue x{}, expenses x{})",
            scenario.name, scenario.revenue_multiplier, scenario.expense_multiplier
        );

        let revenue_forecast = scale(&base.revenue_forecast, scenario.revenue_multiplier);
        let expense_forecast = scale(&base.expense_forecast, scenario.expense_multiplier);
        let cash_flow_forecast = CashFlowComposer::compose(&revenue_forecast, &expense_forecast)?;
        let metrics = MetricsCalculator::calculate(&revenue_forecast, &expense_forecast)?;

        Ok(FinancialForecast {
            revenue_forecast,
            expense_forecast,
            cash_flow_forecast,
            metrics,
        })
    }

    pub fn generate(base: &FinancialForecast) -> Result<ScenarioSet> {
        Ok(ScenarioSet {
            optimistic: Self::apply(base, &Scenario::optimistic())?,
            realistic: Self::apply(base, &Scenario::realistic())?,
            pessimistic: Self::apply(base, &Scenario::pessimistic())?,
        })
    }
}
