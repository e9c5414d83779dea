use crate::forecaster::growth_rate;
use crate::schema::{ExpenseBreakdown, Forecast, ForecastPoint, MonthlySeries};
use crate::utils::mean;
use log::debug;

/// Splits historical expenses into a fixed baseline plus a share that varies
/// with revenue, then projects expenses off a revenue forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseProjector {
    fixed_baseline: f64,
    variable_ratio: f64,
    last_value: f64,
}

impl ExpenseProjector {
    pub fn fit(expenses: &MonthlySeries) -> Self {
        let values: Vec<f64> = expenses.values().copied().collect();

        // The cheapest month is taken as the fixed cost floor.
        let fixed_baseline = values.iter().copied().reduce(f64::min).unwrap_or(0.0);

        let variable_shares: Vec<f64> = values
            .iter()
            .filter(|&&v| v > fixed_baseline)
            .map(|&v| (v - fixed_baseline) / v)
            .collect();
        let variable_ratio = mean(&variable_shares);

        debug!(
            "Expense baseline={:.2}, variable ratio={:.4} from {} months",
            fixed_baseline,
            variable_ratio,
            values.len()
        );

        Self {
            fixed_baseline,
            variable_ratio,
            last_value: values.last().copied().unwrap_or(0.0),
        }
    }

    pub fn fixed_baseline(&self) -> f64 {
        self.fixed_baseline
    }

    pub fn variable_ratio(&self) -> f64 {
        self.variable_ratio
    }

    /// One expense point per revenue point, sharing its period.
    pub fn project(&self, revenue_forecast: &[ForecastPoint]) -> Forecast {
        let mut previous = self.last_value;

        revenue_forecast
            .iter()
            .map(|revenue| {
                let variable = revenue.amount * self.variable_ratio;
                let amount = (self.fixed_baseline + variable).max(0.0);
                let point = ForecastPoint {
                    period: revenue.period,
                    amount,
                    growth_rate: growth_rate(previous, amount),
                    breakdown: Some(ExpenseBreakdown {
                        fixed: self.fixed_baseline,
                        variable,
                    }),
                };
                previous = amount;
                point
            })
            .collect()
    }
}
