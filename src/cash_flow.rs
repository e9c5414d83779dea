use crate::error::{ForecastError, Result};
use crate::schema::{CashFlowPoint, ForecastPoint, Metrics};

fn ensure_same_horizon(revenue: &[ForecastPoint], expenses: &[ForecastPoint]) -> Result<()> {
    if revenue.len() != expenses.len() {
        return Err(ForecastError::LengthMismatch {
            revenue: revenue.len(),
            expenses: expenses.len(),
        });
    }
    Ok(())
}

pub struct CashFlowComposer;

impl CashFlowComposer {
    pub fn compose(
        revenue: &[ForecastPoint],
        expenses: &[ForecastPoint],
    ) -> Result<Vec<CashFlowPoint>> {
        ensure_same_horizon(revenue, expenses)?;

        Ok(revenue
            .iter()
            .zip(expenses)
            .map(|(r, e)| CashFlowPoint {
                period: r.period,
                net_cash_flow: r.amount - e.amount,
                revenue: r.amount,
                expenses: e.amount,
            })
            .collect())
    }
}

pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn calculate(revenue: &[ForecastPoint], expenses: &[ForecastPoint]) -> Result<Metrics> {
        ensure_same_horizon(revenue, expenses)?;

        let total_revenue: f64 = revenue.iter().map(|p| p.amount).sum();
        let total_expenses: f64 = expenses.iter().map(|p| p.amount).sum();
        let periods = revenue.len();

        let projected_profit_margin = if total_revenue > 0.0 {
            (total_revenue - total_expenses) / total_revenue
        } else {
            0.0
        };

        let (average_monthly_revenue, average_monthly_expenses) = if periods == 0 {
            (0.0, 0.0)
        } else {
            (
                total_revenue / periods as f64,
                total_expenses / periods as f64,
            )
        };

        let breakeven_months = revenue
            .iter()
            .zip(expenses)
            .position(|(r, e)| r.amount > e.amount);

        Ok(Metrics {
            projected_profit_margin,
            average_monthly_revenue,
            average_monthly_expenses,
            breakeven_months,
        })
    }
}
