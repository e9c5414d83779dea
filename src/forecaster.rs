use crate::error::{ForecastError, Result};
use crate::schema::{Forecast, ForecastPoint, MonthlySeries};
use crate::seasonality::SeasonalModel;
use crate::utils::MonthKey;
use log::debug;

/// `(current - previous) / previous`, or 0 when `previous` is 0.
pub fn growth_rate(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous
}

/// Projects a monthly series forward using a linear trend scaled by
/// calendar-month seasonal factors.
pub struct SeasonalTrendForecaster {
    model: SeasonalModel,
    history_len: usize,
    last_value: f64,
}

impl SeasonalTrendForecaster {
    pub fn fit(series: &MonthlySeries) -> Self {
        let model = SeasonalModel::fit(series);

        if model.sparse {
            debug!(
                "Only {} months of history; using flat trend at {:.2} with no seasonality",
                series.len(),
                model.trend.intercept
            );
        } else {
            debug!(
                "Fitted trend slope={:.4} intercept={:.4} over {} months",
                model.trend.slope,
                model.trend.intercept,
                series.len()
            );
        }

        Self {
            model,
            history_len: series.len(),
            last_value: series.values().next_back().copied().unwrap_or(0.0),
        }
    }

    pub fn model(&self) -> &SeasonalModel {
        &self.model
    }

    /// Projects `horizon` consecutive months starting at `first_period`.
    pub fn project(&self, first_period: MonthKey, horizon: usize) -> Result<Forecast> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon(horizon));
        }

        let mut forecast = Vec::with_capacity(horizon);
        let mut previous = self.last_value;

        for i in 0..horizon {
            let period = first_period.add_months(i as u32);
            let trend_value = self.model.trend.value_at((self.history_len + i) as f64);
            let amount = (trend_value * self.model.factor_for(period)).max(0.0);

            forecast.push(ForecastPoint {
                period,
                amount,
                growth_rate: growth_rate(previous, amount),
                breakdown: None,
            });
            previous = amount;
        }

        Ok(forecast)
    }
}
