use crate::schema::MonthlySeries;
use crate::utils::{mean, MonthKey};
use serde::{Deserialize, Serialize};

/// Minimum number of historical months before a trend and seasonality are fitted.
pub const MIN_SEASONAL_HISTORY: usize = 12;

const UNIT_FACTORS: [f64; 12] = [1.0; 12];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn flat(level: f64) -> Self {
        Self {
            slope: 0.0,
            intercept: level,
        }
    }

    /// Ordinary least-squares line through `(i, values[i])`.
    pub fn fit(values: &[f64]) -> Self {
        let n = values.len();
        if n < 2 {
            return Self::flat(mean(values));
        }

        let x_mean = (n - 1) as f64 / 2.0;
        let y_mean = mean(values);

        let mut covariance = 0.0;
        let mut variance = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            covariance += dx * (y - y_mean);
            variance += dx * dx;
        }

        let slope = covariance / variance;
        Self {
            slope,
            intercept: y_mean - slope * x_mean,
        }
    }

    pub fn value_at(&self, index: f64) -> f64 {
        self.slope * index + self.intercept
    }
}

/// Average value per calendar month divided by the mean of those averages.
/// Calendar months with no history keep a factor of 1.0.
pub fn seasonal_factors(series: &MonthlySeries) -> [f64; 12] {
    let mut sums = [0.0; 12];
    let mut counts = [0usize; 12];

    for (month, value) in series {
        sums[month.month0()] += value;
        counts[month.month0()] += 1;
    }

    let month_averages: Vec<(usize, f64)> = (0..12)
        .filter(|&m| counts[m] > 0)
        .map(|m| (m, sums[m] / counts[m] as f64))
        .collect();

    let averages: Vec<f64> = month_averages.iter().map(|(_, avg)| *avg).collect();
    let overall = mean(&averages);
    if overall == 0.0 {
        return UNIT_FACTORS;
    }

    let mut factors = UNIT_FACTORS;
    for (m, avg) in month_averages {
        factors[m] = avg / overall;
    }
    factors
}

/// Trend plus per-calendar-month multipliers fitted to a monthly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalModel {
    pub trend: TrendLine,
    pub factors: [f64; 12],
    /// True when the series was too short and the flat/unit fallback was used.
    pub sparse: bool,
}

impl SeasonalModel {
    pub fn fit(series: &MonthlySeries) -> Self {
        let values: Vec<f64> = series.values().copied().collect();

        if values.len() < MIN_SEASONAL_HISTORY {
            return Self {
                trend: TrendLine::flat(mean(&values)),
                factors: UNIT_FACTORS,
                sparse: true,
            };
        }

        Self {
            trend: TrendLine::fit(&values),
            factors: seasonal_factors(series),
            sparse: false,
        }
    }

    pub fn factor_for(&self, month: MonthKey) -> f64 {
        self.factors[month.month0()]
    }
}
