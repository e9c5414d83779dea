use crate::schema::FinancialForecast;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    AboveAverage,
    Average,
    BelowAverage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BenchmarkComparison {
    pub business_value: f64,
    pub benchmark_value: f64,
    pub difference: f64,
    pub performance: Performance,
}

/// Compares every metric present on both sides; the rest are skipped.
pub fn compare_with_benchmarks(
    metrics: &BTreeMap<String, f64>,
    benchmarks: &BTreeMap<String, f64>,
) -> BTreeMap<String, BenchmarkComparison> {
    metrics
        .iter()
        .filter_map(|(name, &business_value)| {
            let benchmark_value = *benchmarks.get(name)?;
            let performance = if business_value > benchmark_value {
                Performance::AboveAverage
            } else if business_value < benchmark_value {
                Performance::BelowAverage
            } else {
                Performance::Average
            };

            Some((
                name.clone(),
                BenchmarkComparison {
                    business_value,
                    benchmark_value,
                    difference: business_value - benchmark_value,
                    performance,
                },
            ))
        })
        .collect()
}

/// Forecast-derived figures keyed the way benchmark tables name them.
pub fn forecast_metric_map(forecast: &FinancialForecast) -> BTreeMap<String, f64> {
    let mut map = BTreeMap::new();
    map.insert(
        "profit_margin".to_string(),
        forecast.metrics.projected_profit_margin,
    );
    map.insert(
        "average_monthly_revenue".to_string(),
        forecast.metrics.average_monthly_revenue,
    );
    map.insert(
        "average_monthly_expenses".to_string(),
        forecast.metrics.average_monthly_expenses,
    );
    map.insert("revenue".to_string(), forecast.total_revenue());
    map.insert("expenses".to_string(), forecast.total_expenses());
    map
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    CashFlow,
    Margin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FinancialRisk {
    pub kind: RiskKind,
    pub severity: RiskSeverity,
    pub description: String,
    pub value: f64,
}

pub fn assess_financial_risks(forecast: &FinancialForecast) -> Vec<FinancialRisk> {
    let mut risks = Vec::new();

    let total_revenue = forecast.total_revenue();
    let total_expenses = forecast.total_expenses();
    if total_expenses > 0.0 {
        let cash_flow_ratio = total_revenue / total_expenses;
        if cash_flow_ratio < 1.0 {
            risks.push(FinancialRisk {
                kind: RiskKind::CashFlow,
                severity: RiskSeverity::High,
                description: "Projected expenses exceed projected revenue".to_string(),
                value: cash_flow_ratio,
            });
        }
    }

    let margin = forecast.metrics.projected_profit_margin;
    if margin < 0.0 {
        risks.push(FinancialRisk {
            kind: RiskKind::Margin,
            severity: RiskSeverity::Medium,
            description: "Projected profit margin is negative".to_string(),
            value: margin,
        });
    }

    risks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cash_flow::{CashFlowComposer, MetricsCalculator};
    use crate::schema::ForecastPoint;
    use crate::utils::MonthKey;

    fn forecast(revenue: &[f64], expenses: &[f64]) -> FinancialForecast {
        let start = MonthKey::new(2024, 1).unwrap();
        let to_points = |amounts: &[f64]| -> Vec<ForecastPoint> {
            amounts
                .iter()
                .enumerate()
                .map(|(i, &amount)| ForecastPoint {
                    period: start.add_months(i as u32),
                    amount,
                    growth_rate: 0.0,
                    breakdown: None,
                })
                .collect()
        };
        let revenue_forecast = to_points(revenue);
        let expense_forecast = to_points(expenses);
        FinancialForecast {
            cash_flow_forecast: CashFlowComposer::compose(&revenue_forecast, &expense_forecast)
                .unwrap(),
            metrics: MetricsCalculator::calculate(&revenue_forecast, &expense_forecast).unwrap(),
            revenue_forecast,
            expense_forecast,
        }
    }

    #[test]
    fn test_compare_with_benchmarks() {
        let metrics: BTreeMap<String, f64> = [
            ("profit_margin".to_string(), 0.2),
            ("revenue_growth".to_string(), 0.05),
            ("headcount".to_string(), 12.0),
        ]
        .into_iter()
        .collect();
        let benchmarks: BTreeMap<String, f64> = [
            ("profit_margin".to_string(), 0.15),
            ("revenue_growth".to_string(), 0.08),
            ("operating_margin".to_string(), 0.12),
        ]
        .into_iter()
        .collect();

        let comparison = compare_with_benchmarks(&metrics, &benchmarks);
        assert_eq!(comparison.len(), 2);
        assert_eq!(
            comparison["profit_margin"].performance,
            Performance::AboveAverage
        );
        assert!((comparison["profit_margin"].difference - 0.05).abs() < 1e-12);
        assert_eq!(
            comparison["revenue_growth"].performance,
            Performance::BelowAverage
        );
        assert!(!comparison.contains_key("headcount"));
    }

    #[test]
    fn test_equal_values_are_average() {
        let metrics: BTreeMap<String, f64> = [("x".to_string(), 1.0)].into_iter().collect();
        let comparison = compare_with_benchmarks(&metrics, &metrics);
        assert_eq!(comparison["x"].performance, Performance::Average);
        assert_eq!(comparison["x"].difference, 0.0);
    }

    #[test]
    fn test_risks_flag_loss_making_forecast() {
        let risks = assess_financial_risks(&forecast(&[100.0, 100.0], &[150.0, 150.0]));
        assert_eq!(risks.len(), 2);
        assert_eq!(risks[0].kind, RiskKind::CashFlow);
        assert_eq!(risks[0].severity, RiskSeverity::High);
        assert!((risks[0].value - 200.0 / 300.0).abs() < 1e-12);
        assert_eq!(risks[1].kind, RiskKind::Margin);
    }

    #[test]
    fn test_healthy_forecast_has_no_risks() {
        assert!(assess_financial_risks(&forecast(&[200.0], &[100.0])).is_empty());

        let map = forecast_metric_map(&forecast(&[200.0], &[100.0]));
        assert_eq!(map["revenue"], 200.0);
        assert!((map["profit_margin"] - 0.5).abs() < 1e-12);
    }
}
