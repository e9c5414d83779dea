use chrono::{Days, NaiveDate};
use financial_forecast_engine::*;

const LEDGER_CSV: &str = "\
business_id,record_type,amount,date
1,revenue,1000,2023-07-10
1,revenue,1100,2023-08-10
1,revenue,1050,2023-09-10
1,revenue,1200,2023-10-10
1,revenue,1250,2023-11-10
1,revenue,1300,2023-12-10
1,revenue,1280,2024-01-10
1,revenue,1350,2024-02-10
1,revenue,1400,2024-03-10
1,revenue,1380,2024-04-10
1,revenue,1450,2024-05-10
1,revenue,1500,2024-06-10
1,expense,700,2023-07-20
1,expense,720,2023-08-20
1,expense,710,2023-09-20
1,expense,760,2023-10-20
1,expense,780,2023-11-20
1,expense,800,2023-12-20
1,expense,790,2024-01-20
1,expense,820,2024-02-20
1,expense,840,2024-03-20
1,expense,830,2024-04-20
1,expense,860,2024-05-20
1,expense,880,2024-06-20
1,asset,50000,2024-06-30
1,revenue,9999,2022-01-10
";

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn load_ledger(csv_text: &str) -> anyhow::Result<Vec<LedgerEntry>> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let rows = reader
        .deserialize::<LedgerRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(convert_ledger_rows(&rows)?)
}

fn seeded_store() -> anyhow::Result<InMemoryLedgerStore> {
    let mut store = InMemoryLedgerStore::new();
    store.add_entries(load_ledger(LEDGER_CSV)?);
    Ok(store)
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_aggregation_from_csv_fixture() -> anyhow::Result<()> {
    let store = seeded_store()?;
    let history = aggregate_history(&store, 1, as_of())?;

    // The 2022 entry falls outside the trailing window and "asset" rows are skipped.
    assert_eq!(history.revenue.len(), 12);
    assert_eq!(history.expenses.len(), 12);
    assert_eq!(history.combined.len(), 12);

    let july: MonthKey = "2023-07".parse()?;
    assert!(is_close(history.revenue[&july], 1000.0));
    assert!(is_close(history.expenses[&july], 700.0));
    assert!(is_close(history.combined[&july], 300.0));
    Ok(())
}

#[test]
fn test_upward_trend_forecast_exceeds_history_and_breaks_even() -> anyhow::Result<()> {
    let store = seeded_store()?;
    let history = aggregate_history(&store, 1, as_of())?;
    let forecast = forecast_financials(&history, 12)?;

    let historical_total: f64 = history.revenue.values().sum();
    assert_eq!(forecast.horizon(), 12);
    assert!(
        forecast.total_revenue() > historical_total,
        "forecast total {} should exceed history {}",
        forecast.total_revenue(),
        historical_total
    );

    let projector = ExpenseProjector::fit(&history.expenses);
    assert!(projector.variable_ratio() < 1.0);
    assert!(forecast.metrics.breakeven_months.is_some());

    for (i, point) in forecast.cash_flow_forecast.iter().enumerate() {
        assert!(is_close(
            point.net_cash_flow,
            forecast.revenue_forecast[i].amount - forecast.expense_forecast[i].amount
        ));
    }
    Ok(())
}

#[test]
fn test_sparse_history_is_flat_at_mean() -> anyhow::Result<()> {
    let mut store = InMemoryLedgerStore::new();
    for (month, amount) in [(4u32, 300.0), (5, 600.0), (6, 900.0)] {
        store.add_entry(LedgerEntry {
            business_id: 2,
            kind: EntryKind::Revenue,
            amount,
            occurred_on: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
        });
    }

    let history = aggregate_history(&store, 2, as_of())?;
    let model = SeasonalModel::fit(&history.revenue);
    assert!(model.factors.iter().all(|&f| f == 1.0));
    assert_eq!(model.trend.slope, 0.0);

    let forecast = forecast_financials(&history, 6)?;
    assert!(forecast
        .revenue_forecast
        .iter()
        .all(|p| is_close(p.amount, 600.0)));
    Ok(())
}

#[test]
fn test_amounts_never_negative_on_collapsing_revenue() -> anyhow::Result<()> {
    let mut store = InMemoryLedgerStore::new();
    let start = NaiveDate::from_ymd_opt(2023, 7, 5).unwrap();
    for i in 0..12u32 {
        let month = MonthKey::from_date(start).add_months(i);
        store.add_entry(LedgerEntry {
            business_id: 3,
            kind: EntryKind::Revenue,
            amount: 5000.0 - 450.0 * i as f64,
            occurred_on: NaiveDate::from_ymd_opt(month.year(), month.month(), 5).unwrap(),
        });
    }

    let history = aggregate_history(&store, 3, as_of())?;
    let forecast = forecast_financials(&history, 24)?;
    assert!(forecast.revenue_forecast.iter().all(|p| p.amount >= 0.0));
    assert!(forecast.expense_forecast.iter().all(|p| p.amount >= 0.0));

    for pair in forecast.revenue_forecast.windows(2) {
        if pair[0].amount == 0.0 {
            assert_eq!(pair[1].growth_rate, 0.0);
        }
    }
    Ok(())
}

#[test]
fn test_scenarios_from_service() -> anyhow::Result<()> {
    let forecaster = FinancialForecaster::new(seeded_store()?, ForecastConfig::default())?;
    let base = forecaster.generate_financial_forecast(1, as_of())?;
    let scenarios = forecaster.generate_financial_scenarios(1, as_of())?;

    assert_eq!(scenarios.realistic, base);

    for (i, point) in scenarios.optimistic.cash_flow_forecast.iter().enumerate() {
        let revenue = base.revenue_forecast[i].amount * 1.2;
        let expenses = base.expense_forecast[i].amount * 0.9;
        assert!((point.net_cash_flow - (revenue - expenses)).abs() < 1e-6);
    }
    for (i, point) in scenarios.pessimistic.revenue_forecast.iter().enumerate() {
        assert!((point.amount - base.revenue_forecast[i].amount * 0.8).abs() < 1e-6);
        assert_eq!(point.growth_rate, base.revenue_forecast[i].growth_rate);
    }
    assert!(
        scenarios.optimistic.metrics.projected_profit_margin
            > scenarios.pessimistic.metrics.projected_profit_margin
    );
    Ok(())
}

#[test]
fn test_two_customer_segmentation() -> anyhow::Result<()> {
    let now = as_of();
    let ten_days_ago = now.checked_sub_days(Days::new(10)).unwrap();
    let one_day_ago = now.checked_sub_days(Days::new(1)).unwrap();

    let mut transactions = vec![CustomerTransaction {
        customer_id: "occasional".to_string(),
        amount: 50.0,
        date: ten_days_ago,
    }];
    for _ in 0..5 {
        transactions.push(CustomerTransaction {
            customer_id: "loyal".to_string(),
            amount: 200.0,
            date: one_day_ago,
        });
    }

    let report = segment_customers(&transactions, now, &SegmentationConfig::default())?;
    assert_eq!(report.k, 2);
    assert_eq!(report.customer_count, 2);
    assert_eq!(report.segments.len(), 2);
    assert!(report.segments.iter().all(|s| s.size == 1));

    let mut recencies: Vec<f64> = report.segments.iter().map(|s| s.avg_recency).collect();
    recencies.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(recencies, vec![0.0, 1.0]);
    Ok(())
}

#[test]
fn test_segmentation_cluster_cap_and_bounds() -> anyhow::Result<()> {
    let now = as_of();
    let mut transactions = Vec::new();
    for c in 0..12u64 {
        for j in 0..=(c % 4) {
            transactions.push(CustomerTransaction {
                customer_id: format!("cust-{:02}", c),
                amount: 25.0 * (c + 1) as f64,
                date: now.checked_sub_days(Days::new(c * 7 + j)).unwrap(),
            });
        }
    }

    let vectors = RfmFeatureBuilder::new(now).build(&transactions)?;
    assert_eq!(vectors.len(), 12);
    assert!(vectors
        .iter()
        .flat_map(|v| v.features())
        .all(|f| (0.0..=1.0).contains(&f)));

    let report = segment_customers(&transactions, now, &SegmentationConfig::default())?;
    assert_eq!(report.k, 5);
    assert!(report.segments.len() <= 5);
    assert_eq!(report.segments.iter().map(|s| s.size).sum::<usize>(), 12);
    for (i, segment) in report.segments.iter().enumerate() {
        assert_eq!(segment.segment_id, i);
    }
    Ok(())
}

#[test]
fn test_business_segmentation_and_summary_through_store() -> anyhow::Result<()> {
    let mut store = seeded_store()?;
    let forecaster_empty = FinancialForecaster::new(store.clone(), ForecastConfig::default())?;
    let err = forecaster_empty
        .segment_business_customers(1, as_of())
        .unwrap_err();
    assert!(err.is_insufficient_data());

    store.add_transaction(
        1,
        CustomerTransaction {
            customer_id: "only".to_string(),
            amount: 10.0,
            date: as_of(),
        },
    );
    let forecaster = FinancialForecaster::new(store, ForecastConfig::default())?;
    let report = forecaster.segment_business_customers(1, as_of())?;
    assert_eq!(report.k, 1);
    assert_eq!(report.segments[0].size, 1);
    assert_eq!(report.segments[0].avg_monetary, 0.0);

    let summary = forecaster.revenue_summary(1, as_of())?;
    assert_eq!(summary.transaction_count, 12);
    assert!(is_close(summary.total_revenue, 15260.0));
    Ok(())
}

#[test]
fn test_benchmarks_and_risks_on_forecast() -> anyhow::Result<()> {
    let store = seeded_store()?;
    let history = aggregate_history(&store, 1, as_of())?;
    let forecast = forecast_financials(&history, 12)?;

    assert!(assess_financial_risks(&forecast).is_empty());

    let benchmarks: std::collections::BTreeMap<String, f64> =
        [("profit_margin".to_string(), 0.99)].into_iter().collect();
    let comparison = compare_with_benchmarks(&forecast_metric_map(&forecast), &benchmarks);
    assert_eq!(comparison.len(), 1);
    assert_eq!(
        comparison["profit_margin"].performance,
        Performance::BelowAverage
    );
    Ok(())
}

#[test]
fn test_forecast_serializes_with_documented_fields() -> anyhow::Result<()> {
    let store = seeded_store()?;
    let history = aggregate_history(&store, 1, as_of())?;
    let forecast = forecast_financials(&history, 2)?;

    let json = serde_json::to_value(&forecast)?;
    assert_eq!(json["revenue_forecast"][0]["period"], "2024-07");
    assert!(json["expense_forecast"][0]["breakdown"]["fixed"].is_number());
    assert!(json["revenue_forecast"][0].get("breakdown").is_none());
    assert!(json["metrics"]["projected_profit_margin"].is_number());

    let back: FinancialForecast = serde_json::from_value(json)?;
    assert_eq!(back.horizon(), forecast.horizon());
    assert_eq!(back.revenue_forecast[1].period, forecast.revenue_forecast[1].period);
    Ok(())
}
