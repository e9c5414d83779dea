use chrono::{Days, NaiveDate};
use financial_forecast_engine::{
    assess_financial_risks, CustomerTransaction, EntryKind, FinancialForecaster, ForecastConfig,
    InMemoryLedgerStore, LedgerEntry, MonthKey,
};
use std::error::Error;

const BUSINESS_ID: u64 = 1;

fn seed_store(as_of: NaiveDate) -> Result<InMemoryLedgerStore, Box<dyn Error>> {
    let mut store = InMemoryLedgerStore::new();
    let start = MonthKey::new(2023, 7)?;

    // Revenue with a gentle upward trend and a December bump.
    for i in 0..12u32 {
        let month = start.add_months(i);
        let seasonal = if month.month() == 12 { 1.25 } else { 1.0 };
        let Some(day) = NaiveDate::from_ymd_opt(month.year(), month.month(), 15) else {
            continue;
        };
        store.add_entry(LedgerEntry {
            business_id: BUSINESS_ID,
            kind: EntryKind::Revenue,
            amount: (8_000.0 + 250.0 * i as f64) * seasonal,
            occurred_on: day,
        });
        store.add_entry(LedgerEntry {
            business_id: BUSINESS_ID,
            kind: EntryKind::Expense,
            amount: 5_500.0 + 90.0 * i as f64,
            occurred_on: day,
        });
    }

    for c in 0..8u64 {
        for j in 0..(c % 3 + 1) {
            let Some(date) = as_of.checked_sub_days(Days::new(c * 11 + j * 3)) else {
                continue;
            };
            store.add_transaction(
                BUSINESS_ID,
                CustomerTransaction {
                    customer_id: format!("customer-{}", c),
                    amount: 40.0 * (c + 1) as f64,
                    date,
                },
            );
        }
    }

    Ok(store)
}

fn main() -> Result<(), Box<dyn Error>> {
    let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).ok_or("invalid as-of date")?;

    println!("📈 Financial Forecast Report");
    println!("═══════════════════════════════════════════════════════════════\n");

    let forecaster = FinancialForecaster::new(seed_store(as_of)?, ForecastConfig::default())?;

    let forecast = forecaster.generate_financial_forecast(BUSINESS_ID, as_of)?;
    println!("   Period    Revenue      Expenses     Net");
    for (i, point) in forecast.cash_flow_forecast.iter().enumerate() {
        println!(
            "   {}   {:>10.2}   {:>10.2}   {:>10.2}",
            point.period,
            forecast.revenue_forecast[i].amount,
            forecast.expense_forecast[i].amount,
            point.net_cash_flow
        );
    }
    println!();
    println!(
        "   Profit margin: {:.2}%",
        forecast.metrics.projected_profit_margin * 100.0
    );
    match forecast.metrics.breakeven_months {
        Some(month) => println!("   Breakeven at month {}", month),
        None => println!("   No breakeven within the horizon"),
    }

    let risks = assess_financial_risks(&forecast);
    if risks.is_empty() {
        println!("   ✅ No financial risks flagged");
    } else {
        for risk in &risks {
            println!("   ⚠️  {:?}: {}", risk.severity, risk.description);
        }
    }
    println!();

    println!("🔀 Scenarios");
    let scenarios = forecaster.generate_financial_scenarios(BUSINESS_ID, as_of)?;
    for (name, scenario) in [
        ("optimistic", &scenarios.optimistic),
        ("realistic", &scenarios.realistic),
        ("pessimistic", &scenarios.pessimistic),
    ] {
        println!(
            "   {:<12} revenue {:>12.2}  margin {:>6.2}%",
            name,
            scenario.total_revenue(),
            scenario.metrics.projected_profit_margin * 100.0
        );
    }
    println!();

    println!("👥 Customer Segments");
    let report = forecaster.segment_business_customers(BUSINESS_ID, as_of)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
