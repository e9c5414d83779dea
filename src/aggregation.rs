use crate::config::DEFAULT_LOOKBACK_DAYS;
use crate::error::Result;
use crate::ingestion::validate_amount;
use crate::schema::{BusinessId, EntryKind, HistoricalSeries, LedgerEntry, RevenueSummary};
use crate::utils::{trailing_window, MonthKey};
use chrono::NaiveDate;
use log::{debug, warn};

/// Buckets ledger entries into monthly revenue, expense and combined series.
pub struct HistoricalAggregator {
    lookback_days: u64,
}

impl Default for HistoricalAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK_DAYS)
    }
}

impl HistoricalAggregator {
    pub fn new(lookback_days: u64) -> Self {
        Self { lookback_days }
    }

    pub fn window(&self, as_of: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        trailing_window(as_of, self.lookback_days)
    }

    /// Entries for other businesses or outside the trailing window are ignored.
    pub fn aggregate(
        &self,
        business_id: BusinessId,
        as_of: NaiveDate,
        entries: &[LedgerEntry],
    ) -> Result<HistoricalSeries> {
        let (start, end) = self.window(as_of)?;
        let mut history = HistoricalSeries::empty(business_id, as_of);
        let mut skipped = 0usize;

        for entry in entries {
            if entry.business_id != business_id
                || entry.occurred_on < start
                || entry.occurred_on > end
            {
                skipped += 1;
                continue;
            }

            validate_amount(
                entry.amount,
                &format!("ledger entry on {}", entry.occurred_on),
            )?;

            let month = MonthKey::from_date(entry.occurred_on);
            match entry.kind {
                EntryKind::Revenue => {
                    *history.revenue.entry(month).or_insert(0.0) += entry.amount;
                    *history.combined.entry(month).or_insert(0.0) += entry.amount;
                }
                EntryKind::Expense => {
                    *history.expenses.entry(month).or_insert(0.0) += entry.amount;
                    *history.combined.entry(month).or_insert(0.0) -= entry.amount;
                }
            }
        }

        if skipped > 0 {
            warn!(
                "Ignored {} ledger entries outside {}..={} or belonging to another business",
                skipped, start, end
            );
        }

        debug!(
            "Business {}: {} revenue months, {} expense months, {} combined months",
            business_id,
            history.revenue.len(),
            history.expenses.len(),
            history.combined.len()
        );

        Ok(history)
    }
}

pub fn summarize_revenue(entries: &[LedgerEntry]) -> RevenueSummary {
    let revenue: Vec<f64> = entries
        .iter()
        .filter(|e| e.kind == EntryKind::Revenue)
        .map(|e| e.amount)
        .collect();

    let total_revenue: f64 = revenue.iter().sum();
    let transaction_count = revenue.len();
    let average_transaction = if transaction_count == 0 {
        0.0
    } else {
        total_revenue / transaction_count as f64
    };

    RevenueSummary {
        total_revenue,
        average_transaction,
        transaction_count,
    }
}
