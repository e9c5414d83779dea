use crate::error::{ForecastError, Result};
use crate::schema::{BusinessId, CustomerTransaction, EntryKind, LedgerEntry};
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

/// A loosely-typed financial record as exported by the storage layer
/// (e.g. one CSV line). `record_type` is free text; only revenue and
/// expense records take part in forecasting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    pub business_id: BusinessId,
    pub record_type: String,
    pub amount: f64,
    pub date: NaiveDate,
}

pub fn convert_ledger_rows(rows: &[LedgerRow]) -> Result<Vec<LedgerEntry>> {
    let mut entries = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let kind = match row.record_type.parse::<EntryKind>() {
            Ok(kind) => kind,
            Err(_) => {
                warn!(
                    "Skipping ledger row #{} with record type '{}'",
                    idx, row.record_type
                );
                continue;
            }
        };

        validate_amount(row.amount, &format!("ledger row #{}", idx))?;

        entries.push(LedgerEntry {
            business_id: row.business_id,
            kind,
            amount: row.amount,
            occurred_on: row.date,
        });
    }

    Ok(entries)
}

pub fn validate_transactions(transactions: &[CustomerTransaction]) -> Result<()> {
    for (idx, tx) in transactions.iter().enumerate() {
        if !tx.amount.is_finite() {
            return Err(ForecastError::InvalidAmount {
                context: format!("transaction #{} for customer '{}'", idx, tx.customer_id),
                value: tx.amount,
            });
        }
    }
    Ok(())
}

pub(crate) fn validate_amount(amount: f64, context: &str) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ForecastError::InvalidAmount {
            context: context.to_string(),
            value: amount,
        });
    }
    Ok(())
}
