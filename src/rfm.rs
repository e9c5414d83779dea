use crate::error::{ForecastError, Result};
use crate::ingestion::validate_transactions;
use crate::schema::{CustomerTransaction, RfmVector};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Un-normalized recency/frequency/monetary values for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRfm {
    pub customer_id: String,
    /// Days between the reference date and the latest purchase.
    pub recency_days: i64,
    pub frequency: usize,
    pub monetary: f64,
}

pub struct RfmFeatureBuilder {
    as_of: NaiveDate,
}

impl RfmFeatureBuilder {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    /// One row per distinct customer, ordered by customer id.
    pub fn raw_features(&self, transactions: &[CustomerTransaction]) -> Result<Vec<CustomerRfm>> {
        if transactions.is_empty() {
            return Err(ForecastError::InsufficientData(
                "no customer transactions to segment".to_string(),
            ));
        }
        validate_transactions(transactions)?;

        let mut grouped: BTreeMap<&str, (NaiveDate, usize, f64)> = BTreeMap::new();
        for tx in transactions {
            let slot = grouped
                .entry(tx.customer_id.as_str())
                .or_insert((tx.date, 0, 0.0));
            slot.0 = slot.0.max(tx.date);
            slot.1 += 1;
            slot.2 += tx.amount;
        }

        Ok(grouped
            .into_iter()
            .map(|(customer_id, (latest, frequency, monetary))| CustomerRfm {
                customer_id: customer_id.to_string(),
                recency_days: (self.as_of - latest).num_days(),
                frequency,
                monetary,
            })
            .collect())
    }

    pub fn build(&self, transactions: &[CustomerTransaction]) -> Result<Vec<RfmVector>> {
        let raw = self.raw_features(transactions)?;

        let recency: Vec<f64> = raw.iter().map(|c| c.recency_days as f64).collect();
        let frequency: Vec<f64> = raw.iter().map(|c| c.frequency as f64).collect();
        let monetary: Vec<f64> = raw.iter().map(|c| c.monetary).collect();

        let recency = min_max_normalize(&recency);
        let frequency = min_max_normalize(&frequency);
        let monetary = min_max_normalize(&monetary);

        debug!(
            "Built RFM features for {} customers from {} transactions",
            raw.len(),
            transactions.len()
        );

        Ok(raw
            .into_iter()
            .enumerate()
            .map(|(i, customer)| RfmVector {
                customer_id: customer.customer_id,
                recency: recency[i],
                frequency: frequency[i],
                monetary: monetary[i],
            })
            .collect())
    }
}

/// Scales a column into [0, 1]. A zero-variance column maps to all zeros.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range.is_nan() || range <= 0.0 {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}
