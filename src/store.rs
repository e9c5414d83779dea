//! Read-only boundary to the persistence layer that owns ledger and
//! customer transaction records.

use crate::error::Result;
use crate::schema::{BusinessId, CustomerTransaction, LedgerEntry};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub trait LedgerStore: Send + Sync {
    fn business_exists(&self, business_id: BusinessId) -> Result<bool>;

    /// Ledger entries with `start <= occurred_on <= end`.
    fn entries_between(
        &self,
        business_id: BusinessId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerEntry>>;

    fn customer_transactions(&self, business_id: BusinessId) -> Result<Vec<CustomerTransaction>>;
}

#[derive(Debug, Clone, Default)]
struct BusinessRecords {
    entries: Vec<LedgerEntry>,
    transactions: Vec<CustomerTransaction>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    businesses: BTreeMap<BusinessId, BusinessRecords>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_business(&mut self, business_id: BusinessId) {
        self.businesses.entry(business_id).or_default();
    }

    /// Stores the entry under its own `business_id`, registering the business if needed.
    pub fn add_entry(&mut self, entry: LedgerEntry) {
        self.businesses
            .entry(entry.business_id)
            .or_default()
            .entries
            .push(entry);
    }

    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = LedgerEntry>) {
        for entry in entries {
            self.add_entry(entry);
        }
    }

    pub fn add_transaction(&mut self, business_id: BusinessId, transaction: CustomerTransaction) {
        self.businesses
            .entry(business_id)
            .or_default()
            .transactions
            .push(transaction);
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn business_exists(&self, business_id: BusinessId) -> Result<bool> {
        Ok(self.businesses.contains_key(&business_id))
    }

    fn entries_between(
        &self,
        business_id: BusinessId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .businesses
            .get(&business_id)
            .map(|records| {
                records
                    .entries
                    .iter()
                    .filter(|e| e.occurred_on >= start && e.occurred_on <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn customer_transactions(&self, business_id: BusinessId) -> Result<Vec<CustomerTransaction>> {
        Ok(self
            .businesses
            .get(&business_id)
            .map(|records| records.transactions.clone())
            .unwrap_or_default())
    }
}
