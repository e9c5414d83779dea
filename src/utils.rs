use crate::error::{ForecastError, Result};
use chrono::{Datelike, Days, NaiveDate};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month (`YYYY-MM`). Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::DateError(format!(
                "Invalid month {} for year {}: must be between 1 and 12",
                month, year
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 0-based calendar month index (Jan = 0), used to look up seasonal factors.
    pub fn month0(&self) -> usize {
        (self.month - 1) as usize
    }

    pub fn next(self) -> Self {
        self.add_months(1)
    }

    pub fn add_months(self, months: u32) -> Self {
        let zero_based = self.year as i64 * 12 + self.month0() as i64 + months as i64;
        Self {
            year: zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| ForecastError::DateError(format!("Month {} is out of range", self)))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ForecastError;

    /// Parses "YYYY-MM".
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || {
            ForecastError::DateError(format!(
                "Invalid month key: {}. Expected YYYY-MM",
                trimmed
            ))
        };

        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

impl JsonSchema for MonthKey {
    fn schema_name() -> String {
        "MonthKey".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

pub fn months_between(start: MonthKey, end: MonthKey) -> i32 {
    let year_diff = end.year - start.year;
    let month_diff = end.month as i32 - start.month as i32;
    year_diff * 12 + month_diff
}

/// Inclusive trailing window `[as_of - days, as_of]`.
pub fn trailing_window(as_of: NaiveDate, days: u64) -> Result<(NaiveDate, NaiveDate)> {
    let start = as_of.checked_sub_days(Days::new(days)).ok_or_else(|| {
        ForecastError::DateError(format!(
            "Cannot look back {} days from {}",
            days, as_of
        ))
    })?;
    Ok((start, as_of))
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
