use crate::date::MonthKey;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub id: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Independent per-month expense and other-income ledgers. Unlike settings
/// records these have no temporal inheritance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledgers {
    #[serde(default)]
    expenses: BTreeMap<MonthKey, Vec<ExpenseRecord>>,
    #[serde(default)]
    incomes: BTreeMap<MonthKey, Vec<IncomeRecord>>,
}

impl Ledgers {
    pub fn add_expense(
        &mut self,
        month: MonthKey,
        amount: Decimal,
        category: impl Into<String>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ExpenseRecord> {
        check_positive(amount)?;
        let records = self.expenses.entry(month).or_default();
        let record = ExpenseRecord {
            id: next_id(records.iter().map(|r| r.id), now),
            amount,
            category: category.into(),
            description,
            timestamp: now,
        };
        records.push(record.clone());
        log::debug!("expense {} added to {month}: {amount}", record.id);
        Ok(record)
    }

    pub fn add_income(
        &mut self,
        month: MonthKey,
        amount: Decimal,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<IncomeRecord> {
        check_positive(amount)?;
        let records = self.incomes.entry(month).or_default();
        let record = IncomeRecord {
            id: next_id(records.iter().map(|r| r.id), now),
            amount,
            description,
            timestamp: now,
        };
        records.push(record.clone());
        log::debug!("income {} added to {month}: {amount}", record.id);
        Ok(record)
    }

    /// Returns true when a record was actually removed.
    pub fn remove_expense(&mut self, month: MonthKey, id: i64) -> bool {
        match self.expenses.get_mut(&month) {
            Some(records) => {
                let before = records.len();
                records.retain(|r| r.id != id);
                records.len() != before
            }
            None => false,
        }
    }

    pub fn remove_income(&mut self, month: MonthKey, id: i64) -> bool {
        match self.incomes.get_mut(&month) {
            Some(records) => {
                let before = records.len();
                records.retain(|r| r.id != id);
                records.len() != before
            }
            None => false,
        }
    }

    pub fn expenses(&self, month: MonthKey) -> &[ExpenseRecord] {
        self.expenses.get(&month).map_or(&[], Vec::as_slice)
    }

    pub fn incomes(&self, month: MonthKey) -> &[IncomeRecord] {
        self.incomes.get(&month).map_or(&[], Vec::as_slice)
    }

    pub fn total_expenses(&self, month: MonthKey) -> Decimal {
        self.expenses(month).iter().map(|r| r.amount).sum()
    }

    pub fn total_income(&self, month: MonthKey) -> Decimal {
        self.incomes(month).iter().map(|r| r.amount).sum()
    }
}

fn check_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::NonPositiveAmount(amount));
    }
    Ok(())
}

// Clock millis, bumped past any existing id so two records created within the
// same millisecond stay distinct.
fn next_id(existing: impl Iterator<Item = i64>, now: DateTime<Utc>) -> i64 {
    let max_existing = existing.max().unwrap_or(0);
    now.timestamp_millis().max(max_existing + 1)
}
