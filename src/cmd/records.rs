//! Ledger commands - record, list and delete expenses and other income

use crate::cmd::money;
use crate::date::{Clock, MonthKey, SystemClock};
use crate::store::JsonStore;
use clap::Args;
use rust_decimal::Decimal;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SpendCommand {
    /// Month the expense belongs to (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    month: Option<MonthKey>,

    /// Amount spent
    #[arg(short, long)]
    amount: Decimal,

    /// Expense category, e.g. food, rent, transport
    #[arg(short, long)]
    category: String,

    /// Optional note
    #[arg(short, long)]
    note: Option<String>,
}

impl SpendCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let month = self.month.unwrap_or_else(|| SystemClock.current_month());
        let mut store = JsonStore::open(store)?;
        let mut ledgers = store.ledgers().clone();
        let record = ledgers.add_expense(
            month,
            self.amount,
            self.category.clone(),
            self.note.clone(),
            SystemClock.now(),
        )?;
        store.save_ledgers(ledgers)?;
        println!(
            "Recorded expense {} for {month}: {} ({})",
            record.id,
            money(record.amount),
            record.category
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct EarnCommand {
    /// Month the income belongs to (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    month: Option<MonthKey>,

    /// Amount received
    #[arg(short, long)]
    amount: Decimal,

    /// Optional note
    #[arg(short, long)]
    note: Option<String>,
}

impl EarnCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let month = self.month.unwrap_or_else(|| SystemClock.current_month());
        let mut store = JsonStore::open(store)?;
        let mut ledgers = store.ledgers().clone();
        let record = ledgers.add_income(month, self.amount, self.note.clone(), SystemClock.now())?;
        store.save_ledgers(ledgers)?;
        println!(
            "Recorded income {} for {month}: {}",
            record.id,
            money(record.amount)
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RecordsCommand {
    /// Month to list (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    month: Option<MonthKey>,
}

#[derive(Debug, Tabled)]
struct LedgerRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Note")]
    note: String,
}

impl RecordsCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let month = self.month.unwrap_or_else(|| SystemClock.current_month());
        let store = JsonStore::open(store)?;
        let ledgers = store.ledgers();

        let expenses: Vec<LedgerRow> = ledgers
            .expenses(month)
            .iter()
            .map(|r| LedgerRow {
                id: r.id,
                amount: money(r.amount),
                category: r.category.clone(),
                note: r.description.clone().unwrap_or_default(),
            })
            .collect();
        let incomes: Vec<LedgerRow> = ledgers
            .incomes(month)
            .iter()
            .map(|r| LedgerRow {
                id: r.id,
                amount: money(r.amount),
                category: "income".to_string(),
                note: r.description.clone().unwrap_or_default(),
            })
            .collect();

        println!("EXPENSES ({month})");
        print_rows(&expenses);
        println!("Total: {}", money(ledgers.total_expenses(month)));
        println!();
        println!("OTHER INCOME ({month})");
        print_rows(&incomes);
        println!("Total: {}", money(ledgers.total_income(month)));
        Ok(())
    }
}

fn print_rows(rows: &[LedgerRow]) {
    if rows.is_empty() {
        println!("  (none)");
        return;
    }
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

#[derive(Args, Debug)]
pub struct RemoveCommand {
    /// Month the record belongs to (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    month: Option<MonthKey>,

    /// Id of an expense record to delete
    #[arg(long, conflicts_with = "income")]
    expense: Option<i64>,

    /// Id of an income record to delete
    #[arg(long)]
    income: Option<i64>,
}

impl RemoveCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let month = self.month.unwrap_or_else(|| SystemClock.current_month());
        let mut store = JsonStore::open(store)?;
        let mut ledgers = store.ledgers().clone();

        let removed = match (self.expense, self.income) {
            (Some(id), None) => ledgers.remove_expense(month, id),
            (None, Some(id)) => ledgers.remove_income(month, id),
            _ => anyhow::bail!("specify exactly one of --expense or --income"),
        };
        if removed {
            store.save_ledgers(ledgers)?;
            println!("Record removed from {month}");
        } else {
            println!("No matching record in {month}");
        }
        Ok(())
    }
}
