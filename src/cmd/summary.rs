//! Summary command - the financial snapshot for one month

use crate::cmd::{money, open_timeline};
use crate::date::{Clock, MonthKey, SystemClock};
use crate::summary::{compute_summary, MonthlySummary};
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// Month to show (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    month: Option<MonthKey>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl SummaryCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let month = self.month.unwrap_or_else(|| SystemClock.current_month());
        let timeline = open_timeline(store)?;
        let summary = compute_summary(&timeline, timeline.store().ledgers(), month);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }
        Ok(())
    }
}

fn print_summary(summary: &MonthlySummary) {
    println!();
    println!("FINANCIAL SUMMARY ({})", summary.month);
    println!();
    println!("SALARY");
    println!("  Gross salary: {}", money(summary.gross_salary));
    println!(
        "  Social insurance: {} | Housing fund: {}",
        money(summary.social_insurance),
        money(summary.housing_fund)
    );
    println!("  Withholding tax: {}", money(summary.tax));
    println!("  Net income: {}", money(summary.net_income));
    println!();
    println!("LEDGERS");
    println!(
        "  Expenses: {} | Other income: {}",
        money(summary.expenses),
        money(summary.other_income)
    );
    println!();
    println!("YEAR TO DATE");
    println!(
        "  Income: {} | Tax: {}",
        money(summary.cumulative_income),
        money(summary.cumulative_tax)
    );
    println!();
}
