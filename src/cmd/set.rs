//! Set command - save a month's salary settings, creating an anchor

use crate::cmd::{self, money};
use crate::date::{Clock, MonthKey, SystemClock};
use crate::salary::{SalaryItem, SalaryItemCollection};
use crate::settings::ContributionRates;
use clap::Args;
use rust_decimal::Decimal;
use std::path::Path;

#[derive(Args, Debug)]
pub struct SetCommand {
    /// Month to anchor (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    month: Option<MonthKey>,

    /// Basic salary amount (taxed and insured)
    #[arg(short, long)]
    basic: Decimal,

    /// Allowance amount (taxed, not insured)
    #[arg(short, long, default_value = "0")]
    allowance: Decimal,

    /// Extra salary item as name=amount[,tax|notax][,insured|uninsured];
    /// repeatable
    #[arg(short, long)]
    item: Vec<String>,

    /// Personal social insurance rate, percent
    #[arg(long, default_value = "8")]
    social_rate: Decimal,

    /// Company social insurance rate, percent
    #[arg(long, default_value = "20")]
    company_social_rate: Decimal,

    /// Personal housing fund rate, percent
    #[arg(long, default_value = "12")]
    housing_rate: Decimal,

    /// Company housing fund rate, percent
    #[arg(long, default_value = "12")]
    company_housing_rate: Decimal,
}

impl SetCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let month = self.month.unwrap_or_else(|| SystemClock.current_month());

        let mut items = vec![
            SalaryItem::basic_salary(self.basic)?,
            SalaryItem::allowance(self.allowance)?,
        ];
        for spec in &self.item {
            items.push(parse_item(spec)?);
        }
        let items = SalaryItemCollection::new(items)?;
        let rates = ContributionRates::from_percent(
            self.social_rate,
            self.company_social_rate,
            self.housing_rate,
            self.company_housing_rate,
        )?;

        let mut timeline = cmd::open_timeline(store)?;
        let record = timeline.upsert_anchor(month, items, rates)?;
        println!(
            "Saved settings for {}: gross {}",
            record.month,
            money(record.gross_salary())
        );
        Ok(())
    }
}

/// Parses `name=amount[,tax|notax][,insured|uninsured]`. Custom items are
/// taxed and uninsured unless flagged otherwise.
fn parse_item(spec: &str) -> anyhow::Result<SalaryItem> {
    let (name, rest) = spec
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid item '{spec}', expected name=amount[,flags]"))?;
    let mut parts = rest.split(',');
    let amount: Decimal = parts
        .next()
        .unwrap_or_default()
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid amount in item '{spec}'"))?;

    let mut include_tax = true;
    let mut include_social_security = false;
    for flag in parts {
        match flag.trim() {
            "tax" => include_tax = true,
            "notax" => include_tax = false,
            "insured" => include_social_security = true,
            "uninsured" => include_social_security = false,
            other => anyhow::bail!("unknown item flag '{other}' in '{spec}'"),
        }
    }
    let item = SalaryItem::custom(name, amount, include_tax, include_social_security)?;
    Ok(item)
}
