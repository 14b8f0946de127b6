//! History command - every settings record on the timeline

use crate::cmd::{money, open_timeline, percent};
use crate::settings::SalarySettingsRecord;
use clap::Args;
use std::io;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// Only show records for this year
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as CSV instead of a formatted table
    #[arg(long)]
    csv: bool,
}

/// Row for the history table output
#[derive(Debug, Clone, Tabled, serde::Serialize)]
struct HistoryRow {
    #[tabled(rename = "Month")]
    month: String,

    #[tabled(rename = "Kind")]
    kind: String,

    #[tabled(rename = "Gross")]
    gross: String,

    #[tabled(rename = "Taxable Base")]
    taxable_base: String,

    #[tabled(rename = "Insured Base")]
    insured_base: String,

    #[tabled(rename = "Social")]
    social_rate: String,

    #[tabled(rename = "Housing")]
    housing_rate: String,
}

impl HistoryRow {
    fn from_record(record: &SalarySettingsRecord) -> Self {
        HistoryRow {
            month: record.month.to_string(),
            kind: record.kind().to_string(),
            gross: money(record.gross_salary()),
            taxable_base: money(record.taxable_base()),
            insured_base: money(record.social_security_base()),
            social_rate: percent(record.rates.personal_social),
            housing_rate: percent(record.rates.personal_housing),
        }
    }
}

impl HistoryCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let timeline = open_timeline(store)?;
        // newest first, matching how the history screen listed records
        let rows: Vec<HistoryRow> = timeline
            .records()
            .filter(|r| self.year.is_none_or(|y| r.month.year() == y))
            .map(HistoryRow::from_record)
            .rev()
            .collect();

        if rows.is_empty() {
            println!("No settings records");
            return Ok(());
        }

        if self.csv {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        } else {
            let table = Table::new(&rows)
                .with(Style::rounded())
                .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
        }
        Ok(())
    }
}
