use crate::cmd::open_timeline;
use crate::date::MonthKey;
use crate::summary::compute_summary;
use clap::Args;
use std::path::Path;

/// Export a full year of monthly summaries as CSV on stdout.
#[derive(Args, Debug)]
pub struct ExportCommand {
    /// Year to export
    #[arg(short, long)]
    year: i32,
}

impl ExportCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let timeline = open_timeline(store)?;
        let ledgers = timeline.store().ledgers();

        let mut writer = csv::Writer::from_writer(std::io::stdout());
        for month in 1..=12 {
            let month = MonthKey::new(self.year, month)?;
            writer.serialize(compute_summary(&timeline, ledgers, month))?;
        }
        writer.flush()?;
        Ok(())
    }
}
