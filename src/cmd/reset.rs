//! Reset command - remove a month's anchor and repair the gap

use crate::cmd;
use crate::date::MonthKey;
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ResetCommand {
    /// Month to reset (YYYY-MM)
    #[arg(short, long)]
    month: MonthKey,
}

impl ResetCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let mut timeline = cmd::open_timeline(store)?;
        let had_anchor = timeline.anchors().any(|a| a.month == self.month);
        timeline.remove_anchor(self.month)?;
        if had_anchor {
            println!("Removed anchor for {}", self.month);
        } else {
            println!("No anchor at {}, nothing to reset", self.month);
        }
        Ok(())
    }
}
