pub mod export;
pub mod history;
pub mod records;
pub mod reset;
pub mod set;
pub mod summary;

use crate::date::SystemClock;
use crate::store::JsonStore;
use crate::timeline::SettingsTimeline;
use rust_decimal::Decimal;
use std::path::Path;

/// Open the store and hydrate the settings timeline.
pub fn open_timeline(store: &Path) -> anyhow::Result<SettingsTimeline<JsonStore, SystemClock>> {
    let store = JsonStore::open(store)?;
    let timeline = SettingsTimeline::open(store, SystemClock)?;
    Ok(timeline)
}

pub fn money(amount: Decimal) -> String {
    format!("¥{:.2}", amount)
}

pub fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}
