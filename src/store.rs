use crate::date::MonthKey;
use crate::error::{Error, Result};
use crate::ledger::Ledgers;
use crate::settings::SalarySettingsRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The persistence contract the timeline depends on. The storage technology
/// behind it is irrelevant to the core.
pub trait SettingsStore {
    fn save(&mut self, month: MonthKey, record: &SalarySettingsRecord) -> Result<()>;
    fn load(&self, month: MonthKey) -> Result<Option<SalarySettingsRecord>>;
    fn load_all_anchors(&self, year: Option<i32>) -> Result<Vec<SalarySettingsRecord>>;
    fn delete(&mut self, month: MonthKey) -> Result<()>;
}

/// In-process store, used by tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<MonthKey, SalarySettingsRecord>,
}

impl SettingsStore for MemoryStore {
    fn save(&mut self, month: MonthKey, record: &SalarySettingsRecord) -> Result<()> {
        self.records.insert(month, record.clone());
        Ok(())
    }

    fn load(&self, month: MonthKey) -> Result<Option<SalarySettingsRecord>> {
        Ok(self.records.get(&month).cloned())
    }

    fn load_all_anchors(&self, year: Option<i32>) -> Result<Vec<SalarySettingsRecord>> {
        Ok(self
            .records
            .values()
            .filter(|r| r.is_anchor)
            .filter(|r| year.is_none_or(|y| r.month.year() == y))
            .cloned()
            .collect())
    }

    fn delete(&mut self, month: MonthKey) -> Result<()> {
        self.records.remove(&month);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    settings: BTreeMap<MonthKey, SalarySettingsRecord>,
    #[serde(default)]
    ledgers: Ledgers,
}

/// File-backed store: one JSON document holding the settings map and the
/// expense/income ledgers. Every write rewrites the file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    doc: StoreFile,
}

impl JsonStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(Error::store)?;
            serde_json::from_str(&contents).map_err(Error::store)?
        } else {
            log::debug!("no store at {}, starting empty", path.display());
            StoreFile::default()
        };
        Ok(JsonStore { path, doc })
    }

    fn persist(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.doc).map_err(Error::store)?;
        fs::write(&self.path, contents).map_err(Error::store)
    }

    pub fn ledgers(&self) -> &Ledgers {
        &self.doc.ledgers
    }

    pub fn save_ledgers(&mut self, ledgers: Ledgers) -> Result<()> {
        self.doc.ledgers = ledgers;
        self.persist()
    }
}

impl SettingsStore for JsonStore {
    fn save(&mut self, month: MonthKey, record: &SalarySettingsRecord) -> Result<()> {
        self.doc.settings.insert(month, record.clone());
        self.persist()
    }

    fn load(&self, month: MonthKey) -> Result<Option<SalarySettingsRecord>> {
        Ok(self.doc.settings.get(&month).cloned())
    }

    fn load_all_anchors(&self, year: Option<i32>) -> Result<Vec<SalarySettingsRecord>> {
        Ok(self
            .doc
            .settings
            .values()
            .filter(|r| r.is_anchor)
            .filter(|r| year.is_none_or(|y| r.month.year() == y))
            .cloned()
            .collect())
    }

    fn delete(&mut self, month: MonthKey) -> Result<()> {
        self.doc.settings.remove(&month);
        self.persist()
    }
}
