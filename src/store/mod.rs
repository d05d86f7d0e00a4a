use crate::export::csv::{parse_csv, to_csv};
use crate::ledger::Ledger;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Whole-file CSV snapshot of a ledger.
///
/// Every save rewrites the file in place. A crash mid-write can truncate the
/// snapshot; the next `load` then falls back to an empty ledger.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: a missing or unreadable snapshot yields an empty ledger.
    pub fn load(&self) -> Ledger {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot yet, starting empty");
                return Ledger::default();
            }
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "failed to read snapshot, starting empty");
                return Ledger::default();
            }
        };

        match parse_csv(&bytes) {
            Ok(records) => {
                debug!(path = %self.path.display(), count = records.len(), "snapshot loaded");
                Ledger::from_records(records)
            }
            Err(error) => {
                warn!(path = %self.path.display(), error = %format!("{error:#}"), "malformed snapshot, starting empty");
                Ledger::default()
            }
        }
    }

    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create snapshot directory: {}", parent.display())
            })?;
        }

        let payload = to_csv(ledger.records())?;
        fs::write(&self.path, payload)
            .with_context(|| format!("Failed to write snapshot: {}", self.path.display()))?;

        Ok(())
    }

    /// Removes the snapshot, then empties `ledger`. If the file cannot be
    /// removed the ledger is left as it was.
    pub fn reset(&self, ledger: &mut Ledger) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => {
                return Err(error).with_context(|| {
                    format!("Failed to remove snapshot: {}", self.path.display())
                });
            }
        }

        ledger.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::model::{Category, Hotel, NewEntry};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn entry(area: &str) -> NewEntry {
        NewEntry {
            hotel_name: Hotel::EdenHotel,
            area_name: area.to_string(),
            category: Category::Lobby,
            coverage_sqm: 55.5,
            cost_per_sqm: Some(3.0),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("assessment_data.csv"));

        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assessment_data.csv");
        fs::write(&path, "Date Added,Hotel Name\nnot-a-date,Nowhere Inn\n").unwrap();

        assert!(LedgerStore::new(&path).load().is_empty());
    }

    #[test]
    fn save_then_load_restores_ledger() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("nested").join("assessment_data.csv"));
        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let mut ledger = Ledger::default();
        ledger.append(entry("Lobby"), date).unwrap();
        ledger.append(entry("Atrium"), date).unwrap();

        store.save(&ledger).unwrap();

        assert_eq!(store.load(), ledger);
    }

    #[test]
    fn reset_removes_file_and_empties_ledger() {
        let dir = tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("assessment_data.csv"));
        let mut ledger = Ledger::default();
        ledger
            .append(entry("Lobby"), NaiveDate::from_ymd_opt(2026, 6, 1).unwrap())
            .unwrap();
        store.save(&ledger).unwrap();

        store.reset(&mut ledger).unwrap();

        assert!(ledger.is_empty());
        assert!(!store.path().exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn reset_keeps_ledger_when_file_cannot_be_removed() {
        let dir = tempdir().unwrap();
        // A directory at the snapshot path makes remove_file fail.
        let path = dir.path().join("assessment_data.csv");
        fs::create_dir(&path).unwrap();
        let store = LedgerStore::new(&path);
        let mut ledger = Ledger::default();
        ledger
            .append(entry("Lobby"), NaiveDate::from_ymd_opt(2026, 6, 1).unwrap())
            .unwrap();

        assert!(store.reset(&mut ledger).is_err());
        assert_eq!(ledger.len(), 1);
    }
}
