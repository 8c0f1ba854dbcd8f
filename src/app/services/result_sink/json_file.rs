//! JSON file result sink
//!
//! Stores every record in one JSON array. Each upsert reads the file, applies
//! the change and writes the whole array to a sibling temporary file that is
//! then renamed over the original, so readers never see a partial file.

use super::{ResultSink, UpsertOutcome, upsert_into};
use crate::app::models::CatastropheRecord;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSink {
    /// Sink backed by `path`; the file and its directory are created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<CatastropheRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::io(
                    format!("Failed to read result store {}", self.path.display()),
                    e,
                ));
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut records: Vec<CatastropheRecord> = serde_json::from_str(&content).map_err(|e| {
            Error::store(format!("{} is not a valid store: {}", self.path.display(), e))
        })?;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records.dedup_by(|later, earlier| later.name == earlier.name);
        Ok(records)
    }

    fn write_records(&self, records: &[CatastropheRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io(
                    format!("Failed to create store directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let json = serde_json::to_string_pretty(records)?;
        let temp_path = self.path.with_extension("json.tmp");

        fs::write(&temp_path, json).map_err(|e| {
            Error::io(format!("Failed to write {}", temp_path.display()), e)
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            Error::io(
                format!("Failed to replace result store {}", self.path.display()),
                e,
            )
        })?;

        debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

impl ResultSink for JsonFileSink {
    fn upsert(
        &self,
        name: &str,
        arrival_date: DateTime<Utc>,
        description: &str,
    ) -> Result<UpsertOutcome> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::store("result store lock poisoned"))?;

        let mut records = self.read_records()?;
        let outcome = upsert_into(&mut records, name, arrival_date, description);
        self.write_records(&records)?;
        Ok(outcome)
    }

    fn get(&self, name: &str) -> Result<Option<CatastropheRecord>> {
        Ok(self.read_records()?.into_iter().find(|r| r.name == name))
    }

    fn list(&self) -> Result<Vec<CatastropheRecord>> {
        self.read_records()
    }
}
