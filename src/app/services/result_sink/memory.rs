//! In-memory result sink

use super::{ResultSink, UpsertOutcome, upsert_into};
use crate::app::models::CatastropheRecord;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

/// Records held for the life of the process
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CatastropheRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records, e.g. a snapshot of a persistent store
    pub fn with_records(records: Vec<CatastropheRecord>) -> Self {
        let sink = Self::new();
        if let Ok(mut guard) = sink.records.lock() {
            for record in records {
                upsert_into(&mut guard, &record.name, record.arrival_date, &record.description);
            }
        }
        sink
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<CatastropheRecord>>> {
        self.records
            .lock()
            .map_err(|_| Error::store("in-memory store lock poisoned"))
    }
}

impl ResultSink for MemorySink {
    fn upsert(
        &self,
        name: &str,
        arrival_date: DateTime<Utc>,
        description: &str,
    ) -> Result<UpsertOutcome> {
        let mut records = self.lock()?;
        Ok(upsert_into(&mut records, name, arrival_date, description))
    }

    fn get(&self, name: &str) -> Result<Option<CatastropheRecord>> {
        Ok(self.lock()?.iter().find(|r| r.name == name).cloned())
    }

    fn list(&self) -> Result<Vec<CatastropheRecord>> {
        Ok(self.lock()?.clone())
    }
}
