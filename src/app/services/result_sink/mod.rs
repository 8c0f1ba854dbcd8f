//! Result sinks for computed catastrophe dates
//!
//! The pipelines end by upserting a [`CatastropheRecord`] keyed by name: a
//! missing record is created with its description, an existing record only
//! has its arrival date replaced. Running a job twice therefore leaves a
//! single record holding the latest estimate.
//!
//! - [`memory`] - in-process store used by tests and dry runs
//! - [`json_file`] - JSON array on disk, rewritten atomically

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileSink;
pub use memory::MemorySink;

use crate::Result;
use crate::app::models::CatastropheRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Whether an upsert created a new record or replaced a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    pub fn created(&self) -> bool {
        matches!(self, UpsertOutcome::Created)
    }
}

/// Destination for catastrophe estimates
pub trait ResultSink: Send + Sync {
    /// Create the record if absent, otherwise overwrite its arrival date
    fn upsert(
        &self,
        name: &str,
        arrival_date: DateTime<Utc>,
        description: &str,
    ) -> Result<UpsertOutcome>;

    fn get(&self, name: &str) -> Result<Option<CatastropheRecord>>;

    /// All records ordered by name
    fn list(&self) -> Result<Vec<CatastropheRecord>>;
}

/// Apply an upsert to a name-ordered record list
pub(crate) fn upsert_into(
    records: &mut Vec<CatastropheRecord>,
    name: &str,
    arrival_date: DateTime<Utc>,
    description: &str,
) -> UpsertOutcome {
    match records.binary_search_by(|record| record.name.as_str().cmp(name)) {
        Ok(index) => {
            records[index].arrival_date = arrival_date;
            UpsertOutcome::Updated
        }
        Err(index) => {
            records.insert(index, CatastropheRecord::new(name, arrival_date, description));
            UpsertOutcome::Created
        }
    }
}
