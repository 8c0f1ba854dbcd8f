//! Parsing statistics and result structures for text-table processing

use crate::app::models::SeriesPoint;
use tracing::debug;

/// Parsing result with points and basic statistics
#[derive(Debug, Clone)]
pub struct ParseResult<D> {
    /// Successfully parsed points, in payload order
    pub points: Vec<SeriesPoint<D>>,

    pub stats: ParseStats,
}

/// Simple parsing statistics
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ParseStats {
    /// Number of data lines encountered (metadata and header lines excluded)
    pub total_records: usize,

    /// Number of points produced
    pub points_parsed: usize,

    /// Values dropped because the source marked them missing
    pub missing_values: usize,

    /// Lines or cells skipped because they could not be parsed
    pub records_skipped: usize,

    /// Skip reasons for debugging
    pub errors: Vec<String>,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unparseable line or cell and keep going
    pub fn skip(&mut self, reason: String) {
        debug!("{}", reason);
        self.records_skipped += 1;
        self.errors.push(reason);
    }

    /// Percentage of data lines that yielded at least something usable
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            let failed = self.records_skipped.min(self.total_records);
            ((self.total_records - failed) as f64 / self.total_records as f64) * 100.0
        }
    }
}
