//! Global mean sea level record parser
//!
//! The file opens with free-text preamble, followed by a block of header lines
//! each carrying the `HDR` token, followed by whitespace-delimited data:
//!
//! ```text
//! HDR Global Mean Sea Level Data
//! HDR column 3 = year+fraction of year (mid-cycle)
//! ...
//! 0 11 1993.0115 466462 337277.00 -37.24 92.66 -37.02 -37.26 92.61 -37.04 -37.55
//! ```
//!
//! Token 3 is the fractional year, token 12 the smoothed GIA-adjusted
//! deviation in millimetres.

use super::stats::{ParseResult, ParseStats};
use crate::app::models::{FractionalYear, YearlyPoint};
use crate::constants::{
    NO_USABLE_DATA, SEA_LEVEL_DEVIATION_TOKEN, SEA_LEVEL_HEADER_MARKER,
    SEA_LEVEL_MISSING_SENTINEL, SEA_LEVEL_YEAR_TOKEN,
};
use crate::{Error, Result};
use tracing::debug;

/// Where the parser is relative to the header block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Header,
    Data,
}

/// Parse the sea level record into (fractional year, deviation mm) points
///
/// Lines before the first header line and the header block itself are
/// skipped; data starts at the first line without the marker. Short or
/// unparseable data lines are logged and skipped.
pub fn parse_sea_levels(raw: &str, context: &str) -> Result<ParseResult<FractionalYear>> {
    let mut stats = ParseStats::new();
    let mut points = Vec::new();
    let mut section = Section::Preamble;

    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let is_header = line.contains(SEA_LEVEL_HEADER_MARKER);

        match section {
            Section::Preamble => {
                if is_header {
                    section = Section::Header;
                } else {
                    debug!("before header started: {}", line);
                }
                continue;
            }
            Section::Header => {
                if is_header {
                    debug!("in header: {}", line);
                    continue;
                }
                section = Section::Data;
            }
            Section::Data => {
                if is_header {
                    debug!("stray header line in data: {}", line);
                    continue;
                }
            }
        }

        stats.total_records += 1;
        match parse_data_line(line) {
            Ok(Some(point)) => points.push(point),
            Ok(None) => stats.missing_values += 1,
            Err(reason) => stats.skip(format!("couldn't parse '{}': {}", line.trim(), reason)),
        }
    }

    stats.points_parsed = points.len();
    debug!(
        "Parsed {} sea level points from {} ({} skipped)",
        stats.points_parsed, context, stats.records_skipped
    );

    if points.is_empty() {
        return Err(Error::parse(context, NO_USABLE_DATA));
    }

    Ok(ParseResult { points, stats })
}

/// `Ok(None)` means the line carries the upstream missing-value sentinel
fn parse_data_line(line: &str) -> std::result::Result<Option<YearlyPoint>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() <= SEA_LEVEL_DEVIATION_TOKEN {
        return Err(format!(
            "expected at least {} tokens, found {}",
            SEA_LEVEL_DEVIATION_TOKEN + 1,
            tokens.len()
        ));
    }

    let year: f64 = tokens[SEA_LEVEL_YEAR_TOKEN]
        .parse()
        .map_err(|_| format!("invalid year '{}'", tokens[SEA_LEVEL_YEAR_TOKEN]))?;
    let deviation_mm: f64 = tokens[SEA_LEVEL_DEVIATION_TOKEN]
        .parse()
        .map_err(|_| format!("invalid deviation '{}'", tokens[SEA_LEVEL_DEVIATION_TOKEN]))?;

    if !year.is_finite() || !deviation_mm.is_finite() {
        return Err("non-finite value".to_string());
    }

    if deviation_mm >= SEA_LEVEL_MISSING_SENTINEL {
        return Ok(None);
    }

    Ok(Some(YearlyPoint::new(FractionalYear(year), deviation_mm)))
}
