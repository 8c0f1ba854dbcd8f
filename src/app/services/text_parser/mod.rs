//! Text-table parsers for the upstream data feeds
//!
//! Both upstream sources publish ad-hoc plain text rather than a standard
//! format. This module turns each into an ordered series of points, skipping
//! metadata, headers and missing-value markers.
//!
//! ## Architecture
//!
//! - [`water_level`] - CDEC daily storage export (one line per station-month)
//! - [`sea_level`] - NASA global mean sea level record (whitespace table with
//!   an `HDR` preamble)
//! - [`stats`] - Parse statistics and result structures
//!
//! ## Usage
//!
//! ```rust
//! use catastrophe_clock::app::services::text_parser::parse_water_levels;
//!
//! # fn example() -> catastrophe_clock::Result<()> {
//! let raw = "'SHA daily storage\nSHA,15,2015,6,100,m,102\n";
//! let result = parse_water_levels(raw, "SHA")?;
//! assert_eq!(result.points.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod sea_level;
pub mod stats;
pub mod water_level;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use sea_level::parse_sea_levels;
pub use stats::{ParseResult, ParseStats};
pub use water_level::parse_water_levels;
