//! Station discovery from the CDEC reservoir listing
//!
//! The listing is an HTML table where each reservoir row starts with a cell
//! holding a link to the reservoir name, followed by a cell holding the
//! station code in bold:
//!
//! ```text
//! <tr><td><a href="...">Shasta</a></td> <td><b>SHA</b></td> <td>...</td></tr>
//! ```
//!
//! Header rows (`<th>`) and rows with fewer than two cells (section titles)
//! are skipped. The page is scanned with regexes rather than a DOM; only the
//! first two cells of each row matter.

use crate::app::models::Station;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static ROW_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<tr\b").unwrap());
static ROW_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</tr\s*>|</table\s*>").unwrap());
static CELL_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<td\b").unwrap());
static CELL_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</td\s*>").unwrap());
static HEADER_CELL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<th\b").unwrap());
static LINK_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a\s*>").unwrap());
static BOLD_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<b\b[^>]*>(.*?)</b\s*>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Stations found on the listing page
#[derive(Debug, Clone, Default)]
pub struct StationListing {
    pub stations: Vec<Station>,
    pub stats: ListingStats,
}

/// Counts of rows that did not become stations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingStats {
    pub rows_seen: usize,
    pub header_rows: usize,
    pub malformed_rows: usize,
    pub excluded: usize,
    pub duplicates: usize,
}

/// Extract stations from the listing HTML
///
/// `excluded` must hold upper-case identifiers; matching upper-cases the
/// listed identifier first. A station listed twice is kept once.
pub fn parse_station_listing(html: &str, excluded: &HashSet<String>) -> StationListing {
    let mut listing = StationListing::default();
    let mut seen = HashSet::new();

    for row in split_rows(html) {
        listing.stats.rows_seen += 1;

        if HEADER_CELL.is_match(row) {
            listing.stats.header_rows += 1;
            continue;
        }

        let cells = split_cells(row);
        if cells.len() < 2 {
            listing.stats.malformed_rows += 1;
            continue;
        }

        let name = tagged_text(&LINK_TEXT, cells[0]);
        let station_id = tagged_text(&BOLD_TEXT, cells[1]);

        let station = match Station::new(station_id, name) {
            Ok(station) => station,
            Err(e) => {
                debug!("Skipping listing row {}: {}", listing.stats.rows_seen, e);
                listing.stats.malformed_rows += 1;
                continue;
            }
        };

        if excluded.contains(&station.station_id.to_uppercase()) {
            debug!("Excluding station {}", station);
            listing.stats.excluded += 1;
            continue;
        }

        if !seen.insert(station.station_id.to_uppercase()) {
            debug!("Station {} listed more than once", station);
            listing.stats.duplicates += 1;
            continue;
        }

        listing.stations.push(station);
    }

    listing
}

/// Row bodies, tolerating rows whose closing tag is omitted
fn split_rows(html: &str) -> Vec<&str> {
    ROW_START
        .split(html)
        .skip(1)
        .map(|chunk| match ROW_END.find(chunk) {
            Some(end) => &chunk[..end.start()],
            None => chunk,
        })
        .collect()
}

/// Cell bodies with the remainder of the opening `<td ...>` tag removed
fn split_cells(row: &str) -> Vec<&str> {
    CELL_START
        .split(row)
        .skip(1)
        .map(|chunk| {
            let body = match chunk.find('>') {
                Some(pos) => &chunk[pos + 1..],
                None => "",
            };
            match CELL_END.find(body) {
                Some(end) => &body[..end.start()],
                None => body,
            }
        })
        .collect()
}

/// Text of the first element matched by `element`, else the whole cell's text
fn tagged_text(element: &Regex, cell: &str) -> String {
    let inner = element
        .captures(cell)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(cell);
    plain_text(inner)
}

fn plain_text(fragment: &str) -> String {
    let stripped = ANY_TAG.replace_all(fragment, "");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
