//! Test utilities and mock infrastructure for source fetching
//!
//! [`MockTextSource`] serves canned documents by URL prefix so fetchers and
//! pipelines can be exercised without a network.

use crate::app::services::source_fetcher::TextSource;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

mod fetcher_tests;

/// In-memory text source keyed by URL prefix (longest prefix wins)
#[derive(Debug, Default)]
pub struct MockTextSource {
    documents: HashMap<String, String>,
    failures: Vec<String>,
    requests: Mutex<Vec<String>>,
}

impl MockTextSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for any URL starting with `prefix`
    pub fn with_document(mut self, prefix: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents.insert(prefix.into(), body.into());
        self
    }

    /// Serve `body` for one station of the daily export
    pub fn with_station(self, base_url: &str, station_id: &str, body: impl Into<String>) -> Self {
        self.with_document(station_prefix(base_url, station_id), body)
    }

    /// Fail with a fetch error for one station of the daily export
    pub fn with_station_failure(mut self, base_url: &str, station_id: &str) -> Self {
        self.failures.push(station_prefix(base_url, station_id));
        self
    }

    /// Every URL requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> Result<String> {
        if self.failures.iter().any(|prefix| url.starts_with(prefix)) {
            return Err(Error::fetch(url, "simulated connection reset", None));
        }

        self.documents
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, body)| body.clone())
            .ok_or_else(|| Error::fetch(url, "HTTP status 404 Not Found", None))
    }
}

impl TextSource for MockTextSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.lookup(url)
    }
}

fn station_prefix(base_url: &str, station_id: &str) -> String {
    format!("{}?station_id={}&", base_url, station_id)
}

/// Helper to create a listing page with a header row, a section title row,
/// and three reservoirs
pub fn create_test_listing_html() -> String {
    r#"<html><body>
<table>
<tr><th>Reservoir</th><th>Station</th><th>Capacity</th></tr>
<tr><td colspan="3">Sacramento River Basin</td></tr>
<tr>
  <td><a href="/cgi-progs/queryDaily?SHA">Shasta</a></td>
  <td align="center"><b>SHA</b></td>
  <td>4552000</td>
</tr>
<tr>
  <td><a href="/cgi-progs/queryDaily?ORO">Oroville</a></td>
  <td align="center"><b>ORO</b></td>
  <td>3537577</td>
</tr>
<tr>
  <td><a href="/cgi-progs/queryDaily?FOL">Folsom &amp; Natoma</a></td>
  <td align="center"><b>FOL</b></td>
  <td>977000</td>
</tr>
</table>
</body></html>"#
        .to_string()
}
