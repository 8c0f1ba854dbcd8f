//! Test utilities for text-table parser testing
//!
//! Payload builders shared by the water level and sea level test modules.

mod water_level_tests;

/// Helper to create a CDEC export covering two months of one station
pub fn create_test_water_level_payload() -> String {
    r#"'Daily storage for station SHA, sensor 15
'Shasta Dam, units AF
SHA,15,2015,6,4000,3990,m,3970
SHA,15,2015,7,3900,m,3880"#
        .to_string()
}

/// Helper to create a sea level payload with preamble, header block and data
pub fn create_test_sea_level_payload() -> String {
    let mut payload = String::new();
    payload.push_str("Global Mean Sea Level Data\n");
    payload.push_str("Source: TOPEX/Poseidon, Jason-1, OSTM/Jason-2\n");
    payload.push_str("HDR Global Mean Sea Level Data\n");
    payload.push_str("HDR column 3 = year+fraction of year\n");
    payload.push_str("HDR column 12 = smoothed GMSL variation (mm), GIA applied\n");
    payload.push_str(&sea_level_line(1993.0, -38.0));
    payload.push_str(&sea_level_line(1994.0, -35.0));
    payload.push_str(&sea_level_line(1995.0, -32.0));
    payload
}

/// Format one sea level data line with twelve tokens
pub fn sea_level_line(year: f64, deviation_mm: f64) -> String {
    format!(
        "0 11 {:.4} 466462 337277.00 -37.24 92.66 -37.02 -37.26 92.61 -37.04 {:.2}\n",
        year, deviation_mm
    )
}
