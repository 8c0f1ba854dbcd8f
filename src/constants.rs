//! Application constants for the catastrophe clock
//!
//! Upstream endpoints, text-format markers, catastrophe defaults and
//! worker pool limits used throughout the application.

// =============================================================================
// Upstream Sources
// =============================================================================

/// CDEC page listing every reservoir that reports daily storage
pub const RESERVOIR_LISTING_URL: &str = "http://cdec.water.ca.gov/misc/daily_res.html";

/// CDEC daily CSV export, queried per station
pub const STATION_CSV_URL: &str = "http://cdec.water.ca.gov/cgi-progs/getDailyCSV";

/// NASA global mean sea level record
pub const SEA_LEVEL_URL: &str =
    "http://climate.nasa.gov/system/internal_resources/details/original/121_Global_Sea_Level_Data_File.txt";

/// CDEC sensor number for reservoir storage (acre-feet)
pub const STORAGE_SENSOR_NUM: u32 = 15;

/// CDEC duration code for daily values
pub const DAILY_DURATION_CODE: &str = "D";

// =============================================================================
// Text Formats
// =============================================================================

/// CDEC export lines starting with this character are metadata
pub const WATER_LEVEL_COMMENT_CHAR: u8 = b'\'';

/// CDEC marker for a missing daily value
pub const WATER_LEVEL_MISSING_MARKER: &str = "m";

/// Column holding the year in a CDEC export line
pub const WATER_LEVEL_YEAR_COLUMN: usize = 2;

/// Column holding the month in a CDEC export line
pub const WATER_LEVEL_MONTH_COLUMN: usize = 3;

/// First daily value column; day-of-month is the offset from here plus one
pub const WATER_LEVEL_FIRST_DAY_COLUMN: usize = 4;

/// Token present on every header line of the sea level file
pub const SEA_LEVEL_HEADER_MARKER: &str = "HDR";

/// Token index of the fractional year in a sea level data line
pub const SEA_LEVEL_YEAR_TOKEN: usize = 2;

/// Token index of the smoothed GIA-adjusted deviation (mm)
pub const SEA_LEVEL_DEVIATION_TOKEN: usize = 11;

/// Values at or above this are the upstream placeholder for "no data"
pub const SEA_LEVEL_MISSING_SENTINEL: f64 = 99900.0;

/// Message carried by a parse error when nothing usable was found
pub const NO_USABLE_DATA: &str = "no usable data";

// =============================================================================
// Catastrophe Defaults
// =============================================================================

/// Job identifiers used in logs, errors and reports
pub const DEPLETION_JOB: &str = "reservoir-depletion";
pub const SUBMERSION_JOB: &str = "coastal-submersion";

/// Record name for the reservoir depletion estimate
pub const DEPLETION_CATASTROPHE_NAME: &str = "California dries up";

pub const DEPLETION_DESCRIPTION: &str =
    "Combined storage of California's reporting reservoirs reaches zero at the current rate of decline.";

/// Record name for the coastal submersion estimate
pub const SUBMERSION_CATASTROPHE_NAME: &str = "Miami sinks";

pub const SUBMERSION_DESCRIPTION: &str =
    "Global mean sea level rises past Miami's average elevation at the current rate of increase.";

/// Miami's average elevation in millimetres
pub const MIAMI_ELEVATION_MM: f64 = 1828.0;

/// First day requested from each reservoir station
pub const DEFAULT_START_YEAR: i32 = 2012;
pub const DEFAULT_START_MONTH: u32 = 1;
pub const DEFAULT_START_DAY: u32 = 1;

/// Name given to the synthetic station holding the summed series
pub const META_STATION_ID: &str = "META";

// =============================================================================
// Calendar Approximation
// =============================================================================

pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Fixed month length used when turning a fractional year into a date
pub const APPROX_DAYS_PER_MONTH: f64 = 30.5;

/// Mean Julian year used by the days-from-now cross-check
pub const DAYS_PER_YEAR: f64 = 365.25;

// =============================================================================
// Fetching and Concurrency
// =============================================================================

/// Upper bound on concurrent station fetches
pub const DEFAULT_MAX_WORKERS: usize = 16;

/// Hard ceiling accepted from configuration
pub const MAX_WORKERS_LIMIT: usize = 100;

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_USER_AGENT: &str = concat!("catastrophe-clock/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Paths and Environment
// =============================================================================

/// Directory name under the platform config/data directories
pub const APP_DIR_NAME: &str = "catastrophe-clock";

pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const STORE_FILE_NAME: &str = "catastrophes.json";

pub const ENV_STORE_PATH: &str = "CATASTROPHE_CLOCK_STORE";

pub const ENV_MAX_WORKERS: &str = "CATASTROPHE_CLOCK_MAX_WORKERS";
