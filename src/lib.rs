//! Catastrophe Clock Library
//!
//! Estimates the date of slow-moving catastrophes by fitting a straight line to
//! public time-series data and extrapolating it to a threshold crossing.
//!
//! This library provides tools for:
//! - Fetching the California CDEC reservoir listing and per-station storage exports
//! - Fetching the global mean sea level record
//! - Parsing both ad-hoc text formats into uniform date/value series
//! - Summing per-station series into a single aggregate series
//! - Least-squares trend fitting and threshold extrapolation
//! - Upserting the computed arrival date into a result store

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod aggregator;
        pub mod extrapolator;
        pub mod pipeline;
        pub mod result_sink;
        pub mod source_fetcher;
        pub mod text_parser;
        pub mod trend_fitter;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CatastropheRecord, FittedLine, FractionalYear, SeriesPoint, Station};
pub use config::Config;

/// Result type alias for the catastrophe clock
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for fetching, parsing, fitting and storing catastrophe estimates
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Network or transport failure while retrieving a source document
    #[error("Fetch error for '{url}': {message}")]
    Fetch {
        url: String,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Malformed payload, or a payload that produced no points
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// Fitted rate has the wrong sign for the series being fitted
    #[error("Trend error: {message}")]
    Trend { message: String },

    /// The fitted line never crosses the threshold at a representable date
    #[error("Threshold crossing undefined: {message}")]
    CrossingUndefined { message: String },

    /// A whole job produced nothing usable
    #[error("No usable data for job '{job}': {message}")]
    NoUsableData { job: String, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Result store could not be read or written
    #[error("Result store error: {message}")]
    Store { message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create a fetch error with an optional transport source
    pub fn fetch(
        url: impl Into<String>,
        message: impl Into<String>,
        source: Option<reqwest::Error>,
    ) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a parse error for the named payload
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a trend error
    pub fn trend(message: impl Into<String>) -> Self {
        Self::Trend {
            message: message.into(),
        }
    }

    /// Create a crossing undefined error
    pub fn crossing_undefined(message: impl Into<String>) -> Self {
        Self::CrossingUndefined {
            message: message.into(),
        }
    }

    /// Create a no usable data error for a job
    pub fn no_usable_data(job: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NoUsableData {
            job: job.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a result store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Self::Fetch {
            url,
            message: "HTTP request failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Store {
            message: format!("JSON serialization failed: {}", error),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid TOML: {}", error),
        }
    }
}
