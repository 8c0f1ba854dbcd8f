//! Ordinary least-squares trend fitting
//!
//! Fits `value = rate * x + intercept` to a series, where `x` is the point's
//! date on the fitting axis (ordinal day for daily series, fractional year for
//! the sea level record). The fit is direct and unweighted; x values are
//! centred on their mean before solving the normal equations so large ordinal
//! day counts do not lose precision.

use crate::app::models::{AxisValue, FittedLine, SeriesPoint};
use crate::{Error, Result};
use tracing::debug;

/// Sign constraint applied to a fitted rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignPolicy {
    /// Storage series must be draining
    MustDecrease,
    Unconstrained,
}

/// Fit a line to `points` and check the rate against `policy`
pub fn fit_line<D: AxisValue>(points: &[SeriesPoint<D>], policy: SignPolicy) -> Result<FittedLine> {
    if points.is_empty() {
        return Err(Error::trend("cannot fit a line to an empty series"));
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x()).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.value).sum::<f64>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), p| {
        let dx = p.x() - mean_x;
        (sxx + dx * dx, sxy + dx * (p.value - mean_y))
    });

    if sxx == 0.0 {
        return Err(Error::trend(format!(
            "all {} points share one x value; slope is undefined",
            points.len()
        )));
    }

    let rate = sxy / sxx;
    let intercept = mean_y - rate * mean_x;

    if !rate.is_finite() || !intercept.is_finite() {
        return Err(Error::trend("fit produced a non-finite line"));
    }

    debug!(
        "Fitted {} points: rate={:e}, intercept={:e}",
        points.len(),
        rate,
        intercept
    );

    if policy == SignPolicy::MustDecrease && rate >= 0.0 {
        return Err(Error::trend(format!("rate must be negative, got {}", rate)));
    }

    Ok(FittedLine::new(rate, intercept))
}
