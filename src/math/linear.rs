//! Simple (one explanatory variable) least squares.
//!
//! Closed form from running sums:
//!
//! ```text
//! slope     = (nΣxy − ΣxΣy) / (nΣx² − (Σx)²)
//! intercept = (Σy − slope·Σx) / n
//! r         = (nΣxy − ΣxΣy) / sqrt((nΣx² − (Σx)²)(nΣy² − (Σy)²))
//! ```
//!
//! A constant `x` or `y` makes a denominator zero. The resulting NaN / ±inf is
//! returned as-is: the regression is undefined and the caller should see that.

use crate::domain::SimpleFit;
use crate::error::RegressionError;

/// Running sums over paired observations.
#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    x: f64,
    y: f64,
    xy: f64,
    x2: f64,
    y2: f64,
}

impl Sums {
    fn accumulate(x: &[f64], y: &[f64]) -> Self {
        x.iter().zip(y).fold(Sums::default(), |acc, (&xi, &yi)| Sums {
            x: acc.x + xi,
            y: acc.y + yi,
            xy: acc.xy + xi * yi,
            x2: acc.x2 + xi * xi,
            y2: acc.y2 + yi * yi,
        })
    }
}

/// Fit `y = intercept + slope·x` by ordinary least squares.
///
/// Requires `x.len() == y.len() >= 2`.
pub fn simple_regression(x: &[f64], y: &[f64]) -> Result<SimpleFit, RegressionError> {
    if x.len() != y.len() {
        return Err(RegressionError::mismatch(
            "simple_regression",
            format!("x has {} values", x.len()),
            format!("y has {} values", y.len()),
        ));
    }
    if x.len() < 2 {
        return Err(RegressionError::InsufficientObservations {
            needed: 2,
            got: x.len(),
        });
    }

    let n = x.len() as f64;
    let s = Sums::accumulate(x, y);

    let cov = n * s.xy - s.x * s.y;
    let var_x = n * s.x2 - s.x * s.x;
    let var_y = n * s.y2 - s.y * s.y;

    let slope = cov / var_x;
    let intercept = (s.y - slope * s.x) / n;
    let r2 = (cov / (var_x * var_y).sqrt()).powi(2);

    Ok(SimpleFit { slope, intercept, r2 })
}

/// Element-wise mean across several aligned series.
///
/// Returns an empty vector when `series` is empty.
pub fn mean_series(series: &[&[f64]]) -> Result<Vec<f64>, RegressionError> {
    let Some(first) = series.first() else {
        return Ok(Vec::new());
    };
    let n = first.len();
    if let Some(bad) = series.iter().find(|s| s.len() != n) {
        return Err(RegressionError::mismatch(
            "mean_series",
            format!("{n} values"),
            format!("{} values", bad.len()),
        ));
    }

    let k = series.len() as f64;
    Ok((0..n)
        .map(|i| series.iter().map(|s| s[i]).sum::<f64>() / k)
        .collect())
}
