//! Multiple linear regression via the normal equations.
//!
//! Given a design matrix `X` (n observations × p explanatory columns) and a
//! dependent series `y`, we solve
//!
//! ```text
//! β = (XbᵀXb)⁻¹ Xbᵀ y,   Xb = [1 | X]
//! ```
//!
//! using the dense kernel in [`crate::math::matrix`]. `β[0]` is the intercept,
//! `β[1..]` are the slopes in column order.
//!
//! Implementation choices:
//! - Matrices are rebuilt on every call; there is no decomposition reuse.
//! - The inverse is plain Gauss-Jordan without row exchange. If any pivot is
//!   below `PIVOT_TOLERANCE` the design is reported as singular, which covers
//!   collinear columns and `n <= p`.

use crate::domain::MultipleFit;
use crate::error::RegressionError;
use crate::math::matrix::Matrix;

/// Fit `y = β0 + Σ βj·x_j` by ordinary least squares.
///
/// `x` must have one row per element of `y`. Too few observations for the
/// number of columns (`n <= p`) surfaces as `SingularDesignMatrix`.
pub fn multiple_regression(x: &Matrix, y: &[f64]) -> Result<MultipleFit, RegressionError> {
    if x.nrows() != y.len() {
        return Err(RegressionError::mismatch(
            "multiple_regression",
            format!("design has {} rows", x.nrows()),
            format!("y has {} values", y.len()),
        ));
    }
    let xb = with_intercept_column(x)?;
    let xt = xb.transpose();
    let xtx = xt.multiply(&xb)?;

    let xtx_inv = xtx.inverse()?.ok_or(RegressionError::SingularDesignMatrix)?;

    let xty = xt.multiply(&Matrix::column(y))?;
    let beta = xtx_inv.multiply(&xty)?;
    let coefficients = beta.as_slice();

    let fit = MultipleFit {
        intercept: coefficients[0],
        slopes: coefficients[1..].to_vec(),
        r2: 0.0,
    };
    let r2 = r_squared(&fit, x, y);

    Ok(MultipleFit { r2, ..fit })
}

/// `R² = 1 − SS_res / SS_tot`.
///
/// A constant `y` gives `SS_tot = 0` and therefore NaN or ±inf.
fn r_squared(fit: &MultipleFit, x: &Matrix, y: &[f64]) -> f64 {
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;

    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let y_hat = fit.predict(x.row(i));
        ss_tot += (yi - mean).powi(2);
        ss_res += (yi - y_hat).powi(2);
    }

    1.0 - ss_res / ss_tot
}

/// Prepend a column of ones.
fn with_intercept_column(x: &Matrix) -> Result<Matrix, RegressionError> {
    let (n, p) = x.shape();
    let mut values = Vec::with_capacity(n * (p + 1));
    for i in 0..n {
        values.push(1.0);
        values.extend_from_slice(x.row(i));
    }
    Matrix::from_row_slice(n, p + 1, &values)
}
