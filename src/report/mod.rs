//! Reporting utilities: rankings and formatted output.

pub mod format;

pub use format::*;

use std::cmp::Ordering;

use crate::domain::CompanyFit;

/// Companies ordered by R² (highest first), top-N.
///
/// Non-finite R² values sort last; ties keep header order.
pub fn rank_by_r2(fits: &[CompanyFit], top_n: usize) -> Vec<CompanyFit> {
    let mut sorted = fits.to_vec();
    sorted.sort_by(|a, b| compare_r2(a.fit.r2, b.fit.r2));
    sorted.truncate(top_n);
    sorted
}

fn compare_r2(a: f64, b: f64) -> Ordering {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}
