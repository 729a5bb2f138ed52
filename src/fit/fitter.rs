//! Fit all regressions for a [`PriceTable`].
//!
//! Per-company fits are independent, so they run on the rayon pool. Each call
//! only borrows its own immutable slices; results come back in header order.

use rayon::prelude::*;

use crate::domain::{Analysis, CompanyFit, Direction, JointFit, PriceTable, SimpleFit};
use crate::error::RegressionError;
use crate::math::{Matrix, mean_series, multiple_regression, simple_regression};

/// Run the per-company, average, and (optionally) joint regressions.
pub fn analyze(table: &PriceTable, direction: Direction, joint: bool) -> Result<Analysis, RegressionError> {
    let companies = fit_companies(table, direction)?;
    log::debug!("Fitted {} company regressions", companies.len());

    let average = fit_average(table, direction)?;

    let joint = if joint {
        let fit = fit_joint(table)?;
        log::debug!("Joint regression R^2 = {:.4}", fit.fit.r2);
        Some(fit)
    } else {
        None
    };

    Ok(Analysis {
        direction,
        companies,
        average,
        joint,
    })
}

/// Simple regression of each company against the index.
pub fn fit_companies(table: &PriceTable, direction: Direction) -> Result<Vec<CompanyFit>, RegressionError> {
    table
        .companies
        .par_iter()
        .map(|company| -> Result<CompanyFit, RegressionError> {
            let (x, y) = direction.xy(&company.values, &table.index);
            let fit = simple_regression(x, y)?;
            if !fit.slope.is_finite() || !fit.r2.is_finite() {
                log::warn!("Regression for `{}` is degenerate (constant series?)", company.name);
            }
            Ok(CompanyFit {
                company: company.name.clone(),
                fit,
            })
        })
        .collect()
}

/// Simple regression of the equal-weighted company average against the index.
pub fn fit_average(table: &PriceTable, direction: Direction) -> Result<SimpleFit, RegressionError> {
    let series: Vec<&[f64]> = table.companies.iter().map(|c| c.values.as_slice()).collect();
    let average = mean_series(&series)?;
    if average.len() != table.index.len() {
        return Err(RegressionError::mismatch(
            "fit_average",
            format!("average has {} values", average.len()),
            format!("index has {} values", table.index.len()),
        ));
    }
    let (x, y) = direction.xy(&average, &table.index);
    simple_regression(x, y)
}

/// Multiple regression of the index on all company columns.
///
/// Fails with `SingularDesignMatrix` when companies are collinear or when
/// there are not more observations than companies.
pub fn fit_joint(table: &PriceTable) -> Result<JointFit, RegressionError> {
    let design = design_matrix(table)?;
    let fit = multiple_regression(&design, &table.index)?;
    Ok(JointFit {
        columns: table.company_names(),
        fit,
    })
}

/// `n × p` matrix with one row per date and one column per company.
pub fn design_matrix(table: &PriceTable) -> Result<Matrix, RegressionError> {
    let n = table.n_obs();
    let p = table.companies.len();
    let mut values = Vec::with_capacity(n * p);
    for i in 0..n {
        for company in &table.companies {
            let v = company.values.get(i).copied().ok_or_else(|| {
                RegressionError::mismatch(
                    "design_matrix",
                    format!("{n} dates"),
                    format!("`{}` has {} values", company.name, company.values.len()),
                )
            })?;
            values.push(v);
        }
    }
    Matrix::from_row_slice(n, p, &values)
}
