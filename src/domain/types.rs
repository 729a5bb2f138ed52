//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - rendered into the Markdown report

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which series plays the explanatory role in the per-company fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// x = company, y = index.
    IndexOnCompany,
    /// x = index, y = company (a "beta"-style reading).
    CompanyOnIndex,
}

impl Direction {
    /// Order `(company, index)` into `(x, y)`.
    pub fn xy<'a>(self, company: &'a [f64], index: &'a [f64]) -> (&'a [f64], &'a [f64]) {
        match self {
            Direction::IndexOnCompany => (company, index),
            Direction::CompanyOnIndex => (index, company),
        }
    }
}

/// One company price column, aligned with `PriceTable::dates`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanySeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Index and company prices on a common date axis.
///
/// Every series has exactly `dates.len()` values; position `i` is the same
/// date in all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub index_name: String,
    pub dates: Vec<NaiveDate>,
    pub index: Vec<f64>,
    pub companies: Vec<CompanySeries>,
}

impl PriceTable {
    pub fn n_obs(&self) -> usize {
        self.dates.len()
    }

    pub fn company_names(&self) -> Vec<String> {
        self.companies.iter().map(|c| c.name.clone()).collect()
    }
}

/// Result of a one-variable fit `y = intercept + slope·x`.
///
/// Values are not clamped: a constant series yields NaN / ±inf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleFit {
    pub slope: f64,
    pub intercept: f64,
    pub r2: f64,
}

/// Result of a multi-variable fit `y = intercept + Σ slopes[j]·x_j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleFit {
    pub intercept: f64,
    /// One slope per design column, in column order.
    pub slopes: Vec<f64>,
    pub r2: f64,
}

impl MultipleFit {
    /// Evaluate the fitted plane at one observation (without the leading 1).
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .slopes
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }
}

/// Simple fit for one named company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFit {
    pub company: String,
    pub fit: SimpleFit,
}

/// Multiple regression with the column names it was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointFit {
    pub columns: Vec<String>,
    pub fit: MultipleFit,
}

impl JointFit {
    /// `(column, slope)` pairs in column order.
    pub fn named_slopes(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.fit.slopes.iter().copied())
    }
}

/// Everything computed for one price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub direction: Direction,
    /// Per-company fits, in CSV header order.
    pub companies: Vec<CompanyFit>,
    /// Fit of the equal-weighted company average.
    pub average: SimpleFit,
    /// Joint fit of the index on all companies (absent when disabled).
    pub joint: Option<JointFit>,
}

/// A full run’s configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` / environment defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: PathBuf,
    pub report_path: PathBuf,
    pub direction: Direction,

    /// Inclusive date bounds.
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Restrict to these companies (case-insensitive). Empty keeps all.
    pub companies: Vec<String>,

    pub joint: bool,
    pub top_n: usize,

    pub export_results: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// Settings for the synthetic price generator.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub out_path: PathBuf,
    pub seed: u64,
    pub n_days: usize,
    pub n_companies: usize,
    pub start_date: NaiveDate,
    pub index_name: String,
    pub index_start: f64,
    /// Daily log-return volatility of the index.
    pub index_vol: f64,
    /// Idiosyncratic noise as a fraction of the company's mean price.
    pub noise: f64,
}

/// A saved run (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    pub source: String,
    pub index: String,
    pub n_obs: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub analysis: Analysis,
}
