//! Write run outputs to disk.
//!
//! - per-company CSV (easy to consume in spreadsheets)
//! - full results JSON (`domain::ResultsFile`)
//! - the Markdown report produced by `report::format_markdown_report`

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{Analysis, ResultsFile};
use crate::error::AppError;
use crate::io::ingest::IngestedData;

/// Row label used for the company-average fit in the CSV export.
pub const AVERAGE_ROW: &str = "__average__";

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    company: &'a str,
    slope: f64,
    intercept: f64,
    r2: f64,
}

/// Write per-company fits (plus the average fit) to a CSV file.
pub fn write_results_csv(path: &Path, analysis: &Analysis) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let rows = analysis
        .companies
        .iter()
        .map(|c| (c.company.as_str(), &c.fit))
        .chain(std::iter::once((AVERAGE_ROW, &analysis.average)));

    for (company, fit) in rows {
        writer
            .serialize(ResultRow {
                company,
                slope: fit.slope,
                intercept: fit.intercept,
                r2: fit.r2,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the full analysis plus run metadata as pretty JSON.
///
/// Non-finite numbers are written as `null`.
pub fn write_results_json(path: &Path, analysis: &Analysis, ingest: &IngestedData, source: &Path) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create results JSON '{}': {e}", path.display())))?;

    let results = ResultsFile {
        tool: "regress".to_string(),
        source: source.display().to_string(),
        index: ingest.table.index_name.clone(),
        n_obs: ingest.stats.n_rows,
        first_date: ingest.stats.first_date,
        last_date: ingest.stats.last_date,
        analysis: analysis.clone(),
    };

    serde_json::to_writer_pretty(file, &results)
        .map_err(|e| AppError::new(2, format!("Failed to write results JSON: {e}")))?;

    Ok(())
}

/// Write the rendered Markdown report.
pub fn write_report(path: &Path, content: &str) -> Result<(), AppError> {
    std::fs::write(path, content)
        .map_err(|e| AppError::new(2, format!("Failed to write report '{}': {e}", path.display())))
}
