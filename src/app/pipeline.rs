//! Shared regression pipeline.
//!
//! CSV ingest -> per-company / average / joint regressions.
//!
//! The `run` and `summary` commands only differ in what they do with the
//! result, so the workflow lives here.

use crate::domain::{Analysis, RunConfig};
use crate::error::AppError;
use crate::fit::analyze;
use crate::io::ingest::{IngestedData, load_price_table};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub analysis: Analysis,
}

/// Load the CSV named in `config` and run every regression.
pub fn run_analysis(config: &RunConfig) -> Result<RunOutput, AppError> {
    let ingest = load_price_table(config)?;
    log::info!(
        "Loaded {} rows x {} companies from '{}' ({} rejected)",
        ingest.rows_used,
        ingest.stats.n_companies,
        config.csv_path.display(),
        ingest.row_errors.len()
    );

    run_analysis_with_data(config, ingest)
}

/// Run every regression on already-ingested data.
pub fn run_analysis_with_data(config: &RunConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    if ingest.table.companies.is_empty() {
        return Err(AppError::new(2, "No company columns selected."));
    }

    let analysis = analyze(&ingest.table, config.direction, config.joint).map_err(|e| {
        log::error!("Regression failed: {e}");
        AppError::from(e)
    })?;
    log::info!("Fitted {} companies", analysis.companies.len());

    Ok(RunOutput { ingest, analysis })
}
