//! Synthetic index / company price generation.
//!
//! The index follows a geometric random walk over business days. Each company
//! is a noisy affine function of the index,
//!
//! ```text
//! price_k(t) = alpha_k + beta_k · index(t) + noise_k(t)
//! ```
//!
//! so the regressions have a known answer to aim at. Generation is fully
//! determined by `SampleConfig::seed`.

use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CompanySeries, PriceTable, SampleConfig};
use crate::error::AppError;

/// Generated table plus the true per-company coefficients.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub table: PriceTable,
    pub alphas: Vec<f64>,
    pub betas: Vec<f64>,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.n_days < 2 {
        return Err(AppError::new(2, "Sample needs at least 2 days."));
    }
    if config.n_companies == 0 {
        return Err(AppError::new(2, "Sample needs at least 1 company."));
    }
    if !(config.index_start.is_finite() && config.index_start > 0.0) {
        return Err(AppError::new(2, "Index start level must be finite and > 0."));
    }
    if !(config.index_vol.is_finite() && config.index_vol >= 0.0) {
        return Err(AppError::new(2, "Index volatility must be finite and >= 0."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise level must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let dates = business_days(config.start_date, config.n_days);

    let mut index = Vec::with_capacity(config.n_days);
    let mut level = config.index_start;
    for _ in 0..config.n_days {
        index.push(round_cents(level));
        let z: f64 = normal.sample(&mut rng);
        // Drift-free in expectation: subtract the lognormal mean correction.
        level *= (config.index_vol * z - 0.5 * config.index_vol * config.index_vol).exp();
    }

    let mut alphas = Vec::with_capacity(config.n_companies);
    let mut betas = Vec::with_capacity(config.n_companies);
    let mut companies = Vec::with_capacity(config.n_companies);

    for k in 0..config.n_companies {
        let beta = rng.gen_range(0.01..0.25);
        let alpha = rng.gen_range(-500.0..2000.0);
        let mean_price = alpha + beta * config.index_start;
        let sigma = config.noise * mean_price.abs().max(1.0);

        let values = index
            .iter()
            .map(|&ix| round_cents(alpha + beta * ix + sigma * normal.sample(&mut rng)))
            .collect();

        alphas.push(alpha);
        betas.push(beta);
        companies.push(CompanySeries {
            name: format!("company_{:02}", k + 1),
            values,
        });
    }

    Ok(SampleData {
        table: PriceTable {
            index_name: config.index_name.clone(),
            dates,
            index,
            companies,
        },
        alphas,
        betas,
    })
}

/// Write a table in the ingest layout: `date,<index>,<company>...`.
pub fn write_sample_csv(path: &Path, table: &PriceTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;

    let mut header = vec!["date".to_string(), table.index_name.clone()];
    header.extend(table.company_names());
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV header: {e}")))?;

    let n = table.dates.len();
    if let Some(len) = std::iter::once(table.index.len())
        .chain(table.companies.iter().map(|c| c.values.len()))
        .find(|&len| len != n)
    {
        return Err(AppError::new(
            2,
            format!("Sample table is ragged: {n} dates but a series has {len} values."),
        ));
    }

    for (i, (date, index_value)) in table.dates.iter().zip(&table.index).enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string(), format!("{index_value:.2}")];
        record.extend(
            table
                .companies
                .iter()
                .filter_map(|c| c.values.get(i))
                .map(|v| format!("{v:.2}")),
        );
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

/// `n` consecutive weekdays starting at `start` (rolled forward off a weekend).
fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut day = start;
    while out.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    out
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::domain::{Direction, RunConfig};
    use crate::fit::fit_companies;
    use crate::io::ingest::load_price_table;

    fn config() -> SampleConfig {
        SampleConfig {
            out_path: PathBuf::from("sample.csv"),
            seed: 42,
            n_days: 250,
            n_companies: 4,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(), // a Saturday
            index_name: "index".to_string(),
            index_start: 30_000.0,
            index_vol: 0.01,
            noise: 0.002,
        }
    }

    #[test]
    fn same_seed_same_sample() {
        let a = generate_sample(&config()).unwrap();
        let b = generate_sample(&config()).unwrap();
        assert_eq!(a.table, b.table);

        let mut other = config();
        other.seed = 7;
        let c = generate_sample(&other).unwrap();
        assert_ne!(a.table.index, c.table.index);
    }

    #[test]
    fn dates_skip_weekends() {
        let sample = generate_sample(&config()).unwrap();
        let dates = &sample.table.dates;
        assert_eq!(dates.len(), 250);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert!(dates.iter().all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn company_on_index_fit_recovers_betas() {
        let sample = generate_sample(&config()).unwrap();
        let fits = fit_companies(&sample.table, Direction::CompanyOnIndex).unwrap();
        for (fit, beta) in fits.iter().zip(&sample.betas) {
            assert!((fit.fit.slope - beta).abs() < 0.02, "{} vs {beta}", fit.fit.slope);
            assert!(fit.fit.r2 > 0.3);
        }
    }

    #[test]
    fn written_csv_reads_back_identically() {
        let sample = generate_sample(&config()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        write_sample_csv(&path, &sample.table).unwrap();

        let run = RunConfig {
            csv_path: path,
            report_path: dir.path().join("results.md"),
            direction: Direction::IndexOnCompany,
            date_from: None,
            date_to: None,
            companies: Vec::new(),
            joint: true,
            top_n: 10,
            export_results: None,
            export_json: None,
        };
        let ingest = load_price_table(&run).unwrap();
        assert!(ingest.row_errors.is_empty());
        assert_eq!(ingest.table, sample.table);
    }

    #[test]
    fn ragged_table_is_an_error_not_a_panic() {
        let mut sample = generate_sample(&config()).unwrap();
        sample.table.companies[2].values.pop();
        let dir = tempfile::tempdir().unwrap();
        let err = write_sample_csv(&dir.path().join("sample.csv"), &sample.table).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("ragged"));
    }

    #[test]
    fn rejects_degenerate_settings() {
        let mut cfg = config();
        cfg.n_days = 1;
        assert_eq!(generate_sample(&cfg).unwrap_err().exit_code(), 2);

        let mut cfg = config();
        cfg.n_companies = 0;
        assert_eq!(generate_sample(&cfg).unwrap_err().exit_code(), 2);

        let mut cfg = config();
        cfg.noise = f64::NAN;
        assert_eq!(generate_sample(&cfg).unwrap_err().exit_code(), 2);
    }
}
