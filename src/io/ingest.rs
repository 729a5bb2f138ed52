//! CSV ingest and validation.
//!
//! This module turns a wide price CSV
//!
//! ```text
//! date,<index>,<company 1>,<company 2>,...
//! ```
//!
//! into an aligned [`PriceTable`].
//!
//! Design goals:
//! - **Strict schema** for the header (clear errors + exit code 2)
//! - **Row-level validation**: a row with any bad cell is dropped as a whole, so
//!   every series keeps the same date alignment; dropped rows are reported
//! - **Separation of concerns**: no regression logic here

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;

use crate::domain::{CompanySeries, PriceTable, RunConfig};
use crate::error::AppError;

/// Summary stats about the rows actually used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub n_companies: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub index_min: f64,
    pub index_max: f64,
}

/// A row that was rejected during ingest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based line number in the CSV file.
    pub line: usize,
    pub message: String,
}

/// Ingest output: aligned table + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub table: PriceTable,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Resolved column layout.
#[derive(Debug, Clone)]
struct Layout {
    index_name: String,
    /// `(csv column, company name)` for the selected companies.
    companies: Vec<(usize, String)>,
    width: usize,
}

/// Load the CSV named in `config`, applying date and company filters.
pub fn load_price_table(config: &RunConfig) -> Result<IngestedData, AppError> {
    let file = File::open(&config.csv_path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open CSV '{}': {e}", config.csv_path.display()),
        )
    })?;
    read_price_table(file, config)
}

/// Same as [`load_price_table`], reading from any source.
pub fn read_price_table<R: Read>(source: R, config: &RunConfig) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let layout = resolve_layout(&headers, &config.companies)?;
    log::debug!(
        "CSV layout: index `{}`, {} companies selected",
        layout.index_name,
        layout.companies.len()
    );

    let mut dates = Vec::new();
    let mut index = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); layout.companies.len()];
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // The reader skips blank lines, so the file line comes from its
        // position. Fallback: header on line 1, records from line 2.
        let fallback = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map_or(fallback, |p| p.line() as usize);
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let line = record.position().map_or(fallback, |p| p.line() as usize);

        let (date, index_value, values) = match parse_row(&record, &layout) {
            Ok(parsed) => parsed,
            Err(message) => {
                row_errors.push(RowError { line, message });
                continue;
            }
        };

        if !within(date, config.date_from, config.date_to) {
            continue;
        }

        dates.push(date);
        index.push(index_value);
        for (column, value) in columns.iter_mut().zip(values) {
            column.push(value);
        }
    }

    for err in &row_errors {
        log::warn!("Skipping CSV line {}: {}", err.line, err.message);
    }

    let rows_used = dates.len();
    if rows_used < 2 {
        return Err(AppError::new(
            3,
            format!("Need at least 2 valid rows after validation/filtering, found {rows_used}."),
        ));
    }

    let companies: Vec<CompanySeries> = layout
        .companies
        .into_iter()
        .zip(columns)
        .map(|((_, name), values)| CompanySeries { name, values })
        .collect();

    let table = PriceTable {
        index_name: layout.index_name,
        dates,
        index,
        companies,
    };

    let stats = compute_stats(&table).ok_or_else(|| AppError::new(3, "No valid rows remain after validation."))?;

    Ok(IngestedData {
        table,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn resolve_layout(headers: &StringRecord, selected: &[String]) -> Result<Layout, AppError> {
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();

    if names.len() < 3 {
        return Err(AppError::new(
            2,
            "CSV header needs at least 3 columns: date, index, and one or more companies.",
        ));
    }

    let index_name = names[1].clone();
    if index_name.is_empty() {
        return Err(AppError::new(2, "CSV header: the index column (column 2) has no name."));
    }

    let mut seen = HashSet::new();
    for (col, name) in names.iter().enumerate().skip(2) {
        if name.is_empty() {
            return Err(AppError::new(
                2,
                format!("CSV header: company column {} has no name.", col + 1),
            ));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(AppError::new(2, format!("CSV header: duplicate company column `{name}`.")));
        }
    }

    for wanted in selected {
        let found = names
            .iter()
            .skip(2)
            .any(|n| n.eq_ignore_ascii_case(wanted.trim()));
        if !found {
            return Err(AppError::new(
                2,
                format!("Unknown company `{wanted}` (not in the CSV header)."),
            ));
        }
    }

    let companies: Vec<(usize, String)> = names
        .iter()
        .enumerate()
        .skip(2)
        .filter(|(_, name)| {
            selected.is_empty() || selected.iter().any(|s| name.eq_ignore_ascii_case(s.trim()))
        })
        .map(|(col, name)| (col, name.clone()))
        .collect();

    Ok(Layout {
        index_name,
        companies,
        width: names.len(),
    })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn parse_row(record: &StringRecord, layout: &Layout) -> Result<(NaiveDate, f64, Vec<f64>), String> {
    if record.len() != layout.width {
        return Err(format!(
            "Expected {} fields, found {}.",
            layout.width,
            record.len()
        ));
    }

    let date = parse_date(record.get(0).unwrap_or(""))?;
    let index = parse_value(record.get(1).unwrap_or(""), &layout.index_name)?;

    let values = layout
        .companies
        .iter()
        .map(|(col, name)| parse_value(record.get(*col).unwrap_or(""), name))
        .collect::<Result<Vec<f64>, String>>()?;

    Ok((date, index, values))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are preferred, but exports from Japanese and European tools
    // commonly use slashes or day-first order.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY."
    ))
}

fn parse_value(s: &str, column: &str) -> Result<f64, String> {
    if s.is_empty() {
        return Err(format!("Missing value for `{column}`."));
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid number '{s}' for `{column}`.")),
    }
}

fn within(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
}

fn compute_stats(table: &PriceTable) -> Option<DatasetStats> {
    let first_date = *table.dates.iter().min()?;
    let last_date = *table.dates.iter().max()?;
    let index_min = table.index.iter().copied().fold(f64::INFINITY, f64::min);
    let index_max = table.index.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(DatasetStats {
        n_rows: table.n_obs(),
        n_companies: table.companies.len(),
        first_date,
        last_date,
        index_min,
        index_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    use crate::domain::Direction;

    fn config() -> RunConfig {
        RunConfig {
            csv_path: PathBuf::from("data.csv"),
            report_path: PathBuf::from("results.md"),
            direction: Direction::IndexOnCompany,
            date_from: None,
            date_to: None,
            companies: Vec::new(),
            joint: true,
            top_n: 10,
            export_results: None,
            export_json: None,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const CSV: &str = "\
date,nk225,toyota,sony
2024-01-04,33288.29,2750.0,14295.0
2024-01-05,33377.42,2755.5,14320.0
2024-01-09,33763.18,2780.0,14500.0
2024-01-10,34441.72,2811.0,14720.0
";

    #[test]
    fn reads_wide_csv_into_aligned_table() {
        let data = read_price_table(CSV.as_bytes(), &config()).unwrap();
        let table = &data.table;
        assert_eq!(table.index_name, "nk225");
        assert_eq!(table.n_obs(), 4);
        assert_eq!(table.company_names(), vec!["toyota", "sony"]);
        assert_eq!(table.companies[1].values[2], 14500.0);
        assert_eq!(table.dates[0], ymd(2024, 1, 4));
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.rows_used, 4);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.stats.first_date, ymd(2024, 1, 4));
        assert_eq!(data.stats.last_date, ymd(2024, 1, 10));
        assert_eq!(data.stats.index_max, 34441.72);
    }

    #[test]
    fn bad_rows_are_dropped_whole() {
        let csv = "\
date,idx,a,b
2024-01-01,10,1,2
2024-01-02,11,oops,3
2024-01-03,12,3
not-a-date,13,4,5
2024-01-05,14,5,inf
2024-01-06,15,6,7
";
        let data = read_price_table(csv.as_bytes(), &config()).unwrap();
        assert_eq!(data.rows_read, 6);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.table.index, vec![10.0, 15.0]);
        assert_eq!(data.table.companies[0].values, vec![1.0, 6.0]);
        assert_eq!(data.table.companies[1].values, vec![2.0, 7.0]);

        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6]);
        assert!(data.row_errors[0].message.contains("`a`"));
        assert!(data.row_errors[1].message.contains("Expected 4 fields"));
    }

    #[test]
    fn rejected_rows_report_file_lines_across_blank_lines() {
        let csv = "date,idx,a\n2024-01-01,1,2\n\n\n2024-01-02,2,oops\n2024-01-03,3,6\n\n2024-01-04\n2024-01-05,5,10\n";
        let data = read_price_table(csv.as_bytes(), &config()).unwrap();
        assert_eq!(data.rows_used, 3);

        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![5, 8]);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let csv = "date,idx,a\n2024-01-01,1,2\n\n2024-01-02,2,4\n\n";
        let data = read_price_table(csv.as_bytes(), &config()).unwrap();
        assert_eq!(data.rows_used, 2);
        assert!(data.row_errors.is_empty());
    }

    #[test]
    fn header_bom_is_stripped() {
        let csv = "\u{feff}date,idx,a\n2024-01-01,1,2\n2024-01-02,2,4\n";
        let data = read_price_table(csv.as_bytes(), &config()).unwrap();
        assert_eq!(data.table.index_name, "idx");
    }

    #[test]
    fn header_needs_a_company_column() {
        let err = read_price_table("date,idx\n2024-01-01,1\n".as_bytes(), &config()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn duplicate_company_is_rejected() {
        let err = read_price_table("date,idx,a,A\n".as_bytes(), &config()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn date_filters_are_inclusive() {
        let mut cfg = config();
        cfg.date_from = Some(ymd(2024, 1, 5));
        cfg.date_to = Some(ymd(2024, 1, 9));
        let data = read_price_table(CSV.as_bytes(), &cfg).unwrap();
        assert_eq!(data.table.dates, vec![ymd(2024, 1, 5), ymd(2024, 1, 9)]);
    }

    #[test]
    fn company_filter_selects_columns() {
        let mut cfg = config();
        cfg.companies = vec!["SONY".to_string()];
        let data = read_price_table(CSV.as_bytes(), &cfg).unwrap();
        assert_eq!(data.table.company_names(), vec!["sony"]);
        assert_eq!(data.table.companies[0].values[0], 14295.0);
    }

    #[test]
    fn unknown_company_filter_is_an_error() {
        let mut cfg = config();
        cfg.companies = vec!["nintendo".to_string()];
        let err = read_price_table(CSV.as_bytes(), &cfg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn too_few_rows_is_exit_code_3() {
        let err = read_price_table("date,idx,a\n2024-01-01,1,2\n".as_bytes(), &config()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn accepts_alternative_date_formats() {
        assert_eq!(parse_date("2024/03/01").unwrap(), ymd(2024, 3, 1));
        assert_eq!(parse_date("01/03/2024").unwrap(), ymd(2024, 3, 1));
        assert_eq!(parse_date("01-03-2024").unwrap(), ymd(2024, 3, 1));
        assert!(parse_date("March 1").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{CSV}").unwrap();

        let mut cfg = config();
        cfg.csv_path = file.path().to_path_buf();
        let data = load_price_table(&cfg).unwrap();
        assert_eq!(data.rows_used, 4);
    }

    #[test]
    fn missing_file_is_exit_code_2() {
        let mut cfg = config();
        cfg.csv_path = PathBuf::from("/definitely/not/here.csv");
        let err = load_price_table(&cfg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
