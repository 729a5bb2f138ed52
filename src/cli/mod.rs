//! Command-line parsing for the index regression tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the regression code.
//!
//! Path and seed defaults can also come from the environment (or a `.env`
//! file loaded before parsing): `REGRESS_DATA`, `REGRESS_OUTPUT`, `REGRESS_SEED`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

use crate::domain::Direction;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "regress", version, about = "Index vs company price regression report")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run all regressions, print a summary, and write the Markdown report.
    Run(RunArgs),
    /// Print the summary only (no report file is written).
    Summary(RunArgs),
    /// Generate a synthetic price CSV for demos and testing.
    Sample(SampleArgs),
}

/// Options for running the regressions.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Input CSV: `date,<index>,<company>...`.
    #[arg(short = 'd', long, env = "REGRESS_DATA", default_value = "data.csv")]
    pub data: PathBuf,

    /// Markdown report path.
    #[arg(short = 'o', long, env = "REGRESS_OUTPUT", default_value = "results.md")]
    pub output: PathBuf,

    /// Which series is explanatory in the per-company and average fits.
    #[arg(long, value_enum, default_value_t = Direction::IndexOnCompany)]
    pub direction: Direction,

    /// Only use rows on or after this date (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Only use rows on or before this date (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Restrict to this company column (repeatable, case-insensitive).
    #[arg(short = 'c', long = "company")]
    pub companies: Vec<String>,

    /// Skip the joint multiple regression.
    #[arg(long)]
    pub no_joint: bool,

    /// Show the top-N companies by R^2 in the terminal summary.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Export per-company results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export all results (plus run metadata) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for generating a synthetic CSV.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, default_value = "sample.csv")]
    pub out: PathBuf,

    /// Random seed.
    #[arg(long, env = "REGRESS_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Number of business days.
    #[arg(long, default_value_t = 250)]
    pub days: usize,

    /// Number of companies.
    #[arg(long, default_value_t = 5)]
    pub companies: usize,

    /// First date (rolled forward to a weekday).
    #[arg(long, default_value = "2024-01-04")]
    pub start: NaiveDate,

    /// Index column name.
    #[arg(long, default_value = "nk225")]
    pub index_name: String,

    /// Index starting level.
    #[arg(long, default_value_t = 33_000.0)]
    pub index_start: f64,

    /// Daily log-return volatility of the index.
    #[arg(long, default_value_t = 0.012)]
    pub index_vol: f64,

    /// Company noise as a fraction of its mean price.
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_filters() {
        let cli = Cli::try_parse_from([
            "regress", "-v", "run", "--data", "prices.csv", "--from", "2024-01-01", "-c", "toyota", "-c", "sony",
            "--direction", "company-on-index", "--no-joint",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.data, PathBuf::from("prices.csv"));
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.companies, vec!["toyota", "sony"]);
        assert_eq!(args.direction, Direction::CompanyOnIndex);
        assert!(args.no_joint);
    }

    #[test]
    fn parses_sample_defaults() {
        let cli = Cli::try_parse_from(["regress", "sample", "--companies", "3"]).unwrap();
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.companies, 3);
        assert_eq!(args.days, 250);
        assert_eq!(args.index_name, "nk225");
    }

    #[test]
    fn rejects_bad_date() {
        assert!(Cli::try_parse_from(["regress", "run", "--to", "yesterday"]).is_err());
    }
}
