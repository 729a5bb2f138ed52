//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - runs the regression pipeline
//! - prints the summary and writes the report
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, RunArgs, SampleArgs};
use crate::domain::{RunConfig, SampleConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `regress` binary.
pub fn run() -> Result<(), AppError> {
    // Missing `.env` is fine; it only supplies defaults.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args, OutputMode::Full),
        Command::Summary(args) => handle_run(args, OutputMode::SummaryOnly),
        Command::Sample(args) => handle_sample(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    SummaryOnly,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init()
        .ok();
}

fn handle_run(args: RunArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_analysis(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.analysis, &config)
    );

    if mode == OutputMode::Full {
        let report = crate::report::format_markdown_report(&run.analysis, &run.ingest.table);
        crate::io::export::write_report(&config.report_path, &report)?;
        log::info!("Wrote report to '{}'", config.report_path.display());
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.analysis)?;
        log::info!("Wrote results CSV to '{}'", path.display());
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_results_json(path, &run.analysis, &run.ingest, &config.csv_path)?;
        log::info!("Wrote results JSON to '{}'", path.display());
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args);
    let sample = crate::data::generate_sample(&config)?;
    crate::data::write_sample_csv(&config.out_path, &sample.table)?;

    println!(
        "Wrote {} days x {} companies to '{}'",
        sample.table.n_obs(),
        sample.table.companies.len(),
        config.out_path.display()
    );
    for (company, (alpha, beta)) in sample
        .table
        .companies
        .iter()
        .zip(sample.alphas.iter().zip(&sample.betas))
    {
        log::debug!("{}: alpha={alpha:.4} beta={beta:.6}", company.name);
    }
    Ok(())
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        csv_path: args.data.clone(),
        report_path: args.output.clone(),
        direction: args.direction,
        date_from: args.from,
        date_to: args.to,
        companies: args.companies.clone(),
        joint: !args.no_joint,
        top_n: args.top,
        export_results: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        out_path: args.out.clone(),
        seed: args.seed,
        n_days: args.days,
        n_companies: args.companies,
        start_date: args.start,
        index_name: args.index_name.clone(),
        index_start: args.index_start,
        index_vol: args.index_vol,
        noise: args.noise,
    }
}

/// Rewrite argv so a bare `regress` behaves like `regress run`.
///
/// Rules:
/// - `regress`                          -> `regress run`
/// - `regress --data x.csv ...`         -> `regress run --data x.csv ...`
/// - `regress -v` / `regress -vv ...`   -> `regress -v run ...`
/// - `regress --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Skip leading global verbosity flags so `regress -v` still defaults to `run`.
    let mut pos = 1;
    while argv
        .get(pos)
        .is_some_and(|a| a == "--verbose" || (a.starts_with("-v") && a[1..].chars().all(|c| c == 'v')))
    {
        pos += 1;
    }

    let Some(arg) = argv.get(pos).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg.as_str(), "run" | "summary" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg.starts_with('-') {
        argv.insert(pos, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
