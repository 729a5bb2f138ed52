//! Formatted output: the Markdown report file and the terminal summary.
//!
//! We keep formatting code in one place so:
//! - the regression code stays clean and testable
//! - output changes are localized
//!
//! Numbers are fixed at 4 decimals. NaN / ±inf print as `NaN` / `inf` / `-inf`.

use crate::domain::{Analysis, Direction, JointFit, PriceTable, RunConfig, SimpleFit};
use crate::io::ingest::IngestedData;
use crate::report::rank_by_r2;

/// Render the full Markdown report.
pub fn format_markdown_report(analysis: &Analysis, table: &PriceTable) -> String {
    let index = &table.index_name;
    let mut out = String::new();

    out.push_str("# Regression Results\n\n");

    out.push_str(&format!("## Each company vs {index}\n"));
    out.push_str(&format!("_{}_\n\n", direction_note(analysis.direction, "company", index)));
    let sections: Vec<String> = analysis
        .companies
        .iter()
        .map(|c| format!("### {}\n{}", c.company, fit_bullets(&c.fit)))
        .collect();
    out.push_str(&sections.join("\n\n"));
    out.push_str("\n\n");

    out.push_str(&format!("## All-company average vs {index}\n"));
    out.push_str(&fit_bullets(&analysis.average));
    out.push('\n');

    if let Some(joint) = &analysis.joint {
        out.push('\n');
        out.push_str(&format!("## Multiple regression of {index} on all companies\n"));
        out.push_str(&joint_bullets(joint));
        out.push('\n');
    }

    out
}

/// Format the terminal run summary (dataset stats + ranked fits + joint fit).
pub fn format_run_summary(ingest: &IngestedData, analysis: &Analysis, config: &RunConfig) -> String {
    let stats = &ingest.stats;
    let mut out = String::new();

    out.push_str("=== regress - index regression ===\n");
    out.push_str(&format!("Source: {}\n", config.csv_path.display()));
    out.push_str(&format!("Index: {}\n", ingest.table.index_name));
    out.push_str(&format!(
        "Rows: used={} read={} rejected={} | dates=[{}, {}]\n",
        ingest.rows_used,
        ingest.rows_read,
        ingest.row_errors.len(),
        stats.first_date,
        stats.last_date,
    ));
    out.push_str(&format!(
        "Companies: {} | index range=[{:.2}, {:.2}]\n",
        stats.n_companies, stats.index_min, stats.index_max
    ));
    out.push_str(&format!(
        "Direction: {}\n",
        direction_note(analysis.direction, "company", &ingest.table.index_name)
    ));

    if !ingest.row_errors.is_empty() {
        out.push_str("\nRejected rows:\n");
        for err in &ingest.row_errors {
            out.push_str(&format!("  line {}: {}\n", err.line, err.message));
        }
    }

    out.push_str(&format!("\nTop {} by R^2:\n", config.top_n.min(analysis.companies.len())));
    out.push_str(&format_fit_table(analysis, config.top_n));

    out.push_str("\nAll-company average:\n");
    out.push_str(&format!(
        "  slope={} intercept={} r2={}\n",
        num(analysis.average.slope),
        num(analysis.average.intercept),
        num(analysis.average.r2),
    ));

    match &analysis.joint {
        Some(joint) => {
            out.push_str("\nMultiple regression:\n");
            out.push_str(&format!(
                "  intercept={} r2={}\n",
                num(joint.fit.intercept),
                num(joint.fit.r2)
            ));
            for (name, slope) in joint.named_slopes() {
                out.push_str(&format!("  {:<24} {:>14}\n", truncate(name, 24), num(slope)));
            }
        }
        None => out.push_str("\nMultiple regression: skipped\n"),
    }

    out
}

fn format_fit_table(analysis: &Analysis, top_n: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!("{:<24} {:>14} {:>14} {:>8}\n", "company", "slope", "intercept", "r2").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<14} {:-<14} {:-<8}\n", "", "", "", "").trim_end());
    out.push('\n');

    for c in rank_by_r2(&analysis.companies, top_n) {
        out.push_str(
            format!(
                "{:<24} {:>14} {:>14} {:>8}\n",
                truncate(&c.company, 24),
                num(c.fit.slope),
                num(c.fit.intercept),
                num(c.fit.r2),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fit_bullets(fit: &SimpleFit) -> String {
    format!(
        "- Slope: {}\n- Intercept: {}\n- R^2: {}",
        num(fit.slope),
        num(fit.intercept),
        num(fit.r2)
    )
}

fn joint_bullets(joint: &JointFit) -> String {
    let mut lines = vec![format!("- Intercept: {}", num(joint.fit.intercept))];
    for (name, slope) in joint.named_slopes() {
        lines.push(format!("- Slope ({name}): {}", num(slope)));
    }
    lines.push(format!("- R^2: {}", num(joint.fit.r2)));
    lines.join("\n")
}

fn direction_note(direction: Direction, company: &str, index: &str) -> String {
    match direction {
        Direction::IndexOnCompany => format!("x = {company}, y = {index}"),
        Direction::CompanyOnIndex => format!("x = {index}, y = {company}"),
    }
}

fn num(v: f64) -> String {
    format!("{v:.4}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
