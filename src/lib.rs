//! `index-regress` library crate.
//!
//! The binary (`regress`) is a thin wrapper around this library so that:
//!
//! - the regression core is testable without spawning processes
//! - the matrix kernel and regressions are reusable on their own
//! - CSV/report glue stays out of the numeric code

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
