//! Regression orchestration for a whole price table.
//!
//! `fitter` runs every regression the report needs:
//!
//! - one simple fit per company (in parallel)
//! - one simple fit of the equal-weighted company average
//! - one joint multiple regression of the index on all companies

pub mod fitter;

pub use fitter::*;
