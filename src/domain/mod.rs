//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the aligned input table (`PriceTable`, `CompanySeries`)
//! - regression outputs (`SimpleFit`, `MultipleFit`, `Analysis`, etc.)
//! - run configuration (`RunConfig`, `SampleConfig`, `Direction`)

pub mod types;

pub use types::*;
