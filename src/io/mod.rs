//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - result exports (CSV/JSON) and the Markdown report file (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
