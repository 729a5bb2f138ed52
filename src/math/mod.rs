//! Numeric core: a dense matrix kernel plus simple and multiple least squares.

pub mod linear;
pub mod matrix;
pub mod ols;

pub use linear::*;
pub use matrix::*;
pub use ols::*;
