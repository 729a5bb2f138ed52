//! Error types.
//!
//! - `RegressionError`: failures of the numeric core (shapes, singularity).
//! - `AppError`: what the binary reports, carrying a process exit code.
//!
//! Exit codes:
//! - 2: input / CLI / file problems
//! - 3: not enough usable data
//! - 4: regression failure

use thiserror::Error;

/// Errors raised by the matrix kernel and the regressions.
///
/// Degenerate numeric outcomes (NaN / ±inf from constant series) are not errors;
/// they are returned as values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegressionError {
    /// Operands have incompatible shapes.
    #[error("dimension mismatch in {op}: {left} vs {right}")]
    DimensionMismatch {
        op: &'static str,
        left: String,
        right: String,
    },

    /// The normal-equation matrix `XᵀX` has no inverse.
    #[error("singular design matrix (collinear columns or too few observations)")]
    SingularDesignMatrix,

    /// Not enough observations to fit a line.
    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },
}

impl RegressionError {
    pub(crate) fn mismatch(op: &'static str, left: impl Into<String>, right: impl Into<String>) -> Self {
        RegressionError::DimensionMismatch {
            op,
            left: left.into(),
            right: right.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<RegressionError> for AppError {
    fn from(err: RegressionError) -> Self {
        AppError::new(4, format!("Regression failed: {err}"))
    }
}
