//! Core traits and error type for GLM fitting.

use crate::core::{DesignMatrix, FittedModel, GlmFamily};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building designs, fitting, or comparing models.
#[derive(Debug, Error)]
pub enum GlmError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("design matrix is rank deficient: rank {rank} < {columns} columns")]
    RankDeficiency { rank: usize, columns: usize },

    #[error("response out of domain: {0}")]
    DomainError(String),

    #[error("weighted normal equations are singular or nearly singular")]
    NumericalSingularity,

    #[error("linear predictor {eta} is too large to exponentiate safely")]
    NumericalOverflow { eta: f64 },

    #[error("special function did not converge after {iterations} iterations")]
    NumericalNonConvergence { iterations: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] crate::core::OptionsError),
}

/// An estimator that fits a GLM to a design matrix.
///
/// Fitting borrows nothing mutable, so one fitter can serve many designs,
/// including from several threads at once.
pub trait ModelFitter {
    /// Exponential family the fitted model carries.
    type Family: GlmFamily;

    /// Fit the model to the design.
    ///
    /// # Arguments
    /// * `design` - Validated design matrix, shared with the returned model
    ///
    /// # Returns
    /// A fitted model. Hitting the iteration cap is reported through
    /// [`FittedModel::converged`], not as an error.
    fn fit(&self, design: Arc<DesignMatrix>) -> Result<FittedModel<Self::Family>, GlmError>;
}
