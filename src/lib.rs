//! Poisson log-link GLM fitting and nested-model selection.
//!
//! This library fits Poisson regression models by iteratively reweighted
//! least squares and compares nested fits with the Akaike Information
//! Criterion and the likelihood-ratio test.
//!
//! # Example
//!
//! ```rust,ignore
//! use glm_select::prelude::*;
//! use std::sync::Arc;
//!
//! let full = Arc::new(DesignMatrix::with_intercept(&covariates, y)?);
//! let reduced = Arc::new(full.select_columns(&[0])?);
//!
//! let fitter = GlmFitter::poisson().tolerance(1e-8).max_iterations(25).build();
//! let full_fit = fitter.fit(full)?;
//! let reduced_fit = fitter.fit(reduced)?;
//!
//! println!("AIC full = {}", ModelSelector::aic(&full_fit)?);
//! let test = ModelSelector::likelihood_ratio_test(&reduced_fit, &full_fit)?;
//! println!("LR = {:.3}, df = {}, p = {:.3e}", test.statistic, test.df, test.p_value);
//! ```

pub mod core;
pub mod diagnostics;
pub mod distributions;
pub mod inference;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        DesignMatrix, FitOptions, FitOptionsBuilder, FittedModel, GlmFamily, PoissonFamily,
    };
    pub use crate::diagnostics::{deviance_residuals, estimate_dispersion, pearson_residuals};
    pub use crate::distributions::chi_square_upper_tail;
    pub use crate::inference::{
        CoefficientInference, InformationCriterion, ModelSelector, TestResult,
    };
    pub use crate::solvers::{GlmError, GlmFitter, ModelFitter};
}

pub use crate::core::{DesignMatrix, FitOptions, FittedModel, GlmFamily, PoissonFamily};
pub use crate::inference::{ModelSelector, TestResult};
pub use crate::solvers::{GlmError, GlmFitter, ModelFitter};
