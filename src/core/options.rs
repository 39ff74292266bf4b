//! Fitting options and configuration.

use thiserror::Error;

/// Configuration options for the IRLS fitter.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Stop when the log-likelihood changes by less than this between iterations (default: 1e-8).
    pub tolerance: f64,
    /// Hard cap on IRLS iterations (default: 25).
    pub max_iterations: usize,
    /// Stop when the largest absolute coefficient change falls below this (default: 1e-10).
    pub coefficient_tolerance: f64,
    /// Relative threshold on the pivoted QR diagonal below which the
    /// weighted system is treated as singular (default: 1e-10).
    pub rank_tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 25,
            coefficient_tolerance: 1e-10,
            rank_tolerance: 1e-10,
        }
    }
}

/// Errors that can occur when validating fit options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
    #[error("coefficient_tolerance must be non-negative, got {0}")]
    InvalidCoefficientTolerance(f64),
    #[error("rank_tolerance must be in (0, 1), got {0}")]
    InvalidRankTolerance(f64),
    #[error("max_iterations must be at least 1, got {0}")]
    InvalidMaxIterations(usize),
}

impl FitOptions {
    /// Create a new builder for fit options.
    pub fn builder() -> FitOptionsBuilder {
        FitOptionsBuilder::default()
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(OptionsError::InvalidTolerance(self.tolerance));
        }
        if !(self.coefficient_tolerance >= 0.0) || !self.coefficient_tolerance.is_finite() {
            return Err(OptionsError::InvalidCoefficientTolerance(
                self.coefficient_tolerance,
            ));
        }
        if !(self.rank_tolerance > 0.0 && self.rank_tolerance < 1.0) {
            return Err(OptionsError::InvalidRankTolerance(self.rank_tolerance));
        }
        if self.max_iterations < 1 {
            return Err(OptionsError::InvalidMaxIterations(self.max_iterations));
        }
        Ok(())
    }
}

/// Builder for `FitOptions`.
#[derive(Debug, Clone, Default)]
pub struct FitOptionsBuilder {
    options: FitOptions,
}

impl FitOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log-likelihood change stopping threshold.
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.options.tolerance = tol;
        self
    }

    /// Set the maximum number of IRLS iterations.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.options.max_iterations = max_iter;
        self
    }

    /// Set the coefficient change stopping threshold.
    pub fn coefficient_tolerance(mut self, tol: f64) -> Self {
        self.options.coefficient_tolerance = tol;
        self
    }

    /// Set the rank tolerance for the pivoted QR solve.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<FitOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> FitOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = FitOptions::default();
        assert!((opts.tolerance - 1e-8).abs() < 1e-20);
        assert_eq!(opts.max_iterations, 25);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let opts = FitOptions::builder()
            .tolerance(1e-6)
            .max_iterations(50)
            .build()
            .unwrap();

        assert!((opts.tolerance - 1e-6).abs() < 1e-20);
        assert_eq!(opts.max_iterations, 50);
    }

    #[test]
    fn test_builder_new() {
        let opts = FitOptionsBuilder::new().build_unchecked();
        assert_eq!(opts.max_iterations, 25);
    }

    #[test]
    fn test_builder_rank_tolerance() {
        let opts = FitOptions::builder()
            .rank_tolerance(1e-8)
            .build_unchecked();
        assert!((opts.rank_tolerance - 1e-8).abs() < 1e-14);
    }

    #[test]
    fn test_validation_invalid_tolerance() {
        let result = FitOptions::builder().tolerance(0.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidTolerance(_))));

        let result = FitOptions::builder().tolerance(f64::NAN).build();
        assert!(matches!(result, Err(OptionsError::InvalidTolerance(_))));
    }

    #[test]
    fn test_validation_invalid_coefficient_tolerance() {
        let result = FitOptions::builder().coefficient_tolerance(-1.0).build();
        assert!(matches!(
            result,
            Err(OptionsError::InvalidCoefficientTolerance(_))
        ));
    }

    #[test]
    fn test_validation_invalid_rank_tolerance() {
        let result = FitOptions::builder().rank_tolerance(1.5).build();
        assert!(matches!(result, Err(OptionsError::InvalidRankTolerance(_))));
    }

    #[test]
    fn test_validation_invalid_max_iterations() {
        let result = FitOptions::builder().max_iterations(0).build();
        assert!(matches!(result, Err(OptionsError::InvalidMaxIterations(_))));
    }
}
