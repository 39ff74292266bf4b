//! GLM fitting by Iteratively Reweighted Least Squares (IRLS).
//!
//! For the canonical Poisson log link IRLS coincides with Fisher scoring and
//! Newton-Raphson on the log-likelihood.
//!
//! # Example
//!
//! ```rust,ignore
//! use glm_select::prelude::*;
//! use std::sync::Arc;
//!
//! let design = Arc::new(DesignMatrix::with_intercept(&x, y)?);
//! let fitted = GlmFitter::poisson()
//!     .tolerance(1e-10)
//!     .max_iterations(50)
//!     .build()
//!     .fit(design)?;
//!
//! assert!(fitted.converged());
//! ```

use crate::core::{
    DesignMatrix, FitOptions, FitOptionsBuilder, FittedModel, GlmFamily, PoissonFamily,
};
use crate::solvers::traits::{GlmError, ModelFitter};
use crate::utils::matrix::{linear_predictor, solve_weighted_least_squares};
use faer::Col;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// GLM estimator fit by IRLS.
///
/// # Algorithm
///
/// Each iteration computes η = Xb and μ = g⁻¹(η), forms working weights
/// wᵢ and working responses zᵢ, and solves the weighted least-squares
/// problem (XᵗWX) b = XᵗWz. Iteration stops when the log-likelihood
/// changes by less than `tolerance` or no coefficient moves by more than
/// `coefficient_tolerance`.
///
/// Without an explicit start the first iteration works from the family's
/// starting linear predictor (η₀ = log((y + ȳ)/2) for Poisson) rather than
/// from coefficients.
#[derive(Debug, Clone)]
pub struct GlmFitter<F: GlmFamily = PoissonFamily> {
    options: FitOptions,
    family: F,
    start: Option<Col<f64>>,
}

impl GlmFitter<PoissonFamily> {
    /// Create a builder for Poisson regression with log link.
    pub fn poisson() -> GlmFitterBuilder<PoissonFamily> {
        GlmFitterBuilder::new(PoissonFamily::new())
    }

    /// Create a general builder (Poisson family).
    pub fn builder() -> GlmFitterBuilder<PoissonFamily> {
        Self::poisson()
    }
}

impl<F: GlmFamily> GlmFitter<F> {
    /// Create a new fitter with the given options and family.
    pub fn new(options: FitOptions, family: F) -> Self {
        Self {
            options,
            family,
            start: None,
        }
    }

    /// Create a builder for an arbitrary family.
    pub fn with_family(family: F) -> GlmFitterBuilder<F> {
        GlmFitterBuilder::new(family)
    }

    /// Options used by this fitter.
    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Family used by this fitter.
    pub fn family(&self) -> &F {
        &self.family
    }

    fn fit_irls(&self, design: Arc<DesignMatrix>) -> Result<FittedModel<F>, GlmError> {
        self.options.validate()?;

        let x = design.x();
        let y = design.y_values();
        let n_samples = design.n_observations();
        let n_params = design.n_parameters();

        let (mut beta, mut eta): (Col<f64>, Vec<f64>) = match &self.start {
            Some(start) => {
                if start.nrows() != n_params {
                    return Err(GlmError::ShapeMismatch {
                        expected: n_params,
                        got: start.nrows(),
                    });
                }
                let eta = linear_predictor(x, start).iter().copied().collect();
                (start.clone(), eta)
            }
            None => (Col::zeros(n_params), self.family.initial_eta(&y)),
        };
        // Coefficient changes are only meaningful once `beta` came from a solve or the caller.
        let mut have_beta = self.start.is_some();

        let mut mu = self.compute_mu(&eta)?;
        let mut log_lik = if have_beta {
            self.family.log_likelihood(&y, &mu)?
        } else {
            f64::NEG_INFINITY
        };

        let max_iter = self.options.max_iterations;
        let mut converged = false;
        let mut iterations = 0;

        for iter in 0..max_iter {
            iterations = iter + 1;

            let (weights, z) = self.compute_irls_quantities(&y, &mu, &eta);
            let beta_new =
                solve_weighted_least_squares(x, &z, &weights, self.options.rank_tolerance)?;

            let eta_new: Vec<f64> = linear_predictor(x, &beta_new).iter().copied().collect();
            let mu_new = self.compute_mu(&eta_new)?;
            let log_lik_new = self.family.log_likelihood(&y, &mu_new)?;

            let max_change = if have_beta {
                beta_new
                    .iter()
                    .zip(beta.iter())
                    .map(|(&b_new, &b_old)| (b_new - b_old).abs())
                    .fold(0.0_f64, f64::max)
            } else {
                f64::INFINITY
            };
            let log_lik_change = (log_lik_new - log_lik).abs();

            debug!(
                family = self.family.name(),
                iteration = iterations,
                log_likelihood = log_lik_new,
                log_likelihood_change = log_lik_change,
                max_coefficient_change = max_change,
                "IRLS step"
            );

            beta = beta_new;
            eta = eta_new;
            mu = mu_new;
            log_lik = log_lik_new;
            have_beta = true;

            if log_lik_change < self.options.tolerance
                || max_change < self.options.coefficient_tolerance
            {
                converged = true;
                break;
            }
        }

        if converged {
            info!(
                family = self.family.name(),
                iterations,
                log_likelihood = log_lik,
                n_samples,
                n_params,
                "IRLS converged"
            );
        } else {
            warn!(
                family = self.family.name(),
                iterations,
                log_likelihood = log_lik,
                "IRLS reached the iteration cap without converging"
            );
        }

        let deviance = self.family.deviance(&y, &mu);
        let fitted_values = Col::from_fn(n_samples, |i| mu[i]);

        Ok(FittedModel::new(
            beta,
            design,
            self.family.clone(),
            iterations,
            converged,
            log_lik,
            deviance,
            fitted_values,
        ))
    }

    /// Means for every observation. A mean that underflows to zero leaves a
    /// zero working weight, which is reported as singular rather than floored.
    fn compute_mu(&self, eta: &[f64]) -> Result<Vec<f64>, GlmError> {
        eta.iter()
            .map(|&e| {
                let mu = self.family.mean(e)?;
                if mu > 0.0 {
                    Ok(mu)
                } else {
                    Err(GlmError::NumericalSingularity)
                }
            })
            .collect()
    }

    fn compute_irls_quantities(&self, y: &[f64], mu: &[f64], eta: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = y.len();
        let mut weights = vec![0.0; n];
        let mut z = vec![0.0; n];

        for i in 0..n {
            weights[i] = self.family.working_weight(mu[i]);
            z[i] = self.family.working_response(y[i], mu[i], eta[i]);
        }

        (weights, z)
    }
}

impl<F: GlmFamily> ModelFitter for GlmFitter<F> {
    type Family = F;

    fn fit(&self, design: Arc<DesignMatrix>) -> Result<FittedModel<F>, GlmError> {
        self.fit_irls(design)
    }
}

/// Builder for `GlmFitter`.
#[derive(Debug, Clone)]
pub struct GlmFitterBuilder<F: GlmFamily = PoissonFamily> {
    options_builder: FitOptionsBuilder,
    family: F,
    start: Option<Col<f64>>,
}

impl Default for GlmFitterBuilder<PoissonFamily> {
    fn default() -> Self {
        Self::new(PoissonFamily::new())
    }
}

impl<F: GlmFamily> GlmFitterBuilder<F> {
    /// Create a new builder for the given family with default options.
    pub fn new(family: F) -> Self {
        Self {
            options_builder: FitOptionsBuilder::default(),
            family,
            start: None,
        }
    }

    /// Set the log-likelihood change stopping threshold.
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.options_builder = self.options_builder.tolerance(tol);
        self
    }

    /// Set the maximum number of IRLS iterations.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.options_builder = self.options_builder.max_iterations(max_iter);
        self
    }

    /// Set the coefficient change stopping threshold.
    pub fn coefficient_tolerance(mut self, tol: f64) -> Self {
        self.options_builder = self.options_builder.coefficient_tolerance(tol);
        self
    }

    /// Set the rank tolerance for the weighted QR solve.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options_builder = self.options_builder.rank_tolerance(tol);
        self
    }

    /// Start IRLS from these coefficients instead of the family's default.
    pub fn start(mut self, coefficients: Col<f64>) -> Self {
        self.start = Some(coefficients);
        self
    }

    /// Build the fitter. Options are validated when `fit` runs.
    pub fn build(self) -> GlmFitter<F> {
        GlmFitter {
            options: self.options_builder.build_unchecked(),
            family: self.family,
            start: self.start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use faer::Mat;

    fn design(x: &[f64], y: &[f64]) -> Arc<DesignMatrix> {
        let covariates = Mat::from_fn(x.len(), 1, |i, _| x[i]);
        let response = Col::from_fn(y.len(), |i| y[i]);
        Arc::new(DesignMatrix::with_intercept(&covariates, response).unwrap())
    }

    #[test]
    fn test_intercept_only_is_log_mean() {
        let y = [2.0, 0.0, 3.0, 1.0, 4.0, 2.0];
        let x = Mat::from_fn(6, 1, |_, _| 1.0);
        let design = Arc::new(DesignMatrix::new(x, Col::from_fn(6, |i| y[i])).unwrap());

        let fitted = GlmFitter::poisson().build().fit(design).unwrap();

        assert!(fitted.converged());
        assert_relative_eq!(fitted.coefficients()[0], 2.0_f64.ln(), epsilon = 1e-8);
    }

    #[test]
    fn test_binary_covariate_closed_form() {
        // Group means 1.5 (x = 0) and 6.0 (x = 1)
        let x = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 0.0, 3.0, 5.0, 7.0, 6.0, 6.0];

        let fitted = GlmFitter::poisson().build().fit(design(&x, &y)).unwrap();

        assert!(fitted.converged());
        assert_relative_eq!(fitted.coefficients()[0], 1.5_f64.ln(), epsilon = 1e-7);
        assert_relative_eq!(fitted.coefficients()[1], 4.0_f64.ln(), epsilon = 1e-7);
    }

    #[test]
    fn test_score_vanishes_at_optimum() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 7.0, 20.0, 55.0];

        let fitted = GlmFitter::poisson()
            .tolerance(1e-12)
            .build()
            .fit(design(&x, &y))
            .unwrap();

        assert!(fitted.converged());
        for g in fitted.score().iter() {
            assert!(g.abs() < 1e-5, "score component {} not near zero", g);
        }

        // Canonical link: fitted totals match observed totals
        let total_mu: f64 = fitted.fitted_values().iter().sum();
        assert_relative_eq!(total_mu, 86.0, epsilon = 1e-5);
    }

    #[test]
    fn test_fit_log_likelihood_matches_family() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 7.0, 20.0, 55.0];
        let fitted = GlmFitter::poisson().build().fit(design(&x, &y)).unwrap();

        let y_vals: Vec<f64> = y.to_vec();
        let mu: Vec<f64> = fitted.fitted_values().iter().copied().collect();
        let ll = PoissonFamily::new().log_likelihood(&y_vals, &mu).unwrap();
        assert_relative_eq!(fitted.fit_log_likelihood(), ll, epsilon = 1e-10);
        assert!(fitted.deviance() >= 0.0);
    }

    #[test]
    fn test_iteration_cap_is_flagged_not_error() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 7.0, 20.0, 55.0];

        let fitted = GlmFitter::poisson()
            .max_iterations(1)
            .tolerance(1e-300)
            .coefficient_tolerance(0.0)
            .build()
            .fit(design(&x, &y))
            .unwrap();

        assert!(!fitted.converged());
        assert_eq!(fitted.iterations(), 1);
    }

    #[test]
    fn test_explicit_start_converges_to_same_fit() {
        let x = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 0.0, 3.0, 5.0, 7.0, 6.0, 6.0];

        let fitted = GlmFitter::poisson()
            .start(Col::zeros(2))
            .build()
            .fit(design(&x, &y))
            .unwrap();

        assert!(fitted.converged());
        assert_relative_eq!(fitted.coefficients()[1], 4.0_f64.ln(), epsilon = 1e-7);
    }

    #[test]
    fn test_start_length_checked() {
        let x = [0.0, 1.0, 2.0];
        let y = [1.0, 2.0, 4.0];

        let result = GlmFitter::poisson()
            .start(Col::zeros(3))
            .build()
            .fit(design(&x, &y));
        assert!(matches!(
            result,
            Err(GlmError::ShapeMismatch {
                expected: 2,
                got: 3
            })
        ));
    }

    #[test]
    fn test_huge_linear_predictor_overflows() {
        let x = [0.0, 1.0, 2.0];
        let y = [1.0, 2.0, 4.0];

        let result = GlmFitter::poisson()
            .start(Col::from_fn(2, |j| if j == 0 { 800.0 } else { 0.0 }))
            .build()
            .fit(design(&x, &y));
        assert!(matches!(result, Err(GlmError::NumericalOverflow { .. })));
    }

    #[test]
    fn test_zero_weights_are_singular() {
        let x = [0.0, 1.0, 2.0];
        let y = [1.0, 2.0, 4.0];

        // exp(-800) underflows to zero for every observation
        let result = GlmFitter::poisson()
            .start(Col::from_fn(2, |j| if j == 0 { -800.0 } else { 0.0 }))
            .build()
            .fit(design(&x, &y));
        assert!(matches!(result, Err(GlmError::NumericalSingularity)));
    }

    #[test]
    fn test_invalid_options_rejected_at_fit() {
        let x = [0.0, 1.0, 2.0];
        let y = [1.0, 2.0, 4.0];

        let result = GlmFitter::poisson()
            .max_iterations(0)
            .build()
            .fit(design(&x, &y));
        assert!(matches!(result, Err(GlmError::InvalidOptions(_))));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 7.0, 20.0, 55.0];
        let fitter = GlmFitter::poisson().build();

        let a = fitter.fit(design(&x, &y)).unwrap();
        let b = fitter.fit(design(&x, &y)).unwrap();
        assert_eq!(a.iterations(), b.iterations());
        for j in 0..2 {
            assert_eq!(a.coefficients()[j], b.coefficients()[j]);
        }
    }
}
