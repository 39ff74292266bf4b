//! Fitted model produced by the IRLS solver.

use super::design::DesignMatrix;
use super::family::GlmFamily;
use super::poisson::PoissonFamily;
use crate::solvers::GlmError;
use crate::utils::matrix::linear_predictor;
use faer::{Col, Mat};
use std::sync::Arc;

/// Maximum-likelihood fit of a GLM to a [`DesignMatrix`].
///
/// Created by [`crate::solvers::GlmFitter`] and never mutated afterwards.
/// The design is shared, so several models fit to sub-designs of the same
/// data stay cheap to keep around for comparison.
#[derive(Debug, Clone)]
pub struct FittedModel<F: GlmFamily = PoissonFamily> {
    coefficients: Col<f64>,
    design: Arc<DesignMatrix>,
    family: F,
    iterations: usize,
    converged: bool,
    log_likelihood: f64,
    deviance: f64,
    fitted_values: Col<f64>,
}

impl<F: GlmFamily> FittedModel<F> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        coefficients: Col<f64>,
        design: Arc<DesignMatrix>,
        family: F,
        iterations: usize,
        converged: bool,
        log_likelihood: f64,
        deviance: f64,
        fitted_values: Col<f64>,
    ) -> Self {
        Self {
            coefficients,
            design,
            family,
            iterations,
            converged,
            log_likelihood,
            deviance,
            fitted_values,
        }
    }

    /// Estimated coefficients, one per design column.
    pub fn coefficients(&self) -> &Col<f64> {
        &self.coefficients
    }

    /// Coefficient paired with its column label.
    pub fn named_coefficients(&self) -> Vec<(&str, f64)> {
        self.design
            .column_names()
            .iter()
            .zip(self.coefficients.iter())
            .map(|(name, &b)| (name.as_str(), b))
            .collect()
    }

    /// The design this model was fit to.
    pub fn design(&self) -> &Arc<DesignMatrix> {
        &self.design
    }

    /// Family used for fitting.
    pub fn family(&self) -> &F {
        &self.family
    }

    /// Number of fitted coefficients p.
    pub fn n_parameters(&self) -> usize {
        self.coefficients.nrows()
    }

    /// Number of observations n.
    pub fn n_observations(&self) -> usize {
        self.design.n_observations()
    }

    /// IRLS iterations used.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether IRLS met its stopping rule before the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Log-likelihood reported by the fitter at its last iterate.
    pub fn fit_log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Residual deviance Σ d(yᵢ, μᵢ).
    pub fn deviance(&self) -> f64 {
        self.deviance
    }

    /// Fitted means μᵢ on the training data.
    pub fn fitted_values(&self) -> &Col<f64> {
        &self.fitted_values
    }

    /// Residual degrees of freedom (n − p).
    pub fn residual_df(&self) -> usize {
        self.n_observations().saturating_sub(self.n_parameters())
    }

    /// Linear predictor η = Xb on the training data.
    pub fn linear_predictor(&self) -> Col<f64> {
        linear_predictor(self.design.x(), &self.coefficients)
    }

    /// Score vector Σ wᵢ (zᵢ − ηᵢ) xᵢ, the gradient of the log-likelihood
    /// with respect to the coefficients.
    ///
    /// For the canonical log link this reduces to Xᵗ(y − μ).
    pub fn score(&self) -> Col<f64> {
        let x = self.design.x();
        let y = self.design.y();
        let eta = self.linear_predictor();
        let p = self.n_parameters();

        let mut grad = Col::zeros(p);
        for i in 0..self.n_observations() {
            let mu = self.fitted_values[i];
            let w = self.family.working_weight(mu);
            let z = self.family.working_response(y[i], mu, eta[i]);
            let u = w * (z - eta[i]);
            for j in 0..p {
                grad[j] += u * x[(i, j)];
            }
        }
        grad
    }

    /// Predicted means g⁻¹(x·b) for new rows laid out like the design.
    pub fn predict(&self, x: &Mat<f64>) -> Result<Col<f64>, GlmError> {
        if x.ncols() != self.n_parameters() {
            return Err(GlmError::ShapeMismatch {
                expected: self.n_parameters(),
                got: x.ncols(),
            });
        }

        let eta = linear_predictor(x, &self.coefficients);
        let mut mu = Col::zeros(x.nrows());
        for i in 0..x.nrows() {
            mu[i] = self.family.mean(eta[i])?;
        }
        Ok(mu)
    }
}
