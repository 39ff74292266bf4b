//! Exponential-family contract for generalized linear models.
//!
//! The IRLS loop in [`crate::solvers::GlmFitter`] only talks to a family
//! through this trait: the inverse link, the log-density, and the working
//! weight/response pair. A new family plugs in by implementing it.
//!
//! # Reference
//!
//! - McCullagh, P. and Nelder, J.A. (1989). "Generalized Linear Models", 2nd ed.
//!   Chapman & Hall. Chapter 2.

use crate::solvers::GlmError;

/// Capability set of an exponential family paired with a link function.
pub trait GlmFamily: std::fmt::Debug + Clone + Send + Sync {
    /// Short family name used in logs.
    fn name(&self) -> &'static str;

    /// Link function η = g(μ).
    fn link(&self, mu: f64) -> f64;

    /// Inverse link μ = g⁻¹(η).
    ///
    /// Fails instead of returning a non-finite mean.
    fn mean(&self, eta: f64) -> Result<f64, GlmError>;

    /// Variance function V(μ).
    fn variance(&self, mu: f64) -> f64;

    /// Log-probability of observing `y` given mean `mu`.
    fn log_pmf(&self, y: f64, mu: f64) -> Result<f64, GlmError>;

    /// Fisher-information weight w = 1 / (V(μ) · (dη/dμ)²).
    fn working_weight(&self, mu: f64) -> f64;

    /// Linearized pseudo-response z = η + (y − μ) · dη/dμ.
    fn working_response(&self, y: f64, mu: f64, eta: f64) -> f64;

    /// Unit deviance d(y, μ); the deviance is Σ d(yᵢ, μᵢ).
    fn unit_deviance(&self, y: f64, mu: f64) -> f64;

    /// Starting linear predictor for IRLS when no coefficients are given.
    fn initial_eta(&self, y: &[f64]) -> Vec<f64>;

    /// Total deviance D = Σ d(yᵢ, μᵢ).
    fn deviance(&self, y: &[f64], mu: &[f64]) -> f64 {
        y.iter()
            .zip(mu.iter())
            .map(|(&yi, &mui)| self.unit_deviance(yi, mui))
            .sum()
    }

    /// Log-likelihood Σ log p(yᵢ | μᵢ).
    fn log_likelihood(&self, y: &[f64], mu: &[f64]) -> Result<f64, GlmError> {
        let mut total = 0.0;
        for (&yi, &mui) in y.iter().zip(mu.iter()) {
            total += self.log_pmf(yi, mui)?;
        }
        Ok(total)
    }
}
