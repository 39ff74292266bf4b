//! Poisson family with log link for count data regression.
//!
//! # Example
//!
//! ```ignore
//! use glm_select::{GlmFamily, PoissonFamily};
//!
//! let poisson = PoissonFamily::new();
//! let mu = poisson.mean(0.5)?;
//! let lp = poisson.log_pmf(2.0, mu)?;
//! ```

use super::family::GlmFamily;
use crate::solvers::GlmError;
use statrs::function::gamma::ln_gamma;

/// Largest linear predictor accepted by [`PoissonFamily::mean`].
///
/// exp(709.78) is the last finite double; 700 leaves headroom for the
/// products formed downstream in the weighted least-squares step.
pub const MAX_ETA: f64 = 700.0;

/// Poisson family with the canonical log link.
///
/// # Variance Function
///
/// For Poisson data with μ = E\[Y\], V(μ) = μ.
///
/// # Unit Deviance
///
/// d(y, μ) = 2[y·log(y/μ) − (y − μ)], with d(0, μ) = 2μ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoissonFamily;

impl PoissonFamily {
    /// Create a Poisson family with log link.
    pub fn new() -> Self {
        Self
    }
}

/// Check that `y` is a non-negative whole number.
pub(crate) fn is_count(y: f64) -> bool {
    y.is_finite() && y >= 0.0 && y.fract() == 0.0
}

impl GlmFamily for PoissonFamily {
    fn name(&self) -> &'static str {
        "poisson"
    }

    fn link(&self, mu: f64) -> f64 {
        mu.ln()
    }

    /// μ = exp(η), refusing η above [`MAX_ETA`].
    fn mean(&self, eta: f64) -> Result<f64, GlmError> {
        if eta.is_nan() || eta > MAX_ETA {
            return Err(GlmError::NumericalOverflow { eta });
        }
        Ok(eta.exp())
    }

    fn variance(&self, mu: f64) -> f64 {
        mu
    }

    /// log p(y | μ) = y·log(μ) − μ − log Γ(y + 1).
    fn log_pmf(&self, y: f64, mu: f64) -> Result<f64, GlmError> {
        if !is_count(y) {
            return Err(GlmError::InvalidArgument(format!(
                "Poisson response must be a non-negative integer, got {y}"
            )));
        }
        if !(mu > 0.0) || !mu.is_finite() {
            return Err(GlmError::InvalidArgument(format!(
                "Poisson mean must be positive and finite, got {mu}"
            )));
        }

        if y == 0.0 {
            return Ok(-mu);
        }
        Ok(y * mu.ln() - mu - ln_gamma(y + 1.0))
    }

    /// For the log link V(μ)·(dη/dμ)² = 1/μ, so the weight is μ itself.
    fn working_weight(&self, mu: f64) -> f64 {
        mu
    }

    fn working_response(&self, y: f64, mu: f64, eta: f64) -> f64 {
        eta + (y - mu) / mu
    }

    fn unit_deviance(&self, y: f64, mu: f64) -> f64 {
        if y == 0.0 {
            2.0 * mu
        } else {
            2.0 * (y * (y / mu).ln() - (y - mu))
        }
    }

    /// η₀ = log((y + ȳ) / 2), keeping every starting mean at least 1e-3.
    fn initial_eta(&self, y: &[f64]) -> Vec<f64> {
        let y_mean = y.iter().sum::<f64>() / y.len().max(1) as f64;
        let y_mean = y_mean.max(1e-3);

        y.iter()
            .map(|&yi| ((yi + y_mean) / 2.0).max(1e-3).ln())
            .collect()
    }
}
