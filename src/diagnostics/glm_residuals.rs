//! Residuals of a fitted GLM.
//!
//! # Residual Types
//!
//! - **Response**: `y - μ`
//! - **Pearson**: `(y - μ) / sqrt(V(μ))`
//! - **Deviance**: `sign(y - μ) * sqrt(d_i)` where `d_i` is the unit deviance
//! - **Working**: `z - η`, the IRLS pseudo-response minus the linear predictor
//!
//! # Reference
//!
//! McCullagh, P. and Nelder, J.A. (1989). Generalized Linear Models, 2nd ed.

use crate::core::{FittedModel, GlmFamily};
use faer::Col;

/// Response residuals: y - μ.
pub fn response_residuals<F: GlmFamily>(model: &FittedModel<F>) -> Col<f64> {
    let y = model.design().y();
    let mu = model.fitted_values();
    Col::from_fn(y.nrows(), |i| y[i] - mu[i])
}

/// Pearson residuals: (y - μ) / sqrt(V(μ)).
pub fn pearson_residuals<F: GlmFamily>(model: &FittedModel<F>) -> Col<f64> {
    let y = model.design().y();
    let mu = model.fitted_values();
    let family = model.family();
    Col::from_fn(y.nrows(), |i| {
        let v = family.variance(mu[i]);
        if v < 1e-14 {
            0.0
        } else {
            (y[i] - mu[i]) / v.sqrt()
        }
    })
}

/// Deviance residuals: sign(y - μ) * sqrt(d_i).
///
/// The squares sum to the model deviance.
pub fn deviance_residuals<F: GlmFamily>(model: &FittedModel<F>) -> Col<f64> {
    let y = model.design().y();
    let mu = model.fitted_values();
    let family = model.family();
    Col::from_fn(y.nrows(), |i| {
        let d_i = family.unit_deviance(y[i], mu[i]).max(0.0);
        let sign = if y[i] >= mu[i] { 1.0 } else { -1.0 };
        sign * d_i.sqrt()
    })
}

/// Working residuals: z - η.
///
/// For the log link this is (y - μ) / μ.
pub fn working_residuals<F: GlmFamily>(model: &FittedModel<F>) -> Col<f64> {
    let y = model.design().y();
    let mu = model.fitted_values();
    let eta = model.linear_predictor();
    let family = model.family();
    Col::from_fn(y.nrows(), |i| {
        family.working_response(y[i], mu[i], eta[i]) - eta[i]
    })
}

/// Pearson's chi-squared statistic: Σ (y - μ)² / V(μ).
pub fn pearson_chi_squared<F: GlmFamily>(model: &FittedModel<F>) -> f64 {
    pearson_residuals(model).iter().map(|r| r * r).sum()
}

/// Pearson dispersion estimate φ̂ = X² / (n - p).
///
/// Values well above 1 flag overdispersion relative to the Poisson
/// assumption. Returns 1.0 when there are no residual degrees of freedom.
pub fn estimate_dispersion<F: GlmFamily>(model: &FittedModel<F>) -> f64 {
    let df = model.residual_df();
    if df == 0 {
        return 1.0;
    }
    pearson_chi_squared(model) / df as f64
}
