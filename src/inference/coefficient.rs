//! Wald inference for fitted GLM coefficients.

use crate::core::{FittedModel, GlmFamily};
use crate::solvers::GlmError;
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, Normal};

/// Per-coefficient Wald statistics at a given confidence level.
#[derive(Debug, Clone)]
pub struct CoefficientSummary {
    /// Column labels from the design.
    pub names: Vec<String>,
    /// Coefficient estimates.
    pub estimates: Col<f64>,
    /// Standard errors sqrt(diag((XᵗWX)⁻¹)).
    pub std_errors: Col<f64>,
    /// z = estimate / standard error.
    pub z_statistics: Col<f64>,
    /// Two-sided p-values P(|Z| > |z|).
    pub p_values: Col<f64>,
    /// Lower confidence bounds.
    pub conf_lower: Col<f64>,
    /// Upper confidence bounds.
    pub conf_upper: Col<f64>,
    /// Confidence level used for the bounds.
    pub confidence_level: f64,
}

/// Computes inference statistics for GLM coefficients.
///
/// Uses the Fisher information XᵗWX at the fitted means with unit
/// dispersion, which is exact for the Poisson family.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Asymptotic covariance matrix (XᵗWX)⁻¹ of the coefficients.
    pub fn covariance<F: GlmFamily>(model: &FittedModel<F>) -> Result<Mat<f64>, GlmError> {
        let x = model.design().x();
        let mu = model.fitted_values();
        let n_samples = x.nrows();
        let n_params = x.ncols();

        let mut xtwx: Mat<f64> = Mat::zeros(n_params, n_params);
        for i in 0..n_samples {
            let w = model.family().working_weight(mu[i]);
            for j in 0..n_params {
                for k in 0..n_params {
                    xtwx[(j, k)] += w * x[(i, j)] * x[(i, k)];
                }
            }
        }

        let qr = xtwx.qr();
        let q = qr.compute_Q();
        let r = qr.R().to_owned();

        let scale = (0..n_params).map(|i| r[(i, i)].abs()).fold(0.0_f64, f64::max);
        if scale == 0.0 || !scale.is_finite() {
            return Err(GlmError::NumericalSingularity);
        }

        let mut xtwx_inv: Mat<f64> = Mat::zeros(n_params, n_params);
        for col in 0..n_params {
            let mut e = Col::zeros(n_params);
            e[col] = 1.0;
            let qte = q.transpose() * e;

            let mut sol = Col::zeros(n_params);
            for i in (0..n_params).rev() {
                if r[(i, i)].abs() <= 1e-14 * scale {
                    return Err(GlmError::NumericalSingularity);
                }
                let mut sum = qte[i];
                for j in (i + 1)..n_params {
                    sum -= r[(i, j)] * sol[j];
                }
                sol[i] = sum / r[(i, i)];
            }

            for i in 0..n_params {
                xtwx_inv[(i, col)] = sol[i];
            }
        }

        Ok(xtwx_inv)
    }

    /// Standard errors, z statistics, p-values and confidence intervals.
    ///
    /// # Errors
    ///
    /// - [`GlmError::InvalidArgument`] when `level` is not in (0, 1)
    /// - [`GlmError::NumericalSingularity`] when the information matrix cannot be inverted
    pub fn summarize<F: GlmFamily>(
        model: &FittedModel<F>,
        level: f64,
    ) -> Result<CoefficientSummary, GlmError> {
        if !(level > 0.0 && level < 1.0) {
            return Err(GlmError::InvalidArgument(format!(
                "confidence level must be in (0, 1), got {level}"
            )));
        }

        let cov = Self::covariance(model)?;
        let beta = model.coefficients();
        let n_params = beta.nrows();

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| GlmError::InvalidArgument(format!("standard normal: {e}")))?;
        let z_crit = normal.inverse_cdf(1.0 - (1.0 - level) / 2.0);

        let std_errors = Col::from_fn(n_params, |j| {
            let var = cov[(j, j)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        });
        let z_statistics = Col::from_fn(n_params, |j| {
            if std_errors[j].is_nan() || std_errors[j] == 0.0 {
                f64::NAN
            } else {
                beta[j] / std_errors[j]
            }
        });
        let p_values = Col::from_fn(n_params, |j| {
            let z = z_statistics[j];
            if z.is_nan() {
                f64::NAN
            } else {
                2.0 * (1.0 - normal.cdf(z.abs()))
            }
        });
        let conf_lower = Col::from_fn(n_params, |j| beta[j] - z_crit * std_errors[j]);
        let conf_upper = Col::from_fn(n_params, |j| beta[j] + z_crit * std_errors[j]);

        Ok(CoefficientSummary {
            names: model.design().column_names().to_vec(),
            estimates: beta.clone(),
            std_errors,
            z_statistics,
            p_values,
            conf_lower,
            conf_upper,
            confidence_level: level,
        })
    }
}
