//! Chi-square distribution functions.
//!
//! A χ²(k) variable is Gamma(k/2, 1/2), so both functions reduce to the
//! regularized incomplete gamma at (k/2, x/2).

use super::gamma::{regularized_gamma_p, regularized_gamma_q};
use crate::solvers::GlmError;

fn check_arguments(statistic: f64, df: usize) -> Result<(), GlmError> {
    if df < 1 {
        return Err(GlmError::InvalidArgument(format!(
            "chi-square degrees of freedom must be at least 1, got {df}"
        )));
    }
    if statistic.is_nan() || statistic < 0.0 {
        return Err(GlmError::InvalidArgument(format!(
            "chi-square statistic must be non-negative, got {statistic}"
        )));
    }
    Ok(())
}

/// Upper-tail probability P(X ≥ statistic) for X ~ χ²(df).
///
/// Returns exactly 1.0 at `statistic == 0` and tends to 0.0 as the statistic
/// grows. This is the p-value of a likelihood-ratio test.
///
/// # Errors
///
/// - [`GlmError::InvalidArgument`] when `df < 1` or `statistic` is negative or NaN
/// - [`GlmError::NumericalNonConvergence`] from the incomplete gamma evaluation
pub fn chi_square_upper_tail(statistic: f64, df: usize) -> Result<f64, GlmError> {
    check_arguments(statistic, df)?;
    regularized_gamma_q(df as f64 / 2.0, statistic / 2.0)
}

/// Cumulative probability P(X ≤ statistic) for X ~ χ²(df).
///
/// # Errors
///
/// Same conditions as [`chi_square_upper_tail`].
pub fn chi_square_cdf(statistic: f64, df: usize) -> Result<f64, GlmError> {
    check_arguments(statistic, df)?;
    regularized_gamma_p(df as f64 / 2.0, statistic / 2.0)
}
