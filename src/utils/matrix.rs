//! Matrix utility functions.

use crate::solvers::GlmError;
use faer::{Col, Mat};

/// Numerical rank from a column-pivoted QR decomposition.
///
/// A column counts toward the rank when its pivoted diagonal entry satisfies
/// `|R_ii| > tolerance * |R_00|`.
pub fn numerical_rank(x: &Mat<f64>, tolerance: f64) -> usize {
    let k = x.nrows().min(x.ncols());
    if k == 0 {
        return 0;
    }

    let qr = x.col_piv_qr();
    let r = qr.R();

    let scale = r[(0, 0)].abs();
    if scale == 0.0 || !scale.is_finite() {
        return 0;
    }

    (0..k)
        .filter(|&i| r[(i, i)].abs() > tolerance * scale)
        .count()
}

/// Linear predictor η = X·β.
pub fn linear_predictor(x: &Mat<f64>, beta: &Col<f64>) -> Col<f64> {
    let n = x.nrows();
    let p = x.ncols();

    Col::from_fn(n, |i| (0..p).map(|j| x[(i, j)] * beta[j]).sum())
}

/// Solve the weighted normal equations (X'WX)β = X'Wz.
///
/// Works on the weighted design √W·X with a column-pivoted QR so that X'WX
/// is never formed. Any pivot below `rank_tolerance` relative to the largest
/// one is reported as [`GlmError::NumericalSingularity`].
pub fn solve_weighted_least_squares(
    x: &Mat<f64>,
    z: &[f64],
    weights: &[f64],
    rank_tolerance: f64,
) -> Result<Col<f64>, GlmError> {
    let n_samples = x.nrows();
    let n_params = x.ncols();

    if weights
        .iter()
        .any(|&w| !(w > 0.0) || !w.is_finite())
    {
        return Err(GlmError::NumericalSingularity);
    }

    let mut x_weighted = Mat::zeros(n_samples, n_params);
    let mut z_weighted = Col::zeros(n_samples);

    for i in 0..n_samples {
        let sqrt_w = weights[i].sqrt();
        for j in 0..n_params {
            x_weighted[(i, j)] = sqrt_w * x[(i, j)];
        }
        z_weighted[i] = sqrt_w * z[i];
    }

    let qr = x_weighted.col_piv_qr();
    let q = qr.compute_Q();
    let r = qr.R();
    let perm = qr.P();

    let scale = r[(0, 0)].abs();
    if scale == 0.0 || !scale.is_finite() {
        return Err(GlmError::NumericalSingularity);
    }

    let qtz = q.transpose() * z_weighted;

    let mut beta_perm = Col::zeros(n_params);
    for i in (0..n_params).rev() {
        let diag = r[(i, i)];
        if diag.abs() <= rank_tolerance * scale {
            return Err(GlmError::NumericalSingularity);
        }
        let mut sum = qtz[i];
        for j in (i + 1)..n_params {
            sum -= r[(i, j)] * beta_perm[j];
        }
        beta_perm[i] = sum / diag;
    }

    let mut beta = Col::zeros(n_params);
    for i in 0..n_params {
        beta[perm.inverse().arrays().0[i]] = beta_perm[i];
    }

    if beta.iter().any(|b| !b.is_finite()) {
        return Err(GlmError::NumericalSingularity);
    }

    Ok(beta)
}
