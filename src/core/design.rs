//! Validated response vector and covariate matrix.
//!
//! A [`DesignMatrix`] is checked once at construction and never mutated
//! afterwards, so fitted models can share it through an `Arc`.

use super::poisson::is_count;
use crate::solvers::GlmError;
use crate::utils::matrix::numerical_rank;
use faer::{Col, Mat};

/// Relative pivot threshold used for the construction-time rank check.
pub const DEFAULT_RANK_TOLERANCE: f64 = 1e-10;

/// Count response `y` paired with an n × p covariate matrix `X`.
///
/// Invariants:
/// - `X` has as many rows as `y` has entries
/// - every `yᵢ` is a finite non-negative integer
/// - n ≥ p ≥ 1 and `X` has full column rank
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    x: Mat<f64>,
    y: Col<f64>,
    column_names: Vec<String>,
}

impl DesignMatrix {
    /// Validate and build a design from a covariate matrix and a response.
    ///
    /// Include a column of ones in `x` for an intercept, or use
    /// [`DesignMatrix::with_intercept`].
    ///
    /// # Errors
    ///
    /// - [`GlmError::ShapeMismatch`] when `x.nrows() != y.nrows()`
    /// - [`GlmError::DomainError`] when a response is negative, fractional or non-finite
    /// - [`GlmError::InvalidArgument`] when `x` has no columns or a non-finite entry
    /// - [`GlmError::RankDeficiency`] when n < p or the columns are linearly dependent
    pub fn new(x: Mat<f64>, y: Col<f64>) -> Result<Self, GlmError> {
        let n = x.nrows();
        let p = x.ncols();

        if n != y.nrows() {
            return Err(GlmError::ShapeMismatch {
                expected: n,
                got: y.nrows(),
            });
        }

        if p == 0 {
            return Err(GlmError::InvalidArgument(
                "design matrix must have at least one column".to_string(),
            ));
        }

        for i in 0..n {
            if !is_count(y[i]) {
                return Err(GlmError::DomainError(format!(
                    "response must be a non-negative integer count, got y[{}] = {}",
                    i, y[i]
                )));
            }
        }

        for j in 0..p {
            for i in 0..n {
                if !x[(i, j)].is_finite() {
                    return Err(GlmError::InvalidArgument(format!(
                        "covariate x[{}, {}] is not finite",
                        i, j
                    )));
                }
            }
        }

        if n < p {
            return Err(GlmError::RankDeficiency {
                rank: n,
                columns: p,
            });
        }

        let rank = numerical_rank(&x, DEFAULT_RANK_TOLERANCE);
        if rank < p {
            return Err(GlmError::RankDeficiency { rank, columns: p });
        }

        let column_names = (0..p).map(|j| format!("x{}", j)).collect();

        Ok(Self { x, y, column_names })
    }

    /// Build a design whose first column is an intercept of ones,
    /// followed by the columns of `covariates`.
    ///
    /// Columns are named `(Intercept)`, `x1`, `x2`, ...
    pub fn with_intercept(covariates: &Mat<f64>, y: Col<f64>) -> Result<Self, GlmError> {
        let n = covariates.nrows();
        let k = covariates.ncols();

        let x = Mat::from_fn(n, k + 1, |i, j| {
            if j == 0 {
                1.0
            } else {
                covariates[(i, j - 1)]
            }
        });

        let mut design = Self::new(x, y)?;
        design.column_names = std::iter::once("(Intercept)".to_string())
            .chain((1..=k).map(|j| format!("x{}", j)))
            .collect();
        Ok(design)
    }

    /// Replace the column labels.
    pub fn with_names<S: Into<String>>(mut self, names: Vec<S>) -> Result<Self, GlmError> {
        if names.len() != self.n_parameters() {
            return Err(GlmError::ShapeMismatch {
                expected: self.n_parameters(),
                got: names.len(),
            });
        }
        self.column_names = names.into_iter().map(Into::into).collect();
        Ok(self)
    }

    /// Design of a sub-model that keeps only `columns`, in the given order.
    ///
    /// The response is shared unchanged, which makes the result nested in
    /// `self` by construction.
    pub fn select_columns(&self, columns: &[usize]) -> Result<Self, GlmError> {
        let p = self.n_parameters();
        for (k, &c) in columns.iter().enumerate() {
            if c >= p {
                return Err(GlmError::InvalidArgument(format!(
                    "column index {} out of range for {} columns",
                    c, p
                )));
            }
            if columns[..k].contains(&c) {
                return Err(GlmError::InvalidArgument(format!(
                    "column index {} selected more than once",
                    c
                )));
            }
        }

        let x = Mat::from_fn(self.n_observations(), columns.len(), |i, j| {
            self.x[(i, columns[j])]
        });
        let mut design = Self::new(x, self.y.clone())?;
        design.column_names = columns
            .iter()
            .map(|&c| self.column_names[c].clone())
            .collect();
        Ok(design)
    }

    /// Number of observations n.
    pub fn n_observations(&self) -> usize {
        self.x.nrows()
    }

    /// Number of columns p (fitted coefficients).
    pub fn n_parameters(&self) -> usize {
        self.x.ncols()
    }

    /// Covariate row `xᵢ`, or `None` when `i` is out of range.
    pub fn row(&self, i: usize) -> Option<Vec<f64>> {
        if i >= self.n_observations() {
            return None;
        }
        Some((0..self.n_parameters()).map(|j| self.x[(i, j)]).collect())
    }

    /// The full covariate matrix.
    pub fn x(&self) -> &Mat<f64> {
        &self.x
    }

    /// The response vector.
    pub fn y(&self) -> &Col<f64> {
        &self.y
    }

    /// Response as a plain slice-friendly vector.
    pub fn y_values(&self) -> Vec<f64> {
        self.y.iter().copied().collect()
    }

    /// Column labels.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Whether `other` carries exactly the same response vector.
    pub fn same_response(&self, other: &DesignMatrix) -> bool {
        self.n_observations() == other.n_observations()
            && self.y.iter().zip(other.y.iter()).all(|(a, b)| a == b)
    }
}
