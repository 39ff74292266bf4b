//! Likelihood-based model comparison.
//!
//! Information criteria score single models; the likelihood-ratio test
//! compares a reduced model against a full model that nests it.
//!
//! # Example
//!
//! ```rust,ignore
//! use glm_select::prelude::*;
//!
//! let full = GlmFitter::poisson().build().fit(design.clone())?;
//! let reduced = GlmFitter::poisson()
//!     .build()
//!     .fit(Arc::new(design.select_columns(&[0])?))?;
//!
//! let test = ModelSelector::likelihood_ratio_test(&reduced, &full)?;
//! println!("LR = {:.3} on {} df, p = {:.4}", test.statistic, test.df, test.p_value);
//! ```

use crate::core::{FittedModel, GlmFamily};
use crate::distributions::chi_square_upper_tail;
use crate::solvers::GlmError;
use crate::utils::matrix::linear_predictor;
use std::sync::Arc;
use tracing::warn;

/// Relative slack below zero tolerated on an LR statistic before it is
/// treated as a nesting violation. Covers rounding only.
const NEGATIVE_STATISTIC_SLACK: f64 = 1e-9;

/// Information criterion used to score and rank models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InformationCriterion {
    /// Akaike Information Criterion
    #[default]
    AIC,
    /// Corrected AIC (better for small samples)
    AICc,
    /// Bayesian Information Criterion
    BIC,
}

impl InformationCriterion {
    /// Compute the criterion from a maximized log-likelihood.
    ///
    /// # Arguments
    /// * `log_lik` - Log-likelihood at the fitted coefficients
    /// * `k` - Number of fitted coefficients
    /// * `n` - Number of observations (AICc and BIC only)
    pub fn compute(&self, log_lik: f64, k: usize, n: usize) -> f64 {
        let k_f = k as f64;
        let n_f = n as f64;

        match self {
            InformationCriterion::AIC => 2.0 * k_f - 2.0 * log_lik,
            InformationCriterion::AICc => {
                let aic = 2.0 * k_f - 2.0 * log_lik;
                if n_f - k_f - 1.0 > 0.0 {
                    aic + 2.0 * k_f * (k_f + 1.0) / (n_f - k_f - 1.0)
                } else {
                    f64::INFINITY
                }
            }
            InformationCriterion::BIC => k_f * n_f.ln() - 2.0 * log_lik,
        }
    }
}

/// Outcome of a likelihood-ratio test between nested models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    /// −2 · (ℓ_reduced − ℓ_full), non-negative.
    pub statistic: f64,
    /// Difference in the number of coefficients.
    pub df: usize,
    /// Upper χ²(df) tail probability of the statistic.
    pub p_value: f64,
}

impl TestResult {
    /// Whether the full model is a significant improvement at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Position of one candidate in an information-criterion ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRanking {
    /// Index of the model in the slice passed to [`ModelSelector::rank_models`].
    pub index: usize,
    /// Criterion value (lower is better).
    pub criterion: f64,
    /// Difference from the best criterion value.
    pub delta: f64,
    /// Akaike weight exp(−Δ/2) / Σ exp(−Δⱼ/2).
    pub weight: f64,
}

/// Computes comparison statistics from fitted models.
pub struct ModelSelector;

impl ModelSelector {
    /// Log-likelihood Σ log p(yᵢ | μᵢ) recomputed at the fitted coefficients.
    ///
    /// Independent of the value the fitter tracked while iterating.
    pub fn log_likelihood<F: GlmFamily>(model: &FittedModel<F>) -> Result<f64, GlmError> {
        let design = model.design();
        let family = model.family();
        let eta = linear_predictor(design.x(), model.coefficients());
        let y = design.y();

        let mut total = 0.0;
        for i in 0..design.n_observations() {
            let mu = family.mean(eta[i])?;
            total += family.log_pmf(y[i], mu)?;
        }
        Ok(total)
    }

    /// AIC = 2p − 2ℓ.
    pub fn aic<F: GlmFamily>(model: &FittedModel<F>) -> Result<f64, GlmError> {
        Self::criterion(model, InformationCriterion::AIC)
    }

    /// AICc = AIC + 2p(p + 1) / (n − p − 1), infinite when n ≤ p + 1.
    pub fn aicc<F: GlmFamily>(model: &FittedModel<F>) -> Result<f64, GlmError> {
        Self::criterion(model, InformationCriterion::AICc)
    }

    /// BIC = p·ln(n) − 2ℓ.
    pub fn bic<F: GlmFamily>(model: &FittedModel<F>) -> Result<f64, GlmError> {
        Self::criterion(model, InformationCriterion::BIC)
    }

    /// Evaluate any supported information criterion.
    pub fn criterion<F: GlmFamily>(
        model: &FittedModel<F>,
        ic: InformationCriterion,
    ) -> Result<f64, GlmError> {
        let log_lik = Self::log_likelihood(model)?;
        Ok(ic.compute(log_lik, model.n_parameters(), model.n_observations()))
    }

    /// Likelihood-ratio test of `reduced` against the `full` model nesting it.
    ///
    /// The caller guarantees that the columns of `reduced` are a subset of
    /// those of `full`; only the response and the parameter counts are
    /// checked here.
    ///
    /// # Errors
    ///
    /// [`GlmError::InvalidArgument`] when the responses differ, when
    /// `reduced` does not have fewer coefficients than `full`, or when the
    /// statistic comes out negative (the models are not nested or a fit did
    /// not converge).
    pub fn likelihood_ratio_test<F: GlmFamily>(
        reduced: &FittedModel<F>,
        full: &FittedModel<F>,
    ) -> Result<TestResult, GlmError> {
        let shared = Arc::ptr_eq(reduced.design(), full.design())
            || reduced.design().same_response(full.design());
        if !shared {
            return Err(GlmError::InvalidArgument(
                "models compared by a likelihood-ratio test must share the response".to_string(),
            ));
        }

        let p_reduced = reduced.n_parameters();
        let p_full = full.n_parameters();
        if p_reduced >= p_full {
            return Err(GlmError::InvalidArgument(format!(
                "reduced model must have fewer coefficients than the full model ({} >= {})",
                p_reduced, p_full
            )));
        }

        let ll_reduced = Self::log_likelihood(reduced)?;
        let ll_full = Self::log_likelihood(full)?;
        let mut statistic = -2.0 * (ll_reduced - ll_full);

        if statistic < 0.0 {
            let slack = NEGATIVE_STATISTIC_SLACK * ll_full.abs().max(1.0);
            if statistic < -slack {
                return Err(GlmError::InvalidArgument(format!(
                    "negative likelihood-ratio statistic {statistic}: \
                     models are not nested or a fit did not converge"
                )));
            }
            warn!(statistic, "clamping rounding-level negative LR statistic to zero");
            statistic = 0.0;
        }

        let df = p_full - p_reduced;
        let p_value = chi_square_upper_tail(statistic, df)?;

        Ok(TestResult {
            statistic,
            df,
            p_value,
        })
    }

    /// Rank candidate models by an information criterion, best first.
    ///
    /// Candidates need not be nested, but they should share the response for
    /// the comparison to mean anything.
    pub fn rank_models<F: GlmFamily>(
        models: &[FittedModel<F>],
        ic: InformationCriterion,
    ) -> Result<Vec<ModelRanking>, GlmError> {
        if models.is_empty() {
            return Err(GlmError::InvalidArgument(
                "at least one model is required for ranking".to_string(),
            ));
        }

        let mut scored = Vec::with_capacity(models.len());
        for (index, model) in models.iter().enumerate() {
            scored.push((index, Self::criterion(model, ic)?));
        }
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));

        let best = scored[0].1;
        let total_weight: f64 = scored
            .iter()
            .map(|&(_, value)| (-(value - best) / 2.0).exp())
            .sum();

        Ok(scored
            .into_iter()
            .map(|(index, criterion)| {
                let delta = criterion - best;
                ModelRanking {
                    index,
                    criterion,
                    delta,
                    weight: (-delta / 2.0).exp() / total_weight,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DesignMatrix;
    use crate::solvers::{GlmFitter, ModelFitter};
    use approx::assert_relative_eq;
    use faer::{Col, Mat};

    fn two_group_design() -> Arc<DesignMatrix> {
        let x = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 0.0, 3.0, 5.0, 7.0, 6.0, 6.0];
        let covariates = Mat::from_fn(8, 1, |i, _| x[i]);
        let response = Col::from_fn(8, |i| y[i]);
        Arc::new(DesignMatrix::with_intercept(&covariates, response).unwrap())
    }

    #[test]
    fn test_information_criterion_compute() {
        let ll = -10.0;
        assert_relative_eq!(InformationCriterion::AIC.compute(ll, 2, 20), 24.0);
        assert_relative_eq!(
            InformationCriterion::AICc.compute(ll, 2, 20),
            24.0 + 12.0 / 17.0
        );
        assert_relative_eq!(
            InformationCriterion::BIC.compute(ll, 2, 20),
            2.0 * 20.0_f64.ln() + 20.0
        );
        assert!(InformationCriterion::AICc.compute(ll, 3, 4).is_infinite());
    }

    #[test]
    fn test_log_likelihood_matches_fitter() {
        let full = GlmFitter::poisson().build().fit(two_group_design()).unwrap();
        let ll = ModelSelector::log_likelihood(&full).unwrap();
        assert_relative_eq!(ll, full.fit_log_likelihood(), epsilon = 1e-9);
    }

    #[test]
    fn test_aic_definition() {
        let full = GlmFitter::poisson().build().fit(two_group_design()).unwrap();
        let ll = ModelSelector::log_likelihood(&full).unwrap();
        assert_relative_eq!(ModelSelector::aic(&full).unwrap(), 4.0 - 2.0 * ll);
    }

    #[test]
    fn test_lrt_two_groups() {
        let design = two_group_design();
        let fitter = GlmFitter::poisson().build();
        let full = fitter.fit(design.clone()).unwrap();
        let reduced = fitter
            .fit(Arc::new(design.select_columns(&[0]).unwrap()))
            .unwrap();

        let test = ModelSelector::likelihood_ratio_test(&reduced, &full).unwrap();
        assert_eq!(test.df, 1);
        assert!(test.statistic > 0.0);
        assert!((0.0..=1.0).contains(&test.p_value));

        // Closed form: 2 Σ y log(μ_full / μ_reduced) with group means 1.5 / 6 and pooled 3.75
        let expected = 2.0 * (6.0 * (1.5_f64 / 3.75).ln() + 24.0 * (6.0_f64 / 3.75).ln());
        assert_relative_eq!(test.statistic, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_lrt_rejects_misordered_models() {
        let design = two_group_design();
        let fitter = GlmFitter::poisson().build();
        let full = fitter.fit(design.clone()).unwrap();
        let reduced = fitter
            .fit(Arc::new(design.select_columns(&[0]).unwrap()))
            .unwrap();

        assert!(matches!(
            ModelSelector::likelihood_ratio_test(&full, &reduced),
            Err(GlmError::InvalidArgument(_))
        ));
        assert!(matches!(
            ModelSelector::likelihood_ratio_test(&full, &full),
            Err(GlmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_lrt_rejects_different_responses() {
        let full = GlmFitter::poisson().build().fit(two_group_design()).unwrap();

        let other_y = Col::from_fn(8, |i| (i % 3) as f64);
        let other = Arc::new(DesignMatrix::new(Mat::from_fn(8, 1, |_, _| 1.0), other_y).unwrap());
        let reduced = GlmFitter::poisson().build().fit(other).unwrap();

        assert!(matches!(
            ModelSelector::likelihood_ratio_test(&reduced, &full),
            Err(GlmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_lrt_rejects_negative_statistic() {
        let design = two_group_design();

        // One IRLS step from a distant start leaves the "full" model far
        // below the reduced optimum.
        let poor_full = GlmFitter::poisson()
            .start(Col::from_fn(2, |j| if j == 0 { 3.0 } else { -3.0 }))
            .max_iterations(1)
            .tolerance(1e-300)
            .coefficient_tolerance(0.0)
            .build()
            .fit(design.clone())
            .unwrap();
        let reduced = GlmFitter::poisson()
            .build()
            .fit(Arc::new(design.select_columns(&[0]).unwrap()))
            .unwrap();

        assert!(!poor_full.converged());
        let ll_poor = ModelSelector::log_likelihood(&poor_full).unwrap();
        let ll_reduced = ModelSelector::log_likelihood(&reduced).unwrap();
        assert!(ll_poor < ll_reduced);

        assert!(matches!(
            ModelSelector::likelihood_ratio_test(&reduced, &poor_full),
            Err(GlmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rank_models_prefers_true_model() {
        let design = two_group_design();
        let fitter = GlmFitter::poisson().build();
        let models = vec![
            fitter
                .fit(Arc::new(design.select_columns(&[0]).unwrap()))
                .unwrap(),
            fitter.fit(design.clone()).unwrap(),
        ];

        let ranking = ModelSelector::rank_models(&models, InformationCriterion::AIC).unwrap();
        assert_eq!(ranking[0].index, 1);
        assert_eq!(ranking[0].delta, 0.0);
        assert!(ranking[1].delta > 0.0);
        let total: f64 = ranking.iter().map(|r| r.weight).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rank_models_requires_candidates() {
        let models: Vec<FittedModel> = Vec::new();
        assert!(matches!(
            ModelSelector::rank_models(&models, InformationCriterion::BIC),
            Err(GlmError::InvalidArgument(_))
        ));
    }
}
