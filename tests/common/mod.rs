//! Common test utilities and data generators.

#![allow(dead_code)]

use faer::{Col, Mat};
use glm_select::DesignMatrix;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Poisson;

/// True intercept of the simulated rate.
pub const TRUE_INTERCEPT: f64 = 1.0;
/// True slope of the simulated rate.
pub const TRUE_SLOPE: f64 = 2.0;

/// Simulate y ~ Poisson(exp(intercept + slope · x)) with x ~ U[0, 1].
///
/// Returns the covariate column and the counts.
pub fn simulate_poisson(
    n_samples: usize,
    intercept: f64,
    slope: f64,
    seed: u64,
) -> (Mat<f64>, Col<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let uniform = Uniform::new(0.0, 1.0);

    let mut x = Mat::zeros(n_samples, 1);
    let mut y = Col::zeros(n_samples);
    for i in 0..n_samples {
        let xi: f64 = uniform.sample(&mut rng);
        let mu = (intercept + slope * xi).exp();
        let dist = Poisson::new(mu).unwrap();
        x[(i, 0)] = xi;
        y[i] = dist.sample(&mut rng);
    }

    (x, y)
}

/// The reference dataset: n = 100 draws from Poisson(exp(1 + 2x)).
pub fn reference_data(seed: u64) -> (Mat<f64>, Col<f64>) {
    simulate_poisson(100, TRUE_INTERCEPT, TRUE_SLOPE, seed)
}

/// Intercept plus slope design over the reference dataset.
pub fn reference_design(seed: u64) -> DesignMatrix {
    let (x, y) = reference_data(seed);
    DesignMatrix::with_intercept(&x, y)
        .unwrap()
        .with_names(vec!["(Intercept)", "x"])
        .unwrap()
}

/// Reference design with an extra column of pure noise unrelated to y.
pub fn design_with_noise_column(seed: u64) -> DesignMatrix {
    let (x, y) = reference_data(seed);
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let uniform = Uniform::new(-1.0, 1.0);

    let n = x.nrows();
    let noise: Vec<f64> = (0..n).map(|_| uniform.sample(&mut rng)).collect();
    let covariates = Mat::from_fn(n, 2, |i, j| if j == 0 { x[(i, 0)] } else { noise[i] });

    DesignMatrix::with_intercept(&covariates, y)
        .unwrap()
        .with_names(vec!["(Intercept)", "x", "noise"])
        .unwrap()
}
