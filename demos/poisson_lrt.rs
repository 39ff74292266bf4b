//! Simulate Poisson counts, fit nested models, and compare them.
//!
//! Run with `RUST_LOG=glm_select=debug` to see each IRLS step.

use faer::{Col, Mat};
use glm_select::prelude::*;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Poisson;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn simulate(n: usize, seed: u64) -> Result<(Mat<f64>, Col<f64>), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let uniform = Uniform::new(0.0, 1.0);

    let mut x = Mat::zeros(n, 1);
    let mut y = Col::zeros(n);
    for i in 0..n {
        let xi: f64 = uniform.sample(&mut rng);
        let dist = Poisson::new((1.0 + 2.0 * xi).exp())?;
        x[(i, 0)] = xi;
        y[i] = dist.sample(&mut rng);
    }
    Ok((x, y))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("glm_select=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let (x, y) = simulate(100, 42)?;
    let full = Arc::new(DesignMatrix::with_intercept(&x, y)?.with_names(vec!["(Intercept)", "x"])?);
    let reduced = Arc::new(full.select_columns(&[0])?);

    let fitter = GlmFitter::poisson().tolerance(1e-8).max_iterations(25).build();
    let full_fit = fitter.fit(full)?;
    let reduced_fit = fitter.fit(reduced)?;

    println!("Full model (y ~ 1 + x):");
    let summary = CoefficientInference::summarize(&full_fit, 0.95)?;
    for j in 0..summary.names.len() {
        println!(
            "  {:<12} {:>9.4}  se {:.4}  95% CI [{:.4}, {:.4}]",
            summary.names[j],
            summary.estimates[j],
            summary.std_errors[j],
            summary.conf_lower[j],
            summary.conf_upper[j]
        );
    }
    println!("  iterations: {}, converged: {}", full_fit.iterations(), full_fit.converged());
    println!("  dispersion: {:.3}", estimate_dispersion(&full_fit));

    println!();
    println!("AIC full    = {:.3}", ModelSelector::aic(&full_fit)?);
    println!("AIC reduced = {:.3}", ModelSelector::aic(&reduced_fit)?);

    let test = ModelSelector::likelihood_ratio_test(&reduced_fit, &full_fit)?;
    println!(
        "LRT: statistic = {:.3}, df = {}, p = {:.3e}",
        test.statistic, test.df, test.p_value
    );

    Ok(())
}
