//! Special functions and reference distributions used for model comparison.
//!
//! - **Incomplete gamma**: regularized lower and upper incomplete gamma
//!   functions P(s, x) and Q(s, x)
//! - **Chi-square**: CDF and upper tail built on the incomplete gamma,
//!   used to turn likelihood-ratio statistics into p-values

mod chi_squared;
mod gamma;

pub use chi_squared::{chi_square_cdf, chi_square_upper_tail};
pub use gamma::{regularized_gamma_p, regularized_gamma_q};
