//! Maximum-likelihood GLM solvers.

mod irls;
mod traits;

pub use irls::{GlmFitter, GlmFitterBuilder};
pub use traits::{GlmError, ModelFitter};
