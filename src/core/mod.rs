//! Core types: the design, the exponential family, fit options and results.

mod design;
mod family;
mod options;
mod poisson;
mod result;

pub use design::{DesignMatrix, DEFAULT_RANK_TOLERANCE};
pub use family::GlmFamily;
pub use options::{FitOptions, FitOptionsBuilder, OptionsError};
pub use poisson::{PoissonFamily, MAX_ETA};
pub use result::FittedModel;
