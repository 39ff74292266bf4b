//! Residual diagnostics for fitted GLMs.
//!
//! - **Residuals**: response, Pearson, deviance and working residuals
//! - **Dispersion**: Pearson χ² and the dispersion estimate X² / (n − p)
//!
//! # Example
//!
//! ```rust,ignore
//! use glm_select::diagnostics::{deviance_residuals, estimate_dispersion};
//!
//! let resid = deviance_residuals(&fitted);
//! let phi = estimate_dispersion(&fitted);
//! ```

mod glm_residuals;

pub use glm_residuals::{
    deviance_residuals, estimate_dispersion, pearson_chi_squared, pearson_residuals,
    response_residuals, working_residuals,
};
