//! Statistical inference: model comparison and coefficient tests.

mod coefficient;
mod selection;

pub use coefficient::{CoefficientInference, CoefficientSummary};
pub use selection::{InformationCriterion, ModelRanking, ModelSelector, TestResult};
