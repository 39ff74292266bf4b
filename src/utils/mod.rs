//! Linear-algebra helpers shared by the solvers.

pub mod matrix;
