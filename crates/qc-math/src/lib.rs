//! # qc-math
//!
//! Numerical building blocks for quantcurve: the 1-D root-finding framework
//! used to solve for curve node values, and the interpolation backend the
//! bootstrapper fits over its nodes.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// 1-D root-finding solvers.
pub mod solvers1d;

/// 1-D interpolation schemes.
pub mod interpolation;

pub use interpolation::{
    Interpolation, InterpolationFactory, Linear, LogLinear, NaturalCubic,
};
pub use solvers1d::{
    Bisection, Brent, DerivativeSolver1D, FalsePosition, Newton, NewtonSafe, Ridder, Secant,
    Solver1D, SolverOptions, SolverState,
};
