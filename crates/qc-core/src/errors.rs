//! Error types for quantcurve.
//!
//! A single `thiserror`-derived enum covers the whole library. The solver and
//! bootstrap failure modes carry enough context to locate the offending
//! bracket or market instrument; nothing is ever swallowed or replaced by a
//! NaN placeholder.

use thiserror::Error;

/// The top-level error type used throughout quantcurve.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// The auto-bracketing routine exhausted its evaluation budget without
    /// finding a sign change.
    #[error(
        "unable to bracket root in {evaluations} function evaluations \
         (last bracket attempt: f[{x_min},{x_max}] -> [{fx_min},{fx_max}])"
    )]
    Bracketing {
        /// Function evaluations spent before giving up.
        evaluations: usize,
        /// Lower end of the last bracket attempt.
        x_min: f64,
        /// Upper end of the last bracket attempt.
        x_max: f64,
        /// Function value at `x_min`.
        fx_min: f64,
        /// Function value at `x_max`.
        fx_max: f64,
    },

    /// A solver performed its maximum allowed number of function evaluations
    /// without meeting the accuracy criterion.
    #[error("maximum number of function evaluations ({max}) exceeded")]
    MaxEvaluations {
        /// The evaluation cap that was hit.
        max: usize,
    },

    /// A specific calibrating instrument could not be repriced during
    /// bootstrapping.
    #[error("could not bootstrap instrument {index} (maturity {maturity}): {source}")]
    NodeBootstrap {
        /// Zero-based index of the instrument in maturity order.
        index: usize,
        /// The instrument's maturity (pillar) date, formatted.
        maturity: String,
        /// The underlying solver error.
        source: Box<Error>,
    },

    /// The outer convergence loop over a global interpolant exceeded its
    /// pass budget.
    #[error(
        "convergence not reached after {passes} passes; \
         last improvement {improvement:e}, required accuracy {accuracy:e}"
    )]
    Convergence {
        /// Number of full bootstrap passes performed.
        passes: usize,
        /// Aggregate node change over the last pass.
        improvement: f64,
        /// The configured bootstrap accuracy.
        accuracy: f64,
    },
}

/// Shorthand `Result` type used throughout quantcurve.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use qc_core::ensure;
/// fn positive(x: f64) -> qc_core::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
