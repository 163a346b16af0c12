//! # qc-termstructures
//!
//! Yield term structures: the common [`TermStructure`] /
//! [`YieldTermStructure`] interface, a flat-forward reference curve, rate
//! helpers wrapping calibrating market instruments, and the lazily
//! re-bootstrapped [`PiecewiseYieldCurve`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bootstrap_traits;
mod flat_forward;
mod piecewise_yield_curve;
mod rate_helpers;
mod term_structure;
mod yield_term_structure;

pub use bootstrap_traits::{BootstrapTraits, Discount, ZeroYield};
pub use flat_forward::FlatForward;
pub use piecewise_yield_curve::{BootstrapConfig, PiecewiseYieldCurve};
pub use rate_helpers::{
    DepositRateHelper, FraRateHelper, RateHelper, SwapRateHelper, TrialCurve,
};
pub use term_structure::TermStructure;
pub use yield_term_structure::YieldTermStructure;
