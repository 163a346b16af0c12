//! # quantcurve
//!
//! Yield-curve bootstrapping with lazy recalculation.
//!
//! The library is split into focused crates, all re-exported here:
//!
//! * [`qc_core`] — error type, observer protocol, lazy objects, handles;
//! * [`qc_time`] — dates, periods, day-count conventions;
//! * [`qc_math`] — 1-D root-finding solvers and interpolation;
//! * [`qc_quotes`] — observable market quotes;
//! * [`qc_termstructures`] — term structures and the curve bootstrapper.
//!
//! ## Example
//!
//! Bootstrap a discount curve from three deposits and query it:
//!
//! ```
//! use std::rc::Rc;
//! use quantcurve::prelude::*;
//!
//! fn main() -> quantcurve::Result<()> {
//!     let today = Date::from_ymd(2025, 1, 2)?;
//!     let quote = SimpleQuote::new(0.0458);
//!     let deposit = |q: &Rc<SimpleQuote>, days| -> quantcurve::Result<Rc<dyn RateHelper>> {
//!         let handle: Handle<dyn Quote> = Handle::new(q.clone());
//!         Ok(DepositRateHelper::new(
//!             handle,
//!             today,
//!             today.add_days(days)?,
//!             Actual360,
//!         )?)
//!     };
//!     let helpers = vec![deposit(&quote, 90)?];
//!
//!     let curve = PiecewiseYieldCurve::new(
//!         today,
//!         helpers,
//!         Discount::default(),
//!         LogLinear,
//!         Actual360,
//!         BootstrapConfig::default(),
//!     )?;
//!
//!     let df = curve.discount(today.add_days(90)?, false)?;
//!     assert!(df < 1.0);
//!
//!     // A quote update only marks the curve stale; the next query
//!     // re-bootstraps.
//!     quote.set_value(0.046);
//!     let _ = curve.discount(today.add_days(90)?, false)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use qc_core;
pub use qc_math;
pub use qc_quotes;
pub use qc_termstructures;
pub use qc_time;

pub use qc_core::{Error, Result};

/// The names needed by typical curve-building code.
pub mod prelude {
    pub use qc_core::{
        DiscountFactor, Error, Handle, LazyObject, Observable, Observer, Rate, Real,
        RelinkableHandle, Result, Spread, Time,
    };
    pub use qc_math::{
        Bisection, Brent, DerivativeSolver1D, FalsePosition, Interpolation,
        InterpolationFactory, Linear, LogLinear, NaturalCubic, Newton, NewtonSafe, Ridder,
        Secant, Solver1D, SolverOptions,
    };
    pub use qc_quotes::{DerivedQuote, Quote, SimpleQuote};
    pub use qc_termstructures::{
        BootstrapConfig, BootstrapTraits, DepositRateHelper, Discount, FlatForward,
        FraRateHelper, PiecewiseYieldCurve, RateHelper, SwapRateHelper, TermStructure,
        TrialCurve, YieldTermStructure, ZeroYield,
    };
    pub use qc_time::{
        Actual360, Actual365Fixed, Date, DayCounter, Period, Thirty360, TimeUnit,
    };
}
