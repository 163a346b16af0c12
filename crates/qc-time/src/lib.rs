//! # qc-time
//!
//! Date arithmetic and day-count conventions for quantcurve.
//!
//! Calendars, holiday tables, and business-day adjustment are out of scope;
//! this crate provides only the narrow surface the curve machinery consumes:
//! a serial-number [`Date`], tenor arithmetic via [`Period`], and the
//! [`DayCounter`] year-fraction conventions.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date;
mod day_counter;
mod period;

pub use date::Date;
pub use day_counter::{Actual360, Actual365Fixed, DayCounter, Thirty360};
pub use period::{Period, TimeUnit};
