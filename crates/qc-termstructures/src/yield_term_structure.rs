//! The interest-rate term structure interface.

use qc_core::{ensure, DiscountFactor, Rate, Result, Time};
use qc_time::Date;

use crate::term_structure::TermStructure;

/// Interval used when an instantaneous forward is requested.
const FORWARD_DT: Time = 1.0e-4;

/// A term structure of interest rates, queried through discount factors.
///
/// Implementors provide [`discount_impl`](YieldTermStructure::discount_impl);
/// zero and forward rates are derived from discounts, so internal consistency
/// (`forward` from discount ratios, `zero` from a single discount) holds by
/// construction. All rates are continuously compounded.
pub trait YieldTermStructure: TermStructure {
    /// Discount factor at time `t`, `t` already range-checked.
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor>;

    /// Discount factor at date `d`.
    fn discount(&self, d: Date, extrapolate: bool) -> Result<DiscountFactor> {
        self.discount_time(self.time_from_reference(d), extrapolate)
    }

    /// Discount factor at time `t`.
    fn discount_time(&self, t: Time, extrapolate: bool) -> Result<DiscountFactor> {
        self.check_range(t, extrapolate)?;
        self.discount_impl(t)
    }

    /// Continuously compounded zero yield from the reference date to `d`.
    fn zero_rate(&self, d: Date, extrapolate: bool) -> Result<Rate> {
        self.zero_rate_time(self.time_from_reference(d), extrapolate)
    }

    /// Continuously compounded zero yield from the reference date to `t`.
    fn zero_rate_time(&self, t: Time, extrapolate: bool) -> Result<Rate> {
        self.check_range(t, extrapolate)?;
        if t < FORWARD_DT {
            // Limit rate at the short end.
            let df = self.discount_impl(FORWARD_DT)?;
            return Ok(-df.ln() / FORWARD_DT);
        }
        let df = self.discount_impl(t)?;
        Ok(-df.ln() / t)
    }

    /// Continuously compounded forward rate between `d1` and `d2`.
    fn forward_rate(&self, d1: Date, d2: Date, extrapolate: bool) -> Result<Rate> {
        self.forward_rate_time(
            self.time_from_reference(d1),
            self.time_from_reference(d2),
            extrapolate,
        )
    }

    /// Continuously compounded forward rate between times `t1` and `t2`.
    ///
    /// `t1 == t2` requests the instantaneous forward at `t1`, computed over
    /// a small interval around it.
    fn forward_rate_time(&self, t1: Time, t2: Time, extrapolate: bool) -> Result<Rate> {
        ensure!(t1 <= t2, "forward start time ({t1}) after end time ({t2})");
        let (t1, t2) = if t1 == t2 {
            let lo = (t1 - FORWARD_DT / 2.0).max(0.0);
            (lo, lo + FORWARD_DT)
        } else {
            (t1, t2)
        };
        self.check_range(t1, extrapolate)?;
        self.check_range(t2, extrapolate)?;
        let df1 = self.discount_impl(t1)?;
        let df2 = self.discount_impl(t2)?;
        Ok((df1 / df2).ln() / (t2 - t1))
    }
}
