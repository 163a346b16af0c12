//! Day-count conventions.
//!
//! A day counter turns a pair of dates into the year fraction used when
//! discounting or accruing interest. Term structures and rate helpers hold
//! one behind a trait object.

use qc_core::{Real, Time};

use crate::date::Date;

/// A convention for counting the fraction of a year between two dates.
pub trait DayCounter: std::fmt::Debug {
    /// Human-readable name (e.g. `"Actual/360"`).
    fn name(&self) -> &'static str;

    /// Number of days between `d1` and `d2` under this convention.
    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        i64::from(d2 - d1)
    }

    /// Fraction of a year between `d1` and `d2`.
    fn year_fraction(&self, d1: Date, d2: Date) -> Time;
}

/// Actual/360: actual days divided by 360. The money-market convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual360;

impl DayCounter for Actual360 {
    fn name(&self) -> &'static str {
        "Actual/360"
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

/// Actual/365 (Fixed): actual days divided by 365.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &'static str {
        "Actual/365 (Fixed)"
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 365.0
    }
}

/// 30/360 (Bond Basis): months count 30 days, years 360.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thirty360;

impl DayCounter for Thirty360 {
    fn name(&self) -> &'static str {
        "30/360 (Bond Basis)"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        let (y1, m1, dd1) = d1.ymd();
        let (y2, m2, dd2) = d2.ymd();
        let dd1 = i64::from(dd1.min(30));
        let mut dd2 = i64::from(dd2);
        if dd2 == 31 && dd1 == 30 {
            dd2 = 30;
        }
        360 * i64::from(y2 - y1) + 30 * (i64::from(m2) - i64::from(m1)) + (dd2 - dd1)
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}
