//! The base interface shared by all term structures.

use qc_core::{ensure, Observable, Result, Time};
use qc_time::{Date, DayCounter};

/// A structure defined over a range of dates anchored at a reference date.
///
/// Dates are translated to year fractions through the structure's day
/// counter; everything downstream works in times. Term structures are
/// observable so that handles and dependent objects can track them.
pub trait TermStructure: Observable {
    /// The date with respect to which times are measured.
    fn reference_date(&self) -> Date;

    /// The day counter used for date/time conversion.
    fn day_counter(&self) -> &dyn DayCounter;

    /// The latest date for which the structure can return values.
    fn max_date(&self) -> Date;

    /// The year fraction from the reference date to `d`.
    fn time_from_reference(&self, d: Date) -> Time {
        self.day_counter().year_fraction(self.reference_date(), d)
    }

    /// The latest time for which the structure can return values.
    fn max_time(&self) -> Time {
        self.time_from_reference(self.max_date())
    }

    /// Check that `t` lies in the structure's range, unless extrapolation
    /// was requested.
    fn check_range(&self, t: Time, extrapolate: bool) -> Result<()> {
        ensure!(t >= 0.0, "negative time ({t}) given");
        let max = self.max_time();
        ensure!(
            extrapolate || t <= max,
            "time ({t}) is past max curve time ({max}); extrapolation not allowed"
        );
        Ok(())
    }
}
