//! Serial-number calendar dates.
//!
//! A [`Date`] is a day count since the library epoch (serial 1 is
//! 1900-01-01), which keeps comparisons, ordering, and day differences down
//! to integer arithmetic. Conversion to and from year/month/day uses the
//! days-from-civil algorithm.

use qc_core::errors::{Error, Result};

use crate::period::{Period, TimeUnit};

/// Offset between the Unix civil epoch (1970-01-01) and serial 1
/// (1900-01-01).
const EPOCH_OFFSET: i64 = 25_568;

/// A calendar date represented as a serial number of days since the epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Date(i32);

impl Date {
    /// Minimum valid date: 1900-01-01 (serial 1).
    pub const MIN: Date = Date(1);

    /// Maximum valid date: 2199-12-31.
    pub const MAX: Date = Date(109_573);

    /// Create a date from a serial number.
    pub fn from_serial(serial: i32) -> Result<Self> {
        let d = Date(serial);
        if !(Self::MIN..=Self::MAX).contains(&d) {
            return Err(Error::Precondition(format!(
                "date serial {serial} outside [{}, {}]",
                Self::MIN.0,
                Self::MAX.0
            )));
        }
        Ok(d)
    }

    /// Create a date from year, month (1–12), and day-of-month.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        if !(1900..=2199).contains(&year) {
            return Err(Error::Precondition(format!(
                "year {year} out of range [1900, 2199]"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::Precondition(format!(
                "month {month} out of range [1, 12]"
            )));
        }
        let last = days_in_month(year, month);
        if day == 0 || day > last {
            return Err(Error::Precondition(format!(
                "day {day} out of range [1, {last}] for {year}-{month:02}"
            )));
        }
        let serial = days_from_civil(year, month, day) + EPOCH_OFFSET;
        Ok(Date(serial as i32))
    }

    /// The serial number.
    pub fn serial(&self) -> i32 {
        self.0
    }

    /// The (year, month, day) triple.
    pub fn ymd(&self) -> (i32, u32, u32) {
        civil_from_days(self.0 as i64 - EPOCH_OFFSET)
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.ymd().0
    }

    /// The month (1–12).
    pub fn month(&self) -> u32 {
        self.ymd().1
    }

    /// The day of the month.
    pub fn day_of_month(&self) -> u32 {
        self.ymd().2
    }

    /// Advance by `n` calendar days.
    pub fn add_days(self, n: i32) -> Result<Self> {
        Date::from_serial(self.0 + n)
    }

    /// Advance by a tenor. Month and year arithmetic clamps the day of
    /// month to the target month's length (Jan 31 + 1M = Feb 28/29).
    pub fn advance(self, period: Period) -> Result<Self> {
        let n = period.length;
        match period.unit {
            TimeUnit::Days => self.add_days(n),
            TimeUnit::Weeks => self.add_days(7 * n),
            TimeUnit::Months => {
                let (y, m, d) = self.ymd();
                let months = y as i64 * 12 + (m as i64 - 1) + n as i64;
                let new_y = months.div_euclid(12);
                let new_m = months.rem_euclid(12) as u32 + 1;
                let new_y = i32::try_from(new_y)
                    .map_err(|_| Error::Precondition("date arithmetic overflow".into()))?;
                if !(1900..=2199).contains(&new_y) {
                    return Err(Error::Precondition(format!(
                        "year {new_y} out of range [1900, 2199]"
                    )));
                }
                let new_d = d.min(days_in_month(new_y, new_m));
                Date::from_ymd(new_y, new_m, new_d)
            }
            TimeUnit::Years => self.advance(Period::months(12 * n)),
        }
    }

    /// Calendar days from `self` to `other` (positive if `other` is later).
    pub fn days_until(self, other: Date) -> i32 {
        other.0 - self.0
    }
}

impl std::ops::Sub<Date> for Date {
    type Output = i32;
    fn sub(self, rhs: Date) -> i32 {
        self.0 - rhs.0
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (y, m, d) = self.ymd();
        write!(f, "{y:04}-{m:02}-{d:02}")
    }
}

impl std::fmt::Debug for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Date({self})")
    }
}

/// Whether `year` is a leap year (proleptic Gregorian).
pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => unreachable!("month validated by caller"),
    }
}

/// Days since 1970-01-01 for a civil (y, m, d).
fn days_from_civil(y: i32, m: u32, d: u32) -> i64 {
    let y = i64::from(y) - i64::from(m <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = i64::from((m + 9) % 12);
    let doy = (153 * mp + 2) / 5 + i64::from(d) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Civil (y, m, d) for days since 1970-01-01.
fn civil_from_days(z: i64) -> (i32, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = ((mp + 2) % 12 + 1) as u32;
    ((y + i64::from(m <= 2)) as i32, m, d)
}
