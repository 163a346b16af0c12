//! Time units and tenors.

/// Units in which a [`Period`] can be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Calendar days.
    Days,
    /// Calendar weeks.
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimeUnit::Days => "D",
            TimeUnit::Weeks => "W",
            TimeUnit::Months => "M",
            TimeUnit::Years => "Y",
        };
        f.write_str(s)
    }
}

/// A tenor: a signed length together with a [`TimeUnit`] (e.g. `3M`, `10Y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    /// Signed number of units.
    pub length: i32,
    /// The unit the length is expressed in.
    pub unit: TimeUnit,
}

impl Period {
    /// Create a period from a length and unit.
    pub fn new(length: i32, unit: TimeUnit) -> Self {
        Self { length, unit }
    }

    /// `n` calendar days.
    pub fn days(n: i32) -> Self {
        Self::new(n, TimeUnit::Days)
    }

    /// `n` calendar weeks.
    pub fn weeks(n: i32) -> Self {
        Self::new(n, TimeUnit::Weeks)
    }

    /// `n` calendar months.
    pub fn months(n: i32) -> Self {
        Self::new(n, TimeUnit::Months)
    }

    /// `n` calendar years.
    pub fn years(n: i32) -> Self {
        Self::new(n, TimeUnit::Years)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.length, self.unit)
    }
}
