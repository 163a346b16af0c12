//! Bootstrap traits: what quantity the curve nodes hold.
//!
//! The bootstrapper is generic over the quantity it solves for at each node.
//! A [`BootstrapTraits`] implementation supplies the value at the reference
//! date, the solver's initial guesses and bracket, and the mapping from a
//! node value to a discount factor.

use qc_core::{DiscountFactor, Rate, Real, Size, Time};

/// Average-rate guess used before any node has been solved.
const AVG_RATE: Rate = 0.05;

/// Policy object describing the bootstrapped quantity.
///
/// `values[0]` always belongs to the reference date; node `i >= 1` belongs
/// to the `i`-th calibrating instrument, in maturity order. During the first
/// pass only `values[..i]` are meaningful when node `i` is being solved; on
/// later passes (`valid_data == true`) the whole slice holds the previous
/// pass's result.
pub trait BootstrapTraits {
    /// The value pinned at the reference date node.
    fn initial_value(&self) -> Real;

    /// Starting guess for node `i`.
    fn guess(&self, i: Size, times: &[Time], values: &[Real], valid_data: bool) -> Real;

    /// Exclusive lower bound for node `i`'s value.
    fn min_value_after(&self, i: Size, times: &[Time], values: &[Real]) -> Real;

    /// Exclusive upper bound for node `i`'s value.
    fn max_value_after(&self, i: Size, times: &[Time], values: &[Real]) -> Real;

    /// Discount factor implied by node value `value` at time `t`.
    fn discount_from_value(&self, value: Real, t: Time) -> DiscountFactor;
}

/// Nodes hold discount factors directly.
///
/// With `allow_negative_rates` unset, discounts are constrained to decrease
/// with maturity; otherwise they may grow up to threefold per node.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discount {
    /// Permit discount factors above the previous node's.
    pub allow_negative_rates: bool,
}

impl BootstrapTraits for Discount {
    fn initial_value(&self) -> Real {
        1.0
    }

    fn guess(&self, i: Size, times: &[Time], values: &[Real], valid_data: bool) -> Real {
        if valid_data {
            return values[i];
        }
        if i == 1 {
            // Discount over the first period at the average rate.
            return 1.0 / (1.0 + AVG_RATE * times[1]);
        }
        // Extrapolate the zero yield of the previous node.
        let zero = -values[i - 1].ln() / times[i - 1];
        (-zero * times[i]).exp()
    }

    fn min_value_after(&self, _i: Size, _times: &[Time], _values: &[Real]) -> Real {
        Real::EPSILON
    }

    fn max_value_after(&self, i: Size, _times: &[Time], values: &[Real]) -> Real {
        if self.allow_negative_rates {
            3.0 * values[i - 1]
        } else {
            values[i - 1]
        }
    }

    fn discount_from_value(&self, value: Real, _t: Time) -> DiscountFactor {
        value
    }
}

/// Nodes hold continuously compounded zero yields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroYield;

impl ZeroYield {
    /// Most negative zero yield the bootstrap will consider.
    pub const MIN_RATE: Rate = -0.10;

    /// Largest zero yield the bootstrap will consider.
    pub const MAX_RATE: Rate = 0.30;
}

impl BootstrapTraits for ZeroYield {
    fn initial_value(&self) -> Real {
        AVG_RATE
    }

    fn guess(&self, i: Size, _times: &[Time], values: &[Real], valid_data: bool) -> Real {
        if valid_data {
            values[i]
        } else if i == 1 {
            AVG_RATE
        } else {
            // Flat extrapolation of the previous zero yield.
            values[i - 1]
        }
    }

    fn min_value_after(&self, _i: Size, _times: &[Time], _values: &[Real]) -> Real {
        Self::MIN_RATE
    }

    fn max_value_after(&self, _i: Size, _times: &[Time], _values: &[Real]) -> Real {
        Self::MAX_RATE
    }

    fn discount_from_value(&self, value: Real, t: Time) -> DiscountFactor {
        (-value * t).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn discount_first_guess_uses_average_rate() {
        let traits = Discount::default();
        let times = [0.0, 0.25];
        let values = [1.0, Real::NAN];
        let g = traits.guess(1, &times, &values, false);
        assert_abs_diff_eq!(g, 1.0 / (1.0 + 0.05 * 0.25), epsilon = 1e-15);
    }

    #[test]
    fn discount_guess_extrapolates_previous_zero() {
        let traits = Discount::default();
        let times = [0.0, 1.0, 2.0];
        let values = [1.0, (-0.04_f64).exp(), Real::NAN];
        let g = traits.guess(2, &times, &values, false);
        assert_abs_diff_eq!(g, (-0.08_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn discount_bounds_enforce_monotonicity() {
        let traits = Discount::default();
        let values = [1.0, 0.95, Real::NAN];
        let times = [0.0, 1.0, 2.0];
        assert_eq!(traits.max_value_after(2, &times, &values), 0.95);
        assert!(traits.min_value_after(2, &times, &values) > 0.0);

        let relaxed = Discount {
            allow_negative_rates: true,
        };
        assert_abs_diff_eq!(
            relaxed.max_value_after(2, &times, &values),
            2.85,
            epsilon = 1e-12
        );
    }

    #[test]
    fn zero_yield_maps_to_discount() {
        let traits = ZeroYield;
        assert_abs_diff_eq!(
            traits.discount_from_value(0.05, 2.0),
            (-0.1_f64).exp(),
            epsilon = 1e-15
        );
    }
}
