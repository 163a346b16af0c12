//! Rate helpers: calibrating instruments for curve bootstrapping.
//!
//! A rate helper pairs a market quote with the pricing formula of the
//! instrument it came from. During bootstrapping the curve hands each helper
//! a [`TrialCurve`] view of the nodes solved so far and asks for the quote
//! the trial curve implies; the solver drives the node value until implied
//! and market quote agree.

use std::rc::{Rc, Weak};

use qc_core::errors::{Error, Result};
use qc_core::{ensure, DiscountFactor, Handle, Observable, Observer, ObserverList, Real, Time};
use qc_math::Interpolation;
use qc_quotes::Quote;
use qc_time::{Date, DayCounter, Period, TimeUnit};

use crate::bootstrap_traits::BootstrapTraits;

/// A read-only view of the curve under construction.
///
/// Borrowing the interpolant instead of the curve itself keeps the
/// bootstrap re-entrant: helpers query discounts while the curve's own node
/// array is being mutated by the solver, without touching the curve's lazy
/// machinery.
pub struct TrialCurve<'a> {
    reference_date: Date,
    day_counter: &'a dyn DayCounter,
    interpolation: &'a dyn Interpolation,
    traits: &'a dyn BootstrapTraits,
}

impl<'a> TrialCurve<'a> {
    /// Assemble a view over a fitted interpolant.
    pub fn new(
        reference_date: Date,
        day_counter: &'a dyn DayCounter,
        interpolation: &'a dyn Interpolation,
        traits: &'a dyn BootstrapTraits,
    ) -> Self {
        Self {
            reference_date,
            day_counter,
            interpolation,
            traits,
        }
    }

    /// The curve's reference date.
    pub fn reference_date(&self) -> Date {
        self.reference_date
    }

    /// Year fraction from the reference date to `d`.
    pub fn time_from_reference(&self, d: Date) -> Time {
        self.day_counter.year_fraction(self.reference_date, d)
    }

    /// Discount factor at date `d`.
    pub fn discount(&self, d: Date) -> DiscountFactor {
        self.discount_time(self.time_from_reference(d))
    }

    /// Discount factor at time `t`.
    pub fn discount_time(&self, t: Time) -> DiscountFactor {
        if t <= 0.0 {
            return 1.0;
        }
        self.traits
            .discount_from_value(self.interpolation.value(t), t)
    }
}

/// A calibrating instrument: one market quote, one curve node.
pub trait RateHelper: Observable {
    /// The instrument's market quote.
    fn quote(&self) -> &Handle<dyn Quote>;

    /// The earliest date the instrument's cashflows involve.
    fn earliest_date(&self) -> Date;

    /// The instrument's maturity: the pillar date it pins down.
    fn latest_date(&self) -> Date;

    /// The quote implied by the trial curve.
    fn implied_quote(&self, curve: &TrialCurve<'_>) -> Result<Real>;

    /// The current market quote value.
    fn quote_value(&self) -> Result<Real> {
        let quote = self
            .quote()
            .get()
            .ok_or_else(|| Error::Precondition("rate helper has an empty quote handle".into()))?;
        quote.value()
    }

    /// Market quote minus implied quote; zero when the instrument is
    /// repriced exactly.
    fn quote_error(&self, curve: &TrialCurve<'_>) -> Result<Real> {
        Ok(self.quote_value()? - self.implied_quote(curve)?)
    }
}

/// A money-market deposit: simple interest from `start` to `maturity`.
pub struct DepositRateHelper {
    quote: Handle<dyn Quote>,
    start: Date,
    maturity: Date,
    day_counter: Box<dyn DayCounter>,
    observers: ObserverList,
}

impl DepositRateHelper {
    /// Create a deposit helper over an explicit date pair.
    pub fn new(
        quote: Handle<dyn Quote>,
        start: Date,
        maturity: Date,
        day_counter: impl DayCounter + 'static,
    ) -> Result<Rc<Self>> {
        ensure!(
            start < maturity,
            "deposit start {start} not before maturity {maturity}"
        );
        let helper = Rc::new(Self {
            quote,
            start,
            maturity,
            day_counter: Box::new(day_counter),
            observers: ObserverList::new(),
        });
        helper
            .quote
            .register_observer(Rc::downgrade(&helper) as Weak<dyn Observer>);
        Ok(helper)
    }
}

impl RateHelper for DepositRateHelper {
    fn quote(&self) -> &Handle<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start
    }

    fn latest_date(&self) -> Date {
        self.maturity
    }

    fn implied_quote(&self, curve: &TrialCurve<'_>) -> Result<Real> {
        simple_forward(curve, self.start, self.maturity, &*self.day_counter)
    }
}

/// A forward rate agreement: the simple forward rate over a future period.
pub struct FraRateHelper {
    quote: Handle<dyn Quote>,
    start: Date,
    maturity: Date,
    day_counter: Box<dyn DayCounter>,
    observers: ObserverList,
}

impl FraRateHelper {
    /// Create a FRA helper over an explicit date pair.
    pub fn new(
        quote: Handle<dyn Quote>,
        start: Date,
        maturity: Date,
        day_counter: impl DayCounter + 'static,
    ) -> Result<Rc<Self>> {
        ensure!(
            start < maturity,
            "FRA start {start} not before maturity {maturity}"
        );
        let helper = Rc::new(Self {
            quote,
            start,
            maturity,
            day_counter: Box::new(day_counter),
            observers: ObserverList::new(),
        });
        helper
            .quote
            .register_observer(Rc::downgrade(&helper) as Weak<dyn Observer>);
        Ok(helper)
    }
}

impl RateHelper for FraRateHelper {
    fn quote(&self) -> &Handle<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start
    }

    fn latest_date(&self) -> Date {
        self.maturity
    }

    fn implied_quote(&self, curve: &TrialCurve<'_>) -> Result<Real> {
        simple_forward(curve, self.start, self.maturity, &*self.day_counter)
    }
}

/// Simple (money-market) forward rate between two dates.
fn simple_forward(
    curve: &TrialCurve<'_>,
    start: Date,
    end: Date,
    day_counter: &dyn DayCounter,
) -> Result<Real> {
    let tau = day_counter.year_fraction(start, end);
    ensure!(tau > 0.0, "non-positive accrual period between {start} and {end}");
    let df_start = curve.discount(start);
    let df_end = curve.discount(end);
    ensure!(
        df_end > 0.0,
        "non-positive discount factor {df_end} at {end}"
    );
    Ok((df_start / df_end - 1.0) / tau)
}

/// A par interest-rate swap, quoted by its fixed rate.
///
/// Only the fixed leg is modelled explicitly; the floating leg is assumed to
/// price at par against the same curve, so the fair rate is
/// `(df(start) - df(maturity)) / annuity`.
pub struct SwapRateHelper {
    quote: Handle<dyn Quote>,
    start: Date,
    payment_dates: Vec<Date>,
    day_counter: Box<dyn DayCounter>,
    observers: ObserverList,
}

impl SwapRateHelper {
    /// Create a swap helper.
    ///
    /// The fixed-leg schedule runs from `start` to `start + tenor` in steps
    /// of `fixed_leg_tenor`; both periods must be month- or year-based and
    /// the step must divide the tenor exactly.
    pub fn new(
        quote: Handle<dyn Quote>,
        start: Date,
        tenor: Period,
        fixed_leg_tenor: Period,
        day_counter: impl DayCounter + 'static,
    ) -> Result<Rc<Self>> {
        let total_months = months(tenor)?;
        let step_months = months(fixed_leg_tenor)?;
        ensure!(
            step_months > 0 && total_months > 0,
            "swap tenor {tenor} and fixed-leg tenor {fixed_leg_tenor} must be positive"
        );
        ensure!(
            total_months % step_months == 0,
            "fixed-leg tenor {fixed_leg_tenor} does not divide swap tenor {tenor}"
        );
        let n = total_months / step_months;
        let mut payment_dates = Vec::with_capacity(n as usize);
        for k in 1..=n {
            payment_dates.push(start.advance(Period::months(k * step_months))?);
        }
        let helper = Rc::new(Self {
            quote,
            start,
            payment_dates,
            day_counter: Box::new(day_counter),
            observers: ObserverList::new(),
        });
        helper
            .quote
            .register_observer(Rc::downgrade(&helper) as Weak<dyn Observer>);
        Ok(helper)
    }

    /// The fixed-leg payment dates.
    pub fn payment_dates(&self) -> &[Date] {
        &self.payment_dates
    }
}

fn months(period: Period) -> Result<i32> {
    match period.unit {
        TimeUnit::Months => Ok(period.length),
        TimeUnit::Years => Ok(12 * period.length),
        _ => Err(Error::Precondition(format!(
            "swap periods must be month- or year-based, got {period}"
        ))),
    }
}

impl RateHelper for SwapRateHelper {
    fn quote(&self) -> &Handle<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start
    }

    fn latest_date(&self) -> Date {
        // The schedule is never empty (n >= 1 checked at construction).
        self.payment_dates[self.payment_dates.len() - 1]
    }

    fn implied_quote(&self, curve: &TrialCurve<'_>) -> Result<Real> {
        let mut annuity = 0.0;
        let mut prev = self.start;
        for &payment in &self.payment_dates {
            let tau = self.day_counter.year_fraction(prev, payment);
            annuity += tau * curve.discount(payment);
            prev = payment;
        }
        ensure!(annuity > 0.0, "non-positive fixed-leg annuity {annuity}");
        let df_start = curve.discount(self.start);
        let df_end = curve.discount(self.latest_date());
        Ok((df_start - df_end) / annuity)
    }
}

macro_rules! forward_observable {
    ($helper:ty) => {
        impl Observable for $helper {
            fn register_observer(&self, observer: Weak<dyn Observer>) {
                self.observers.register(observer);
            }
            fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
                self.observers.unregister(observer);
            }
            fn notify_observers(&self) {
                self.observers.notify();
            }
        }

        impl Observer for $helper {
            // Helpers cache nothing; a quote change only needs forwarding.
            fn update(&self) {
                self.observers.notify();
            }
        }
    };
}

forward_observable!(DepositRateHelper);
forward_observable!(FraRateHelper);
forward_observable!(SwapRateHelper);
