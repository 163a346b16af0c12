//! Piecewise yield curve, bootstrapped from rate helpers.
//!
//! The curve owns one node per calibrating instrument (plus the reference
//! date node) and solves them in maturity order: node `i` is driven by a
//! Brent solver until instrument `i` reprices exactly on the trial curve.
//! Local interpolation schemes need a single pass; global schemes (cubic)
//! are iterated until the nodes stop moving.
//!
//! The whole bootstrap runs lazily. Construction only wires up observer
//! registrations; the first discount query triggers the computation, and a
//! quote change merely marks the curve stale.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use qc_core::errors::{Error, Result};
use qc_core::{
    ensure, DiscountFactor, LazyObject, LazyState, Observable, Observer, ObserverList, Real, Time,
};
use qc_math::{Brent, Interpolation, InterpolationFactory, Solver1D};
use qc_time::{Date, DayCounter};

use crate::bootstrap_traits::BootstrapTraits;
use crate::rate_helpers::{RateHelper, TrialCurve};
use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;

/// Knobs of the iterative bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Repricing accuracy per instrument.
    pub accuracy: Real,
    /// Factor applied to previous-pass node values when reseeding the
    /// solver guess on later passes.
    pub damping: Real,
    /// Pass budget for global interpolation schemes.
    pub max_passes: usize,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            accuracy: 1.0e-12,
            damping: 0.99,
            max_passes: 25,
        }
    }
}

/// A yield curve bootstrapped node by node from market instruments.
///
/// Generic over the bootstrapped quantity (`T`, e.g.
/// [`Discount`](crate::Discount)) and the interpolation scheme (`I`).
pub struct PiecewiseYieldCurve<T, I>
where
    T: BootstrapTraits + 'static,
    I: InterpolationFactory + 'static,
    I::Output: 'static,
{
    reference_date: Date,
    helpers: Vec<Rc<dyn RateHelper>>,
    traits: T,
    interpolator: I,
    day_counter: Box<dyn DayCounter>,
    config: BootstrapConfig,

    dates: RefCell<Vec<Date>>,
    times: RefCell<Vec<Time>>,
    values: RefCell<Vec<Real>>,
    interpolation: RefCell<Option<I::Output>>,
    bootstrap_count: Cell<usize>,

    lazy: LazyState,
    observers: ObserverList,
}

impl<T, I> PiecewiseYieldCurve<T, I>
where
    T: BootstrapTraits + 'static,
    I: InterpolationFactory + 'static,
    I::Output: 'static,
{
    /// Set up a curve over the given helpers.
    ///
    /// Helpers are sorted by maturity; two instruments with the same pillar
    /// date are rejected. No bootstrapping happens here.
    pub fn new(
        reference_date: Date,
        helpers: Vec<Rc<dyn RateHelper>>,
        traits: T,
        interpolator: I,
        day_counter: impl DayCounter + 'static,
        config: BootstrapConfig,
    ) -> Result<Rc<Self>> {
        ensure!(!helpers.is_empty(), "no rate helpers given");
        ensure!(
            config.accuracy > 0.0,
            "bootstrap accuracy ({}) must be positive",
            config.accuracy
        );
        ensure!(
            config.damping > 0.0 && config.damping < 1.0,
            "damping ({}) must lie in (0, 1)",
            config.damping
        );
        ensure!(config.max_passes > 0, "pass budget must be positive");
        // Convergence of a global scheme is measured between passes, so a
        // single pass can never be declared converged.
        ensure!(
            !interpolator.is_global() || config.max_passes > 1,
            "a global interpolation scheme needs at least 2 passes, got {}",
            config.max_passes
        );

        let mut helpers = helpers;
        helpers.sort_by_key(|h| h.latest_date());
        ensure!(
            helpers[0].latest_date() > reference_date,
            "first pillar {} not after reference date {}",
            helpers[0].latest_date(),
            reference_date
        );
        for pair in helpers.windows(2) {
            ensure!(
                pair[0].latest_date() < pair[1].latest_date(),
                "two instruments share the pillar date {}",
                pair[1].latest_date()
            );
        }

        let curve = Rc::new(Self {
            reference_date,
            helpers,
            traits,
            interpolator,
            day_counter: Box::new(day_counter),
            config,
            dates: RefCell::new(Vec::new()),
            times: RefCell::new(Vec::new()),
            values: RefCell::new(Vec::new()),
            interpolation: RefCell::new(None),
            bootstrap_count: Cell::new(0),
            lazy: LazyState::new(),
            observers: ObserverList::new(),
        });
        for helper in &curve.helpers {
            helper.register_observer(Rc::downgrade(&curve) as Weak<dyn Observer>);
        }
        Ok(curve)
    }

    /// The curve nodes as `(pillar date, node value)` pairs, bootstrapping
    /// first if necessary.
    pub fn nodes(&self) -> Result<Vec<(Date, Real)>> {
        self.calculate()?;
        Ok(self
            .dates
            .borrow()
            .iter()
            .copied()
            .zip(self.values.borrow().iter().copied())
            .collect())
    }

    /// The node times, bootstrapping first if necessary.
    pub fn times(&self) -> Result<Vec<Time>> {
        self.calculate()?;
        Ok(self.times.borrow().clone())
    }

    /// How many times the bootstrap has actually run. Diagnostic: lets
    /// callers verify that queries hit the cache and invalidation is lazy.
    pub fn bootstrap_count(&self) -> usize {
        self.bootstrap_count.get()
    }

    fn solve_node(
        &self,
        i: usize,
        times: &[Time],
        values: &mut [Real],
        pillar: Date,
        valid_data: bool,
    ) -> Result<()> {
        let helper = &self.helpers[i - 1];
        let node_error = |e: Error| Error::NodeBootstrap {
            index: i - 1,
            maturity: pillar.to_string(),
            source: Box::new(e),
        };

        helper.quote_value().map_err(node_error)?;
        let min = self.traits.min_value_after(i, times, values);
        let max = self.traits.max_value_after(i, times, values);
        ensure!(
            min < max,
            "inverted value bounds [{min}, {max}] for pillar {pillar}"
        );
        let mut guess = self.traits.guess(i, times, values, valid_data);
        if valid_data {
            // Reseeding from the previous pass: perturb slightly so the
            // solver re-establishes the root instead of stalling on it.
            guess *= self.config.damping;
        }
        if !(guess > min && guess < max) {
            guess = 0.5 * (min + max);
        }

        // A global interpolant spans every node once all of them hold data;
        // on the first pass only the nodes solved so far exist.
        let hi = if valid_data { values.len() - 1 } else { i };
        // A failure inside the objective poisons the evaluation with NaN,
        // which the solver rejects; the real cause is kept on the side so
        // the node error carries it instead of the solver's NaN report.
        let mut cause: Option<Error> = None;
        let objective = |x: Real| -> Real {
            values[i] = x;
            match self.interpolator.interpolate(&times[..=hi], &values[..=hi]) {
                Ok(interp) => {
                    let trial = TrialCurve::new(
                        self.reference_date,
                        &*self.day_counter,
                        &interp,
                        &self.traits,
                    );
                    match helper.quote_error(&trial) {
                        Ok(error) => error,
                        Err(e) => {
                            cause = Some(e);
                            Real::NAN
                        }
                    }
                }
                Err(e) => {
                    cause = Some(e);
                    Real::NAN
                }
            }
        };
        let solver = Brent::default();
        match solver.solve_bracketed(objective, self.config.accuracy, guess, min, max) {
            Ok(root) => {
                values[i] = root;
                Ok(())
            }
            Err(e) => Err(node_error(cause.unwrap_or(e))),
        }
    }
}

impl<T, I> LazyObject for PiecewiseYieldCurve<T, I>
where
    T: BootstrapTraits + 'static,
    I: InterpolationFactory + 'static,
    I::Output: 'static,
{
    fn lazy_state(&self) -> &LazyState {
        &self.lazy
    }

    fn perform_calculations(&self) -> Result<()> {
        let n = self.helpers.len();
        let mut dates = Vec::with_capacity(n + 1);
        let mut times = Vec::with_capacity(n + 1);
        dates.push(self.reference_date);
        times.push(0.0);
        for helper in &self.helpers {
            let pillar = helper.latest_date();
            dates.push(pillar);
            times.push(
                self.day_counter
                    .year_fraction(self.reference_date, pillar),
            );
        }
        for pair in times.windows(2) {
            ensure!(
                pair[0] < pair[1],
                "pillar times not strictly increasing under {}",
                self.day_counter.name()
            );
        }

        let mut values = vec![Real::NAN; n + 1];
        values[0] = self.traits.initial_value();

        let global = self.interpolator.is_global();
        let max_passes = if global { self.config.max_passes } else { 1 };
        let tolerance = n as Real * self.config.accuracy;
        let mut previous: Vec<Real> = Vec::new();
        let mut improvement = Real::INFINITY;
        let mut converged = false;

        for pass in 0..max_passes {
            let valid_data = pass > 0;
            for i in 1..=n {
                self.solve_node(i, &times, &mut values, dates[i], valid_data)?;
            }
            if !global {
                converged = true;
                break;
            }
            if valid_data {
                improvement = values
                    .iter()
                    .zip(&previous)
                    .map(|(a, b)| (a - b).abs())
                    .sum();
                if improvement <= tolerance {
                    converged = true;
                    break;
                }
            }
            previous.clone_from(&values);
        }
        if !converged {
            return Err(Error::Convergence {
                passes: max_passes,
                improvement,
                accuracy: self.config.accuracy,
            });
        }

        let interpolation = self.interpolator.interpolate(&times, &values)?;
        self.bootstrap_count.set(self.bootstrap_count.get() + 1);
        *self.dates.borrow_mut() = dates;
        *self.times.borrow_mut() = times;
        *self.values.borrow_mut() = values;
        *self.interpolation.borrow_mut() = Some(interpolation);
        Ok(())
    }
}

impl<T, I> TermStructure for PiecewiseYieldCurve<T, I>
where
    T: BootstrapTraits + 'static,
    I: InterpolationFactory + 'static,
    I::Output: 'static,
{
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    fn max_date(&self) -> Date {
        // Helpers are sorted and non-empty.
        self.helpers[self.helpers.len() - 1].latest_date()
    }
}

impl<T, I> YieldTermStructure for PiecewiseYieldCurve<T, I>
where
    T: BootstrapTraits + 'static,
    I: InterpolationFactory + 'static,
    I::Output: 'static,
{
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        self.calculate()?;
        let interpolation = self.interpolation.borrow();
        let interpolation = interpolation
            .as_ref()
            .ok_or_else(|| Error::Runtime("curve queried before bootstrap".into()))?;
        if t <= 0.0 {
            return Ok(1.0);
        }
        Ok(self.traits.discount_from_value(interpolation.value(t), t))
    }
}

impl<T, I> Observable for PiecewiseYieldCurve<T, I>
where
    T: BootstrapTraits + 'static,
    I: InterpolationFactory + 'static,
    I::Output: 'static,
{
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

impl<T, I> Observer for PiecewiseYieldCurve<T, I>
where
    T: BootstrapTraits + 'static,
    I: InterpolationFactory + 'static,
    I::Output: 'static,
{
    /// A calibrating quote changed: mark stale and cascade, but do not
    /// recompute until the next query.
    fn update(&self) {
        self.invalidate();
        self.notify_observers();
    }
}
