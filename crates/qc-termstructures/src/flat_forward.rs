//! Flat-forward curve: the simplest yield term structure.

use std::rc::{Rc, Weak};

use qc_core::errors::{Error, Result};
use qc_core::{DiscountFactor, Handle, Observable, Observer, ObserverList, Rate, Time};
use qc_quotes::{Quote, SimpleQuote};
use qc_time::{Date, DayCounter};

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;

/// A curve with one constant, continuously compounded forward rate.
///
/// The rate is read through a quote handle on every query, so a market
/// update is reflected immediately and propagated to observers. Useful as a
/// stub curve while the real one is being assembled, and as the simplest
/// possible referent for a [`RelinkableHandle`](qc_core::RelinkableHandle).
pub struct FlatForward {
    reference_date: Date,
    forward: Handle<dyn Quote>,
    day_counter: Box<dyn DayCounter>,
    observers: ObserverList,
}

impl FlatForward {
    /// Create a flat curve reading its rate through `forward`.
    pub fn new(
        reference_date: Date,
        forward: Handle<dyn Quote>,
        day_counter: impl DayCounter + 'static,
    ) -> Rc<Self> {
        let curve = Rc::new(Self {
            reference_date,
            forward,
            day_counter: Box::new(day_counter),
            observers: ObserverList::new(),
        });
        curve
            .forward
            .register_observer(Rc::downgrade(&curve) as Weak<dyn Observer>);
        curve
    }

    /// Create a flat curve at a fixed rate.
    pub fn from_rate(
        reference_date: Date,
        rate: Rate,
        day_counter: impl DayCounter + 'static,
    ) -> Rc<Self> {
        let quote: Rc<dyn Quote> = SimpleQuote::new(rate);
        Self::new(reference_date, Handle::new(quote), day_counter)
    }

    fn rate(&self) -> Result<Rate> {
        let quote = self
            .forward
            .get()
            .ok_or_else(|| Error::Precondition("flat curve has an empty rate handle".into()))?;
        quote.value()
    }
}

impl TermStructure for FlatForward {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    fn max_date(&self) -> Date {
        Date::MAX
    }
}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        Ok((-self.rate()? * t).exp())
    }
}

impl Observable for FlatForward {
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

impl Observer for FlatForward {
    // Nothing is cached; a rate change only needs forwarding.
    fn update(&self) {
        self.observers.notify();
    }
}
