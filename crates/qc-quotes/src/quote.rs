//! The [`Quote`] trait and its basic implementations.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use qc_core::errors::{Error, Result};
use qc_core::{Handle, Observable, Observer, ObserverList, Real};

/// A purely observable market value.
///
/// Reading a quote that currently has no value is an error, never a silent
/// default.
pub trait Quote: Observable {
    /// The current value.
    fn value(&self) -> Result<Real>;

    /// Whether the quote currently holds a value.
    fn is_valid(&self) -> bool;
}

/// A market element whose value is set directly.
///
/// Setting a new value notifies observers; setting the same value again
/// does not.
pub struct SimpleQuote {
    value: Cell<Option<Real>>,
    observers: ObserverList,
}

impl SimpleQuote {
    /// Create a quote holding `value`.
    pub fn new(value: Real) -> Rc<Self> {
        Rc::new(Self {
            value: Cell::new(Some(value)),
            observers: ObserverList::new(),
        })
    }

    /// Create a quote holding no value yet.
    pub fn empty() -> Rc<Self> {
        Rc::new(Self {
            value: Cell::new(None),
            observers: ObserverList::new(),
        })
    }

    /// Set a new value, returning the difference from the previous one.
    ///
    /// Observers are notified only if the value actually changed.
    pub fn set_value(&self, value: Real) -> Real {
        let old = self.value.get();
        let diff = match old {
            Some(old) => value - old,
            None => value,
        };
        if old != Some(value) {
            self.value.set(Some(value));
            self.observers.notify();
        }
        diff
    }

    /// Clear the value. Observers are notified if one was present.
    pub fn reset(&self) {
        if self.value.take().is_some() {
            self.observers.notify();
        }
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> Result<Real> {
        self.value
            .get()
            .ok_or_else(|| Error::Precondition("quote has no value".into()))
    }

    fn is_valid(&self) -> bool {
        self.value.get().is_some()
    }
}

impl Observable for SimpleQuote {
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

impl std::fmt::Debug for SimpleQuote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value.get() {
            Some(v) => write!(f, "SimpleQuote({v})"),
            None => write!(f, "SimpleQuote(empty)"),
        }
    }
}

/// A quote computed on the fly from another quote.
///
/// The transformation is applied on every read; the derived quote itself
/// caches nothing, it only forwards the source's notifications.
pub struct DerivedQuote<F>
where
    F: Fn(Real) -> Real + 'static,
{
    source: Handle<dyn Quote>,
    transform: F,
    observers: ObserverList,
}

impl<F> DerivedQuote<F>
where
    F: Fn(Real) -> Real + 'static,
{
    /// Create a derived quote applying `transform` to `source`'s value.
    pub fn new(source: Handle<dyn Quote>, transform: F) -> Rc<Self> {
        let quote = Rc::new(Self {
            source,
            transform,
            observers: ObserverList::new(),
        });
        quote
            .source
            .register_observer(Rc::downgrade(&quote) as Weak<dyn Observer>);
        quote
    }
}

impl<F> Quote for DerivedQuote<F>
where
    F: Fn(Real) -> Real + 'static,
{
    fn value(&self) -> Result<Real> {
        let source = self
            .source
            .get()
            .ok_or_else(|| Error::Precondition("derived quote has an empty source handle".into()))?;
        Ok((self.transform)(source.value()?))
    }

    fn is_valid(&self) -> bool {
        self.source.get().is_some_and(|q| q.is_valid())
    }
}

impl<F> Observable for DerivedQuote<F>
where
    F: Fn(Real) -> Real + 'static,
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

impl<F> Observer for DerivedQuote<F>
where
    F: Fn(Real) -> Real + 'static,
{
    fn update(&self) {
        self.observers.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::cell::Cell;

    struct Counter {
        count: Cell<u32>,
    }

    impl Counter {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                count: Cell::new(0),
            })
        }
    }

    impl Observer for Counter {
        fn update(&self) {
            self.count.set(self.count.get() + 1);
        }
    }

    #[test]
    fn set_value_notifies_only_on_change() {
        let quote = SimpleQuote::new(0.05);
        let counter = Counter::new();
        quote.register_observer(Rc::downgrade(&counter) as Weak<dyn Observer>);

        assert_abs_diff_eq!(quote.set_value(0.055), 0.005, epsilon = 1e-15);
        assert_eq!(counter.count.get(), 1);

        quote.set_value(0.055);
        assert_eq!(counter.count.get(), 1, "no notification without a change");
    }

    #[test]
    fn empty_quote_is_an_error_to_read() {
        let quote = SimpleQuote::empty();
        assert!(!quote.is_valid());
        assert!(matches!(quote.value(), Err(Error::Precondition(_))));
    }

    #[test]
    fn reset_clears_and_notifies() {
        let quote = SimpleQuote::new(0.05);
        let counter = Counter::new();
        quote.register_observer(Rc::downgrade(&counter) as Weak<dyn Observer>);

        quote.reset();
        assert!(!quote.is_valid());
        assert_eq!(counter.count.get(), 1);

        quote.reset();
        assert_eq!(counter.count.get(), 1, "resetting an empty quote is a no-op");
    }

    #[test]
    fn derived_quote_transforms_and_forwards() {
        let base = SimpleQuote::new(0.04);
        let handle: Handle<dyn Quote> = Handle::new(base.clone());
        let spread = DerivedQuote::new(handle, |r| r + 0.001);

        assert_abs_diff_eq!(spread.value().unwrap(), 0.041, epsilon = 1e-15);

        let counter = Counter::new();
        spread.register_observer(Rc::downgrade(&counter) as Weak<dyn Observer>);
        base.set_value(0.05);
        assert_eq!(counter.count.get(), 1);
        assert_abs_diff_eq!(spread.value().unwrap(), 0.051, epsilon = 1e-15);
    }
}
