//! `Handle<T>` — a shared, relinkable, observable reference.
//!
//! A `Handle<T>` is a cloneable pointer to a *link*, which in turn points to
//! the current referent. All clones of a handle share the same link, so
//! relinking through a [`RelinkableHandle`] is visible to every copy at once.
//! This is the mechanism by which a term structure under construction can be
//! swapped transparently underneath already-constructed rate helpers.
//!
//! The link participates in the observer protocol on both sides: it observes
//! its current referent (forwarding change notifications downstream) and is
//! observable by whoever holds a handle. Relinking deregisters from the old
//! referent, registers with the new one, and notifies downstream exactly
//! once.
//!
//! Dereferencing an empty handle is a programming error and panics
//! immediately rather than returning a default.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::patterns::observable::{Observable, Observer, ObserverList};

/// The shared indirection all clones of a handle point at.
struct Link<T: ?Sized> {
    target: RefCell<Option<Rc<T>>>,
    observers: ObserverList,
}

impl<T: ?Sized> Observer for Link<T> {
    fn update(&self) {
        // Forward the referent's notification downstream.
        self.observers.notify();
    }
}

/// A shared reference to an observable value of type `T`.
///
/// Cloning a handle shares the underlying link; the handle itself is
/// read-only. Use [`RelinkableHandle`] to obtain handles whose referent can
/// be replaced.
pub struct Handle<T: ?Sized> {
    link: Rc<Link<T>>,
}

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            link: self.link.clone(),
        }
    }
}

impl<T: Observable + ?Sized + 'static> Handle<T> {
    /// Create a handle linked to `target`.
    pub fn new(target: Rc<T>) -> Self {
        let handle = Self::empty();
        handle.set_target(Some(target));
        handle
    }

    fn set_target(&self, target: Option<Rc<T>>) {
        let weak = Rc::downgrade(&self.link) as Weak<dyn Observer>;
        let old = self.link.target.borrow_mut().take();
        if let Some(old) = old {
            old.unregister_observer(&weak);
        }
        if let Some(new) = target {
            new.register_observer(weak);
            *self.link.target.borrow_mut() = Some(new);
        }
    }
}

impl<T: ?Sized> Handle<T> {
    /// Create an empty (unlinked) handle.
    pub fn empty() -> Self {
        Self {
            link: Rc::new(Link {
                target: RefCell::new(None),
                observers: ObserverList::new(),
            }),
        }
    }

    /// `true` if the handle currently points at nothing.
    pub fn is_empty(&self) -> bool {
        self.link.target.borrow().is_none()
    }

    /// The current referent, or `None` if the handle is empty.
    pub fn get(&self) -> Option<Rc<T>> {
        self.link.target.borrow().clone()
    }

    /// The current referent.
    ///
    /// # Panics
    /// Panics if the handle is empty — an empty handle must never be
    /// dereferenced.
    pub fn value(&self) -> Rc<T> {
        self.get().expect("empty Handle cannot be dereferenced")
    }

    /// `true` if `self` and `other` share the same link.
    pub fn shares_link_with(&self, other: &Handle<T>) -> bool {
        Rc::ptr_eq(&self.link, &other.link)
    }
}

impl<T: ?Sized> Observable for Handle<T> {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.link.observers.register(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.link.observers.unregister(observer);
    }

    fn notify_observers(&self) {
        self.link.observers.notify();
    }
}

impl<T: ?Sized> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "Handle(empty)")
        } else {
            write!(f, "Handle(linked)")
        }
    }
}

/// A [`Handle`] whose referent can be replaced after construction.
///
/// All handles obtained through [`RelinkableHandle::handle`] (and their
/// clones) see the new referent immediately after
/// [`link_to`](RelinkableHandle::link_to) runs, and receive one notification.
pub struct RelinkableHandle<T: ?Sized> {
    inner: Handle<T>,
}

impl<T: Observable + ?Sized + 'static> RelinkableHandle<T> {
    /// Create an empty relinkable handle.
    pub fn empty() -> Self {
        Self {
            inner: Handle::empty(),
        }
    }

    /// Create a relinkable handle initially linked to `target`.
    pub fn new(target: Rc<T>) -> Self {
        Self {
            inner: Handle::new(target),
        }
    }

    /// Replace the referent and notify all downstream observers once.
    pub fn link_to(&self, target: Rc<T>) {
        self.inner.set_target(Some(target));
        self.inner.link.observers.notify();
    }

    /// Detach from the current referent (the handle becomes empty).
    pub fn unlink(&self) {
        self.inner.set_target(None);
        self.inner.link.observers.notify();
    }

    /// A read-only handle sharing this link.
    pub fn handle(&self) -> Handle<T> {
        self.inner.clone()
    }

    /// `true` if no referent is currently linked.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Observable + ?Sized + 'static> Default for RelinkableHandle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Minimal observable for handle tests.
    struct Beacon {
        observers: ObserverList,
    }

    impl Beacon {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                observers: ObserverList::new(),
            })
        }
    }

    impl Observable for Beacon {
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

    struct Counter {
        count: Cell<u32>,
    }

    impl Observer for Counter {
        fn update(&self) {
            self.count.set(self.count.get() + 1);
        }
    }

    #[test]
    #[should_panic(expected = "empty Handle")]
    fn empty_handle_dereference_panics() {
        let h: Handle<Beacon> = Handle::empty();
        let _ = h.value();
    }

    #[test]
    fn handle_forwards_referent_notifications() {
        let beacon = Beacon::new();
        let handle = Handle::new(beacon.clone());
        let counter = Rc::new(Counter {
            count: Cell::new(0),
        });
        handle.register_observer(Rc::downgrade(&counter) as Weak<dyn Observer>);

        beacon.notify_observers();
        assert_eq!(counter.count.get(), 1);
    }

    #[test]
    fn clones_share_the_link() {
        let relinkable = RelinkableHandle::new(Beacon::new());
        let h1 = relinkable.handle();
        let h2 = h1.clone();
        assert!(h1.shares_link_with(&h2));

        let replacement = Beacon::new();
        relinkable.link_to(replacement.clone());
        assert!(Rc::ptr_eq(&h1.value(), &replacement));
        assert!(Rc::ptr_eq(&h2.value(), &replacement));
    }

    #[test]
    fn relink_notifies_once_and_switches_subscription() {
        let first = Beacon::new();
        let second = Beacon::new();
        let relinkable = RelinkableHandle::new(first.clone());
        let handle = relinkable.handle();

        let counter = Rc::new(Counter {
            count: Cell::new(0),
        });
        handle.register_observer(Rc::downgrade(&counter) as Weak<dyn Observer>);

        relinkable.link_to(second.clone());
        assert_eq!(counter.count.get(), 1, "one notification per relink");

        // The old referent no longer reaches the handle...
        first.notify_observers();
        assert_eq!(counter.count.get(), 1);
        // ...the new one does.
        second.notify_observers();
        assert_eq!(counter.count.get(), 2);
    }
}
