//! Observer / Observable notification protocol.
//!
//! Market primitives (quotes) and derived objects (term structures) form a
//! dependency graph: an [`Observer`] registers interest in one or more
//! [`Observable`]s; when an observable changes it synchronously invokes
//! `update()` on every registered observer, which may in turn re-notify its
//! own observers (cascading invalidation).
//!
//! Two invariants hold everywhere:
//!
//! * registration and deregistration are safe while a notification cascade is
//!   in flight — [`ObserverList::notify`] snapshots the live observers before
//!   dispatching, so `update()` may freely modify registrations;
//! * `update()` only marks cached state stale and re-raises the notification;
//!   recomputation happens on the next read (see
//!   [`lazy_object`](super::lazy_object)).
//!
//! Everything works through `&self` references with interior mutability so
//! that observables shared via `Rc` can be registered with and notified.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// An object that can notify interested parties when it changes.
pub trait Observable {
    /// Register an observer to receive future change notifications.
    fn register_observer(&self, observer: Weak<dyn Observer>);

    /// Remove a previously registered observer.
    fn unregister_observer(&self, observer: &Weak<dyn Observer>);

    /// Notify all currently registered observers that this object changed.
    fn notify_observers(&self);
}

/// An object that reacts to changes in [`Observable`]s it has subscribed to.
pub trait Observer {
    /// Called by every observable this observer is registered with when that
    /// observable changes state.
    ///
    /// Implementations must be cheap: mark caches stale, forward the
    /// notification, and return.
    fn update(&self);
}

/// Observer-list bookkeeping, embeddable in any observable type.
///
/// Holds `Weak` references so that an observable never keeps its observers
/// alive; dead registrations are pruned on notification.
pub struct ObserverList {
    observers: RefCell<Vec<Weak<dyn Observer>>>,
}

impl Default for ObserverList {
    fn default() -> Self {
        Self::new()
    }
}

impl ObserverList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Register an observer.
    pub fn register(&self, observer: Weak<dyn Observer>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Remove an observer (by pointer identity of the `Weak`).
    pub fn unregister(&self, observer: &Weak<dyn Observer>) {
        self.observers
            .borrow_mut()
            .retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// Notify all live observers, pruning dead `Weak` references.
    ///
    /// The dispatch happens outside any borrow of the internal list, so
    /// observers may register or unregister (on this list or others) from
    /// within `update()`.
    pub fn notify(&self) {
        let live: Vec<Rc<dyn Observer>> = self
            .observers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        self.observers
            .borrow_mut()
            .retain(|w| w.upgrade().is_some());
        for observer in live {
            observer.update();
        }
    }

    /// Number of currently registered (possibly dead) observers.
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    /// `true` if no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObserverList({} registered)", self.len())
    }
}
