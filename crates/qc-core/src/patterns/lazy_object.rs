//! LazyObject pattern: expensive computation behind a dirty flag.
//!
//! Any object whose value is expensive to compute and depends on observables
//! follows the same discipline: a `calculated` flag starts out false; public
//! accessors call [`LazyObject::calculate`] before reading cached fields;
//! observer notifications call [`LazyObject::invalidate`], which clears the
//! flag and must **not** recompute — that separation (invalidate cheaply now,
//! recompute on next read) is the central performance contract of the
//! library.
//!
//! The bookkeeping lives in an embeddable [`LazyState`] rather than an
//! inheritance-style base class: implementors hold one as a field and return
//! it from [`LazyObject::lazy_state`].

use std::cell::Cell;

use crate::errors::Result;

/// Trait for objects that lazily compute and cache their results.
pub trait LazyObject {
    /// Perform the actual (expensive) calculation.
    ///
    /// Called by [`calculate`](Self::calculate) when the cache is stale.
    fn perform_calculations(&self) -> Result<()>;

    /// The embedded dirty-flag bookkeeping.
    fn lazy_state(&self) -> &LazyState;

    /// Ensure cached results are up to date.
    ///
    /// Recomputes only when the cache is stale and the object is not frozen.
    /// The flag is raised *before* the computation runs so that re-entrant
    /// queries issued from inside `perform_calculations` read the
    /// intermediate state instead of recursing; it is lowered again if the
    /// computation fails.
    fn calculate(&self) -> Result<()> {
        let state = self.lazy_state();
        if !state.calculated.get() && state.freeze_count.get() == 0 {
            state.calculated.set(true);
            if let Err(e) = self.perform_calculations() {
                state.calculated.set(false);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Mark the cached result stale without recomputing.
    ///
    /// This is what observer `update()` implementations call.
    fn invalidate(&self) {
        self.lazy_state().calculated.set(false);
    }

    /// Prevent recalculation until a matching [`unfreeze`](Self::unfreeze).
    fn freeze(&self) {
        let c = self.lazy_state().freeze_count.get();
        self.lazy_state().freeze_count.set(c + 1);
    }

    /// Undo one call to [`freeze`](Self::freeze).
    fn unfreeze(&self) {
        let c = self.lazy_state().freeze_count.get();
        if c > 0 {
            self.lazy_state().freeze_count.set(c - 1);
        }
    }

    /// `true` if the cache is currently valid.
    fn is_calculated(&self) -> bool {
        self.lazy_state().calculated.get()
    }
}

/// Bookkeeping fields for [`LazyObject`], meant to be embedded by value.
#[derive(Debug)]
pub struct LazyState {
    calculated: Cell<bool>,
    freeze_count: Cell<u32>,
}

impl LazyState {
    /// Create a state whose cache is initially stale.
    pub fn new() -> Self {
        Self {
            calculated: Cell::new(false),
            freeze_count: Cell::new(0),
        }
    }
}

impl Default for LazyState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler {
        state: LazyState,
        input: Cell<f64>,
        result: Cell<f64>,
        runs: Cell<u32>,
    }

    impl Doubler {
        fn new(input: f64) -> Self {
            Self {
                state: LazyState::new(),
                input: Cell::new(input),
                result: Cell::new(f64::NAN),
                runs: Cell::new(0),
            }
        }

        fn value(&self) -> Result<f64> {
            self.calculate()?;
            Ok(self.result.get())
        }
    }

    impl LazyObject for Doubler {
        fn perform_calculations(&self) -> Result<()> {
            self.runs.set(self.runs.get() + 1);
            self.result.set(2.0 * self.input.get());
            Ok(())
        }

        fn lazy_state(&self) -> &LazyState {
            &self.state
        }
    }

    #[test]
    fn computes_once_until_invalidated() {
        let d = Doubler::new(21.0);
        assert_eq!(d.value().unwrap(), 42.0);
        assert_eq!(d.value().unwrap(), 42.0);
        assert_eq!(d.runs.get(), 1);

        d.input.set(5.0);
        d.invalidate();
        assert_eq!(d.value().unwrap(), 10.0);
        assert_eq!(d.runs.get(), 2);
    }

    #[test]
    fn invalidate_does_not_recompute() {
        let d = Doubler::new(1.0);
        d.invalidate();
        d.invalidate();
        assert_eq!(d.runs.get(), 0);
    }

    #[test]
    fn frozen_object_defers_recalculation() {
        let d = Doubler::new(1.0);
        d.value().unwrap();
        d.input.set(2.0);
        d.invalidate();
        d.freeze();
        assert_eq!(d.value().unwrap(), 2.0, "stale value while frozen");
        d.unfreeze();
        assert_eq!(d.value().unwrap(), 4.0);
    }

    #[test]
    fn failure_leaves_cache_stale() {
        struct Failing {
            state: LazyState,
            attempts: Cell<u32>,
        }
        impl LazyObject for Failing {
            fn perform_calculations(&self) -> Result<()> {
                self.attempts.set(self.attempts.get() + 1);
                Err(crate::Error::Runtime("boom".into()))
            }
            fn lazy_state(&self) -> &LazyState {
                &self.state
            }
        }
        let f = Failing {
            state: LazyState::new(),
            attempts: Cell::new(0),
        };
        assert!(f.calculate().is_err());
        assert!(!f.is_calculated());
        assert!(f.calculate().is_err(), "retried on next read");
        assert_eq!(f.attempts.get(), 2);
    }
}
