//! # qc-core
//!
//! Core types, traits, and error definitions for quantcurve.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace: type aliases, the error taxonomy, the
//! Observer/Observable protocol, the `Handle` wrapper, and `LazyObject`.
//!
//! The whole library is single-threaded and synchronous by design: curve
//! bootstrapping relies on a deeply re-entrant call graph (a curve under
//! construction is queried by the very instruments that calibrate it), so
//! shared state uses `Rc`/`RefCell`/`Cell` rather than locks.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` / `ensure_post!` macros.
pub mod errors;

/// Shared observable reference (`Handle<T>`, `RelinkableHandle<T>`).
pub mod handle;

/// Design patterns: observable, lazy_object.
pub mod patterns;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A spread over a reference rate.
pub type Spread = Real;

/// A discount factor in (0, 1] for non-negative rates.
pub type DiscountFactor = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use handle::{Handle, RelinkableHandle};
pub use patterns::lazy_object::{LazyObject, LazyState};
pub use patterns::observable::{Observable, Observer, ObserverList};
