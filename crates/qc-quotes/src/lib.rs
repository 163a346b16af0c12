//! # qc-quotes
//!
//! Observable market quotes: the inputs at the edge of the dependency graph.
//! A quote changing value is what ultimately invalidates every curve built
//! on top of it.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod quote;

pub use quote::{DerivedQuote, Quote, SimpleQuote};
