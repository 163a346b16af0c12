//! Design patterns shared across the library.

/// LazyObject pattern: cached computation invalidated by notifications.
pub mod lazy_object;

/// Observer / Observable notification protocol.
pub mod observable;
