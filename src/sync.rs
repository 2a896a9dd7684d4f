//! Deferred-value primitives used to coordinate asynchronous credentials.
//!
//! [`AsyncResult`] is a re-armable broadcast cell: producers deliver values from one place while
//! any number of consumers wait on them elsewhere. [`Deferred`] is its single-shot sibling that
//! can also be rejected. Neither primitive times out on its own; race a wait against
//! [`timeout`] when a deadline is needed.

pub mod cell;
pub mod deferred;
pub mod timeout;

pub use cell::*;
pub use deferred::*;
pub use timeout::*;
