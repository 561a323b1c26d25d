//! Runtime core: wiring, supervision and lifecycle.
//!
//! The public API from this module is [`Runtime`] (plus the [`run`] and
//! [`scan`] shorthands) and the [`RunHandle`] / [`Stopper`] pair it returns.
//!
//! Internal modules:
//! - [`dispatcher`]: checks capabilities and starts one stream per enabled switch;
//! - [`forwarder`]: pipes one stream into one handler capability;
//! - [`foreman`]: classifies every report, fires the children token once;
//! - [`lifecycle`]: `stop` / `wait` and the single-fire tear-down;
//! - [`runtime`]: entry points and launch sequence.

mod dispatcher;
mod foreman;
mod forwarder;
mod lifecycle;
mod runtime;

#[cfg(test)]
pub(crate) mod test_support;

pub use lifecycle::{RunHandle, Stopper};
pub use runtime::{Runtime, RuntimeBuilder, run, scan};
