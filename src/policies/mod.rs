//! Shutdown policy.
//!
//! This module holds the table that decides **which** reported errors end a
//! run. It is consulted by the supervisor for every report; no other
//! component classifies.
//!
//! ## Contents
//! - [`Classify`] transient-vs-fatal decision for one error
//! - [`TransientSet`] allow-list of transient upstream conditions (the default policy)
//! - [`Verdict`] the decision itself
//! - [`classify`] helper that maps `Ok(())` to `Continue` and delegates errors
//!
//! ## Quick wiring
//! ```text
//! forwarder / stream source ── report(Result) ──► Foreman
//!                                                   └─► classify(result, classifier)
//!                                                        ├─ Continue → keep looping
//!                                                        └─ Fatal    → cancel children, return Err
//! ```

mod classify;

pub use classify::{Classify, TransientSet, Verdict, classify};
