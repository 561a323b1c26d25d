//! # Error classification policy.
//!
//! [`Classify`] is the single place that decides whether an error reported
//! during a run keeps it going ([`Verdict::Continue`]) or tears everything
//! down ([`Verdict::Fatal`]). Nothing downstream of the dispatcher makes its
//! own continue/abort decision.
//!
//! No retries, backoff or counting happen here: `Continue` only means the
//! supervisor keeps accepting further reports.
//!
//! ## Defaults
//! [`TransientSet::default()`] treats `Busy`, `Gateway` and `GatewayTimeout`
//! as transient, wherever they appear: reported directly by a stream source,
//! or propagated by a handler through its boxed error.
//!
//! ## Example
//! ```rust
//! use feedvisor::{classify, FeedError, TransientSet, UpstreamError, Verdict};
//!
//! let set = TransientSet::default();
//! assert_eq!(classify(&Ok(()), &set), Verdict::Continue);
//! assert_eq!(classify(&Err(UpstreamError::Busy.into()), &set), Verdict::Continue);
//! assert_eq!(classify(&Err(UpstreamError::RateLimit.into()), &set), Verdict::Fatal);
//!
//! // Transports plug their own policy in as a closure.
//! let lenient = |_: &FeedError| Verdict::Continue;
//! assert_eq!(classify(&Err(FeedError::stream("eof")), &lenient), Verdict::Continue);
//! ```

use crate::error::{FeedError, UpstreamError};

/// Outcome of classifying one report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Keep running.
    Continue,
    /// Shut the run down and surface the error.
    Fatal,
}

/// Decides whether an error is transient or fatal.
pub trait Classify: Send + Sync + 'static {
    /// Classifies one error. Success never reaches this method.
    fn classify(&self, err: &FeedError) -> Verdict;
}

impl<F> Classify for F
where
    F: Fn(&FeedError) -> Verdict + Send + Sync + 'static,
{
    fn classify(&self, err: &FeedError) -> Verdict {
        self(err)
    }
}

/// Classifies one handler or source outcome.
///
/// `Ok(())` always continues; errors are delegated to `classifier`.
pub fn classify(result: &Result<(), FeedError>, classifier: &dyn Classify) -> Verdict {
    match result {
        Ok(()) => Verdict::Continue,
        Err(err) => classifier.classify(err),
    }
}

/// Allow-list of upstream conditions that are transient.
///
/// Anything not in the set, including every handler application error, is fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransientSet {
    transient: Vec<UpstreamError>,
}

impl TransientSet {
    /// Creates a set with exactly the given conditions.
    pub fn new(transient: impl IntoIterator<Item = UpstreamError>) -> Self {
        Self {
            transient: transient.into_iter().collect(),
        }
    }

    /// Creates a set where every error is fatal.
    pub fn empty() -> Self {
        Self {
            transient: Vec::new(),
        }
    }

    /// Returns a new set that also treats `err` as transient.
    pub fn with(mut self, err: UpstreamError) -> Self {
        if !self.transient.contains(&err) {
            self.transient.push(err);
        }
        self
    }

    /// Reports whether `err` is in the allow-list.
    pub fn contains(&self, err: &UpstreamError) -> bool {
        self.transient.contains(err)
    }
}

impl Default for TransientSet {
    /// Busy, bad gateway and gateway timeout.
    fn default() -> Self {
        Self::new([
            UpstreamError::Busy,
            UpstreamError::Gateway,
            UpstreamError::GatewayTimeout,
        ])
    }
}

impl Classify for TransientSet {
    fn classify(&self, err: &FeedError) -> Verdict {
        match err.upstream() {
            Some(up) if self.contains(up) => Verdict::Continue,
            _ => Verdict::Fatal,
        }
    }
}
