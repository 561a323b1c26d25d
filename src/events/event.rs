//! # Runtime events emitted by the foreman, forwarders and lifecycle hooks.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Stream events**: a forwarder started or its stream ran dry
//! - **Supervision events**: transient/fatal reports, stop, cancellation
//! - **Lifecycle events**: set-up, tear-down, drain grace exceeded
//!
//! The [`Event`] struct carries metadata such as timestamps, stream name,
//! reason and a stable error label.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use feedvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TransientError)
//!     .with_stream("subreddits:rust")
//!     .with_reason("reddit is busy right now")
//!     .with_label("upstream_busy");
//!
//! assert_eq!(ev.kind, EventKind::TransientError);
//! assert_eq!(ev.stream.as_deref(), Some("subreddits:rust"));
//! assert_eq!(ev.label, Some("upstream_busy"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::FeedError;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets `stream` (subscriber name) and `reason` (panic message).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `stream` (subscriber name) and `reason`.
    SubscriberOverflow,

    // === Stream events ===
    /// A forwarding task is attached to a freshly started stream.
    ///
    /// Sets `stream`.
    StreamStarted,

    /// A stream ended on its own (the source stopped producing).
    ///
    /// Sets `stream`.
    StreamEnded,

    /// A handler invocation panicked; reported to the foreman as fatal.
    ///
    /// Sets `stream` and `reason`.
    ForwarderPanicked,

    // === Supervision events ===
    /// A report was classified transient; the run keeps going.
    ///
    /// Sets `reason` and `label`.
    TransientError,

    /// A report was classified fatal; the run is ending.
    ///
    /// Sets `reason` and `label`.
    FatalError,

    /// The caller asked the run to stop.
    StopRequested,

    /// The children cancellation signal fired. Published exactly once per run.
    ChildrenCancelled,

    // === Lifecycle events ===
    /// The handler's set-up hook succeeded.
    ///
    /// Sets `stream` (handler name).
    SetUpCompleted,

    /// The handler's tear-down hook ran. Published at most once per run.
    ///
    /// Sets `stream` (handler name).
    TornDown,

    /// Forwarding tasks did not drain within the configured grace period.
    ///
    /// Sets `reason` (stuck stream names).
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Stream (or subscriber/handler) name, if applicable.
    pub stream: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Stable error label, see [`FeedError::as_label`].
    pub label: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            stream: None,
            reason: None,
            label: None,
        }
    }

    /// Attaches a stream name.
    #[inline]
    pub fn with_stream(mut self, stream: impl Into<Arc<str>>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a stable label.
    #[inline]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Attaches reason and label taken from an error.
    #[inline]
    pub fn with_error(self, err: &FeedError) -> Self {
        self.with_reason(err.as_message()).with_label(err.as_label())
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_stream(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_stream(subscriber)
            .with_reason(info)
    }

    /// Whether this event reports a subscriber queue that dropped events.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
